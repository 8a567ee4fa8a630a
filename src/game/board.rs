use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::card::{Card, CardView, CellStatus};
use super::error::IntegrityError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub card: Card,
    #[serde(default)]
    pub status: CellStatus,
}

/// 棋盘：有序的卡位列表，外加标识到卡位的索引。
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: Vec<Cell>,
    index: HashMap<String, usize>,
    generation: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 每次整盘重建都会递增，用来识别过期的延迟结算。
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.index.contains_key(&card.identifier())
    }

    pub fn slot_of(&self, card_id: &str) -> Option<usize> {
        self.index.get(card_id).copied()
    }

    pub fn cell(&self, slot: usize) -> Option<&Cell> {
        self.cells.get(slot)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> + '_ {
        self.cells.iter().map(|cell| &cell.card)
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.cards().map(Card::identifier).collect()
    }

    pub fn push(&mut self, card: Card) -> usize {
        let slot = self.cells.len();
        self.index.insert(card.identifier(), slot);
        self.cells.push(Cell {
            card,
            status: CellStatus::Idle,
        });
        slot
    }

    /// 原位替换卡牌，返回被换下的卡牌。
    pub fn replace(&mut self, slot: usize, card: Card) -> Option<Card> {
        let cell = self.cells.get_mut(slot)?;
        let previous = std::mem::replace(&mut cell.card, card);
        cell.status = CellStatus::Idle;
        self.index.remove(&previous.identifier());
        self.index.insert(card.identifier(), slot);
        Some(previous)
    }

    pub fn set_status(&mut self, slot: usize, status: CellStatus) -> bool {
        match self.cells.get_mut(slot) {
            Some(cell) => {
                cell.status = status;
                true
            }
            None => false,
        }
    }

    pub fn selected_slots(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.status == CellStatus::Selected)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// 清空全部卡牌并开始新的一代。
    pub fn clear(&mut self) {
        self.cells.clear();
        self.index.clear();
        self.generation += 1;
    }

    /// 空的下一代棋盘，用于先在旁边生成、成功后再整体换上。
    pub fn successor(&self) -> Board {
        Board {
            generation: self.generation + 1,
            ..Board::default()
        }
    }

    pub fn views(&self) -> Vec<CardView> {
        self.cells
            .iter()
            .enumerate()
            .map(|(slot, cell)| CardView::new(&cell.card, slot, cell.status))
            .collect()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let mut seen = HashSet::new();
        for card in self.cards() {
            let card_id = card.identifier();
            if !seen.insert(card_id.clone()) {
                return Err(IntegrityError::DuplicateCard { card_id });
            }
        }
        for (slot, cell) in self.cells.iter().enumerate() {
            let card_id = cell.card.identifier();
            if self.index.get(&card_id) != Some(&slot) {
                return Err(IntegrityError::IndexMismatch { card_id, slot });
            }
        }
        for (card_id, &slot) in &self.index {
            let matches = self
                .cells
                .get(slot)
                .map(|cell| cell.card.identifier() == *card_id)
                .unwrap_or(false);
            if !matches {
                return Err(IntegrityError::IndexMismatch {
                    card_id: card_id.clone(),
                    slot,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::attributes::{Color, Count, Shape, Style};

    fn sample_cards() -> [Card; 3] {
        [
            Card::new(Style::Solid, Shape::Diamond, Color::Red, Count::One),
            Card::new(Style::Striped, Shape::Oval, Color::Green, Count::Two),
            Card::new(Style::Outline, Shape::Squiggle, Color::Purple, Count::Three),
        ]
    }

    #[test]
    fn index_tracks_slots_through_replacement() {
        let [a, b, c] = sample_cards();
        let mut board = Board::new();
        board.push(a);
        board.push(b);

        assert_eq!(board.slot_of("striped-oval-green-2"), Some(1));
        board.set_status(1, CellStatus::Selected);

        let previous = board.replace(1, c).expect("slot 1 exists");
        assert_eq!(previous, b);
        assert_eq!(board.slot_of("striped-oval-green-2"), None);
        assert_eq!(board.slot_of("outline-squiggle-purple-3"), Some(1));
        assert_eq!(
            board.cell(1).map(|cell| cell.status),
            Some(CellStatus::Idle),
            "replacement resets the cell status"
        );
        board.integrity_check().expect("board should stay consistent");
    }

    #[test]
    fn clear_starts_a_new_generation() {
        let [a, b, _] = sample_cards();
        let mut board = Board::new();
        board.push(a);
        board.push(b);
        let before = board.generation();

        board.clear();

        assert!(board.is_empty());
        assert!(!board.contains(&a));
        assert_eq!(board.generation(), before + 1);

        let next = board.successor();
        assert!(next.is_empty());
        assert_eq!(next.generation(), before + 2);
    }

    #[test]
    fn duplicate_cards_fail_integrity_check() {
        let [a, _, _] = sample_cards();
        let mut board = Board::new();
        board.push(a);
        board.push(a);

        assert_eq!(
            board.integrity_check(),
            Err(IntegrityError::DuplicateCard {
                card_id: a.identifier()
            })
        );
    }

    #[test]
    fn views_follow_board_order() {
        let cards = sample_cards();
        let mut board = Board::new();
        for card in cards {
            board.push(card);
        }
        board.set_status(2, CellStatus::Selected);

        let views = board.views();
        let ids: Vec<&str> = views.iter().map(|view| view.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "solid-diamond-red-1",
                "striped-oval-green-2",
                "outline-squiggle-purple-3"
            ]
        );
        assert_eq!(views[2].status, CellStatus::Selected);
        assert_eq!(board.selected_slots(), vec![2]);
    }
}
