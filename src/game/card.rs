use log::warn;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::attributes::{Color, Count, Difficulty, Shape, Style};
use super::board::Board;
use super::error::GameError;

/// 一张卡牌：四个属性的不可变组合，以属性拼接串作为唯一标识。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub style: Style,
    pub shape: Shape,
    pub color: Color,
    pub count: Count,
}

impl Card {
    pub fn new(style: Style, shape: Shape, color: Color, count: Count) -> Self {
        Self {
            style,
            shape,
            color,
            count,
        }
    }

    /// `style-shape-color-count`，同时用作图片的 alt 文本。
    pub fn identifier(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.style, self.shape, self.color, self.count
        )
    }

    /// 图片资源键，不含数量。
    pub fn asset_key(&self) -> String {
        format!("{}-{}-{}", self.style, self.shape, self.color)
    }

    pub fn image_path(&self) -> String {
        format!("imgs/{}.png", self.asset_key())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetOutcome {
    Set,
    NotASet,
}

impl SetOutcome {
    pub fn label(self) -> &'static str {
        match self {
            SetOutcome::Set => "SET!",
            SetOutcome::NotASet => "Not a Set :(",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CellStatus {
    Idle,
    Selected,
    Resolving { outcome: SetOutcome },
}

impl Default for CellStatus {
    fn default() -> Self {
        CellStatus::Idle
    }
}

/// 提供给前端渲染的卡牌数据。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    pub id: String,
    pub slot: usize,
    pub style: Style,
    pub shape: Shape,
    pub color: Color,
    pub count: Count,
    pub images: Vec<String>,
    pub alt: String,
    pub status: CellStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CardView {
    pub fn new(card: &Card, slot: usize, status: CellStatus) -> Self {
        let id = card.identifier();
        let label = match status {
            CellStatus::Resolving { outcome } => Some(outcome.label().to_string()),
            _ => None,
        };
        Self {
            alt: id.clone(),
            id,
            slot,
            style: card.style,
            shape: card.shape,
            color: card.color,
            count: card.count,
            images: vec![card.asset_key(); card.count.value()],
            status,
            label,
        }
    }
}

/// 随机生成不与棋盘重复的卡牌。
#[derive(Debug, Clone)]
pub struct CardGenerator {
    rng: SmallRng,
    max_attempts: usize,
}

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 512;

impl Default for CardGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CardGenerator {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            max_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            max_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn draw(&mut self, difficulty: Difficulty) -> Card {
        let style = match difficulty.fixed_style() {
            Some(style) => style,
            None => *Style::ALL.choose(&mut self.rng).unwrap_or(&Style::Solid),
        };
        let shape = *Shape::ALL.choose(&mut self.rng).unwrap_or(&Shape::Diamond);
        let color = *Color::ALL.choose(&mut self.rng).unwrap_or(&Color::Green);
        let count = *Count::ALL.choose(&mut self.rng).unwrap_or(&Count::One);
        Card::new(style, shape, color, count)
    }

    /// 整组重抽直到得到棋盘上没有的卡牌，超过重试上限时报告属性空间耗尽。
    pub fn generate(&mut self, difficulty: Difficulty, board: &Board) -> Result<Card, GameError> {
        self.generate_avoiding(difficulty, board, &[])
    }

    /// 同 `generate`，另外避开 `reserved` 中尚未落到棋盘上的卡牌。
    pub fn generate_avoiding(
        &mut self,
        difficulty: Difficulty,
        board: &Board,
        reserved: &[Card],
    ) -> Result<Card, GameError> {
        let taken = board.len()
            + reserved
                .iter()
                .filter(|card| !board.contains(card))
                .count();
        if taken >= difficulty.combinations() {
            warn!("attribute space exhausted: {taken} cards on a {difficulty} board");
            return Err(GameError::AttributeSpaceExhausted { difficulty, taken });
        }

        for _ in 0..self.max_attempts {
            let card = self.draw(difficulty);
            if !board.contains(&card) && !reserved.contains(&card) {
                return Ok(card);
            }
        }

        warn!(
            "gave up after {} draws with {taken} cards on a {difficulty} board",
            self.max_attempts
        );
        Err(GameError::AttributeSpaceExhausted { difficulty, taken })
    }
}
