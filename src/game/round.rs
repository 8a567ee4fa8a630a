use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{
    attributes::Difficulty,
    board::Board,
    card::{Card, CardGenerator, CardView, CellStatus, SetOutcome},
    config::{GameConfig, RoundRequest},
    error::GameError,
    rules,
    timer::{format_clock, TimerEngine, TimerSignal},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    NotStarted,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Menu,
    Game,
}

/// 前端与计时器投递给控制器的命令。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RoundCommand {
    StartRequested {
        #[serde(default)]
        request: RoundRequest,
    },
    CardClicked {
        card_id: String,
    },
    RefreshRequested,
    BackRequested,
    Tick,
    ResolutionDue {
        resolution_id: u64,
    },
}

/// 控制器产生的事件流，前端据此更新页面。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    ViewChanged {
        view: View,
    },
    RoundStarted {
        difficulty: Difficulty,
        duration_seconds: u32,
        board: Vec<CardView>,
    },
    BoardRefreshed {
        board: Vec<CardView>,
    },
    CardSelected {
        card_id: String,
        slot: usize,
    },
    CardDeselected {
        card_id: String,
        slot: usize,
    },
    TripleEvaluated {
        card_ids: Vec<String>,
        outcome: SetOutcome,
    },
    ScoreChanged {
        score: u32,
    },
    PenaltyApplied {
        seconds: u32,
    },
    ResolutionScheduled {
        resolution_id: u64,
        delay_ms: u32,
    },
    CardReplaced {
        slot: usize,
        previous: String,
        card: CardView,
    },
    CardRestored {
        slot: usize,
        card: CardView,
    },
    TimeChanged {
        remaining: u32,
        display: String,
    },
    RefreshAvailability {
        enabled: bool,
    },
    RoundEnded {
        score: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingResolution {
    generation: u64,
    slots: [usize; 3],
    cards: [Card; 3],
    outcome: SetOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub status: RoundStatus,
    pub view: View,
    pub difficulty: Difficulty,
    pub score: u32,
    pub remaining_seconds: u32,
    pub time_display: String,
    pub refresh_enabled: bool,
    pub board: Vec<CardView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<String>,
    pub pending_resolutions: usize,
}

pub struct RoundController {
    config: GameConfig,
    generator: CardGenerator,
    board: Board,
    selection: Vec<usize>,
    timer: Option<TimerEngine>,
    status: RoundStatus,
    view: View,
    difficulty: Difficulty,
    score: u32,
    pending: BTreeMap<u64, PendingResolution>,
    next_resolution_id: u64,
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl RoundController {
    pub fn new(config: GameConfig) -> Self {
        let generator = CardGenerator::new();
        Self::with_generator(config, generator)
    }

    pub fn with_generator(config: GameConfig, generator: CardGenerator) -> Self {
        let generator = generator.with_max_attempts(config.max_generation_attempts);
        Self {
            config,
            generator,
            board: Board::new(),
            selection: Vec::with_capacity(3),
            timer: None,
            status: RoundStatus::NotStarted,
            view: View::Menu,
            difficulty: Difficulty::default(),
            score: 0,
            pending: BTreeMap::new(),
            next_resolution_id: 1,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.as_ref().map(TimerEngine::remaining).unwrap_or(0)
    }

    /// 统一入口：处理一条命令并返回需要通知前端的事件。
    pub fn handle(&mut self, command: RoundCommand) -> Result<Vec<GameEvent>, GameError> {
        match command {
            RoundCommand::StartRequested { request } => self.start(&request),
            RoundCommand::CardClicked { card_id } => self.click(&card_id),
            RoundCommand::RefreshRequested => self.refresh(),
            RoundCommand::BackRequested => Ok(self.back()),
            RoundCommand::Tick => Ok(self.tick()),
            RoundCommand::ResolutionDue { resolution_id } => self.resolve(resolution_id),
        }
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.status != RoundStatus::Running {
            return Err(GameError::RoundNotRunning);
        }
        Ok(())
    }

    fn time_event(&self) -> GameEvent {
        let remaining = self.remaining_seconds();
        GameEvent::TimeChanged {
            remaining,
            display: format_clock(remaining),
        }
    }

    /// 新棋盘完整生成后才替换旧棋盘；失败时旧棋盘保持原样。
    fn rebuild_board(&mut self) -> Result<(), GameError> {
        let mut fresh = self.board.successor();
        for _ in 0..self.difficulty.board_size() {
            let card = self.generator.generate(self.difficulty, &fresh)?;
            fresh.push(card);
        }
        fresh.integrity_check()?;

        self.board = fresh;
        self.selection.clear();
        self.pending.clear();
        Ok(())
    }

    pub fn start(&mut self, request: &RoundRequest) -> Result<Vec<GameEvent>, GameError> {
        if self.status == RoundStatus::Running {
            return Err(GameError::RoundAlreadyRunning);
        }
        let settings = request.resolve()?;

        self.difficulty = settings.difficulty;
        self.rebuild_board()?;
        self.score = 0;
        self.timer = Some(TimerEngine::started(settings.duration_seconds));
        self.status = RoundStatus::Running;
        self.view = View::Game;
        info!(
            "round started: {} mode, {}s, {} cards",
            settings.difficulty,
            settings.duration_seconds,
            self.board.len()
        );

        Ok(vec![
            GameEvent::ViewChanged { view: View::Game },
            GameEvent::RoundStarted {
                difficulty: settings.difficulty,
                duration_seconds: settings.duration_seconds,
                board: self.board.views(),
            },
            GameEvent::ScoreChanged { score: self.score },
            self.time_event(),
            GameEvent::RefreshAvailability { enabled: true },
        ])
    }

    pub fn click(&mut self, card_id: &str) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;
        let slot = self
            .board
            .slot_of(card_id)
            .ok_or_else(|| GameError::CardNotOnBoard {
                card_id: card_id.to_string(),
            })?;
        let status = self
            .board
            .cell(slot)
            .map(|cell| cell.status)
            .unwrap_or_default();

        match status {
            CellStatus::Resolving { .. } => {
                debug!("ignoring click on {card_id} while it resolves");
                Ok(Vec::new())
            }
            CellStatus::Selected => {
                self.selection.retain(|selected| *selected != slot);
                self.board.set_status(slot, CellStatus::Idle);
                Ok(vec![GameEvent::CardDeselected {
                    card_id: card_id.to_string(),
                    slot,
                }])
            }
            CellStatus::Idle => {
                self.selection.push(slot);
                self.board.set_status(slot, CellStatus::Selected);
                let mut events = vec![GameEvent::CardSelected {
                    card_id: card_id.to_string(),
                    slot,
                }];
                if self.selection.len() == 3 {
                    events.extend(self.evaluate_selection());
                }
                Ok(events)
            }
        }
    }

    fn evaluate_selection(&mut self) -> Vec<GameEvent> {
        let taken = std::mem::take(&mut self.selection);
        let Ok(slots) = <[usize; 3]>::try_from(taken.as_slice()) else {
            warn!("evaluation requested with {} selected cards", taken.len());
            return Vec::new();
        };
        let cards: Vec<Card> = slots
            .iter()
            .filter_map(|slot| self.board.cell(*slot).map(|cell| cell.card))
            .collect();
        let Ok(cards) = <[Card; 3]>::try_from(cards) else {
            warn!("selected slots {slots:?} are not all on the board");
            return Vec::new();
        };

        let outcome = if rules::validate(self.config.rule, &cards, self.difficulty) {
            SetOutcome::Set
        } else {
            SetOutcome::NotASet
        };
        for slot in slots {
            self.board.set_status(slot, CellStatus::Resolving { outcome });
        }

        let resolution_id = self.next_resolution_id;
        self.next_resolution_id += 1;
        self.pending.insert(
            resolution_id,
            PendingResolution {
                generation: self.board.generation(),
                slots,
                cards,
                outcome,
            },
        );

        let card_ids: Vec<String> = cards.iter().map(Card::identifier).collect();
        debug!("evaluated {card_ids:?}: {outcome:?}");
        let mut events = vec![GameEvent::TripleEvaluated { card_ids, outcome }];

        if outcome == SetOutcome::Set {
            self.score += 1;
            events.push(GameEvent::ScoreChanged { score: self.score });
        }
        events.push(GameEvent::ResolutionScheduled {
            resolution_id,
            delay_ms: self.config.resolution_delay_ms,
        });

        if outcome == SetOutcome::NotASet {
            let penalty = self.config.penalty_seconds;
            let signal = self
                .timer
                .as_mut()
                .and_then(|timer| timer.apply_penalty(penalty));
            events.push(GameEvent::PenaltyApplied { seconds: penalty });
            events.push(self.time_event());
            if signal == Some(TimerSignal::Expired) {
                events.extend(self.end_round());
            }
        }
        events
    }

    /// 延迟结算：成组的三张换成新牌，否则恢复原状。
    pub fn resolve(&mut self, resolution_id: u64) -> Result<Vec<GameEvent>, GameError> {
        let Some(pending) = self.pending.remove(&resolution_id) else {
            debug!("resolution {resolution_id} is no longer pending");
            return Ok(Vec::new());
        };
        if pending.generation != self.board.generation() {
            debug!("resolution {resolution_id} belongs to a discarded board");
            return Ok(Vec::new());
        }

        let live: Vec<(usize, Card)> = pending
            .slots
            .into_iter()
            .zip(pending.cards)
            .filter(|(slot, card)| {
                let holds = self.board.cell(*slot).map(|cell| cell.card) == Some(*card);
                if !holds {
                    warn!("slot {slot} no longer holds {}", card.identifier());
                }
                holds
            })
            .collect();

        let mut events = Vec::with_capacity(live.len());
        match pending.outcome {
            SetOutcome::Set => {
                let mut replacements = Vec::with_capacity(live.len());
                for _ in &live {
                    match self.generator.generate_avoiding(
                        self.difficulty,
                        &self.board,
                        &replacements,
                    ) {
                        Ok(card) => replacements.push(card),
                        Err(error) => {
                            for (slot, _) in &live {
                                self.board.set_status(*slot, CellStatus::Idle);
                            }
                            return Err(error);
                        }
                    }
                }
                for ((slot, card), replacement) in live.into_iter().zip(replacements) {
                    self.board.replace(slot, replacement);
                    events.push(GameEvent::CardReplaced {
                        slot,
                        previous: card.identifier(),
                        card: CardView::new(&replacement, slot, CellStatus::Idle),
                    });
                }
            }
            SetOutcome::NotASet => {
                for (slot, card) in live {
                    self.board.set_status(slot, CellStatus::Idle);
                    events.push(GameEvent::CardRestored {
                        slot,
                        card: CardView::new(&card, slot, CellStatus::Idle),
                    });
                }
            }
        }
        self.board.integrity_check()?;
        Ok(events)
    }

    /// 换一整盘新牌；计时与得分保持不变。
    pub fn refresh(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;
        self.rebuild_board()?;
        debug!("board refreshed with {} cards", self.board.len());
        Ok(vec![GameEvent::BoardRefreshed {
            board: self.board.views(),
        }])
    }

    pub fn tick(&mut self) -> Vec<GameEvent> {
        if self.status != RoundStatus::Running {
            return Vec::new();
        }
        match self.timer.as_mut().and_then(TimerEngine::tick) {
            Some(TimerSignal::Remaining { .. }) => vec![self.time_event()],
            Some(TimerSignal::Expired) => self.end_round(),
            None => Vec::new(),
        }
    }

    /// 回到菜单：结束进行中的对局并丢弃棋盘。
    pub fn back(&mut self) -> Vec<GameEvent> {
        let mut events = if self.status == RoundStatus::Running {
            self.end_round()
        } else {
            Vec::new()
        };
        self.board.clear();
        self.selection.clear();
        self.pending.clear();
        self.view = View::Menu;
        events.push(GameEvent::ViewChanged { view: View::Menu });
        events
    }

    fn end_round(&mut self) -> Vec<GameEvent> {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.status = RoundStatus::Ended;

        let mut events = Vec::new();
        for slot in std::mem::take(&mut self.selection) {
            if let Some(cell) = self.board.cell(slot) {
                let card_id = cell.card.identifier();
                self.board.set_status(slot, CellStatus::Idle);
                events.push(GameEvent::CardDeselected { card_id, slot });
            }
        }
        info!("round ended with {} sets", self.score);

        events.push(GameEvent::TimeChanged {
            remaining: 0,
            display: format_clock(0),
        });
        events.push(GameEvent::RefreshAvailability { enabled: false });
        events.push(GameEvent::RoundEnded { score: self.score });
        events
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let remaining_seconds = self.remaining_seconds();
        RoundSnapshot {
            status: self.status,
            view: self.view,
            difficulty: self.difficulty,
            score: self.score,
            remaining_seconds,
            time_display: format_clock(remaining_seconds),
            refresh_enabled: self.status == RoundStatus::Running,
            board: self.board.views(),
            selected: self
                .selection
                .iter()
                .filter_map(|slot| self.board.cell(*slot))
                .map(|cell| cell.card.identifier())
                .collect(),
            pending_resolutions: self.pending.len(),
        }
    }
}
