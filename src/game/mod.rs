//! 游戏核心逻辑模块（卡牌生成、Set 判定、对局状态机与倒计时）。

pub mod attributes;
pub mod board;
pub mod card;
pub mod config;
pub mod error;
pub mod round;
pub mod rules;
pub mod timer;

pub use attributes::{Color, Count, Difficulty, Shape, Style};
pub use board::{Board, Cell};
pub use card::{Card, CardGenerator, CardView, CellStatus, SetOutcome};
pub use config::{GameConfig, RoundRequest, RoundSettings};
pub use error::{GameError, IntegrityError};
pub use round::{GameEvent, RoundCommand, RoundController, RoundSnapshot, RoundStatus, View};
pub use rules::{is_canonical_set, is_set, validate, SetRule};
pub use timer::{format_clock, TimerEngine, TimerPhase, TimerSignal};
