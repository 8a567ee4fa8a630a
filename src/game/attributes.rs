use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 卡牌填充样式。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Solid,
    Striped,
    Outline,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Solid, Style::Striped, Style::Outline];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Solid => "solid",
            Style::Striped => "striped",
            Style::Outline => "outline",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Diamond,
    Oval,
    Squiggle,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Diamond, Shape::Oval, Shape::Squiggle];

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Diamond => "diamond",
            Shape::Oval => "oval",
            Shape::Squiggle => "squiggle",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Purple,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Green, Color::Red, Color::Purple];

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Purple => "purple",
        }
    }
}

/// 图案数量（1~3），决定同一张图片重复绘制几次。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Count {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Count {
    pub const ALL: [Count; 3] = [Count::One, Count::Two, Count::Three];

    pub fn value(self) -> usize {
        match self {
            Count::One => 1,
            Count::Two => 2,
            Count::Three => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Count::One => "1",
            Count::Two => "2",
            Count::Three => "3",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Style, Shape, Color, Count);

/// 难度。简单模式下样式固定为 solid，且不参与判定。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
        }
    }

    pub fn board_size(self) -> usize {
        match self {
            Difficulty::Easy => 9,
            Difficulty::Normal => 12,
        }
    }

    /// 该难度下可能出现的不同卡牌总数。
    pub fn combinations(self) -> usize {
        match self {
            Difficulty::Easy => Shape::ALL.len() * Color::ALL.len() * Count::ALL.len(),
            Difficulty::Normal => {
                Style::ALL.len() * Shape::ALL.len() * Color::ALL.len() * Count::ALL.len()
            }
        }
    }

    pub fn fixed_style(self) -> Option<Style> {
        match self {
            Difficulty::Easy => Some(Style::Solid),
            Difficulty::Normal => None,
        }
    }

    pub fn checks_style(self) -> bool {
        self.fixed_style().is_none()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            _ => Err(()),
        }
    }
}
