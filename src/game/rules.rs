use serde::{Deserialize, Serialize};

use super::attributes::Difficulty;
use super::card::Card;

/// 判定规则。默认沿用页面的宽松规则：任一属性三张完全相同即成组。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SetRule {
    AnyMatch,
    Canonical,
}

impl Default for SetRule {
    fn default() -> Self {
        SetRule::AnyMatch
    }
}

fn all_same<T: PartialEq>(a: T, b: T, c: T) -> bool {
    a == b && b == c
}

fn all_different<T: PartialEq>(a: T, b: T, c: T) -> bool {
    a != b && b != c && a != c
}

/// 按 style（仅普通模式）→ shape → color → count 的顺序检查，
/// 第一个三张完全一致的属性即判定为 Set。
pub fn is_set(a: &Card, b: &Card, c: &Card, difficulty: Difficulty) -> bool {
    if difficulty.checks_style() && all_same(a.style, b.style, c.style) {
        return true;
    }
    if all_same(a.shape, b.shape, c.shape) {
        return true;
    }
    if all_same(a.color, b.color, c.color) {
        return true;
    }
    all_same(a.count, b.count, c.count)
}

/// 标准 Set 规则：每个参与判定的属性要么全同，要么全不同。
pub fn is_canonical_set(a: &Card, b: &Card, c: &Card, difficulty: Difficulty) -> bool {
    fn holds<T: PartialEq + Copy>(a: T, b: T, c: T) -> bool {
        all_same(a, b, c) || all_different(a, b, c)
    }

    (!difficulty.checks_style() || holds(a.style, b.style, c.style))
        && holds(a.shape, b.shape, c.shape)
        && holds(a.color, b.color, c.color)
        && holds(a.count, b.count, c.count)
}

pub fn validate(rule: SetRule, cards: &[Card; 3], difficulty: Difficulty) -> bool {
    let [a, b, c] = cards;
    match rule {
        SetRule::AnyMatch => is_set(a, b, c, difficulty),
        SetRule::Canonical => is_canonical_set(a, b, c, difficulty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::attributes::{Color, Count, Shape, Style};

    fn card(style: Style, shape: Shape, color: Color, count: Count) -> Card {
        Card::new(style, shape, color, count)
    }

    fn permutations(cards: [Card; 3]) -> Vec<[Card; 3]> {
        let [a, b, c] = cards;
        vec![
            [a, b, c],
            [a, c, b],
            [b, a, c],
            [b, c, a],
            [c, a, b],
            [c, b, a],
        ]
    }

    #[test]
    fn shared_shape_color_count_with_varied_style_is_a_set() {
        let cards = [
            card(Style::Solid, Shape::Oval, Color::Green, Count::Two),
            card(Style::Striped, Shape::Oval, Color::Green, Count::Two),
            card(Style::Outline, Shape::Oval, Color::Green, Count::Two),
        ];
        assert!(validate(SetRule::AnyMatch, &cards, Difficulty::Normal));
    }

    #[test]
    fn single_shared_attribute_is_enough() {
        let cards = [
            card(Style::Solid, Shape::Diamond, Color::Red, Count::One),
            card(Style::Striped, Shape::Oval, Color::Red, Count::Two),
            card(Style::Outline, Shape::Squiggle, Color::Red, Count::Three),
        ];
        assert!(validate(SetRule::AnyMatch, &cards, Difficulty::Normal));
    }

    #[test]
    fn all_different_everywhere_is_rejected_by_default_rule() {
        let cards = [
            card(Style::Solid, Shape::Diamond, Color::Green, Count::One),
            card(Style::Striped, Shape::Oval, Color::Red, Count::Two),
            card(Style::Outline, Shape::Squiggle, Color::Purple, Count::Three),
        ];
        assert!(!validate(SetRule::AnyMatch, &cards, Difficulty::Normal));
        assert!(validate(SetRule::Canonical, &cards, Difficulty::Normal));
    }

    #[test]
    fn style_alone_counts_only_in_normal_mode() {
        let cards = [
            card(Style::Solid, Shape::Diamond, Color::Green, Count::One),
            card(Style::Solid, Shape::Oval, Color::Red, Count::Two),
            card(Style::Solid, Shape::Squiggle, Color::Purple, Count::Three),
        ];
        assert!(is_set(&cards[0], &cards[1], &cards[2], Difficulty::Normal));
        assert!(
            !is_set(&cards[0], &cards[1], &cards[2], Difficulty::Easy),
            "easy mode ignores style entirely"
        );
    }

    #[test]
    fn easy_mode_ignores_style_content() {
        let mixed = [
            card(Style::Solid, Shape::Diamond, Color::Green, Count::One),
            card(Style::Striped, Shape::Oval, Color::Red, Count::One),
            card(Style::Outline, Shape::Squiggle, Color::Purple, Count::One),
        ];
        let solid = mixed.map(|c| Card { style: Style::Solid, ..c });
        assert_eq!(
            validate(SetRule::AnyMatch, &mixed, Difficulty::Easy),
            validate(SetRule::AnyMatch, &solid, Difficulty::Easy)
        );
        assert_eq!(
            validate(SetRule::Canonical, &mixed, Difficulty::Easy),
            validate(SetRule::Canonical, &solid, Difficulty::Easy)
        );
    }

    #[test]
    fn decision_is_independent_of_argument_order() {
        let fixtures = [
            [
                card(Style::Solid, Shape::Diamond, Color::Red, Count::One),
                card(Style::Striped, Shape::Diamond, Color::Green, Count::Two),
                card(Style::Outline, Shape::Oval, Color::Purple, Count::Three),
            ],
            [
                card(Style::Solid, Shape::Diamond, Color::Red, Count::One),
                card(Style::Striped, Shape::Oval, Color::Green, Count::Two),
                card(Style::Outline, Shape::Squiggle, Color::Purple, Count::Three),
            ],
            [
                card(Style::Solid, Shape::Oval, Color::Green, Count::Two),
                card(Style::Striped, Shape::Oval, Color::Green, Count::Two),
                card(Style::Outline, Shape::Oval, Color::Green, Count::Two),
            ],
        ];

        for rule in [SetRule::AnyMatch, SetRule::Canonical] {
            for difficulty in [Difficulty::Easy, Difficulty::Normal] {
                for fixture in fixtures {
                    let expected = validate(rule, &fixture, difficulty);
                    for permuted in permutations(fixture) {
                        assert_eq!(validate(rule, &permuted, difficulty), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn counts_one_two_three_share_nothing_else() {
        let cards = [
            card(Style::Solid, Shape::Diamond, Color::Red, Count::One),
            card(Style::Striped, Shape::Oval, Color::Green, Count::Two),
            card(Style::Outline, Shape::Squiggle, Color::Purple, Count::Three),
        ];
        assert!(
            !is_set(&cards[0], &cards[1], &cards[2], Difficulty::Normal),
            "all-different counts do not satisfy the match-only rule"
        );
    }
}
