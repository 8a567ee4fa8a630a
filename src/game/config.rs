use serde::{Deserialize, Serialize};

use super::attributes::Difficulty;
use super::card::DEFAULT_MAX_GENERATION_ATTEMPTS;
use super::error::GameError;
use super::rules::SetRule;

/// 前端表单里读到的原始值，未经校验。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRequest {
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, alias = "duration")]
    pub duration_seconds: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSettings {
    pub difficulty: Difficulty,
    pub duration_seconds: u32,
}

impl RoundRequest {
    pub fn new(difficulty: impl Into<String>, duration_seconds: impl Into<String>) -> Self {
        Self {
            difficulty: Some(difficulty.into()),
            duration_seconds: Some(duration_seconds.into()),
        }
    }

    pub fn resolve(&self) -> Result<RoundSettings, GameError> {
        let raw_difficulty = required("difficulty", self.difficulty.as_deref())?;
        let difficulty = raw_difficulty
            .parse::<Difficulty>()
            .map_err(|_| invalid("difficulty", raw_difficulty))?;

        let raw_duration = required("duration_seconds", self.duration_seconds.as_deref())?;
        let duration_seconds = raw_duration
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|seconds| *seconds > 0)
            .ok_or_else(|| invalid("duration_seconds", raw_duration))?;

        Ok(RoundSettings {
            difficulty,
            duration_seconds,
        })
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, GameError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GameError::ConfigurationMissing {
            field: field.to_string(),
        }),
    }
}

fn invalid(field: &str, value: &str) -> GameError {
    GameError::ConfigurationInvalid {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// 对局节奏参数，前端可用 JSON 覆盖其中任意字段。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub penalty_seconds: u32,
    pub resolution_delay_ms: u32,
    pub tick_interval_ms: u32,
    pub max_generation_attempts: usize,
    pub rule: SetRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            penalty_seconds: 15,
            resolution_delay_ms: 1000,
            tick_interval_ms: 1000,
            max_generation_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            rule: SetRule::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_rule(mut self, rule: SetRule) -> Self {
        self.rule = rule;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_form_values() {
        let settings = RoundRequest::new("Easy", " 90 ")
            .resolve()
            .expect("valid form values should resolve");
        assert_eq!(settings.difficulty, Difficulty::Easy);
        assert_eq!(settings.duration_seconds, 90);
    }

    #[test]
    fn missing_difficulty_fails_fast() {
        let request = RoundRequest {
            difficulty: None,
            duration_seconds: Some("60".into()),
        };
        assert_eq!(
            request.resolve(),
            Err(GameError::ConfigurationMissing {
                field: "difficulty".into()
            })
        );
    }

    #[test]
    fn blank_duration_counts_as_missing() {
        let request = RoundRequest::new("normal", "  ");
        assert_eq!(
            request.resolve(),
            Err(GameError::ConfigurationMissing {
                field: "duration_seconds".into()
            })
        );
    }

    #[test]
    fn unusable_values_are_invalid() {
        assert!(matches!(
            RoundRequest::new("hard", "60").resolve(),
            Err(GameError::ConfigurationInvalid { ref field, .. }) if field == "difficulty"
        ));
        assert!(matches!(
            RoundRequest::new("easy", "0").resolve(),
            Err(GameError::ConfigurationInvalid { ref field, .. }) if field == "duration_seconds"
        ));
        assert!(matches!(
            RoundRequest::new("easy", "-5").resolve(),
            Err(GameError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn partial_config_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{"penalty_seconds": 5, "rule": "canonical"}"#)
            .expect("partial config should parse");
        assert_eq!(config.penalty_seconds, 5);
        assert_eq!(config.rule, SetRule::Canonical);
        assert_eq!(config.resolution_delay_ms, 1000);
        assert_eq!(config.tick_interval_ms, 1000);
    }
}
