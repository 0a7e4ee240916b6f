//! World rules: claims the novel's period cannot contain
//!
//! The setting is dated by the latest entry on the novel's timeline. A claim
//! naming a technology from the anachronism table in a setting that ends
//! before `historical_before` contradicts the novel.

use canon_domain::text::tokens;
use canon_domain::NarrativeTime;
use serde::{Deserialize, Serialize};

/// Technologies that place a claim after the historical cutoff
const DEFAULT_ANACHRONISMS: &[&str] = &[
    "airplane",
    "car",
    "computer",
    "electricity",
    "email",
    "internet",
    "phone",
    "radio",
    "telephone",
    "television",
];

/// Configuration for the world rules
///
/// Timeline timestamps are read as years; disable the rules for novels whose
/// timeline uses another scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldRulesConfig {
    /// Apply the anachronism rule
    pub enabled: bool,

    /// Settings whose latest event is earlier than this are historical
    pub historical_before: NarrativeTime,

    /// Single lowercase words, matched whole or with a plural `s`
    pub anachronisms: Vec<String>,
}

impl Default for WorldRulesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            historical_before: 1900,
            anachronisms: DEFAULT_ANACHRONISMS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl WorldRulesConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for word in &self.anachronisms {
            let valid = !word.is_empty() && word.chars().all(|c| c.is_alphanumeric()) && word.to_lowercase() == *word;
            if !valid {
                return Err(format!("anachronism '{}' must be a single lowercase word", word));
            }
        }
        Ok(())
    }

    /// The first anachronism `text` names, given a setting whose latest event is `latest`
    pub fn anachronism_in(&self, text: &str, latest: NarrativeTime) -> Option<&str> {
        if !self.enabled || latest >= self.historical_before {
            return None;
        }
        let words = tokens(text);
        self.anachronisms
            .iter()
            .find(|keyword| {
                words
                    .iter()
                    .any(|w| w == *keyword || w.strip_suffix('s') == Some(keyword.as_str()))
            })
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_setting_flags_technology() {
        let rules = WorldRulesConfig::default();
        assert_eq!(rules.anachronism_in("Anna answered the telephone", 1825), Some("telephone"));
        assert_eq!(rules.anachronism_in("Anna sold her cars", 1825), Some("car"));
    }

    #[test]
    fn test_modern_setting_allows_technology() {
        let rules = WorldRulesConfig::default();
        assert_eq!(rules.anachronism_in("Anna answered the telephone", 1950), None);
        assert_eq!(rules.anachronism_in("Anna answered the telephone", 1900), None);
    }

    #[test]
    fn test_whole_words_only() {
        let rules = WorldRulesConfig::default();
        assert_eq!(rules.anachronism_in("Anna carried the carpet", 1825), None);
    }

    #[test]
    fn test_disabled_rules_never_fire() {
        let rules = WorldRulesConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(rules.anachronism_in("Anna drove a car", 1825), None);
    }

    #[test]
    fn test_invalid_keyword_rejected() {
        let rules = WorldRulesConfig {
            anachronisms: vec!["steam engine".to_string()],
            ..Default::default()
        };
        assert!(rules.validate().is_err());
        assert!(WorldRulesConfig::default().validate().is_ok());
    }
}
