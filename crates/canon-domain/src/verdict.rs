//! Verdicts for claims and documents

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking a claim (or a whole document) against the novel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The novel backs the claim
    Supported,
    /// The novel refutes the claim
    Contradicted,
    /// The novel neither backs nor refutes the claim
    Unverifiable,
}

impl Verdict {
    /// Uppercase name as used in dossiers and predictions
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "SUPPORTED",
            Verdict::Contradicted => "CONTRADICTED",
            Verdict::Unverifiable => "UNVERIFIABLE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Verdict::Supported).unwrap(), "\"SUPPORTED\"");
        let parsed: Verdict = serde_json::from_str("\"UNVERIFIABLE\"").unwrap();
        assert_eq!(parsed, Verdict::Unverifiable);
    }
}
