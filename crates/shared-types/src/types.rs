//! Analysis payload produced by the document-analysis backend

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecodeError;

/// Full analysis of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub risk_flags: Vec<RiskFlag>,
    #[serde(default)]
    pub key_clauses: Vec<KeyClause>,
}

impl AnalysisResult {
    /// Decode a backend response body
    pub fn from_json(raw: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode for the `analysisResult` bridge entry
    pub fn to_json(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn has_risks(&self) -> bool {
        !self.risk_flags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub title: String,
    pub explanation: String,
    pub level: RiskLevel,
}

/// Severity of a risk flag
///
/// The backend is inconsistent about casing ("Red" vs "red"), so parsing
/// ignores case. Serialization always emits lowercase.
///
/// `FromStr` accepts only the two known levels. Decoding a payload is
/// looser: anything that is not red decodes as yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Red,
    Yellow,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Red => "red",
            RiskLevel::Yellow => "yellow",
        }
    }

    /// Level as sent by the backend; unknown values read as yellow
    pub fn from_wire(raw: &str) -> Self {
        raw.parse().unwrap_or(RiskLevel::Yellow)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(RiskLevel::Red),
            "yellow" => Ok(RiskLevel::Yellow),
            _ => Err(DecodeError::UnknownRiskLevel(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(RiskLevel::from_wire(&raw))
    }
}

/// A quoted clause with its plain-English rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyClause {
    pub title: String,
    pub original_text: String,
    pub simplified_text: String,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any casing of the two known levels parses
        #[test]
        fn known_levels_parse_in_any_case(upper in prop::collection::vec(any::<bool>(), 6)) {
            let word: String = "yellow"
                .chars()
                .zip(upper.iter())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(word.parse::<RiskLevel>().unwrap(), RiskLevel::Yellow);
        }

        /// Nothing outside the two levels parses
        #[test]
        fn other_words_rejected(word in "[a-z]{1,10}") {
            prop_assume!(word != "red" && word != "yellow");
            prop_assert!(word.parse::<RiskLevel>().is_err());
        }

        /// Any string level decodes, and only "red" decodes as red
        #[test]
        fn any_wire_level_decodes(word in "[A-Za-z ]{0,12}") {
            let body = serde_json::json!({
                "summary": "s",
                "riskFlags": [{"level": word, "title": "t", "explanation": "e"}]
            })
            .to_string();
            let result = AnalysisResult::from_json(&body).unwrap();
            let expected = if word.trim().eq_ignore_ascii_case("red") {
                RiskLevel::Red
            } else {
                RiskLevel::Yellow
            };
            prop_assert_eq!(result.risk_flags[0].level, expected);
        }
    }
}
