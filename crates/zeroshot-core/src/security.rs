//! Security matrix: category → risk level → integer score.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup failures. Both are caller errors, never internal faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("category not found: {0}")]
    UnknownCategory(String),
    #[error("invalid security level '{0}', expected one of 低风险等级, 中风险等级, 高风险等级")]
    InvalidLevel(String),
}

/// Risk level of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    /// Canonical (wire) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "低风险等级",
            Self::Medium => "中风险等级",
            Self::High => "高风险等级",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = SecurityError;

    /// Accepts the canonical Chinese names and the English aliases
    /// `low` / `medium` / `high` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s || level.alias().eq_ignore_ascii_case(s))
            .ok_or_else(|| SecurityError::InvalidLevel(s.to_string()))
    }
}

/// Scores of one category. All three levels are mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelScores {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl LevelScores {
    pub fn get(&self, level: RiskLevel) -> i64 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }
}

/// One row of the matrix as written in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityEntry {
    pub category: String,
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Read-only category → level → score table, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SecurityMatrix {
    entries: Vec<(String, LevelScores)>,
    index: HashMap<String, usize>,
}

impl SecurityMatrix {
    /// Build the matrix. Returns the offending name if a category appears twice.
    pub fn from_entries<I>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = SecurityEntry>,
    {
        let mut matrix = Self::default();
        for entry in entries {
            let name = entry.category.trim().to_string();
            if matrix.index.contains_key(&name) {
                return Err(name);
            }
            matrix.index.insert(name.clone(), matrix.entries.len());
            matrix.entries.push((
                name,
                LevelScores {
                    low: entry.low,
                    medium: entry.medium,
                    high: entry.high,
                },
            ));
        }
        Ok(matrix)
    }

    /// Resolve `level` and its score for `category`.
    ///
    /// The category is resolved first, so an unknown category with a bad
    /// level reports [`SecurityError::UnknownCategory`].
    pub fn lookup(&self, category: &str, level: &str) -> Result<(RiskLevel, i64), SecurityError> {
        let scores = self
            .scores(category)
            .ok_or_else(|| SecurityError::UnknownCategory(category.to_string()))?;
        let level: RiskLevel = level.parse()?;
        Ok((level, scores.get(level)))
    }

    /// Score for `category` at `level`.
    pub fn level_value(&self, category: &str, level: &str) -> Result<i64, SecurityError> {
        self.lookup(category, level).map(|(_, value)| value)
    }

    pub fn scores(&self, category: &str) -> Option<&LevelScores> {
        self.index
            .get(category.trim())
            .map(|&i| &self.entries[i].1)
    }

    /// Category names in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str, low: i64, medium: i64, high: i64) -> SecurityEntry {
        SecurityEntry {
            category: category.into(),
            low,
            medium,
            high,
        }
    }

    fn matrix() -> SecurityMatrix {
        SecurityMatrix::from_entries([entry("城市景观", 1, 2, 3), entry("个人身份信息", 4, 7, 10)])
            .unwrap()
    }

    #[test]
    fn lookup_every_level() {
        let m = matrix();
        assert_eq!(m.level_value("城市景观", "低风险等级"), Ok(1));
        assert_eq!(m.level_value("城市景观", "中风险等级"), Ok(2));
        assert_eq!(m.level_value("城市景观", "高风险等级"), Ok(3));
        assert_eq!(m.level_value("个人身份信息", "高风险等级"), Ok(10));
    }

    #[test]
    fn english_aliases_accepted() {
        let m = matrix();
        assert_eq!(m.level_value("个人身份信息", "low"), Ok(4));
        assert_eq!(m.level_value("个人身份信息", "MEDIUM"), Ok(7));
        assert_eq!(m.level_value("个人身份信息", " High "), Ok(10));
    }

    #[test]
    fn lookup_returns_canonical_level() {
        let m = matrix();
        assert_eq!(m.lookup("个人身份信息", " MEDIUM "), Ok((RiskLevel::Medium, 7)));
        assert_eq!(m.lookup("城市景观", "高风险等级"), Ok((RiskLevel::High, 3)));
        assert!(matches!(
            m.lookup("城市景观", "max"),
            Err(SecurityError::InvalidLevel(_))
        ));
    }

    #[test]
    fn unknown_category() {
        let err = matrix().level_value("火星", "低风险等级").unwrap_err();
        assert_eq!(err, SecurityError::UnknownCategory("火星".into()));
    }

    #[test]
    fn invalid_level() {
        let err = matrix().level_value("城市景观", "超高风险").unwrap_err();
        assert_eq!(err, SecurityError::InvalidLevel("超高风险".into()));
    }

    #[test]
    fn unknown_category_wins_over_invalid_level() {
        let err = matrix().level_value("火星", "nope").unwrap_err();
        assert!(matches!(err, SecurityError::UnknownCategory(_)));
    }

    #[test]
    fn duplicate_category_rejected() {
        let dup = SecurityMatrix::from_entries([entry("a", 1, 2, 3), entry(" a ", 4, 5, 6)]);
        assert_eq!(dup.unwrap_err(), "a");
    }

    #[test]
    fn categories_keep_declaration_order() {
        let matrix = matrix();
        let names: Vec<&str> = matrix.categories().collect();
        assert_eq!(names, ["城市景观", "个人身份信息"]);
    }

    #[test]
    fn entry_missing_a_level_fails_to_parse() {
        let err = toml::from_str::<SecurityEntry>("category = \"x\"\nlow = 1\nhigh = 3\n");
        assert!(err.is_err());
    }

    #[test]
    fn level_display_is_canonical() {
        assert_eq!(RiskLevel::High.to_string(), "高风险等级");
        assert_eq!("高风险等级".parse::<RiskLevel>(), Ok(RiskLevel::High));
    }
}
