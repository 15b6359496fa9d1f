//! Candidate label groups, keyed by input modality.
//!
//! A [`LabelGroup`] is the unit of classification: the classifier scores an
//! input against every label in the group and the orchestrator keeps the
//! best one. Each modality carries an ordered list of groups, so one request
//! yields one result per group, in declaration order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered candidate labels classified together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelGroup(Vec<String>);

impl LabelGroup {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }
}

/// Input modality of a classification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Txt,
    Image,
    Audio,
    Csv,
}

impl Modality {
    pub const ALL: [Modality; 4] = [Self::Txt, Self::Image, Self::Audio, Self::Csv];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown modality '{s}'"))
    }
}

/// Label groups for every modality.
///
/// Missing modalities deserialize as empty lists; a request against a
/// modality without groups simply returns no results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModalityConfig {
    #[serde(default)]
    pub txt: Vec<LabelGroup>,
    #[serde(default)]
    pub image: Vec<LabelGroup>,
    #[serde(default)]
    pub audio: Vec<LabelGroup>,
    #[serde(default)]
    pub csv: Vec<LabelGroup>,
}

impl ModalityConfig {
    /// Label groups configured for `modality`, in declaration order.
    pub fn groups(&self, modality: Modality) -> &[LabelGroup] {
        match modality {
            Modality::Txt => &self.txt,
            Modality::Image => &self.image,
            Modality::Audio => &self.audio,
            Modality::Csv => &self.csv,
        }
    }

    /// Iterate over `(modality, groups)` for all modalities.
    pub fn iter(&self) -> impl Iterator<Item = (Modality, &[LabelGroup])> {
        Modality::ALL.into_iter().map(|m| (m, self.groups(m)))
    }

    /// Total number of labels across every group of every modality.
    pub fn label_count(&self) -> usize {
        self.iter()
            .flat_map(|(_, groups)| groups.iter())
            .map(LabelGroup::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_deserializes_from_plain_array() {
        let group: LabelGroup = serde_json::from_str(r#"["旅游", "故事"]"#).unwrap();
        assert_eq!(group.labels(), ["旅游", "故事"]);
        assert!(group.contains("故事"));
        assert!(!group.contains("游戏"));
    }

    #[test]
    fn missing_modalities_default_to_empty() {
        let cfg: ModalityConfig = serde_json::from_str(r#"{"txt": [["a", "b"], ["c"]]}"#).unwrap();
        assert_eq!(cfg.groups(Modality::Txt).len(), 2);
        assert!(cfg.groups(Modality::Image).is_empty());
        assert!(cfg.groups(Modality::Csv).is_empty());
        assert_eq!(cfg.label_count(), 3);
    }

    #[test]
    fn unknown_modality_key_rejected() {
        let err = serde_json::from_str::<ModalityConfig>(r#"{"video": [["a"]]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn modality_parse_is_case_insensitive() {
        assert_eq!("TXT".parse::<Modality>().unwrap(), Modality::Txt);
        assert_eq!(" csv ".parse::<Modality>().unwrap(), Modality::Csv);
        assert!("video".parse::<Modality>().is_err());
    }

    #[test]
    fn iter_preserves_modality_order() {
        let cfg = ModalityConfig::default();
        let order: Vec<&str> = cfg.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(order, ["txt", "image", "audio", "csv"]);
    }
}
