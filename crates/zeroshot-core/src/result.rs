//! Classifier output and the per-group result shape returned over HTTP.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde::Deserialize;

/// Labels ranked by descending score.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, Deserialize)]
pub struct Ranking {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl Ranking {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from unsorted `(label, score)` pairs; sorts descending.
    pub fn from_pairs(mut pairs: Vec<(String, f32)>) -> Self {
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let (labels, scores) = pairs.into_iter().unzip();
        Self { labels, scores }
    }

    /// Keep only the first `n` entries.
    pub fn truncate(&mut self, n: usize) {
        self.labels.truncate(n);
        self.scores.truncate(n);
    }

    pub fn top(&self) -> Option<(&str, f32)> {
        self.iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Best label of one group.
///
/// Serializes as `[label, score]`, or `[]` when the group was empty or the
/// classifier returned nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupResult {
    Top { label: String, score: f32 },
    Empty,
}

impl GroupResult {
    pub fn from_ranking(ranking: &Ranking) -> Self {
        match ranking.top() {
            Some((label, score)) => Self::Top {
                label: label.to_string(),
                score,
            },
            None => Self::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Serialize for GroupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Top { label, score } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(label)?;
                seq.serialize_element(score)?;
                seq.end()
            }
            Self::Empty => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_sorts_descending() {
        let r = Ranking::from_pairs(vec![
            ("b".into(), 0.2),
            ("a".into(), 0.7),
            ("c".into(), 0.1),
        ]);
        assert_eq!(r.labels, ["a", "b", "c"]);
        assert_eq!(r.scores, [0.7, 0.2, 0.1]);
        assert_eq!(r.top(), Some(("a", 0.7)));
    }

    #[test]
    fn truncate_keeps_labels_and_scores_aligned() {
        let mut r = Ranking::from_pairs(vec![("a".into(), 0.5), ("b".into(), 0.3), ("c".into(), 0.2)]);
        r.truncate(2);
        assert_eq!(r.len(), 2);
        assert_eq!(r.scores.len(), 2);
        r.truncate(10);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn group_result_wire_shape() {
        let top = GroupResult::Top {
            label: "旅游".into(),
            score: 0.5,
        };
        assert_eq!(serde_json::to_string(&top).unwrap(), r#"["旅游",0.5]"#);
        assert_eq!(serde_json::to_string(&GroupResult::Empty).unwrap(), "[]");
    }

    #[test]
    fn empty_ranking_gives_empty_group() {
        assert!(GroupResult::from_ranking(&Ranking::empty()).is_empty());
    }
}
