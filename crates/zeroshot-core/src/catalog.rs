//! The catalog: label groups per modality plus the security matrix.
//!
//! Loaded once at startup from TOML (the built-in default or a file given
//! on the command line) and shared read-only with every request handler.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::labels::{Modality, ModalityConfig};
use crate::security::{SecurityEntry, SecurityMatrix};

/// Catalog compiled into the binary.
pub const DEFAULT_CATALOG: &str = include_str!("../assets/catalog.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate security category: {0}")]
    DuplicateCategory(String),

    #[error("blank label in {modality} group {group}")]
    BlankLabel { modality: Modality, group: usize },

    #[error("duplicate label '{label}' in {modality} group {group}")]
    DuplicateLabel {
        modality: Modality,
        group: usize,
        label: String,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    modalities: ModalityConfig,
    #[serde(default)]
    security: RawSecurity,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSecurity {
    #[serde(default)]
    categories: Vec<SecurityEntry>,
}

/// Immutable label and security configuration.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub modalities: ModalityConfig,
    pub security: SecurityMatrix,
}

/// Counts for startup logging and the `catalog` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub groups: Vec<(Modality, usize)>,
    pub labels: usize,
    pub security_categories: usize,
}

impl Catalog {
    /// The built-in catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        DEFAULT_CATALOG.parse()
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self = text.parse()?;
        let s = catalog.summary();
        info!(
            path = %path.display(),
            labels = s.labels,
            security_categories = s.security_categories,
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Built-in catalog, or the file at `path` when given.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            groups: self
                .modalities
                .iter()
                .map(|(m, groups)| (m, groups.len()))
                .collect(),
            labels: self.modalities.label_count(),
            security_categories: self.security.len(),
        }
    }
}

impl FromStr for Catalog {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawCatalog = toml::from_str(s)?;
        validate_groups(&raw.modalities)?;
        let security = SecurityMatrix::from_entries(raw.security.categories)
            .map_err(CatalogError::DuplicateCategory)?;
        Ok(Self {
            modalities: raw.modalities,
            security,
        })
    }
}

fn validate_groups(modalities: &ModalityConfig) -> Result<(), CatalogError> {
    for (modality, groups) in modalities.iter() {
        for (group, labels) in groups.iter().enumerate() {
            let mut seen = HashSet::new();
            for label in labels.labels() {
                if label.trim().is_empty() {
                    return Err(CatalogError::BlankLabel { modality, group });
                }
                if !seen.insert(label.as_str()) {
                    return Err(CatalogError::DuplicateLabel {
                        modality,
                        group,
                        label: label.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.modalities.txt.is_empty());
        assert!(!catalog.modalities.image.is_empty());
        assert!(!catalog.modalities.audio.is_empty());
        assert!(!catalog.modalities.csv.is_empty());
        assert!(catalog.security.scores("城市景观").is_some());
    }

    #[test]
    fn builtin_covers_every_csv_category() {
        let catalog = Catalog::builtin().unwrap();
        let csv_categories = &catalog.modalities.csv[0];
        assert_eq!(csv_categories.len(), 65);
        for label in csv_categories.labels() {
            assert!(
                catalog.security.scores(label).is_some(),
                "no security scores for {label}"
            );
        }
    }

    #[test]
    fn builtin_scores_increase_with_level() {
        let catalog = Catalog::builtin().unwrap();
        for name in catalog.security.categories() {
            let s = catalog.security.scores(name).unwrap();
            assert!(s.low <= s.medium && s.medium <= s.high, "{name}: {s:?}");
        }
    }

    #[test]
    fn parses_minimal_document() {
        let catalog: Catalog = r#"
            [modalities]
            txt = [["a", "b"]]

            [security]
            categories = [{ category = "x", low = 1, medium = 2, high = 3 }]
        "#
        .parse()
        .unwrap();
        assert_eq!(catalog.modalities.txt.len(), 1);
        assert_eq!(catalog.security.level_value("x", "high"), Ok(3));
        assert_eq!(
            catalog.summary(),
            CatalogSummary {
                groups: vec![
                    (Modality::Txt, 1),
                    (Modality::Image, 0),
                    (Modality::Audio, 0),
                    (Modality::Csv, 0)
                ],
                labels: 2,
                security_categories: 1,
            }
        );
    }

    #[test]
    fn empty_document_is_an_empty_catalog() {
        let catalog: Catalog = "".parse().unwrap();
        assert_eq!(catalog.modalities.label_count(), 0);
        assert!(catalog.security.is_empty());
    }

    #[test]
    fn rejects_duplicate_category() {
        let err = r#"
            [security]
            categories = [
                { category = "x", low = 1, medium = 2, high = 3 },
                { category = "x", low = 1, medium = 2, high = 3 },
            ]
        "#
        .parse::<Catalog>()
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(ref c) if c == "x"));
    }

    #[test]
    fn rejects_missing_level() {
        let err = r#"
            [security]
            categories = [{ category = "x", low = 1, high = 3 }]
        "#
        .parse::<Catalog>()
        .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn rejects_blank_and_duplicate_labels() {
        let blank = "[modalities]\nimage = [[\"a\", \" \"]]\n".parse::<Catalog>();
        assert!(matches!(
            blank,
            Err(CatalogError::BlankLabel {
                modality: Modality::Image,
                group: 0
            })
        ));

        let dup = "[modalities]\ncsv = [[\"a\"], [\"b\", \"b\"]]\n".parse::<Catalog>();
        assert!(matches!(
            dup,
            Err(CatalogError::DuplicateLabel { modality: Modality::Csv, group: 1, .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[modalities]\naudio = [[\"生活服务\", \"闲聊\"]]").unwrap();
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.modalities.audio[0].len(), 2);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
