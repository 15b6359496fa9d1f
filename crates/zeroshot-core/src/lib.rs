//! Core types shared by the zeroshot crates: label groups, the security
//! matrix, the catalog that holds both, and classifier result shapes.

pub mod catalog;
pub mod labels;
pub mod result;
pub mod security;

pub use catalog::{Catalog, CatalogError, CatalogSummary};
pub use labels::{LabelGroup, Modality, ModalityConfig};
pub use result::{GroupResult, Ranking};
pub use security::{LevelScores, RiskLevel, SecurityEntry, SecurityError, SecurityMatrix};
