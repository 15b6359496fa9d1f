//! Plain-text rendering of the catalog for the `catalog` command.

use std::fmt::Write;

use zeroshot_core::{Catalog, RiskLevel};

const MAX_LABELS: usize = 12;

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    let summary = catalog.summary();

    let _ = writeln!(out, "=== Label groups ({} labels) ===", summary.labels);
    for (modality, groups) in catalog.modalities.iter() {
        let _ = writeln!(out, "{modality} ({} groups)", groups.len());
        for (i, group) in groups.iter().enumerate() {
            let labels = group.labels();
            let shown = labels.iter().take(MAX_LABELS).cloned().collect::<Vec<_>>();
            let more = labels.len().saturating_sub(MAX_LABELS);
            if more > 0 {
                let _ = writeln!(out, "  [{}] {} … (+{more})", i + 1, shown.join(", "));
            } else {
                let _ = writeln!(out, "  [{}] {}", i + 1, shown.join(", "));
            }
        }
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "=== Security matrix ({} categories) ===",
        summary.security_categories
    );
    let header: Vec<&str> = RiskLevel::ALL.iter().map(RiskLevel::as_str).collect();
    let _ = writeln!(out, "  {:<26} {}", "category", header.join("  "));
    for category in catalog.security.categories() {
        if let Some(scores) = catalog.security.scores(category) {
            let values: Vec<String> = RiskLevel::ALL
                .iter()
                .map(|l| format!("{:>10}", scores.get(*l)))
                .collect();
            let _ = writeln!(out, "  {:<26} {}", category, values.join("  "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_groups_and_matrix_rows() {
        let catalog: Catalog = r#"
            [modalities]
            txt = [["旅游", "故事"], ["科技"]]

            [[security.categories]]
            category = "个人基本资料"
            low = 1
            medium = 2
            high = 3
        "#
        .parse()
        .unwrap();

        let text = render_catalog(&catalog);
        assert!(text.contains("txt (2 groups)"));
        assert!(text.contains("[1] 旅游, 故事"));
        assert!(text.contains("[2] 科技"));
        assert!(text.contains("=== Security matrix (1 categories) ==="));
        let row = text.lines().find(|l| l.contains("个人基本资料")).unwrap();
        let numbers: Vec<&str> = row.split_whitespace().skip(1).collect();
        assert_eq!(numbers, ["1", "2", "3"]);
    }
}
