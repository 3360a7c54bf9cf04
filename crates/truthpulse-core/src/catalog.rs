//! Quiz item catalog.
//!
//! The catalog is fixed reference data loaded at startup. A built-in
//! three-item catalog ships with the crate; alternative catalogs can be
//! loaded from TOML files and validated.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::Verdict;

/// A single image/video shown in the "real or fake?" quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    #[serde(alias = "truth", alias = "ground_truth")]
    pub ground_truth: Verdict,
    /// Shown after the respondent answers.
    #[serde(default, alias = "explain")]
    pub explanation: String,
    /// How other respondents did, e.g. "67% of users misclassified this."
    #[serde(default, alias = "stat", alias = "population_stat")]
    pub population_stat: String,
}

/// An ordered, immutable set of quiz items. Item indices are positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCatalog {
    #[serde(default)]
    items: Vec<QuizItem>,
}

impl QuizCatalog {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self { items }
    }

    /// The three items the survey ships with.
    pub fn builtin() -> Self {
        Self::new(vec![
            QuizItem {
                ground_truth: Verdict::Fake,
                explanation:
                    "Subtle skin smoothing and edge blending indicate face-swap artifacts.".into(),
                population_stat: "67% of users misclassified this.".into(),
            },
            QuizItem {
                ground_truth: Verdict::Fake,
                explanation: "Detected blending anomalies and temporal inconsistencies.".into(),
                population_stat: "71% spotted the anomaly.".into(),
            },
            QuizItem {
                ground_truth: Verdict::Real,
                explanation: "Natural lighting and consistent edges without blending artifacts."
                    .into(),
                population_stat: "62% identified this correctly.".into(),
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&QuizItem> {
        self.items.get(index)
    }

    pub fn ground_truth(&self, index: usize) -> Result<Verdict, CatalogError> {
        self.items
            .get(index)
            .map(|item| item.ground_truth)
            .ok_or(CatalogError::UnknownItem {
                index,
                len: self.items.len(),
            })
    }
}

impl Default for QuizCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Load a catalog from a TOML file with `[[items]]` tables.
pub fn load_catalog(path: &Path) -> Result<QuizCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file: {}", path.display()))?;
    parse_catalog_str(&content, path)
}

/// Parse a TOML catalog string (useful for testing).
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Result<QuizCatalog> {
    let catalog: QuizCatalog = toml::from_str(content)
        .with_context(|| format!("failed to parse catalog TOML: {}", source_path.display()))?;
    if catalog.is_empty() {
        return Err(CatalogError::Empty)
            .with_context(|| format!("no [[items]] in {}", source_path.display()));
    }
    Ok(catalog)
}

/// Load from `path` when given, otherwise use the built-in catalog.
pub fn load_catalog_or_builtin(path: Option<&Path>) -> Result<QuizCatalog> {
    match path {
        Some(p) => load_catalog(p),
        None => Ok(QuizCatalog::builtin()),
    }
}

/// A warning from catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item index (if applicable).
    pub item_index: Option<usize>,
    pub message: String,
}

/// Validate a catalog for common authoring issues.
pub fn validate_catalog(catalog: &QuizCatalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if catalog.is_empty() {
        warnings.push(ValidationWarning {
            item_index: None,
            message: "catalog has no items".into(),
        });
    }

    for (index, item) in catalog.items().iter().enumerate() {
        if item.explanation.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_index: Some(index),
                message: "explanation is empty".into(),
            });
        }
        if item.population_stat.trim().is_empty() {
            warnings.push(ValidationWarning {
                item_index: Some(index),
                message: "population stat is empty".into(),
            });
        }
    }

    // A quiz where every answer is the same verdict is trivially gamed.
    if catalog.len() > 1
        && catalog
            .items()
            .iter()
            .all(|i| i.ground_truth == catalog.items()[0].ground_truth)
    {
        warnings.push(ValidationWarning {
            item_index: None,
            message: "every item has the same ground truth".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[[items]]
groundTruth = "Fake"
explanation = "Mouth movement lags the audio."
populationStat = "54% spotted this."

[[items]]
truth = "Real"
explain = "Consistent reflections in both eyes."
stat = "48% identified this correctly."
"#;

    #[test]
    fn builtin_catalog_matches_survey() {
        let catalog = QuizCatalog::builtin();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.ground_truth(0), Ok(Verdict::Fake));
        assert_eq!(catalog.ground_truth(1), Ok(Verdict::Fake));
        assert_eq!(catalog.ground_truth(2), Ok(Verdict::Real));
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn ground_truth_out_of_range() {
        let catalog = QuizCatalog::builtin();
        assert_eq!(
            catalog.ground_truth(3),
            Err(CatalogError::UnknownItem { index: 3, len: 3 })
        );
    }

    #[test]
    fn parse_valid_toml_with_aliases() {
        let catalog = parse_catalog_str(VALID_TOML, &PathBuf::from("catalog.toml")).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ground_truth(1), Ok(Verdict::Real));
        assert_eq!(
            catalog.get(1).unwrap().population_stat,
            "48% identified this correctly."
        );
    }

    #[test]
    fn parse_empty_catalog_fails() {
        let result = parse_catalog_str("", &PathBuf::from("empty.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let result = parse_catalog_str("[[items]\nnope", &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_flags_blank_fields_and_uniform_truth() {
        let catalog = QuizCatalog::new(vec![
            QuizItem {
                ground_truth: Verdict::Real,
                explanation: String::new(),
                population_stat: "50%".into(),
            },
            QuizItem {
                ground_truth: Verdict::Real,
                explanation: "ok".into(),
                population_stat: " ".into(),
            },
        ]);
        let warnings = validate_catalog(&catalog);
        assert!(warnings
            .iter()
            .any(|w| w.item_index == Some(0) && w.message.contains("explanation")));
        assert!(warnings
            .iter()
            .any(|w| w.item_index == Some(1) && w.message.contains("population")));
        assert!(warnings.iter().any(|w| w.message.contains("same ground truth")));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        let catalog = load_catalog_or_builtin(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(load_catalog_or_builtin(None).unwrap().len(), 3);
    }
}
