//! Study Records and Review Criteria
//!
//! Input contracts for a screening pass. Both are created once per job
//! by the calling collaborator and are read-only inputs to the cascade.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A bibliographic study record as retrieved from a record source.
///
/// Text fields are never null: missing values deserialize to the empty
/// string so that downstream string operations are total. Records are
/// immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecord {
    /// Externally assigned unique identifier (PMID for PubMed records).
    pub id: String,

    /// Study title.
    #[serde(default)]
    pub title: String,

    /// Study abstract.
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    /// Publication year as reported by the source.
    #[serde(default)]
    pub year: String,

    /// Journal name.
    #[serde(default)]
    pub journal: String,

    /// Originating database (e.g. "pubmed").
    #[serde(default)]
    pub source: String,
}

impl StudyRecord {
    /// Create a record with all text fields empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            abstract_text: String::new(),
            year: String::new(),
            journal: String::new(),
            source: String::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the abstract.
    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = abstract_text.into();
        self
    }

    /// Lowercase concatenation of title and abstract, the text all rule
    /// gates evaluate against.
    pub fn screening_text(&self) -> String {
        format!("{} {}", self.title, self.abstract_text).to_lowercase()
    }
}

/// Result of a record-source search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total matching records reported by the source, which may exceed
    /// the number actually retrieved.
    pub total_count: u64,

    /// Retrieved, already-parsed records.
    pub records: Vec<StudyRecord>,
}

/// Inclusion/exclusion criteria for a systematic literature review.
///
/// Optional fields mean "unconstrained"; gate evaluation never fails on
/// an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReviewCriteria {
    /// Disease or condition under review (e.g. "type 2 diabetes").
    #[validate(length(min = 1, max = 255))]
    pub disease: Option<String>,

    /// Target population.
    #[validate(length(min = 1, max = 255))]
    pub population: Option<String>,

    /// Intervention of interest.
    #[validate(length(min = 1, max = 255))]
    pub intervention: Option<String>,

    /// Comparator arm.
    #[validate(length(min = 1, max = 255))]
    pub comparator: Option<String>,

    /// Outcome of interest.
    #[validate(length(min = 1, max = 255))]
    pub outcome: Option<String>,

    /// Study design (e.g. "randomized controlled trial").
    #[validate(length(min = 1, max = 255))]
    pub study_type: Option<String>,

    /// Inclusive publication-year window.
    pub publication_years: Option<(i32, i32)>,

    /// Publication language.
    #[serde(default = "default_language")]
    pub language: String,

    /// Free-form query appended by the caller when searching.
    pub custom_query: Option<String>,
}

fn default_language() -> String {
    "English".to_string()
}

impl Default for ReviewCriteria {
    fn default() -> Self {
        Self {
            disease: None,
            population: None,
            intervention: None,
            comparator: None,
            outcome: None,
            study_type: None,
            publication_years: None,
            language: default_language(),
            custom_query: None,
        }
    }
}

impl ReviewCriteria {
    /// Criteria constrained to a disease and a study type, the common
    /// minimal job configuration.
    pub fn for_disease(disease: impl Into<String>, study_type: impl Into<String>) -> Self {
        Self {
            disease: Some(disease.into()),
            study_type: Some(study_type.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_text_fields_deserialize_to_empty_strings() {
        let record: StudyRecord = serde_json::from_str(r#"{"id": "12345"}"#).unwrap();
        assert_eq!(record.id, "12345");
        assert_eq!(record.title, "");
        assert_eq!(record.abstract_text, "");
        assert_eq!(record.journal, "");
    }

    #[test]
    fn abstract_serializes_under_wire_name() {
        let record = StudyRecord::new("1").with_abstract("A trial of something.");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["abstract"], "A trial of something.");
    }

    #[test]
    fn screening_text_is_lowercased_concatenation() {
        let record = StudyRecord::new("1")
            .with_title("RCT of Type 2 Diabetes")
            .with_abstract("A Randomized study.");
        assert_eq!(
            record.screening_text(),
            "rct of type 2 diabetes a randomized study."
        );
    }

    #[test]
    fn criteria_default_language_is_english() {
        let criteria = ReviewCriteria::default();
        assert_eq!(criteria.language, "English");

        let parsed: ReviewCriteria = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.language, "English");
    }

    #[test]
    fn criteria_validation_rejects_blank_disease() {
        let criteria = ReviewCriteria {
            disease: Some(String::new()),
            ..ReviewCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }
}
