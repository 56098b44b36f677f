//! Keyword Taxonomies
//!
//! Configuration data mapping a canonical criterion value (e.g.
//! "type 2 diabetes") to a set of synonym substrings. Matching is
//! case-insensitive substring containment, not tokenized or stemmed
//! matching — a synonym embedded in an unrelated word will
//! false-positive. Callers who need token-level matching must supply
//! their own gate; the limitation is documented rather than silently
//! fixed.
//!
//! Taxonomies are validated at construction: screening with a broken
//! taxonomy is worse than refusing to start.

use std::collections::BTreeMap;

use thiserror::Error;

/// Fatal configuration errors raised at pipeline construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A taxonomy group was named with a blank string.
    #[error("taxonomy group name must not be blank")]
    BlankGroupName,

    /// A taxonomy group was supplied with no synonyms.
    #[error("taxonomy group '{0}' has no keywords")]
    EmptyGroup(String),

    /// A taxonomy group contains a blank synonym.
    #[error("taxonomy group '{0}' contains a blank keyword")]
    BlankKeyword(String),

    /// A rule gate was built with an empty gate list.
    #[error("rule gate has no gates configured")]
    NoGates,

    /// Two gates share a name.
    #[error("duplicate gate name '{0}'")]
    DuplicateGate(String),

    /// A gate's exclusion confidence is outside [0, 1].
    #[error("gate '{name}' has exclusion confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange {
        /// Offending gate name.
        name: String,
        /// The out-of-range confidence.
        confidence: f64,
    },
}

/// A validated keyword taxonomy.
///
/// Group names and synonyms are normalized to lowercase at
/// construction so lookups and matching are case-insensitive.
#[derive(Debug, Clone)]
pub struct KeywordTaxonomy {
    groups: BTreeMap<String, Vec<String>>,
}

impl KeywordTaxonomy {
    /// Build a taxonomy from (canonical value, synonyms) pairs.
    ///
    /// Fails fast on blank group names, empty synonym lists, and blank
    /// synonyms.
    pub fn new<G, S>(groups: G) -> Result<Self, ConfigError>
    where
        G: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut validated = BTreeMap::new();
        for (name, synonyms) in groups {
            let name = name.into().trim().to_lowercase();
            if name.is_empty() {
                return Err(ConfigError::BlankGroupName);
            }
            if synonyms.is_empty() {
                return Err(ConfigError::EmptyGroup(name));
            }
            let mut normalized = Vec::with_capacity(synonyms.len());
            for synonym in synonyms {
                let synonym = synonym.into().trim().to_lowercase();
                if synonym.is_empty() {
                    return Err(ConfigError::BlankKeyword(name));
                }
                normalized.push(synonym);
            }
            validated.insert(name, normalized);
        }
        Ok(Self { groups: validated })
    }

    /// Default disease taxonomy shipped with the pipeline.
    pub fn default_diseases() -> Self {
        Self::new([
            (
                "type 2 diabetes",
                vec!["t2d", "t2dm", "type 2 diabetes", "niddm", "diabetes mellitus type 2"],
            ),
            ("pcos", vec!["pcos", "polycystic ovary syndrome"]),
        ])
        .expect("default disease taxonomy is valid")
    }

    /// Default trial-type taxonomy shipped with the pipeline.
    pub fn default_trial_types() -> Self {
        Self::new([
            (
                "randomized controlled trial",
                vec!["rct", "randomized controlled trial", "randomized"],
            ),
            ("clinical trial", vec!["clinical trial", "trial phase"]),
        ])
        .expect("default trial-type taxonomy is valid")
    }

    /// Synonyms for a canonical value, if the group exists.
    pub fn group(&self, canonical: &str) -> Option<&[String]> {
        self.groups
            .get(&canonical.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Synonyms of `canonical`'s group that appear in `text`, falling
    /// back to every group when `canonical` is absent or unknown.
    ///
    /// `text` is expected to be lowercased already (see
    /// [`StudyRecord::screening_text`](crate::contracts::StudyRecord::screening_text)).
    pub fn matches(&self, canonical: Option<&str>, text: &str) -> Vec<String> {
        match canonical.and_then(|c| self.group(c)) {
            Some(synonyms) => Self::matching_keywords(synonyms, text),
            None => self
                .groups
                .values()
                .flat_map(|synonyms| Self::matching_keywords(synonyms, text))
                .collect(),
        }
    }

    /// Synonyms from any group that appear in `text`.
    pub fn matches_any(&self, text: &str) -> Vec<String> {
        self.matches(None, text)
    }

    fn matching_keywords(synonyms: &[String], text: &str) -> Vec<String> {
        synonyms
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .cloned()
            .collect()
    }

    /// Number of groups in the taxonomy.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the taxonomy has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
