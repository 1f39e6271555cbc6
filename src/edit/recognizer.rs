//! Recognizing edits in a companion document.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::CompanionDocument;
use crate::error::{Error, Result};
use crate::model::ModificationMap;

/// Derives a modification map from an edited document.
pub trait EditRecognizer {
    fn recognize(&self, companion: &CompanionDocument) -> Result<ModificationMap>;
}

/// A labeled field whose known original value is replaced by the edited one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Paragraph prefix, e.g. "Address:"
    pub label: String,
    /// Text of the field in the source page
    pub original: String,
}

impl FieldRule {
    pub fn new(label: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original: original.into(),
        }
    }
}

/// Replace `placeholder` with `substitute` when the edited document has
/// dropped the former and contains the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSwap {
    pub placeholder: String,
    pub substitute: String,
}

/// Rule set for [`LabelRecognizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerRules {
    pub fields: Vec<FieldRule>,
    pub phrase_swaps: Vec<PhraseSwap>,
}

impl Default for RecognizerRules {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldRule::new("Address:", "123 Sample Street, Example City, EX 12345"),
                FieldRule::new("Phone:", "(555) 123-4567"),
                FieldRule::new("Email:", "contact@example.com"),
            ],
            phrase_swaps: vec![PhraseSwap {
                placeholder: "Lorem ipsum".to_string(),
                substitute: "Sample text".to_string(),
            }],
        }
    }
}

impl RecognizerRules {
    /// Parse rules from JSON. Missing sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::ModificationBuild(format!("invalid recognizer rules: {}", e)))
    }

    /// Load rules from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::ModificationBuild(format!("cannot read rules {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

/// Recognizes edits by label prefix.
///
/// Each paragraph is matched against the field rules in order; the first
/// rule whose label starts the trimmed paragraph captures the rest of that
/// line as the new value.
#[derive(Debug, Clone)]
pub struct LabelRecognizer {
    fields: Vec<(FieldRule, Regex)>,
    phrase_swaps: Vec<PhraseSwap>,
}

impl LabelRecognizer {
    /// Recognizer with the default rules.
    pub fn new() -> Result<Self> {
        Self::with_rules(RecognizerRules::default())
    }

    pub fn with_rules(rules: RecognizerRules) -> Result<Self> {
        let fields = rules
            .fields
            .into_iter()
            .map(|rule| {
                let pattern = format!(r"^{}\s*(.+)", regex::escape(&rule.label));
                Regex::new(&pattern)
                    .map(|re| (rule, re))
                    .map_err(|e| Error::ModificationBuild(format!("label pattern: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fields,
            phrase_swaps: rules.phrase_swaps,
        })
    }

    /// Value following the first matching label, if any.
    fn match_field<'p>(&self, paragraph: &'p str) -> Option<(&FieldRule, &'p str)> {
        let (rule, re) = self
            .fields
            .iter()
            .find(|(rule, _)| paragraph.starts_with(rule.label.as_str()))?;
        let value = re.captures(paragraph)?.get(1)?.as_str().trim();
        (!value.is_empty()).then_some((rule, value))
    }
}

impl EditRecognizer for LabelRecognizer {
    fn recognize(&self, companion: &CompanionDocument) -> Result<ModificationMap> {
        let mut map = ModificationMap::new();

        for paragraph in companion.paragraphs() {
            if let Some((rule, value)) = self.match_field(paragraph.trim()) {
                log::debug!("Field {} -> {:?}", rule.label, value);
                map.insert(rule.original.as_str(), value);
            }
        }

        let joined = companion.joined_text();
        for swap in &self.phrase_swaps {
            if !joined.contains(&swap.placeholder) && joined.contains(&swap.substitute) {
                log::debug!("Phrase {:?} -> {:?}", swap.placeholder, swap.substitute);
                map.insert(swap.placeholder.as_str(), swap.substitute.as_str());
            }
        }

        Ok(map)
    }
}

/// Run `recognizer` over `companion`.
///
/// An empty result is not an error; it is logged as a warning since the
/// reconstruction will then reproduce the source text unchanged.
pub fn build_modification_map(
    companion: &CompanionDocument,
    recognizer: &dyn EditRecognizer,
) -> Result<ModificationMap> {
    let map = recognizer.recognize(companion)?;
    if map.is_empty() {
        log::warn!("No recognized edits in companion document");
    } else {
        log::info!("Recognized {} modifications", map.len());
    }
    Ok(map)
}
