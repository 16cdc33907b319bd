//! Field Normalizer: turns raw model text into a `ModelVerdict`.
//!
//! Never fails. Each field is decoded on its own and a field with the wrong
//! JSON type is simply left unset. Values are kept exactly as the model wrote
//! them. When neither extraction tier yields a JSON object carrying at least
//! one recognized field, the fence-stripped raw text is kept as `comments` so
//! the stored evaluation stays auditable.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::evaluation::extractor::{extract, extract_aggressive, strip_code_fences};

/// Default negative markers. A reason containing any of them (case-insensitive)
/// is classified as a weakness. English and Spanish, substring-matched.
pub const DEFAULT_NEGATIVE_KEYWORDS: &[&str] = &[
    "no ",
    "not ",
    "lack",
    "insufficient",
    "weak",
    "missing",
    "falta",
    "sin ",
];

/// Structured fields recovered from a model response. Absence is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelVerdict {
    pub result: Option<String>,
    pub score: Option<i64>,
    pub comments: Option<String>,
    pub reasons: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl ModelVerdict {
    /// Verdict for a response with no usable JSON: only the cleaned text survives.
    pub fn unstructured(text: &str) -> Self {
        Self {
            comments: Some(text.to_string()).filter(|t| !t.trim().is_empty()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("candidate is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("candidate JSON is not an object")]
    NotAnObject,

    #[error("candidate JSON has no recognized fields")]
    NoRecognizedFields,
}

/// Splits free-text reasons into strengths and weaknesses by keyword.
///
/// This is a heuristic: matching is plain substring search, so e.g. "sin "
/// also fires inside "Wisconsin " and "no " inside "piano ".
#[derive(Debug, Clone)]
pub struct ReasonClassifier {
    negative_keywords: Vec<String>,
}

impl Default for ReasonClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NEGATIVE_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

impl ReasonClassifier {
    pub fn new(negative_keywords: Vec<String>) -> Self {
        Self {
            negative_keywords: negative_keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_negative(&self, reason: &str) -> bool {
        let lower = reason.to_lowercase();
        self.negative_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Returns `(strengths, weaknesses)`, preserving input order.
    pub fn classify(&self, reasons: &[String]) -> (Vec<String>, Vec<String>) {
        reasons
            .iter()
            .cloned()
            .partition(|reason| !self.is_negative(reason))
    }
}

/// Parses raw model text through the two-tier ladder, then derives
/// strengths/weaknesses from reasons when the model gave neither.
pub fn normalize(raw: &str, classifier: &ReasonClassifier) -> ModelVerdict {
    let mut verdict = parse_verdict(extract(raw))
        .or_else(|first| {
            debug!("Primary extraction failed ({first}); trying aggressive extraction");
            parse_verdict(extract_aggressive(raw))
        })
        .unwrap_or_else(|second| {
            warn!("Model response is not structured JSON ({second}); keeping raw text");
            ModelVerdict::unstructured(strip_code_fences(raw))
        });

    derive_strengths_and_weaknesses(&mut verdict, classifier);
    verdict
}

/// Decodes one candidate string. Only a JSON object (or an array whose first
/// object element is used) with at least one usable field counts as success,
/// so an empty `{}` lifted out of surrounding prose never hides the raw text.
pub fn parse_verdict(candidate: &str) -> Result<ModelVerdict, ExtractError> {
    let value: Value = serde_json::from_str(candidate)?;

    let object = match &value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .iter()
            .find_map(Value::as_object)
            .ok_or(ExtractError::NotAnObject)?,
        _ => return Err(ExtractError::NotAnObject),
    };

    let verdict = ModelVerdict {
        result: read_string(object, "result"),
        score: read_score(object),
        comments: read_string(object, "comments").or_else(|| read_string(object, "summary")),
        reasons: read_string_array(object, "reasons"),
        strengths: read_string_array(object, "strengths"),
        weaknesses: read_string_array(object, "weaknesses"),
    };

    if verdict == ModelVerdict::default() {
        return Err(ExtractError::NoRecognizedFields);
    }
    Ok(verdict)
}

fn derive_strengths_and_weaknesses(verdict: &mut ModelVerdict, classifier: &ReasonClassifier) {
    if !verdict.strengths.is_empty() || !verdict.weaknesses.is_empty() || verdict.reasons.is_empty()
    {
        return;
    }

    let (strengths, weaknesses) = classifier.classify(&verdict.reasons);
    verdict.strengths = strengths;
    verdict.weaknesses = weaknesses;
}

/// A blank string counts as unset; anything else is returned untouched.
fn read_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn read_score(object: &Map<String, Value>) -> Option<i64> {
    let value = object.get("score")?;
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|n| n.min(i64::MAX as u64) as i64))
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

fn read_string_array(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
