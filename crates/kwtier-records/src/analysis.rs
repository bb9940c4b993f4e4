//! Keyword analysis documents produced by the analysis service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordsError;

/// A keyword analysis document.
///
/// The document is stored verbatim, so any field beyond the required
/// `keyword_analysis.search_intent.type` survives a round trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct KeywordAnalysis {
    document: Map<String, Value>,
    intent: String,
}

impl KeywordAnalysis {
    /// The search intent type, e.g. `commercial` or `informational`.
    #[must_use]
    pub fn intent(&self) -> &str {
        &self.intent
    }

    #[must_use]
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }
}

impl TryFrom<Value> for KeywordAnalysis {
    type Error = RecordsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(document) = value else {
            return Err(RecordsError::InvalidAnalysis(
                "analysis must be a JSON object".to_owned(),
            ));
        };

        let intent = document
            .get("keyword_analysis")
            .and_then(|a| a.get("search_intent"))
            .and_then(|i| i.get("type"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RecordsError::InvalidAnalysis(
                    "missing keyword_analysis.search_intent.type".to_owned(),
                )
            })?
            .to_owned();

        Ok(Self { document, intent })
    }
}

impl From<KeywordAnalysis> for Value {
    fn from(analysis: KeywordAnalysis) -> Self {
        Value::Object(analysis.document)
    }
}
