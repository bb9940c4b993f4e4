//! Keyword, context and project types shared by every crate.
//!
//! The serialized shapes match the records the browser client kept in local
//! storage, so exported projects can be re-imported without conversion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const MIN_TIER: u8 = 1;
pub const MAX_TIER: u8 = 5;

/// A single keyword row inside a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub id: String,
    pub keyword: String,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_traffic: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_conversions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potential_revenue: Option<u64>,
    /// Set only while a delivery for this keyword is in flight.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_analyzing: bool,
}

impl Keyword {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        keyword: impl Into<String>,
        volume: u64,
        difficulty: f64,
    ) -> Self {
        Self {
            id: id.into(),
            keyword: keyword.into(),
            volume,
            difficulty,
            auto_suggestions: None,
            potential_traffic: None,
            potential_conversions: None,
            potential_revenue: None,
            is_analyzing: false,
        }
    }
}

/// Campaign-level assumptions used to project revenue from search volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Percentage, e.g. `5.0` for 5 %.
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub average_order_value: f64,
    /// Locale tag such as `pt-PT` or `en-US`.
    #[serde(default)]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_context: Option<String>,
}

/// A numbered keyword bucket (1–5) within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const ALL: [Tier; 5] = [Tier(1), Tier(2), Tier(3), Tier(4), Tier(5)];

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTier`] when `n` is outside `1..=5`.
    pub fn new(n: u8) -> Result<Self, CoreError> {
        if (MIN_TIER..=MAX_TIER).contains(&n) {
            Ok(Self(n))
        } else {
            Err(CoreError::InvalidTier(n))
        }
    }

    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    /// The slot key this tier is stored under, e.g. `tier2Keywords`.
    #[must_use]
    pub fn storage_key(self) -> String {
        format!("tier{}Keywords", self.0)
    }
}

impl TryFrom<u8> for Tier {
    type Error = CoreError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Tier::new(n)
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project as exported from (and importable into) the local store.
///
/// `data` holds one `tier{N}Keywords` array per populated tier. Other keys are
/// accepted on import and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: Context,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    /// Decodes the keyword slot for `tier`. A missing slot is an empty tier.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the slot is present but not a keyword array.
    pub fn tier_keywords(&self, tier: Tier) -> Result<Vec<Keyword>, serde_json::Error> {
        match self.data.get(&tier.storage_key()) {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()),
        }
    }
}

fn null_as_default<'de, D>(deserializer: D) -> Result<Context, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Context>::deserialize(deserializer)?.unwrap_or_default())
}

/// Splits a newline-delimited suggestion string, trimming each entry and
/// dropping blanks. Order is preserved.
#[must_use]
pub fn split_suggestions(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// # Errors
///
/// Returns [`CoreError::DuplicateKeywordId`] naming the first repeated id.
pub fn ensure_unique_ids(keywords: &[Keyword]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(keywords.len());
    for kw in keywords {
        if !seen.insert(kw.id.as_str()) {
            return Err(CoreError::DuplicateKeywordId(kw.id.clone()));
        }
    }
    Ok(())
}
