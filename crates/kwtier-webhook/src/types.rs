use kwtier_core::{Context, Keyword, ProjectedMetrics};
use serde::{Deserialize, Serialize};

/// Request body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub keywords: Vec<DeliveryKeyword>,
    pub context: DeliveryContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryKeyword {
    pub id: String,
    pub keyword: String,
    pub volume: u64,
    pub difficulty: f64,
    pub metrics: ProjectedMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    pub conversion_rate: f64,
    pub average_order_value: f64,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_context: Option<String>,
}

impl From<&Context> for DeliveryContext {
    fn from(ctx: &Context) -> Self {
        Self {
            conversion_rate: ctx.conversion_rate,
            average_order_value: ctx.average_order_value,
            language: ctx.language.clone(),
            category: ctx.category.clone(),
            brand_name: ctx.brand_name.clone(),
            business_context: ctx.business_context.clone(),
        }
    }
}

impl DeliveryPayload {
    /// Builds a payload for `keywords`, projecting metrics fresh from each
    /// keyword's volume and `context`.
    #[must_use]
    pub fn build<'a>(
        keywords: impl IntoIterator<Item = &'a Keyword>,
        context: &Context,
    ) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|kw| DeliveryKeyword {
                id: kw.id.clone(),
                keyword: kw.keyword.clone(),
                volume: kw.volume,
                difficulty: kw.difficulty,
                metrics: ProjectedMetrics::project(kw.volume, context),
            })
            .collect();
        Self {
            keywords,
            context: DeliveryContext::from(context),
        }
    }
}

/// A webhook reply that passed [`crate::validate_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub status: i64,
    /// Id of the one keyword this reply addresses.
    pub id: String,
    /// Raw newline-delimited suggestion text.
    pub auto_suggest: String,
}

impl DeliveryResponse {
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        kwtier_core::split_suggestions(&self.auto_suggest)
    }
}
