//! Projected traffic/conversion/revenue derived from search volume.

use serde::{Deserialize, Serialize};

use crate::keywords::{Context, Keyword};

/// Share of search volume expected to click through.
pub const CLICK_THROUGH_RATE: f64 = 0.32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMetrics {
    pub potential_traffic: u64,
    pub potential_conversions: u64,
    pub potential_revenue: u64,
}

impl ProjectedMetrics {
    /// Projects metrics for `volume` under `context`.
    ///
    /// Each figure is rounded on its own from the unrounded chain, so rounding
    /// errors never compound from traffic into conversions or revenue.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project(volume: u64, context: &Context) -> Self {
        let traffic = volume as f64 * CLICK_THROUGH_RATE;
        let conversions = traffic * (context.conversion_rate / 100.0);
        let revenue = conversions * context.average_order_value;
        Self {
            potential_traffic: round_non_negative(traffic),
            potential_conversions: round_non_negative(conversions),
            potential_revenue: round_non_negative(revenue),
        }
    }

    /// Writes these figures onto `keyword`.
    pub fn apply_to(self, keyword: &mut Keyword) {
        keyword.potential_traffic = Some(self.potential_traffic);
        keyword.potential_conversions = Some(self.potential_conversions);
        keyword.potential_revenue = Some(self.potential_revenue);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_non_negative(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(conversion_rate: f64, average_order_value: f64) -> Context {
        Context {
            conversion_rate,
            average_order_value,
            language: "en-US".to_string(),
            ..Context::default()
        }
    }

    #[test]
    fn projects_exact_figures() {
        let m = ProjectedMetrics::project(1000, &context(5.0, 50.0));
        assert_eq!(m.potential_traffic, 320);
        assert_eq!(m.potential_conversions, 16);
        assert_eq!(m.potential_revenue, 800);
    }

    #[test]
    fn rounds_each_figure_from_unrounded_chain() {
        // traffic 4.8 rounds to 5 and conversions 0.48 to 0, but revenue
        // still comes from 0.48 × 100.
        let m = ProjectedMetrics::project(15, &context(10.0, 100.0));
        assert_eq!(m.potential_traffic, 5);
        assert_eq!(m.potential_conversions, 0);
        assert_eq!(m.potential_revenue, 48);
    }

    #[test]
    fn zero_volume_projects_zero() {
        let m = ProjectedMetrics::project(0, &context(5.0, 50.0));
        assert_eq!(
            m,
            ProjectedMetrics {
                potential_traffic: 0,
                potential_conversions: 0,
                potential_revenue: 0,
            }
        );
    }

    #[test]
    fn negative_inputs_clamp_to_zero() {
        let m = ProjectedMetrics::project(1000, &context(-5.0, 50.0));
        assert_eq!(m.potential_conversions, 0);
        assert_eq!(m.potential_revenue, 0);
    }

    #[test]
    fn apply_to_sets_keyword_fields() {
        let mut kw = Keyword::new("k", "shoes", 1000, 10.0);
        ProjectedMetrics::project(kw.volume, &context(5.0, 50.0)).apply_to(&mut kw);
        assert_eq!(kw.potential_traffic, Some(320));
        assert_eq!(kw.potential_conversions, Some(16));
        assert_eq!(kw.potential_revenue, Some(800));
    }
}
