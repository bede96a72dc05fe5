//! Recommendation engine seam.
//!
//! The LLM-backed collaborator lives behind this trait. Workflows only ever
//! see its structured output and fall back to fixed payloads when a call
//! fails, so engine unavailability is never surfaced as an error.

use procura_types::{IntakeResult, Recommendations, SpecVariant};

/// External generator of intake questions, recommendations, and summaries.
pub trait RecommendationEngine: Send + Sync {
    /// Candidate follow-up questions plus a requirements summary for the
    /// initial product details.
    fn intake(
        &self,
        product_name: &str,
        budget_usd: f64,
        quantity: u32,
        scope_text: &str,
    ) -> anyhow::Result<IntakeResult>;

    /// Specification variants for a consolidated requirements summary.
    fn recommend(
        &self,
        product_name: &str,
        budget_usd: f64,
        quantity: u32,
        structured_summary: &str,
    ) -> anyhow::Result<Recommendations>;

    /// Rephrase a structured summary into a user-facing narrative.
    fn rephrase_summary(&self, structured_summary: &str) -> anyhow::Result<String>;
}

/// Fixed question set used whenever the engine cannot produce one.
pub fn fallback_intake(product_name: &str, budget_usd: f64, quantity: u32) -> IntakeResult {
    IntakeResult {
        status: "questions".to_string(),
        requirements_summary: format!(
            "Requirements for {product_name} (${budget_usd} budget, qty: {quantity})"
        ),
        missing_info_questions: vec![
            format!("What specific tasks will {product_name} be used for?"),
            "What are your performance requirements?".to_string(),
            "Do you have any compliance or security requirements?".to_string(),
            "What is your preferred delivery timeline?".to_string(),
            "Do you need any special features or capabilities?".to_string(),
        ],
    }
}

/// Single budget-anchored variant used whenever the engine cannot recommend.
pub fn fallback_recommendations(
    product_name: &str,
    budget_usd: f64,
    quantity: u32,
) -> Recommendations {
    Recommendations {
        variants: vec![SpecVariant {
            id: "baseline".to_string(),
            title: format!("Baseline {product_name}"),
            summary: "Budget-anchored baseline option pending engine availability.".to_string(),
            quantity,
            est_unit_price_usd: budget_usd,
            est_total_usd: budget_usd * f64::from(quantity),
            lead_time_days: 30,
            profile: "balanced".to_string(),
            rationale_summary: vec!["Anchored to the stated per-unit budget".to_string()],
        }],
        decision_notes: "Generated without the recommendation engine; review manually."
            .to_string(),
    }
}

/// Deterministic engine used when no LLM provider is configured.
pub struct FallbackEngine;

impl RecommendationEngine for FallbackEngine {
    fn intake(
        &self,
        product_name: &str,
        budget_usd: f64,
        quantity: u32,
        _scope_text: &str,
    ) -> anyhow::Result<IntakeResult> {
        Ok(fallback_intake(product_name, budget_usd, quantity))
    }

    fn recommend(
        &self,
        product_name: &str,
        budget_usd: f64,
        quantity: u32,
        _structured_summary: &str,
    ) -> anyhow::Result<Recommendations> {
        Ok(fallback_recommendations(product_name, budget_usd, quantity))
    }

    fn rephrase_summary(&self, structured_summary: &str) -> anyhow::Result<String> {
        Ok(structured_summary.to_string())
    }
}

/// Deterministic post-step applied to every recommendation result: drops
/// untitled variants, fills in missing totals from unit price x quantity,
/// and orders variants by estimated total ascending.
pub fn postprocess_recommendations(mut recs: Recommendations) -> Recommendations {
    recs.variants.retain(|v| !v.title.trim().is_empty());
    for variant in &mut recs.variants {
        if variant.est_total_usd <= 0.0 && variant.est_unit_price_usd > 0.0 {
            variant.est_total_usd =
                variant.est_unit_price_usd * f64::from(variant.quantity.max(1));
        }
    }
    recs.variants
        .sort_by(|a, b| a.est_total_usd.total_cmp(&b.est_total_usd));
    recs
}
