//! Deterministic project summary assembly.
//!
//! The structured summary concatenates everything known about a session in
//! a fixed section order; the engine may later rephrase it into a
//! user-facing narrative, but this text is the canonical input to
//! recommendation generation.

use procura_types::{IntakeSession, ProjectContext};

const DOC_SUMMARY_PREVIEW_CHARS: usize = 200;

/// Answers treated as non-substantive in the consolidated requirements.
fn is_substantive(answer: &str) -> bool {
    let trimmed = answer.trim().to_lowercase();
    !trimmed.is_empty() && !matches!(trimmed.as_str(), "na" | "n/a" | "no" | "none")
}

/// Collapse free-text scope plus supplemental inputs into the single scope
/// string handed to the recommendation engine at intake time.
pub fn normalize_scope(
    scope_text: &str,
    uploaded_summaries: &[String],
    project_context: Option<&ProjectContext>,
    vendors: &[String],
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !scope_text.trim().is_empty() {
        parts.push(scope_text.trim().to_string());
    }
    if let Some(ctx) = project_context {
        if !ctx.project_name.is_empty() {
            parts.push(format!(
                "Project: {} ({})",
                ctx.project_name, ctx.procurement_type
            ));
        }
    }
    for summary in uploaded_summaries {
        if !summary.trim().is_empty() {
            parts.push(format!("Document summary: {}", summary.trim()));
        }
    }
    if !vendors.is_empty() {
        parts.push(format!("Preferred vendors: {}", vendors.join(", ")));
    }
    parts.join("\n")
}

/// Build the structured summary for a session: project overview, context,
/// scope, answered questions, the intake requirements summary, vendors,
/// document previews, and a consolidated requirements trailer.
pub fn build_structured_summary(session: &IntakeSession) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push("=== PROJECT OVERVIEW ===".to_string());
    sections.push(format!("Product: {}", session.product_name));
    sections.push(format!("Quantity: {}", session.quantity));
    sections.push(format!("Budget: ${:.2} per unit", session.budget_usd));
    sections.push(format!(
        "Total Budget: ${:.2}",
        session.budget_usd * f64::from(session.quantity.max(1))
    ));

    if let Some(ctx) = &session.project_context {
        sections.push("\n=== PROJECT CONTEXT ===".to_string());
        sections.push(format!("Project Name: {}", ctx.project_name));
        sections.push(format!("Procurement Type: {}", ctx.procurement_type));
        sections.push(format!("Service Program: {}", ctx.service_program));
        sections.push(format!("Technical POC: {}", ctx.technical_poc));
    }

    sections.push("\n=== ORIGINAL SCOPE & REQUIREMENTS ===".to_string());
    if session.scope_text.trim().is_empty() {
        sections.push("No scope provided".to_string());
    } else {
        sections.push(session.scope_text.clone());
    }

    let answered: Vec<(&String, &String)> = session
        .answers
        .iter()
        .filter(|(_, answer)| !answer.trim().is_empty())
        .collect();
    if !answered.is_empty() {
        sections.push("\n=== CLARIFYING QUESTIONS & ANSWERS ===".to_string());
        for (question, answer) in &answered {
            sections.push(format!("Q: {question}"));
            sections.push(format!("A: {answer}"));
            sections.push(String::new());
        }
    }

    if !session.intake_result.requirements_summary.is_empty() {
        sections.push("=== AI-GENERATED REQUIREMENTS SUMMARY ===".to_string());
        sections.push(session.intake_result.requirements_summary.clone());
    }

    sections.push("\n=== ADDITIONAL CONTEXT ===".to_string());
    if !session.vendors.is_empty() {
        sections.push(format!("Preferred Vendors: {}", session.vendors.join(", ")));
    }
    if !session.uploaded_summaries.is_empty() {
        sections.push("Uploaded Documents:".to_string());
        for (i, summary) in session.uploaded_summaries.iter().enumerate() {
            let trimmed = summary.trim();
            if trimmed.is_empty() {
                continue;
            }
            sections.push(format!(
                "  {}. {}",
                i + 1,
                truncate(trimmed, DOC_SUMMARY_PREVIEW_CHARS)
            ));
        }
    }

    sections.push("\n=== CONSOLIDATED REQUIREMENTS FOR RECOMMENDATIONS ===".to_string());
    sections.push("Based on all the above information, generate recommendations that:".to_string());
    sections.push(format!(
        "- Match the product category: {}",
        session.product_name
    ));
    sections.push(format!(
        "- Fit within budget: ${:.2} per unit",
        session.budget_usd
    ));
    sections.push(format!(
        "- Meet quantity requirement: {} units",
        session.quantity
    ));

    let substantive: Vec<&String> = session
        .answers
        .values()
        .filter(|answer| is_substantive(answer))
        .collect();
    if !substantive.is_empty() {
        sections.push("- Address the following specific requirements:".to_string());
        for answer in substantive {
            sections.push(format!("  * {}", answer.trim()));
        }
    }

    sections.join("\n")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_chars).collect();
        format!("{prefix}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use procura_types::{IntakeResult, IntakeStage};
    use std::collections::{BTreeMap, BTreeSet};

    fn session() -> IntakeSession {
        IntakeSession {
            product_name: "Thermal camera".to_string(),
            budget_usd: 2500.0,
            quantity: 4,
            scope_text: "Perimeter monitoring at two sites".to_string(),
            stage: IntakeStage::Answered,
            intake_result: IntakeResult {
                status: "questions".to_string(),
                requirements_summary: "Four thermal cameras for perimeter use.".to_string(),
                missing_info_questions: vec![],
            },
            answers: BTreeMap::new(),
            asked_questions: BTreeSet::new(),
            structured_summary: None,
            project_summary: None,
            recommendations: None,
            project_context: None,
            vendors: vec!["Acme Optics".to_string()],
            uploaded_summaries: vec![],
            version: 1,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_is_deterministic() {
        let s = session();
        assert_eq!(build_structured_summary(&s), build_structured_summary(&s));
    }

    #[test]
    fn test_summary_contains_fixed_sections() {
        let text = build_structured_summary(&session());
        assert!(text.contains("=== PROJECT OVERVIEW ==="));
        assert!(text.contains("Total Budget: $10000.00"));
        assert!(text.contains("Perimeter monitoring at two sites"));
        assert!(text.contains("Preferred Vendors: Acme Optics"));
        assert!(text.contains("=== CONSOLIDATED REQUIREMENTS FOR RECOMMENDATIONS ==="));
    }

    #[test]
    fn test_empty_answers_are_skipped() {
        let mut s = session();
        s.answers
            .insert("What range?".to_string(), "300m".to_string());
        s.answers.insert("Mounting?".to_string(), "  ".to_string());
        let text = build_structured_summary(&s);
        assert!(text.contains("Q: What range?"));
        assert!(!text.contains("Q: Mounting?"));
    }

    #[test]
    fn test_non_substantive_answers_excluded_from_trailer() {
        let mut s = session();
        s.answers
            .insert("Compliance?".to_string(), "n/a".to_string());
        s.answers
            .insert("Range?".to_string(), "300m detection".to_string());
        let text = build_structured_summary(&s);
        assert!(text.contains("  * 300m detection"));
        assert!(!text.contains("  * n/a"));
    }

    #[test]
    fn test_document_summaries_truncated() {
        let mut s = session();
        s.uploaded_summaries = vec!["x".repeat(450)];
        let text = build_structured_summary(&s);
        assert!(text.contains(&format!("1. {}...", "x".repeat(200))));
    }

    #[test]
    fn test_normalize_scope_merges_sources() {
        let ctx = ProjectContext {
            project_name: "Site upgrade".to_string(),
            procurement_type: "Purchase Order".to_string(),
            ..Default::default()
        };
        let scope = normalize_scope(
            " base scope ",
            &["doc one".to_string(), "  ".to_string()],
            Some(&ctx),
            &["Acme".to_string()],
        );
        assert_eq!(
            scope,
            "base scope\nProject: Site upgrade (Purchase Order)\nDocument summary: doc one\nPreferred vendors: Acme"
        );
    }
}
