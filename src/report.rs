use std::fmt::Write;

use crate::models::{
    DiagnosticIntake, DiagnosticResult, Dimension, InsightKind, ToolRecommendation, ToolTier,
};
use crate::trend::TrendView;

fn tier_label(tier: ToolTier) -> &'static str {
    match tier {
        ToolTier::Primary => "Primary",
        ToolTier::Secondary => "Secondary",
        ToolTier::Supporting => "Supporting",
    }
}

fn kind_heading(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Concern => "Concerns",
        InsightKind::Opportunity => "Opportunities",
        InsightKind::Recommendation => "Recommendations",
    }
}

pub fn build_report(
    intake: &DiagnosticIntake,
    result: &DiagnosticResult,
    history: Option<&TrendView>,
) -> String {
    let mut output = String::new();
    let profile = &intake.profile;

    let _ = writeln!(output, "# Strategic Diagnostic: {}", profile.organization_name);
    let _ = writeln!(
        output,
        "{} | {} | scored {}",
        profile.industry,
        profile.region,
        result.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Scores");
    let _ = writeln!(
        output,
        "- Overall health: {:.1} ({})",
        result.scores.overall_health,
        result.status.overall.as_str()
    );
    for dimension in Dimension::ALL {
        let _ = writeln!(
            output,
            "- {}: {:.1} ({})",
            dimension.label(),
            result.scores.get(dimension),
            result.status.get(dimension).as_str()
        );
    }

    for kind in [
        InsightKind::Concern,
        InsightKind::Opportunity,
        InsightKind::Recommendation,
    ] {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {}", kind_heading(kind));
        let mut any = false;
        for insight in result.insights.iter().filter(|i| i.kind == kind) {
            any = true;
            let _ = writeln!(
                output,
                "- [{}] {}: {}",
                insight.priority.as_str(),
                insight.title,
                insight.description
            );
        }
        if !any {
            let _ = writeln!(output, "None identified.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommended Tools");
    if result.recommendations.is_empty() {
        let _ = writeln!(output, "No tools stand out for this diagnostic.");
    } else {
        for rec in result.recommendations.iter() {
            write_tool(&mut output, rec);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## History");
    match history {
        None => {
            let _ = writeln!(output, "No scored history yet.");
        }
        Some(TrendView::Summary(point)) => {
            let _ = writeln!(
                output,
                "Single diagnostic on {}: overall {:.1}. Re-score later to see a trend.",
                point.date, point.overall
            );
        }
        Some(TrendView::Series(points)) => {
            let _ = writeln!(output, "| Date | Overall | Performance | Threat | Alignment | Readiness |");
            let _ = writeln!(output, "|---|---|---|---|---|---|");
            for point in points {
                let _ = writeln!(
                    output,
                    "| {} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} |",
                    point.date,
                    point.overall,
                    point.performance,
                    point.threat,
                    point.alignment,
                    point.readiness
                );
            }
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                let _ = writeln!(
                    output,
                    "Overall health moved {:+.1} across {} diagnostics.",
                    last.overall - first.overall,
                    points.len()
                );
            }
        }
    }

    output
}

fn write_tool(output: &mut String, rec: &ToolRecommendation) {
    let _ = writeln!(
        output,
        "- {} ({}, relevance {}): {}",
        rec.tool_name,
        tier_label(rec.priority),
        rec.relevance_score,
        rec.reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::tests::sample_draft;
    use crate::models::RiskSignal;
    use crate::store::tests::StepClock;
    use crate::store::DiagnosticStore;

    #[test]
    fn report_covers_scores_insights_and_tools() {
        let mut store = DiagnosticStore::with_clock(StepClock::new());
        let mut draft = sample_draft();
        draft.risks.cybersecurity = RiskSignal::stable(5);
        let id = store.create_intake(draft).unwrap().id;
        store.complete_intake(id).unwrap();

        let intake = store.intake(id).unwrap();
        let result = store.latest_result(id).unwrap();
        let report = build_report(intake, result, store.trend(Some(id)).as_ref());

        assert!(report.starts_with("# Strategic Diagnostic: Northwind Analytics"));
        assert!(report.contains("- Overall health:"));
        assert!(report.contains("Elevated cybersecurity risk"));
        assert!(report.contains("## Recommended Tools"));
        assert!(report.contains("Single diagnostic on 2026-02-01"));
    }

    #[test]
    fn report_shows_trend_table_after_rescore() {
        let mut store = DiagnosticStore::with_clock(StepClock::new());
        let id = store.create_intake(sample_draft()).unwrap().id;
        store.complete_intake(id).unwrap();
        store.rescore(id).unwrap();

        let report = build_report(
            store.intake(id).unwrap(),
            store.latest_result(id).unwrap(),
            store.trend(Some(id)).as_ref(),
        );
        assert!(report.contains("| Date | Overall |"));
        assert!(report.contains("across 2 diagnostics"));
    }
}
