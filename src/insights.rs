use crate::models::{
    DiagnosticIntake, DiagnosticScores, Dimension, GeneratedInsight, InsightKind, Kpi, KpiTrend,
    Priority, RiskTrend, Status,
};
use crate::scoring::{
    normalize_kpi, risk_threat, status_indicators, AMBER_THRESHOLD, GREEN_THRESHOLD,
};

/// Risk levels at or above this raise a concern.
pub const HIGH_RISK_LEVEL: u8 = 4;

pub fn generate_insights(
    intake: &DiagnosticIntake,
    scores: &DiagnosticScores,
) -> Vec<GeneratedInsight> {
    let mut insights = Vec::new();
    risk_concerns(intake, &mut insights);
    kpi_concerns(intake, &mut insights);
    kpi_opportunities(intake, &mut insights);
    dimension_recommendations(intake, scores, &mut insights);

    // Stable sort keeps rule order within each (kind, priority) bucket.
    insights.sort_by(|a, b| (a.kind, a.priority).cmp(&(b.kind, b.priority)));
    for (index, insight) in insights.iter_mut().enumerate() {
        insight.id = format!("ins-{:02}", index + 1);
    }
    insights
}

fn push(
    insights: &mut Vec<GeneratedInsight>,
    kind: InsightKind,
    priority: Priority,
    title: String,
    description: String,
    related_area: &str,
) {
    insights.push(GeneratedInsight {
        id: String::new(),
        kind,
        title,
        description,
        priority,
        related_area: related_area.to_string(),
    });
}

fn risk_concerns(intake: &DiagnosticIntake, insights: &mut Vec<GeneratedInsight>) {
    for (category, signal) in intake.risks.signals() {
        if signal.level < HIGH_RISK_LEVEL {
            continue;
        }
        let priority = if signal.level >= 5 || signal.trend == RiskTrend::Worsening {
            Priority::High
        } else {
            Priority::Medium
        };
        let trend = match signal.trend {
            RiskTrend::Improving => "though it is improving",
            RiskTrend::Stable => "and holding steady",
            RiskTrend::Worsening => "and getting worse",
        };
        push(
            insights,
            InsightKind::Concern,
            priority,
            format!("Elevated {} risk", category.label().to_lowercase()),
            format!(
                "{} risk is rated {}/5 {trend}.",
                category.label(),
                signal.level
            ),
            category.key(),
        );
    }
}

fn kpi_concerns(intake: &DiagnosticIntake, insights: &mut Vec<GeneratedInsight>) {
    for (kpi, reading) in intake.kpis.readings() {
        let normalized = normalize_kpi(kpi, reading);
        if normalized < AMBER_THRESHOLD && reading.trend == Some(KpiTrend::Falling) {
            push(
                insights,
                InsightKind::Concern,
                Priority::Medium,
                format!("{} is weak and declining", kpi.label()),
                format!(
                    "{} scores {normalized:.0}/100 and the trend is falling.",
                    kpi.label()
                ),
                kpi.key(),
            );
        }
    }
}

fn kpi_opportunities(intake: &DiagnosticIntake, insights: &mut Vec<GeneratedInsight>) {
    for (kpi, reading) in intake.kpis.readings() {
        let normalized = normalize_kpi(kpi, reading);
        if normalized < GREEN_THRESHOLD {
            continue;
        }
        let priority = if reading.trend == Some(KpiTrend::Rising) {
            Priority::High
        } else {
            Priority::Medium
        };
        push(
            insights,
            InsightKind::Opportunity,
            priority,
            format!("Build on strong {}", kpi.label().to_lowercase()),
            format!(
                "{} scores {normalized:.0}/100; it can anchor differentiation and investment.",
                kpi.label()
            ),
            kpi.key(),
        );
    }
}

fn dimension_recommendations(
    intake: &DiagnosticIntake,
    scores: &DiagnosticScores,
    insights: &mut Vec<GeneratedInsight>,
) {
    let status = status_indicators(scores);

    for dimension in Dimension::ALL {
        let priority = match status.get(dimension) {
            Status::Green => continue,
            Status::Amber => Priority::Medium,
            Status::Red => Priority::High,
        };
        let area = weakest_contributor(intake, scores, dimension);
        let (title, description) = recommendation_text(dimension, &area, scores.get(dimension));
        push(
            insights,
            InsightKind::Recommendation,
            priority,
            title,
            description,
            &area,
        );

        if priority == Priority::High {
            push(
                insights,
                InsightKind::Recommendation,
                Priority::High,
                format!("Set up a recovery plan for {}", dimension.label().to_lowercase()),
                format!(
                    "{} is in the red at {:.1}; assign an owner and a 90-day plan.",
                    dimension.label(),
                    scores.get(dimension)
                ),
                dimension.key(),
            );
        }
    }

    let (priority, title, advice) = match status.overall {
        Status::Green => return,
        Status::Amber => (
            Priority::Medium,
            "Schedule a strategic health check",
            "review the amber dimensions together before they slip further",
        ),
        Status::Red => (
            Priority::High,
            "Commission a full strategic review",
            "several dimensions need coordinated attention",
        ),
    };
    push(
        insights,
        InsightKind::Recommendation,
        priority,
        title.to_string(),
        format!(
            "Overall health is {:.1}; {advice}.",
            scores.overall_health
        ),
        "overall",
    );
}

/// The related area a dimension's recommendation should point at.
fn weakest_contributor(
    intake: &DiagnosticIntake,
    scores: &DiagnosticScores,
    dimension: Dimension,
) -> String {
    match dimension {
        Dimension::Performance => {
            let mut weakest = Kpi::ALL[0];
            let mut lowest = f64::MAX;
            for (kpi, reading) in intake.kpis.readings() {
                let normalized = normalize_kpi(kpi, reading);
                if normalized < lowest {
                    lowest = normalized;
                    weakest = kpi;
                }
            }
            weakest.key().to_string()
        }
        Dimension::Threat => {
            let mut worst = None;
            let mut highest = f64::MIN;
            for (category, signal) in intake.risks.signals() {
                let threat = risk_threat(signal);
                if threat > highest {
                    highest = threat;
                    worst = Some(category);
                }
            }
            worst.map_or("risk_signals", |category| category.key()).to_string()
        }
        Dimension::Alignment => intake
            .priorities
            .iter()
            .find(|priority| {
                normalize_kpi(priority.focus, intake.kpis.get(priority.focus))
                    < scores.performance_score
            })
            .map_or("strategic_priorities", |priority| priority.focus.key())
            .to_string(),
        Dimension::Readiness => intake
            .constraints
            .unresolved_gaps()
            .next()
            .map_or_else(|| "constraints".to_string(), |gap| gap.name.clone()),
    }
}

fn recommendation_text(dimension: Dimension, area: &str, score: f64) -> (String, String) {
    match dimension {
        Dimension::Performance => (
            format!("Lift {}", area.replace('_', " ")),
            format!(
                "Performance sits at {score:.1}; {} is the weakest metric and the fastest lever.",
                area.replace('_', " ")
            ),
        ),
        Dimension::Threat => (
            format!("Mitigate {} exposure", area.replace('_', " ")),
            format!(
                "Threat exposure is {score:.1}; start mitigation with the {} risk.",
                area.replace('_', " ")
            ),
        ),
        Dimension::Alignment => (
            "Realign strategic priorities".to_string(),
            format!(
                "Alignment is {score:.1}; stated priorities lean on areas that are underperforming ({}).",
                area.replace('_', " ")
            ),
        ),
        Dimension::Readiness => (
            format!("Close the {area} gap"),
            format!("Readiness is {score:.1}; constraints limit execution, starting with {area}."),
        ),
    }
}
