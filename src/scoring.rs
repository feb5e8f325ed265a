use crate::error::{DiagnosticError, Result};
use crate::models::{
    BudgetLevel, DiagnosticIntake, DiagnosticResult, DiagnosticScores, Dimension, Kpi,
    KpiReading, RiskSignal, RiskTrend, Status, StatusIndicators, TimelinePressure,
};

pub const GREEN_THRESHOLD: f64 = 70.0;
pub const AMBER_THRESHOLD: f64 = 40.0;

/// Growth of 40% already counts as a perfect score.
const REVENUE_GROWTH_SCALE: f64 = 2.5;
/// A 25% share of the addressable market maps to 100.
const MARKET_SHARE_SCALE: f64 = 4.0;
/// 20% of revenue from new offerings maps to 100.
const INNOVATION_RATE_SCALE: f64 = 5.0;

const RISK_STEP: f64 = 25.0;
const RISK_TREND_ADJUSTMENT: f64 = 5.0;

const NEUTRAL_ALIGNMENT: f64 = 50.0;
const FOCUSED_PRIORITY_LIMIT: usize = 5;
const DILUTION_PENALTY: f64 = 5.0;

const GAP_PENALTY: f64 = 15.0;
const TALENT_RISK_PENALTY: f64 = 10.0;
const TALENT_RISK_LEVEL: u8 = 4;

pub fn compute_scores(intake: &DiagnosticIntake) -> DiagnosticScores {
    let performance = performance_score(intake);
    let threat = threat_score(intake);
    let alignment = alignment_score(intake, performance);
    let readiness = readiness_score(intake);
    let overall = (performance + (100.0 - threat) + alignment + readiness) / 4.0;

    DiagnosticScores {
        performance_score: round1(performance),
        threat_score: round1(threat),
        alignment_score: round1(alignment),
        readiness_score: round1(readiness),
        overall_health: round1(clamp_score(overall)),
    }
}

pub fn status_indicators(scores: &DiagnosticScores) -> StatusIndicators {
    StatusIndicators {
        performance: status_for(scores.performance_score),
        threat: inverted_status_for(scores.threat_score),
        alignment: status_for(scores.alignment_score),
        readiness: status_for(scores.readiness_score),
        overall: status_for(scores.overall_health),
    }
}

/// Higher is better: `>= 70` green, `>= 40` amber, anything lower red.
pub fn status_for(score: f64) -> Status {
    if score >= GREEN_THRESHOLD {
        Status::Green
    } else if score >= AMBER_THRESHOLD {
        Status::Amber
    } else {
        Status::Red
    }
}

/// Lower is better: `<= 30` green, `<= 60` amber, anything higher red.
pub fn inverted_status_for(score: f64) -> Status {
    status_for(100.0 - score)
}

/// Checks a stored result: every score finite and in [0, 100], and the
/// status bands matching the scores.
pub fn validate_result(result: &DiagnosticResult) -> Result<()> {
    let scores = &result.scores;
    let named = Dimension::ALL
        .into_iter()
        .map(|dimension| (dimension.key(), scores.get(dimension)))
        .chain(std::iter::once(("overall_health", scores.overall_health)));
    for (name, score) in named {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(DiagnosticError::Validation(format!(
                "{name} score {score} is outside 0-100"
            )));
        }
    }
    if result.status != status_indicators(scores) {
        return Err(DiagnosticError::Validation(
            "status indicators do not match the scores".to_string(),
        ));
    }
    Ok(())
}

pub fn kpi_scale(kpi: Kpi) -> f64 {
    match kpi {
        Kpi::RevenueGrowth => REVENUE_GROWTH_SCALE,
        Kpi::MarketShare => MARKET_SHARE_SCALE,
        Kpi::InnovationRate => INNOVATION_RATE_SCALE,
        _ => 1.0,
    }
}

pub fn normalize_kpi(kpi: Kpi, reading: &KpiReading) -> f64 {
    clamp_score(reading.value * kpi_scale(kpi))
}

/// Threat contribution of one signal on the 0-100 scale.
pub fn risk_threat(signal: &RiskSignal) -> f64 {
    let level = signal.level.clamp(1, 5);
    let base = f64::from(level - 1) * RISK_STEP;
    let adjusted = match signal.trend {
        RiskTrend::Improving => base - RISK_TREND_ADJUSTMENT,
        RiskTrend::Stable => base,
        RiskTrend::Worsening => base + RISK_TREND_ADJUSTMENT,
    };
    clamp_score(adjusted)
}

fn performance_score(intake: &DiagnosticIntake) -> f64 {
    let total: f64 = intake
        .kpis
        .readings()
        .map(|(kpi, reading)| normalize_kpi(kpi, reading))
        .sum();
    total / Kpi::ALL.len() as f64
}

fn threat_score(intake: &DiagnosticIntake) -> f64 {
    let total: f64 = intake
        .risks
        .signals()
        .map(|(_, signal)| risk_threat(signal))
        .sum();
    total / crate::models::RiskCategory::ALL.len() as f64
}

fn alignment_score(intake: &DiagnosticIntake, performance: f64) -> f64 {
    let priorities = &intake.priorities;
    if priorities.is_empty() {
        return NEUTRAL_ALIGNMENT;
    }

    let focus_scores: Vec<f64> = priorities
        .iter()
        .map(|priority| normalize_kpi(priority.focus, intake.kpis.get(priority.focus)))
        .collect();
    let mean_focus = focus_scores.iter().sum::<f64>() / focus_scores.len() as f64;

    // Comparing unrounded values keeps ties between equal KPIs stable.
    let covered = focus_scores
        .iter()
        .filter(|score| **score >= performance)
        .count();
    let coverage = covered as f64 / focus_scores.len() as f64 * 100.0;

    let dilution =
        priorities.len().saturating_sub(FOCUSED_PRIORITY_LIMIT) as f64 * DILUTION_PENALTY;

    clamp_score(0.5 * mean_focus + 0.5 * coverage - dilution)
}

fn readiness_score(intake: &DiagnosticIntake) -> f64 {
    let constraints = &intake.constraints;
    let gaps = constraints.unresolved_gaps().count() as f64 * GAP_PENALTY;
    let budget = match constraints.budget {
        BudgetLevel::Constrained => 20.0,
        BudgetLevel::Moderate => 10.0,
        BudgetLevel::Flexible => 0.0,
    };
    let timeline = match constraints.timeline {
        TimelinePressure::Urgent => 15.0,
        TimelinePressure::Normal => 5.0,
        TimelinePressure::Relaxed => 0.0,
    };
    let talent = if intake.risks.talent.level >= TALENT_RISK_LEVEL {
        TALENT_RISK_PENALTY
    } else {
        0.0
    };

    clamp_score(100.0 - gaps - budget - timeline - talent)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
