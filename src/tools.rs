use std::cmp::Ordering;

use crate::models::{
    BudgetLevel, DiagnosticIntake, DiagnosticScores, Dimension, Kpi, RiskCategory, ToolCategory,
    ToolRecommendation, ToolTier,
};
use crate::scoring::{normalize_kpi, risk_threat};

pub const PRIMARY_THRESHOLD: u8 = 80;
pub const SECONDARY_THRESHOLD: u8 = 50;
/// Tools scoring below this are left out entirely.
pub const MIN_RELEVANCE: u8 = 25;

const DIRECT: f64 = 1.0;
const PARTIAL: f64 = 0.7;
const INDIRECT: f64 = 0.4;

const WEAKEST_DIMENSION_BONUS: f64 = 10.0;
const HEAVY_TOOL_BUDGET_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effort {
    Light,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Dimension(Dimension),
    Kpi(Kpi),
    Risk(RiskCategory),
}

impl Target {
    fn label(self) -> &'static str {
        match self {
            Target::Dimension(dimension) => dimension.label(),
            Target::Kpi(kpi) => kpi.label(),
            Target::Risk(category) => category.label(),
        }
    }

    fn weakness(self, intake: &DiagnosticIntake, scores: &DiagnosticScores) -> f64 {
        match self {
            Target::Dimension(dimension) => scores.weakness(dimension),
            Target::Kpi(kpi) => 100.0 - normalize_kpi(kpi, intake.kpis.get(kpi)),
            Target::Risk(category) => risk_threat(intake.risks.get(category)),
        }
    }
}

#[derive(Debug)]
pub struct ToolSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub category: ToolCategory,
    pub effort: Effort,
    pub targets: &'static [(Target, f64)],
}

use self::Target::{Dimension as Dim, Kpi as K, Risk as R};

pub static CATALOG: &[ToolSpec] = &[
    ToolSpec {
        id: "ansoff-matrix",
        name: "Ansoff Growth Matrix",
        category: ToolCategory::Growth,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::RevenueGrowth), DIRECT),
            (K(Kpi::MarketShare), PARTIAL),
            (Dim(Dimension::Performance), INDIRECT),
        ],
    },
    ToolSpec {
        id: "growth-share-matrix",
        name: "BCG Growth-Share Matrix",
        category: ToolCategory::Growth,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::MarketShare), DIRECT),
            (K(Kpi::RevenueGrowth), PARTIAL),
            (Dim(Dimension::Alignment), INDIRECT),
        ],
    },
    ToolSpec {
        id: "three-horizons",
        name: "Three Horizons of Growth",
        category: ToolCategory::Renewal,
        effort: Effort::Heavy,
        targets: &[
            (Dim(Dimension::Alignment), DIRECT),
            (K(Kpi::InnovationRate), PARTIAL),
            (Dim(Dimension::Performance), INDIRECT),
        ],
    },
    ToolSpec {
        id: "turnaround-playbook",
        name: "Turnaround Playbook",
        category: ToolCategory::Renewal,
        effort: Effort::Heavy,
        targets: &[
            (Dim(Dimension::Performance), DIRECT),
            (K(Kpi::OperatingMargin), PARTIAL),
            (R(RiskCategory::Financial), INDIRECT),
        ],
    },
    ToolSpec {
        id: "risk-heat-map",
        name: "Enterprise Risk Heat Map",
        category: ToolCategory::Risk,
        effort: Effort::Light,
        targets: &[
            (Dim(Dimension::Threat), DIRECT),
            (R(RiskCategory::Regulatory), PARTIAL),
            (R(RiskCategory::Operational), PARTIAL),
        ],
    },
    ToolSpec {
        id: "scenario-planning",
        name: "Scenario Planning",
        category: ToolCategory::Risk,
        effort: Effort::Heavy,
        targets: &[
            (R(RiskCategory::TechnologyDisruption), DIRECT),
            (R(RiskCategory::Market), DIRECT),
            (Dim(Dimension::Threat), PARTIAL),
        ],
    },
    ToolSpec {
        id: "blue-ocean",
        name: "Blue Ocean Strategy",
        category: ToolCategory::Innovation,
        effort: Effort::Heavy,
        targets: &[
            (K(Kpi::InnovationRate), DIRECT),
            (R(RiskCategory::Competitive), PARTIAL),
            (K(Kpi::MarketShare), INDIRECT),
        ],
    },
    ToolSpec {
        id: "jobs-to-be-done",
        name: "Jobs-to-be-Done",
        category: ToolCategory::Innovation,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::InnovationRate), DIRECT),
            (K(Kpi::CustomerSatisfaction), PARTIAL),
        ],
    },
    ToolSpec {
        id: "okr-framework",
        name: "OKR Framework",
        category: ToolCategory::Execution,
        effort: Effort::Light,
        targets: &[
            (Dim(Dimension::Alignment), DIRECT),
            (Dim(Dimension::Readiness), PARTIAL),
        ],
    },
    ToolSpec {
        id: "balanced-scorecard",
        name: "Balanced Scorecard",
        category: ToolCategory::Execution,
        effort: Effort::Heavy,
        targets: &[
            (Dim(Dimension::Performance), PARTIAL),
            (Dim(Dimension::Alignment), PARTIAL),
            (K(Kpi::OperationalEfficiency), INDIRECT),
        ],
    },
    ToolSpec {
        id: "capability-maturity",
        name: "Capability Maturity Assessment",
        category: ToolCategory::Capability,
        effort: Effort::Light,
        targets: &[
            (Dim(Dimension::Readiness), DIRECT),
            (R(RiskCategory::Talent), PARTIAL),
        ],
    },
    ToolSpec {
        id: "mckinsey-7s",
        name: "McKinsey 7-S Framework",
        category: ToolCategory::Capability,
        effort: Effort::Heavy,
        targets: &[
            (R(RiskCategory::Talent), DIRECT),
            (Dim(Dimension::Readiness), PARTIAL),
            (K(Kpi::EmployeeProductivity), PARTIAL),
        ],
    },
    ToolSpec {
        id: "digital-maturity",
        name: "Digital Maturity Model",
        category: ToolCategory::Digital,
        effort: Effort::Heavy,
        targets: &[
            (R(RiskCategory::Cybersecurity), DIRECT),
            (R(RiskCategory::TechnologyDisruption), PARTIAL),
            (K(Kpi::OperationalEfficiency), PARTIAL),
        ],
    },
    ToolSpec {
        id: "process-automation",
        name: "Process Automation Roadmap",
        category: ToolCategory::Digital,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::OperationalEfficiency), DIRECT),
            (K(Kpi::EmployeeProductivity), PARTIAL),
        ],
    },
    ToolSpec {
        id: "customer-journey-map",
        name: "Customer Journey Mapping",
        category: ToolCategory::Marketing,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::CustomerSatisfaction), DIRECT),
            (R(RiskCategory::Reputation), PARTIAL),
        ],
    },
    ToolSpec {
        id: "stp-positioning",
        name: "Segmentation, Targeting & Positioning",
        category: ToolCategory::Marketing,
        effort: Effort::Light,
        targets: &[
            (R(RiskCategory::Competitive), DIRECT),
            (K(Kpi::MarketShare), PARTIAL),
        ],
    },
    ToolSpec {
        id: "value-driver-tree",
        name: "Value Driver Tree",
        category: ToolCategory::Finance,
        effort: Effort::Light,
        targets: &[
            (K(Kpi::OperatingMargin), DIRECT),
            (K(Kpi::GrossMargin), DIRECT),
            (R(RiskCategory::Financial), PARTIAL),
        ],
    },
    ToolSpec {
        id: "zero-based-budgeting",
        name: "Zero-Based Budgeting",
        category: ToolCategory::Finance,
        effort: Effort::Heavy,
        targets: &[
            (R(RiskCategory::Financial), DIRECT),
            (K(Kpi::OperatingMargin), PARTIAL),
        ],
    },
    ToolSpec {
        id: "stakeholder-map",
        name: "Stakeholder Mapping",
        category: ToolCategory::Stakeholders,
        effort: Effort::Light,
        targets: &[
            (R(RiskCategory::Regulatory), DIRECT),
            (R(RiskCategory::Reputation), DIRECT),
            (Dim(Dimension::Alignment), INDIRECT),
        ],
    },
    ToolSpec {
        id: "pestle-analysis",
        name: "PESTLE Analysis",
        category: ToolCategory::Stakeholders,
        effort: Effort::Light,
        targets: &[
            (R(RiskCategory::SupplyChain), DIRECT),
            (R(RiskCategory::Regulatory), PARTIAL),
            (Dim(Dimension::Threat), INDIRECT),
        ],
    },
];

pub fn tier_for(relevance: u8) -> ToolTier {
    if relevance >= PRIMARY_THRESHOLD {
        ToolTier::Primary
    } else if relevance >= SECONDARY_THRESHOLD {
        ToolTier::Secondary
    } else {
        ToolTier::Supporting
    }
}

pub fn recommend_tools(
    intake: &DiagnosticIntake,
    scores: &DiagnosticScores,
) -> Vec<ToolRecommendation> {
    let weakest = scores.weakest_dimension();
    let constrained = intake.constraints.budget == BudgetLevel::Constrained;

    let mut recommendations: Vec<ToolRecommendation> = CATALOG
        .iter()
        .filter_map(|tool| score_tool(tool, intake, scores, weakest, constrained))
        .filter(|rec| rec.relevance_score >= MIN_RELEVANCE)
        .collect();

    recommendations.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.relevance_score.cmp(&a.relevance_score))
            .then_with(|| a.tool_id.cmp(&b.tool_id))
    });
    recommendations
}

fn score_tool(
    tool: &ToolSpec,
    intake: &DiagnosticIntake,
    scores: &DiagnosticScores,
    weakest: Dimension,
    constrained: bool,
) -> Option<ToolRecommendation> {
    let (best_target, best_fit) = tool
        .targets
        .iter()
        .map(|(target, directness)| (*target, target.weakness(intake, scores) * directness))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))?;

    let mut reason = format!(
        "Targets {} ({:.0}/100 weakness)",
        best_target.label().to_lowercase(),
        best_target.weakness(intake, scores)
    );
    let mut relevance = best_fit;

    if tool.targets.iter().any(|(t, _)| *t == Target::Dimension(weakest)) {
        relevance += WEAKEST_DIMENSION_BONUS;
        reason.push_str(&format!(
            "; addresses the weakest dimension ({})",
            weakest.label().to_lowercase()
        ));
    }
    if constrained && tool.effort == Effort::Heavy {
        relevance -= HEAVY_TOOL_BUDGET_PENALTY;
        reason.push_str("; heavy lift under a constrained budget");
    }

    let relevance_score = relevance.clamp(0.0, 100.0).round() as u8;
    Some(ToolRecommendation {
        tool_id: tool.id.to_string(),
        tool_name: tool.name.to_string(),
        category: tool.category,
        priority: tier_for(relevance_score),
        relevance_score,
        reason,
    })
}
