use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
    Enterprise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub organization_name: String,
    pub industry: String,
    pub size: CompanySize,
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    RevenueGrowth,
    GrossMargin,
    OperatingMargin,
    MarketShare,
    EmployeeProductivity,
    CustomerSatisfaction,
    InnovationRate,
    OperationalEfficiency,
}

impl Kpi {
    pub const ALL: [Kpi; 8] = [
        Kpi::RevenueGrowth,
        Kpi::GrossMargin,
        Kpi::OperatingMargin,
        Kpi::MarketShare,
        Kpi::EmployeeProductivity,
        Kpi::CustomerSatisfaction,
        Kpi::InnovationRate,
        Kpi::OperationalEfficiency,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Kpi::RevenueGrowth => "revenue_growth",
            Kpi::GrossMargin => "gross_margin",
            Kpi::OperatingMargin => "operating_margin",
            Kpi::MarketShare => "market_share",
            Kpi::EmployeeProductivity => "employee_productivity",
            Kpi::CustomerSatisfaction => "customer_satisfaction",
            Kpi::InnovationRate => "innovation_rate",
            Kpi::OperationalEfficiency => "operational_efficiency",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Kpi::RevenueGrowth => "Revenue growth",
            Kpi::GrossMargin => "Gross margin",
            Kpi::OperatingMargin => "Operating margin",
            Kpi::MarketShare => "Market share",
            Kpi::EmployeeProductivity => "Employee productivity",
            Kpi::CustomerSatisfaction => "Customer satisfaction",
            Kpi::InnovationRate => "Innovation rate",
            Kpi::OperationalEfficiency => "Operational efficiency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiTrend {
    Rising,
    Steady,
    Falling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReading {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<KpiTrend>,
}

impl KpiReading {
    pub fn new(value: f64) -> Self {
        Self { value, trend: None }
    }

    pub fn with_trend(value: f64, trend: KpiTrend) -> Self {
        Self {
            value,
            trend: Some(trend),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceKpis {
    pub revenue_growth: KpiReading,
    pub gross_margin: KpiReading,
    pub operating_margin: KpiReading,
    pub market_share: KpiReading,
    pub employee_productivity: KpiReading,
    pub customer_satisfaction: KpiReading,
    pub innovation_rate: KpiReading,
    pub operational_efficiency: KpiReading,
}

impl PerformanceKpis {
    /// Every KPI set to the same raw value with no trend.
    pub fn uniform(value: f64) -> Self {
        Self {
            revenue_growth: KpiReading::new(value),
            gross_margin: KpiReading::new(value),
            operating_margin: KpiReading::new(value),
            market_share: KpiReading::new(value),
            employee_productivity: KpiReading::new(value),
            customer_satisfaction: KpiReading::new(value),
            innovation_rate: KpiReading::new(value),
            operational_efficiency: KpiReading::new(value),
        }
    }

    pub fn get(&self, kpi: Kpi) -> &KpiReading {
        match kpi {
            Kpi::RevenueGrowth => &self.revenue_growth,
            Kpi::GrossMargin => &self.gross_margin,
            Kpi::OperatingMargin => &self.operating_margin,
            Kpi::MarketShare => &self.market_share,
            Kpi::EmployeeProductivity => &self.employee_productivity,
            Kpi::CustomerSatisfaction => &self.customer_satisfaction,
            Kpi::InnovationRate => &self.innovation_rate,
            Kpi::OperationalEfficiency => &self.operational_efficiency,
        }
    }

    pub fn get_mut(&mut self, kpi: Kpi) -> &mut KpiReading {
        match kpi {
            Kpi::RevenueGrowth => &mut self.revenue_growth,
            Kpi::GrossMargin => &mut self.gross_margin,
            Kpi::OperatingMargin => &mut self.operating_margin,
            Kpi::MarketShare => &mut self.market_share,
            Kpi::EmployeeProductivity => &mut self.employee_productivity,
            Kpi::CustomerSatisfaction => &mut self.customer_satisfaction,
            Kpi::InnovationRate => &mut self.innovation_rate,
            Kpi::OperationalEfficiency => &mut self.operational_efficiency,
        }
    }

    pub fn readings(&self) -> impl Iterator<Item = (Kpi, &KpiReading)> {
        Kpi::ALL.into_iter().map(move |kpi| (kpi, self.get(kpi)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Regulatory,
    SupplyChain,
    TechnologyDisruption,
    Talent,
    Market,
    Financial,
    Competitive,
    Cybersecurity,
    Reputation,
    Operational,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 10] = [
        RiskCategory::Regulatory,
        RiskCategory::SupplyChain,
        RiskCategory::TechnologyDisruption,
        RiskCategory::Talent,
        RiskCategory::Market,
        RiskCategory::Financial,
        RiskCategory::Competitive,
        RiskCategory::Cybersecurity,
        RiskCategory::Reputation,
        RiskCategory::Operational,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RiskCategory::Regulatory => "regulatory",
            RiskCategory::SupplyChain => "supply_chain",
            RiskCategory::TechnologyDisruption => "technology_disruption",
            RiskCategory::Talent => "talent",
            RiskCategory::Market => "market",
            RiskCategory::Financial => "financial",
            RiskCategory::Competitive => "competitive",
            RiskCategory::Cybersecurity => "cybersecurity",
            RiskCategory::Reputation => "reputation",
            RiskCategory::Operational => "operational",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Regulatory => "Regulatory",
            RiskCategory::SupplyChain => "Supply chain",
            RiskCategory::TechnologyDisruption => "Technology disruption",
            RiskCategory::Talent => "Talent",
            RiskCategory::Market => "Market",
            RiskCategory::Financial => "Financial",
            RiskCategory::Competitive => "Competitive",
            RiskCategory::Cybersecurity => "Cybersecurity",
            RiskCategory::Reputation => "Reputation",
            RiskCategory::Operational => "Operational",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTrend {
    Improving,
    #[default]
    Stable,
    Worsening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSignal {
    /// 1 (low risk) to 5 (high risk).
    pub level: u8,
    #[serde(default)]
    pub trend: RiskTrend,
}

impl RiskSignal {
    pub fn new(level: u8, trend: RiskTrend) -> Self {
        Self { level, trend }
    }

    pub fn stable(level: u8) -> Self {
        Self::new(level, RiskTrend::Stable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignals {
    pub regulatory: RiskSignal,
    pub supply_chain: RiskSignal,
    pub technology_disruption: RiskSignal,
    pub talent: RiskSignal,
    pub market: RiskSignal,
    pub financial: RiskSignal,
    pub competitive: RiskSignal,
    pub cybersecurity: RiskSignal,
    pub reputation: RiskSignal,
    pub operational: RiskSignal,
}

impl RiskSignals {
    /// Every category at the same level, trend stable.
    pub fn uniform(level: u8) -> Self {
        let signal = RiskSignal::stable(level);
        Self {
            regulatory: signal,
            supply_chain: signal,
            technology_disruption: signal,
            talent: signal,
            market: signal,
            financial: signal,
            competitive: signal,
            cybersecurity: signal,
            reputation: signal,
            operational: signal,
        }
    }

    pub fn get(&self, category: RiskCategory) -> &RiskSignal {
        match category {
            RiskCategory::Regulatory => &self.regulatory,
            RiskCategory::SupplyChain => &self.supply_chain,
            RiskCategory::TechnologyDisruption => &self.technology_disruption,
            RiskCategory::Talent => &self.talent,
            RiskCategory::Market => &self.market,
            RiskCategory::Financial => &self.financial,
            RiskCategory::Competitive => &self.competitive,
            RiskCategory::Cybersecurity => &self.cybersecurity,
            RiskCategory::Reputation => &self.reputation,
            RiskCategory::Operational => &self.operational,
        }
    }

    pub fn get_mut(&mut self, category: RiskCategory) -> &mut RiskSignal {
        match category {
            RiskCategory::Regulatory => &mut self.regulatory,
            RiskCategory::SupplyChain => &mut self.supply_chain,
            RiskCategory::TechnologyDisruption => &mut self.technology_disruption,
            RiskCategory::Talent => &mut self.talent,
            RiskCategory::Market => &mut self.market,
            RiskCategory::Financial => &mut self.financial,
            RiskCategory::Competitive => &mut self.competitive,
            RiskCategory::Cybersecurity => &mut self.cybersecurity,
            RiskCategory::Reputation => &mut self.reputation,
            RiskCategory::Operational => &mut self.operational,
        }
    }

    pub fn signals(&self) -> impl Iterator<Item = (RiskCategory, &RiskSignal)> {
        RiskCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicPriority {
    pub title: String,
    /// KPI the goal is meant to move.
    pub focus: Kpi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Constrained,
    Moderate,
    #[default]
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelinePressure {
    Urgent,
    Normal,
    #[default]
    Relaxed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityGap {
    pub name: String,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub budget: BudgetLevel,
    #[serde(default)]
    pub timeline: TimelinePressure,
    #[serde(default)]
    pub capability_gaps: Vec<CapabilityGap>,
}

impl Constraints {
    pub fn unresolved_gaps(&self) -> impl Iterator<Item = &CapabilityGap> {
        self.capability_gaps.iter().filter(|gap| !gap.resolved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticIntake {
    pub id: Uuid,
    pub profile: CompanyProfile,
    pub kpis: PerformanceKpis,
    pub risks: RiskSignals,
    #[serde(default)]
    pub priorities: Vec<StrategicPriority>,
    #[serde(default)]
    pub constraints: Constraints,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed: bool,
}

impl DiagnosticIntake {
    pub fn organization_name(&self) -> &str {
        &self.profile.organization_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Performance,
    Threat,
    Alignment,
    Readiness,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Performance,
        Dimension::Threat,
        Dimension::Alignment,
        Dimension::Readiness,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Dimension::Performance => "performance",
            Dimension::Threat => "threat",
            Dimension::Alignment => "alignment",
            Dimension::Readiness => "readiness",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Performance => "Performance",
            Dimension::Threat => "Threat exposure",
            Dimension::Alignment => "Strategic alignment",
            Dimension::Readiness => "Execution readiness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticScores {
    pub performance_score: f64,
    pub threat_score: f64,
    pub alignment_score: f64,
    pub readiness_score: f64,
    pub overall_health: f64,
}

impl DiagnosticScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Performance => self.performance_score,
            Dimension::Threat => self.threat_score,
            Dimension::Alignment => self.alignment_score,
            Dimension::Readiness => self.readiness_score,
        }
    }

    /// 0-100, higher means the dimension is in worse shape.
    pub fn weakness(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Threat => self.threat_score,
            other => 100.0 - self.get(other),
        }
    }

    /// The dimension in the worst shape; earlier dimensions win ties.
    pub fn weakest_dimension(&self) -> Dimension {
        let mut weakest = Dimension::Performance;
        for dimension in Dimension::ALL {
            if self.weakness(dimension) > self.weakness(weakest) {
                weakest = dimension;
            }
        }
        weakest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Green,
    Amber,
    Red,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Green => "green",
            Status::Amber => "amber",
            Status::Red => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusIndicators {
    pub performance: Status,
    pub threat: Status,
    pub alignment: Status,
    pub readiness: Status,
    pub overall: Status,
}

impl StatusIndicators {
    pub fn get(&self, dimension: Dimension) -> Status {
        match dimension {
            Dimension::Performance => self.performance,
            Dimension::Threat => self.threat,
            Dimension::Alignment => self.alignment,
            Dimension::Readiness => self.readiness,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Concern,
    Opportunity,
    Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub related_area: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Growth,
    Renewal,
    Risk,
    Innovation,
    Execution,
    Capability,
    Digital,
    Marketing,
    Finance,
    Stakeholders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTier {
    Primary,
    Secondary,
    Supporting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecommendation {
    pub tool_id: String,
    pub tool_name: String,
    pub category: ToolCategory,
    pub priority: ToolTier,
    pub relevance_score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub id: Uuid,
    pub intake_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub scores: DiagnosticScores,
    pub status: StatusIndicators,
    pub insights: Vec<GeneratedInsight>,
    pub recommendations: Vec<ToolRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub name: String,
    pub overall: f64,
    pub performance: f64,
    pub threat: f64,
    pub alignment: f64,
    pub readiness: f64,
}
