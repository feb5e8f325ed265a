use rand::seq::SliceRandom;
use rand::Rng;

use crate::intake::IntakeDraft;
use crate::models::{
    BudgetLevel, CapabilityGap, CompanyProfile, CompanySize, Constraints, Kpi, KpiReading,
    KpiTrend, PerformanceKpis, RiskCategory, RiskSignal, RiskSignals, RiskTrend,
    StrategicPriority, TimelinePressure,
};

const ORGANIZATIONS: &[(&str, &str, &str)] = &[
    ("Lumina Health Partners", "Healthcare", "North America"),
    ("Contoso Freight", "Logistics", "EMEA"),
    ("Northwind Analytics", "Software", "EMEA"),
    ("Tailspin Aerospace", "Aviation", "APAC"),
    ("Fabrikam Materials", "Manufacturing", "North America"),
    ("Woodgrove Financial", "Banking", "LATAM"),
    ("Adatum Energy", "Utilities", "APAC"),
    ("Proseware Retail", "Retail", "EMEA"),
];

const CAPABILITY_GAPS: &[&str] = &[
    "Data engineering",
    "Pricing analytics",
    "Change management",
    "Cloud security",
    "Product management",
];

const PRIORITY_TITLES: &[(&str, Kpi)] = &[
    ("Accelerate top-line growth", Kpi::RevenueGrowth),
    ("Protect gross margin", Kpi::GrossMargin),
    ("Win share in core segments", Kpi::MarketShare),
    ("Lift customer experience", Kpi::CustomerSatisfaction),
    ("Scale the innovation pipeline", Kpi::InnovationRate),
    ("Automate core operations", Kpi::OperationalEfficiency),
];

/// Native ranges per KPI: growth and share are small percentages, the rest
/// are 0-100 style indices.
fn kpi_range(kpi: Kpi) -> (f64, f64) {
    match kpi {
        Kpi::RevenueGrowth => (-10.0, 35.0),
        Kpi::MarketShare => (2.0, 30.0),
        Kpi::InnovationRate => (1.0, 22.0),
        Kpi::OperatingMargin => (-5.0, 30.0),
        _ => (30.0, 95.0),
    }
}

pub fn demo_drafts<R: Rng>(rng: &mut R, count: usize) -> Vec<IntakeDraft> {
    (0..count).map(|index| demo_draft(rng, index)).collect()
}

fn demo_draft<R: Rng>(rng: &mut R, index: usize) -> IntakeDraft {
    let (name, industry, region) = ORGANIZATIONS[index % ORGANIZATIONS.len()];
    let organization_name = if index < ORGANIZATIONS.len() {
        name.to_string()
    } else {
        format!("{name} #{}", index / ORGANIZATIONS.len() + 1)
    };

    let sizes = [
        CompanySize::Startup,
        CompanySize::Small,
        CompanySize::Medium,
        CompanySize::Large,
        CompanySize::Enterprise,
    ];
    let size = sizes[rng.gen_range(0..sizes.len())];

    let mut kpis = PerformanceKpis::uniform(0.0);
    for kpi in Kpi::ALL {
        let (low, high) = kpi_range(kpi);
        let value = (rng.gen_range(low..=high) * 10.0_f64).round() / 10.0;
        let trend = match rng.gen_range(0..4) {
            0 => None,
            1 => Some(KpiTrend::Rising),
            2 => Some(KpiTrend::Steady),
            _ => Some(KpiTrend::Falling),
        };
        *kpis.get_mut(kpi) = match trend {
            Some(trend) => KpiReading::with_trend(value, trend),
            None => KpiReading::new(value),
        };
    }

    let mut risks = RiskSignals::uniform(1);
    for category in RiskCategory::ALL {
        let trend = match rng.gen_range(0..3) {
            0 => RiskTrend::Improving,
            1 => RiskTrend::Stable,
            _ => RiskTrend::Worsening,
        };
        *risks.get_mut(category) = RiskSignal::new(rng.gen_range(1..=5), trend);
    }

    let priority_count = rng.gen_range(1..=3);
    let priorities = PRIORITY_TITLES
        .choose_multiple(rng, priority_count)
        .map(|(title, focus)| StrategicPriority {
            title: title.to_string(),
            focus: *focus,
        })
        .collect();

    let gap_count = rng.gen_range(0..=2);
    let capability_gaps = CAPABILITY_GAPS
        .choose_multiple(rng, gap_count)
        .map(|name| CapabilityGap {
            name: name.to_string(),
            resolved: rng.gen_bool(0.25),
        })
        .collect();

    let budget = match rng.gen_range(0..3) {
        0 => BudgetLevel::Constrained,
        1 => BudgetLevel::Moderate,
        _ => BudgetLevel::Flexible,
    };
    let timeline = match rng.gen_range(0..3) {
        0 => TimelinePressure::Urgent,
        1 => TimelinePressure::Normal,
        _ => TimelinePressure::Relaxed,
    };

    IntakeDraft {
        profile: CompanyProfile {
            organization_name,
            industry: industry.to_string(),
            size,
            region: region.to_string(),
        },
        kpis,
        risks,
        priorities,
        constraints: Constraints {
            budget,
            timeline,
            capability_gaps,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::StepClock;
    use crate::store::DiagnosticStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn same_seed_same_portfolio() {
        let first = demo_drafts(&mut StdRng::seed_from_u64(7), 5);
        let second = demo_drafts(&mut StdRng::seed_from_u64(7), 5);
        assert_eq!(first, second);

        let other = demo_drafts(&mut StdRng::seed_from_u64(8), 5);
        assert_ne!(first, other);
    }

    #[test]
    fn demo_drafts_are_valid_intakes() {
        let mut store = DiagnosticStore::with_clock(StepClock::new());
        for draft in demo_drafts(&mut StdRng::seed_from_u64(42), 20) {
            let id = store.create_intake(draft).unwrap().id;
            store.complete_intake(id).unwrap();
        }
        assert_eq!(store.intakes().len(), 20);
        assert_eq!(store.results().len(), 20);
    }

    #[test]
    fn names_stay_unique_past_the_roster() {
        let drafts = demo_drafts(&mut StdRng::seed_from_u64(1), ORGANIZATIONS.len() + 2);
        let mut names: Vec<_> = drafts
            .iter()
            .map(|d| d.profile.organization_name.clone())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ORGANIZATIONS.len() + 2);
    }
}
