use std::io::Read;

use anyhow::Context;

use crate::intake::IntakeDraft;
use crate::models::{
    CompanyProfile, CompanySize, Constraints, KpiReading, PerformanceKpis, RiskSignal, RiskSignals,
};

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    organization_name: String,
    industry: String,
    size: CompanySize,
    region: String,
    revenue_growth: f64,
    gross_margin: f64,
    operating_margin: f64,
    market_share: f64,
    employee_productivity: f64,
    customer_satisfaction: f64,
    innovation_rate: f64,
    operational_efficiency: f64,
    regulatory: u8,
    supply_chain: u8,
    technology_disruption: u8,
    talent: u8,
    market: u8,
    financial: u8,
    competitive: u8,
    cybersecurity: u8,
    reputation: u8,
    operational: u8,
}

impl From<CsvRow> for IntakeDraft {
    fn from(row: CsvRow) -> Self {
        IntakeDraft {
            profile: CompanyProfile {
                organization_name: row.organization_name,
                industry: row.industry,
                size: row.size,
                region: row.region,
            },
            kpis: PerformanceKpis {
                revenue_growth: KpiReading::new(row.revenue_growth),
                gross_margin: KpiReading::new(row.gross_margin),
                operating_margin: KpiReading::new(row.operating_margin),
                market_share: KpiReading::new(row.market_share),
                employee_productivity: KpiReading::new(row.employee_productivity),
                customer_satisfaction: KpiReading::new(row.customer_satisfaction),
                innovation_rate: KpiReading::new(row.innovation_rate),
                operational_efficiency: KpiReading::new(row.operational_efficiency),
            },
            risks: RiskSignals {
                regulatory: RiskSignal::stable(row.regulatory),
                supply_chain: RiskSignal::stable(row.supply_chain),
                technology_disruption: RiskSignal::stable(row.technology_disruption),
                talent: RiskSignal::stable(row.talent),
                market: RiskSignal::stable(row.market),
                financial: RiskSignal::stable(row.financial),
                competitive: RiskSignal::stable(row.competitive),
                cybersecurity: RiskSignal::stable(row.cybersecurity),
                reputation: RiskSignal::stable(row.reputation),
                operational: RiskSignal::stable(row.operational),
            },
            priorities: Vec::new(),
            constraints: Constraints::default(),
        }
    }
}

/// Parses intake drafts from CSV. Range checks happen when the drafts are
/// handed to the store.
pub fn read_drafts<R: Read>(reader: R) -> anyhow::Result<Vec<IntakeDraft>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut drafts = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let row = result.with_context(|| format!("invalid CSV row at line {}", index + 2))?;
        drafts.push(row.into());
    }

    Ok(drafts)
}

pub fn read_drafts_from_path(path: &std::path::Path) -> anyhow::Result<Vec<IntakeDraft>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_drafts(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskTrend;

    const HEADER: &str = "organization_name,industry,size,region,revenue_growth,gross_margin,\
operating_margin,market_share,employee_productivity,customer_satisfaction,innovation_rate,\
operational_efficiency,regulatory,supply_chain,technology_disruption,talent,market,financial,\
competitive,cybersecurity,reputation,operational";

    #[test]
    fn rows_become_drafts() {
        let csv = format!(
            "{HEADER}\n\
Fabrikam,Manufacturing,large,North America,6.5,38,12,9,72,81,4,77,2,4,3,3,2,2,3,5,1,2\n\
Tailspin,Aviation,enterprise,APAC,-2,22,3,14,60,70,2,65,4,5,2,4,3,4,3,3,2,4\n"
        );
        let drafts = read_drafts(csv.as_bytes()).unwrap();
        assert_eq!(drafts.len(), 2);

        let fabrikam = &drafts[0];
        assert_eq!(fabrikam.profile.organization_name, "Fabrikam");
        assert_eq!(fabrikam.profile.size, CompanySize::Large);
        assert_eq!(fabrikam.kpis.revenue_growth.value, 6.5);
        assert_eq!(fabrikam.risks.cybersecurity.level, 5);
        assert_eq!(fabrikam.risks.cybersecurity.trend, RiskTrend::Stable);
        assert!(fabrikam.priorities.is_empty());

        assert_eq!(drafts[1].kpis.revenue_growth.value, -2.0);
    }

    #[test]
    fn bad_row_reports_line() {
        let csv = format!("{HEADER}\nAcme,Retail,huge,EU,1,2,3,4,5,6,7,8,1,1,1,1,1,1,1,1,1,1\n");
        let err = read_drafts(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
