use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DiagnosticError, Result};
use crate::models::{
    CompanyProfile, Constraints, DiagnosticIntake, PerformanceKpis, RiskSignals,
    StrategicPriority,
};

pub const MIN_RISK_LEVEL: u8 = 1;
pub const MAX_RISK_LEVEL: u8 = 5;

/// Everything a caller supplies to open a new intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeDraft {
    pub profile: CompanyProfile,
    pub kpis: PerformanceKpis,
    pub risks: RiskSignals,
    #[serde(default)]
    pub priorities: Vec<StrategicPriority>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl IntakeDraft {
    pub fn into_intake(self, id: Uuid, now: DateTime<Utc>) -> Result<DiagnosticIntake> {
        let intake = DiagnosticIntake {
            id,
            profile: self.profile,
            kpis: self.kpis,
            risks: self.risks,
            priorities: self.priorities,
            constraints: self.constraints,
            created_at: now,
            updated_at: now,
            completed: false,
        };
        validate_intake(&intake)?;
        Ok(intake)
    }
}

/// Whole-section replacement; absent sections are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<CompanyProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kpis: Option<PerformanceKpis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<RiskSignals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priorities: Option<Vec<StrategicPriority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl IntakeUpdate {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.kpis.is_none()
            && self.risks.is_none()
            && self.priorities.is_none()
            && self.constraints.is_none()
    }

    /// Returns a merged copy; the original is never touched.
    pub fn apply(&self, intake: &DiagnosticIntake, now: DateTime<Utc>) -> DiagnosticIntake {
        let mut merged = intake.clone();
        if let Some(profile) = &self.profile {
            merged.profile = profile.clone();
        }
        if let Some(kpis) = &self.kpis {
            merged.kpis = kpis.clone();
        }
        if let Some(risks) = &self.risks {
            merged.risks = risks.clone();
        }
        if let Some(priorities) = &self.priorities {
            merged.priorities = priorities.clone();
        }
        if let Some(constraints) = &self.constraints {
            merged.constraints = constraints.clone();
        }
        merged.updated_at = now;
        merged
    }
}

pub fn validate_intake(intake: &DiagnosticIntake) -> Result<()> {
    if intake.profile.organization_name.trim().is_empty() {
        return Err(invalid("organization name must not be empty"));
    }

    for (kpi, reading) in intake.kpis.readings() {
        if !reading.value.is_finite() {
            return Err(invalid(format!("{} must be a finite number", kpi.key())));
        }
    }

    for (category, signal) in intake.risks.signals() {
        if !(MIN_RISK_LEVEL..=MAX_RISK_LEVEL).contains(&signal.level) {
            return Err(invalid(format!(
                "{} risk level {} is outside {MIN_RISK_LEVEL}-{MAX_RISK_LEVEL}",
                category.key(),
                signal.level
            )));
        }
    }

    if let Some(index) = intake
        .priorities
        .iter()
        .position(|priority| priority.title.trim().is_empty())
    {
        return Err(invalid(format!("priority #{} has an empty title", index + 1)));
    }

    if let Some(index) = intake
        .constraints
        .capability_gaps
        .iter()
        .position(|gap| gap.name.trim().is_empty())
    {
        return Err(invalid(format!(
            "capability gap #{} has an empty name",
            index + 1
        )));
    }

    if intake.updated_at < intake.created_at {
        return Err(invalid("updated_at precedes created_at"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> DiagnosticError {
    DiagnosticError::Validation(message.into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{CompanySize, Kpi, RiskCategory, RiskSignal};
    use chrono::TimeZone;

    pub(crate) fn sample_draft() -> IntakeDraft {
        IntakeDraft {
            profile: CompanyProfile {
                organization_name: "Northwind Analytics".to_string(),
                industry: "Software".to_string(),
                size: CompanySize::Medium,
                region: "EMEA".to_string(),
            },
            kpis: PerformanceKpis::uniform(80.0),
            risks: RiskSignals::uniform(1),
            priorities: Vec::new(),
            constraints: Constraints::default(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn draft_becomes_open_intake() {
        let id = Uuid::new_v4();
        let intake = sample_draft().into_intake(id, now()).unwrap();
        assert_eq!(intake.id, id);
        assert!(!intake.completed);
        assert_eq!(intake.created_at, intake.updated_at);
        assert_eq!(intake.organization_name(), "Northwind Analytics");
    }

    #[test]
    fn rejects_risk_level_outside_scale() {
        let mut draft = sample_draft();
        *draft.risks.get_mut(RiskCategory::Cybersecurity) = RiskSignal::stable(6);
        let err = draft.into_intake(Uuid::new_v4(), now()).unwrap_err();
        assert!(matches!(err, DiagnosticError::Validation(msg) if msg.contains("cybersecurity")));

        let mut draft = sample_draft();
        draft.risks.market.level = 0;
        assert!(draft.into_intake(Uuid::new_v4(), now()).is_err());
    }

    #[test]
    fn rejects_blank_name_and_non_finite_kpi() {
        let mut draft = sample_draft();
        draft.profile.organization_name = "   ".to_string();
        assert!(draft.into_intake(Uuid::new_v4(), now()).is_err());

        let mut draft = sample_draft();
        draft.kpis.get_mut(Kpi::GrossMargin).value = f64::NAN;
        assert!(draft.into_intake(Uuid::new_v4(), now()).is_err());
    }

    #[test]
    fn out_of_range_kpis_are_accepted() {
        let mut draft = sample_draft();
        draft.kpis.gross_margin.value = 250.0;
        draft.kpis.revenue_growth.value = -30.0;
        assert!(draft.into_intake(Uuid::new_v4(), now()).is_ok());
    }

    #[test]
    fn update_replaces_only_given_sections() {
        let intake = sample_draft().into_intake(Uuid::new_v4(), now()).unwrap();
        let later = now() + chrono::Duration::hours(2);
        let update = IntakeUpdate {
            risks: Some(RiskSignals::uniform(3)),
            ..IntakeUpdate::default()
        };
        let merged = update.apply(&intake, later);
        assert_eq!(merged.risks, RiskSignals::uniform(3));
        assert_eq!(merged.kpis, intake.kpis);
        assert_eq!(merged.updated_at, later);
        assert_eq!(intake.risks, RiskSignals::uniform(1));
    }

    #[test]
    fn draft_parses_with_optional_sections_missing() {
        let json = serde_json::to_value(sample_draft()).unwrap();
        let mut object = json.as_object().unwrap().clone();
        object.remove("priorities");
        object.remove("constraints");
        let draft: IntakeDraft = serde_json::from_value(object.into()).unwrap();
        assert!(draft.priorities.is_empty());
        assert_eq!(draft.constraints, Constraints::default());
    }
}
