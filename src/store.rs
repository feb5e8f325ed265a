use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DiagnosticError, Result};
use crate::insights::generate_insights;
use crate::intake::{validate_intake, IntakeDraft, IntakeUpdate};
use crate::models::{DiagnosticIntake, DiagnosticResult};
use crate::scoring::{compute_scores, status_indicators, validate_result};
use crate::tools::recommend_tools;
use crate::trend::{project_trend, TrendView};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    intakes: &'a [DiagnosticIntake],
    results: &'a [DiagnosticResult],
}

/// Records are kept as raw JSON until each one is checked individually.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    intakes: Vec<serde_json::Value>,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Runs scoring, insights and tool recommendations for one intake.
pub fn build_result(intake: &DiagnosticIntake, created_at: DateTime<Utc>) -> DiagnosticResult {
    let scores = compute_scores(intake);
    DiagnosticResult {
        id: Uuid::new_v4(),
        intake_id: intake.id,
        created_at,
        status: status_indicators(&scores),
        insights: generate_insights(intake, &scores),
        recommendations: recommend_tools(intake, &scores),
        scores,
    }
}

pub struct DiagnosticStore {
    intakes: Vec<DiagnosticIntake>,
    results: Vec<DiagnosticResult>,
    clock: Box<dyn Clock>,
}

impl Default for DiagnosticStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            intakes: Vec::new(),
            results: Vec::new(),
            clock: Box::new(clock),
        }
    }

    pub fn intakes(&self) -> &[DiagnosticIntake] {
        &self.intakes
    }

    pub fn results(&self) -> &[DiagnosticResult] {
        &self.results
    }

    pub fn intake(&self, id: Uuid) -> Result<&DiagnosticIntake> {
        self.intakes
            .iter()
            .find(|intake| intake.id == id)
            .ok_or(DiagnosticError::NotFound { kind: "intake", id })
    }

    pub fn results_for(&self, intake_id: Uuid) -> impl Iterator<Item = &DiagnosticResult> {
        self.results
            .iter()
            .filter(move |result| result.intake_id == intake_id)
    }

    /// Most recent result for an intake; later insertions win timestamp ties.
    pub fn latest_result(&self, intake_id: Uuid) -> Result<&DiagnosticResult> {
        self.results_for(intake_id)
            .max_by_key(|result| result.created_at)
            .ok_or(DiagnosticError::NotFound {
                kind: "result for intake",
                id: intake_id,
            })
    }

    pub fn names(&self) -> HashMap<Uuid, String> {
        self.intakes
            .iter()
            .map(|intake| (intake.id, intake.organization_name().to_string()))
            .collect()
    }

    /// Trend over one intake's history, or over every result when `None`.
    pub fn trend(&self, intake_id: Option<Uuid>) -> Option<TrendView> {
        let names = self.names();
        match intake_id {
            Some(id) => project_trend(self.results_for(id), &names),
            None => project_trend(&self.results, &names),
        }
    }

    pub fn create_intake(&mut self, draft: IntakeDraft) -> Result<&DiagnosticIntake> {
        let intake = draft.into_intake(Uuid::new_v4(), self.clock.now())?;
        info!(
            intake_id = %intake.id,
            organization = %intake.organization_name(),
            "intake created"
        );
        let index = self.intakes.len();
        self.intakes.push(intake);
        Ok(&self.intakes[index])
    }

    /// Applies `update` only if the intake is still open and the merged record
    /// validates; otherwise the stored intake is left exactly as it was.
    pub fn update_intake(&mut self, id: Uuid, update: &IntakeUpdate) -> Result<&DiagnosticIntake> {
        let index = self.index_of(id)?;
        let current = &self.intakes[index];
        if current.completed {
            warn!(intake_id = %id, "rejected update to completed intake");
            return Err(DiagnosticError::ImmutableRecord(id));
        }

        let merged = update.apply(current, self.clock.now());
        validate_intake(&merged)?;
        self.intakes[index] = merged;
        debug!(intake_id = %id, "intake updated");
        Ok(&self.intakes[index])
    }

    pub fn complete_intake(&mut self, id: Uuid) -> Result<&DiagnosticResult> {
        let index = self.index_of(id)?;
        if self.intakes[index].completed {
            return Err(DiagnosticError::ImmutableRecord(id));
        }

        let now = self.clock.now();
        let intake = &mut self.intakes[index];
        intake.completed = true;
        intake.updated_at = now;

        let result = build_result(intake, now);
        info!(
            intake_id = %id,
            result_id = %result.id,
            overall = result.scores.overall_health,
            "intake completed"
        );
        Ok(self.push_result(result))
    }

    /// Scores a completed intake again, appending a new result.
    pub fn rescore(&mut self, id: Uuid) -> Result<&DiagnosticResult> {
        let index = self.index_of(id)?;
        let intake = &self.intakes[index];
        if !intake.completed {
            return Err(DiagnosticError::Validation(format!(
                "intake {id} must be completed before it can be re-scored"
            )));
        }

        let result = build_result(intake, self.clock.now());
        info!(intake_id = %id, result_id = %result.id, "intake re-scored");
        Ok(self.push_result(result))
    }

    /// Removes the intake and every result derived from it. Returns how many
    /// results went with it.
    pub fn delete_intake(&mut self, id: Uuid) -> Result<usize> {
        let index = self.index_of(id)?;
        self.intakes.remove(index);

        let before = self.results.len();
        self.results.retain(|result| result.intake_id != id);
        let removed = before - self.results.len();
        info!(intake_id = %id, removed_results = removed, "intake deleted");
        Ok(removed)
    }

    fn index_of(&self, id: Uuid) -> Result<usize> {
        self.intakes
            .iter()
            .position(|intake| intake.id == id)
            .ok_or(DiagnosticError::NotFound { kind: "intake", id })
    }

    fn push_result(&mut self, result: DiagnosticResult) -> &DiagnosticResult {
        let index = self.results.len();
        self.results.push(result);
        &self.results[index]
    }

    /// Rebuilds a store from untrusted records. Anything that fails to parse,
    /// fails validation, repeats an id, or points at a missing or still-open
    /// intake is skipped with a warning.
    pub fn from_records(
        intakes: impl IntoIterator<Item = serde_json::Value>,
        results: impl IntoIterator<Item = serde_json::Value>,
    ) -> Self {
        let mut store = Self::new();
        let mut seen = HashSet::new();

        for (position, value) in intakes.into_iter().enumerate() {
            let intake: DiagnosticIntake = match serde_json::from_value(value) {
                Ok(intake) => intake,
                Err(err) => {
                    warn!(position, error = %err, "skipping malformed intake record");
                    continue;
                }
            };
            if let Err(err) = validate_intake(&intake) {
                warn!(intake_id = %intake.id, error = %err, "skipping invalid intake record");
                continue;
            }
            if !seen.insert(intake.id) {
                warn!(intake_id = %intake.id, "skipping duplicate intake record");
                continue;
            }
            store.intakes.push(intake);
        }

        let completed: HashSet<Uuid> = store
            .intakes
            .iter()
            .filter(|intake| intake.completed)
            .map(|intake| intake.id)
            .collect();

        for (position, value) in results.into_iter().enumerate() {
            let result: DiagnosticResult = match serde_json::from_value(value) {
                Ok(result) => result,
                Err(err) => {
                    warn!(position, error = %err, "skipping malformed result record");
                    continue;
                }
            };
            if let Err(err) = validate_result(&result) {
                warn!(result_id = %result.id, error = %err, "skipping invalid result record");
                continue;
            }
            if !completed.contains(&result.intake_id) {
                warn!(
                    result_id = %result.id,
                    intake_id = %result.intake_id,
                    "skipping result without a completed intake"
                );
                continue;
            }
            if !seen.insert(result.id) {
                warn!(result_id = %result.id, "skipping duplicate result record");
                continue;
            }
            store.results.push(result);
        }

        store
    }

    /// Loads a JSON snapshot; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(path)?;
        let raw: RawSnapshot = serde_json::from_str(&data)?;
        let store = Self::from_records(raw.intakes, raw.results);
        debug!(
            path = %path.display(),
            intakes = store.intakes.len(),
            results = store.results.len(),
            "snapshot loaded"
        );
        Ok(store)
    }

    /// Writes the snapshot through a tempfile so a crash never leaves a
    /// half-written file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = SnapshotRef {
            intakes: &self.intakes,
            results: &self.results,
        };
        let data = serde_json::to_vec_pretty(&snapshot)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::intake::tests::sample_draft;
    use crate::models::{PerformanceKpis, RiskSignals, Status};
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    /// Advances one hour on every call.
    pub(crate) struct StepClock {
        ticks: AtomicI64,
    }

    impl StepClock {
        pub(crate) fn new() -> Self {
            Self {
                ticks: AtomicI64::new(0),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap() + Duration::hours(tick)
        }
    }

    fn store() -> DiagnosticStore {
        DiagnosticStore::with_clock(StepClock::new())
    }

    #[test]
    fn create_assigns_identity_and_starts_open() {
        let mut store = store();
        let intake = store.create_intake(sample_draft()).unwrap();
        assert!(!intake.completed);
        assert_eq!(intake.created_at, intake.updated_at);
        let id = intake.id;
        assert_eq!(store.intake(id).unwrap().organization_name(), "Northwind Analytics");
        assert_eq!(store.intakes().len(), 1);
    }

    #[test]
    fn create_rejects_invalid_draft() {
        let mut store = store();
        let mut draft = sample_draft();
        draft.risks.financial.level = 7;
        let err = store.create_intake(draft).unwrap_err();
        assert!(matches!(err, DiagnosticError::Validation(_)));
        assert!(store.intakes().is_empty());
    }

    #[test]
    fn update_open_intake() {
        let mut store = store();
        let id = store.create_intake(sample_draft()).unwrap().id;
        let update = IntakeUpdate {
            kpis: Some(PerformanceKpis::uniform(40.0)),
            ..IntakeUpdate::default()
        };
        let updated = store.update_intake(id, &update).unwrap();
        assert_eq!(updated.kpis, PerformanceKpis::uniform(40.0));
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn invalid_update_leaves_record_unchanged() {
        let mut store = store();
        let id = store.create_intake(sample_draft()).unwrap().id;
        let before = store.intake(id).unwrap().clone();

        let update = IntakeUpdate {
            risks: Some(RiskSignals::uniform(9)),
            ..IntakeUpdate::default()
        };
        let err = store.update_intake(id, &update).unwrap_err();
        assert!(matches!(err, DiagnosticError::Validation(_)));
        assert_eq!(store.intake(id).unwrap(), &before);
    }

    #[test]
    fn completed_intake_is_immutable() {
        let mut store = store();
        let id = store.create_intake(sample_draft()).unwrap().id;
        store.complete_intake(id).unwrap();
        let before = store.intake(id).unwrap().clone();

        let update = IntakeUpdate {
            risks: Some(RiskSignals::uniform(5)),
            ..IntakeUpdate::default()
        };
        let err = store.update_intake(id, &update).unwrap_err();
        assert!(matches!(err, DiagnosticError::ImmutableRecord(rejected) if rejected == id));
        assert_eq!(store.intake(id).unwrap(), &before);

        let err = store.complete_intake(id).unwrap_err();
        assert!(matches!(err, DiagnosticError::ImmutableRecord(_)));
        assert_eq!(store.results().len(), 1);
    }

    #[test]
    fn completing_fixture_intake_is_green() {
        let mut store = store();
        let id = store.create_intake(sample_draft()).unwrap().id;
        let result = store.complete_intake(id).unwrap();
        assert_eq!(result.intake_id, id);
        assert!(result.scores.overall_health >= 70.0);
        assert_eq!(result.status.overall, Status::Green);
        assert!(store.intake(id).unwrap().completed);
    }

    #[test]
    fn rescore_appends_history_and_latest_wins() {
        let mut store = store();
        let id = store.create_intake(sample_draft()).unwrap().id;

        let err = store.rescore(id).unwrap_err();
        assert!(matches!(err, DiagnosticError::Validation(_)));

        let first = store.complete_intake(id).unwrap().id;
        let second = store.rescore(id).unwrap().id;
        assert_ne!(first, second);
        assert_eq!(store.results_for(id).count(), 2);
        assert_eq!(store.latest_result(id).unwrap().id, second);

        match store.trend(Some(id)) {
            Some(TrendView::Series(points)) => assert_eq!(points.len(), 2),
            other => panic!("expected a series, got {other:?}"),
        }
    }

    #[test]
    fn delete_cascades_to_results() {
        let mut store = store();
        let keep = store.create_intake(sample_draft()).unwrap().id;
        let gone = store.create_intake(sample_draft()).unwrap().id;
        store.complete_intake(keep).unwrap();
        store.complete_intake(gone).unwrap();
        store.rescore(gone).unwrap();

        assert_eq!(store.delete_intake(gone).unwrap(), 2);
        assert!(store.results().iter().all(|r| r.intake_id != gone));
        assert_eq!(store.results().len(), 1);
        assert!(matches!(
            store.intake(gone),
            Err(DiagnosticError::NotFound { .. })
        ));
        assert!(matches!(
            store.latest_result(gone),
            Err(DiagnosticError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut store = store();
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.complete_intake(missing),
            Err(DiagnosticError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_intake(missing),
            Err(DiagnosticError::NotFound { .. })
        ));
        assert!(matches!(
            store.update_intake(missing, &IntakeUpdate::default()),
            Err(DiagnosticError::NotFound { .. })
        ));
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/store.json");

        let mut store = store();
        let open = store.create_intake(sample_draft()).unwrap().id;
        let done = store.create_intake(sample_draft()).unwrap().id;
        store.complete_intake(done).unwrap();
        store.save(&path).unwrap();

        let loaded = DiagnosticStore::load(&path).unwrap();
        let ids = |s: &DiagnosticStore| s.intakes().iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(ids(&loaded), ids(&store));
        assert_eq!(loaded.results().len(), 1);
        assert_eq!(loaded.results()[0].id, store.results()[0].id);
        assert_eq!(loaded.results()[0].insights, store.results()[0].insights);
        assert_eq!(loaded.results()[0].status, store.results()[0].status);
        assert!(!loaded.intake(open).unwrap().completed);
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = DiagnosticStore::load(&dir.path().join("absent.json")).unwrap();
        assert!(store.intakes().is_empty());
        assert!(store.trend(None).is_none());
    }

    #[test]
    fn load_skips_malformed_records() {
        let mut source = store();
        let id = source.create_intake(sample_draft()).unwrap().id;
        source.complete_intake(id).unwrap();

        let good_intake = serde_json::to_value(&source.intakes()[0]).unwrap();
        let good_result = serde_json::to_value(&source.results()[0]).unwrap();

        let mut bad_risk = good_intake.clone();
        bad_risk["id"] = serde_json::json!(Uuid::new_v4());
        bad_risk["risks"]["market"]["level"] = serde_json::json!(11);

        let mut orphan = good_result.clone();
        orphan["id"] = serde_json::json!(Uuid::new_v4());
        orphan["intake_id"] = serde_json::json!(Uuid::new_v4());

        let mut out_of_range = good_result.clone();
        out_of_range["id"] = serde_json::json!(Uuid::new_v4());
        out_of_range["scores"]["overall_health"] = serde_json::json!(5000.0);
        out_of_range["scores"]["threat_score"] = serde_json::json!(-250.0);

        let mut wrong_status = good_result.clone();
        wrong_status["id"] = serde_json::json!(Uuid::new_v4());
        wrong_status["status"]["overall"] = serde_json::json!("red");

        let loaded = DiagnosticStore::from_records(
            vec![
                good_intake.clone(),
                serde_json::json!({ "id": "not-a-uuid" }),
                bad_risk,
                good_intake,
            ],
            vec![
                good_result,
                serde_json::json!(42),
                orphan,
                out_of_range,
                wrong_status,
            ],
        );
        assert_eq!(loaded.intakes().len(), 1);
        assert_eq!(loaded.results().len(), 1);
        assert_eq!(loaded.results()[0].intake_id, id);
    }
}
