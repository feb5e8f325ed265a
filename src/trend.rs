use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{DiagnosticResult, TrendPoint};

pub const UNKNOWN_ORGANIZATION: &str = "Unknown organization";

/// Chart-ready history. A single result renders as a summary card rather
/// than a line.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendView {
    Summary(TrendPoint),
    Series(Vec<TrendPoint>),
}

impl TrendView {
    pub fn points(&self) -> &[TrendPoint] {
        match self {
            TrendView::Summary(point) => std::slice::from_ref(point),
            TrendView::Series(points) => points,
        }
    }
}

/// Projects results into a chronological series; `None` when there is
/// nothing to chart.
pub fn project_trend<'a, I>(results: I, names: &HashMap<Uuid, String>) -> Option<TrendView>
where
    I: IntoIterator<Item = &'a DiagnosticResult>,
{
    let mut ordered: Vec<&DiagnosticResult> = results.into_iter().collect();
    ordered.sort_by_key(|result| result.created_at);

    let mut points: Vec<TrendPoint> = ordered
        .into_iter()
        .map(|result| to_point(result, names))
        .collect();

    match points.len() {
        0 => None,
        1 => points.pop().map(TrendView::Summary),
        _ => Some(TrendView::Series(points)),
    }
}

fn to_point(result: &DiagnosticResult, names: &HashMap<Uuid, String>) -> TrendPoint {
    let scores = &result.scores;
    TrendPoint {
        date: result.created_at.format("%Y-%m-%d").to_string(),
        name: names
            .get(&result.intake_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ORGANIZATION.to_string()),
        overall: scores.overall_health,
        performance: scores.performance_score,
        threat: scores.threat_score,
        alignment: scores.alignment_score,
        readiness: scores.readiness_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiagnosticScores, Status, StatusIndicators};
    use chrono::{Duration, TimeZone, Utc};

    fn result(intake_id: Uuid, days: i64, overall: f64) -> DiagnosticResult {
        let green = Status::Green;
        DiagnosticResult {
            id: Uuid::new_v4(),
            intake_id,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::days(days),
            scores: DiagnosticScores {
                performance_score: 60.0,
                threat_score: 20.0,
                alignment_score: 55.0,
                readiness_score: 75.0,
                overall_health: overall,
            },
            status: StatusIndicators {
                performance: green,
                threat: green,
                alignment: green,
                readiness: green,
                overall: green,
            },
            insights: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn empty_history_has_no_view() {
        let results: Vec<DiagnosticResult> = Vec::new();
        assert_eq!(project_trend(&results, &HashMap::new()), None);
    }

    #[test]
    fn single_result_is_a_summary() {
        let id = Uuid::new_v4();
        let names = HashMap::from([(id, "Contoso".to_string())]);
        let results = [result(id, 0, 66.0)];
        match project_trend(&results, &names) {
            Some(TrendView::Summary(point)) => {
                assert_eq!(point.name, "Contoso");
                assert_eq!(point.date, "2026-01-01");
                assert_eq!(point.overall, 66.0);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn series_is_chronological() {
        let id = Uuid::new_v4();
        let names = HashMap::from([(id, "Contoso".to_string())]);
        let results = [
            result(id, 30, 71.0),
            result(id, 0, 52.0),
            result(Uuid::new_v4(), 14, 60.0),
        ];
        let view = project_trend(&results, &names).unwrap();
        assert!(matches!(view, TrendView::Series(_)));

        let points = view.points();
        assert_eq!(points.len(), 3);
        let dates: Vec<_> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-01-01", "2026-01-15", "2026-01-31"]);
        assert_eq!(points[1].name, UNKNOWN_ORGANIZATION);
        assert_eq!(points[2].overall, 71.0);
    }

    #[test]
    fn point_serializes_to_chart_shape() {
        let id = Uuid::new_v4();
        let names = HashMap::from([(id, "Contoso".to_string())]);
        let results = [result(id, 0, 66.0)];
        let view = project_trend(&results, &names).unwrap();
        let json = serde_json::to_value(&view.points()[0]).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["alignment", "date", "name", "overall", "performance", "readiness", "threat"]
        );
    }
}
