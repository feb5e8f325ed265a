use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{info, warn};

use crate::store::DiagnosticStore;

const KIND_INTAKE: &str = "intake";
const KIND_RESULT: &str = "result";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Replaces the remote copy with the local snapshot in one transaction.
pub async fn push(pool: &PgPool, store: &DiagnosticStore) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM ambisight.records")
        .execute(&mut *tx)
        .await?;

    let mut written = 0usize;
    for (position, intake) in store.intakes().iter().enumerate() {
        let payload = serde_json::to_value(intake)?;
        insert_record(
            &mut tx,
            &format!("{KIND_INTAKE}:{}", intake.id),
            KIND_INTAKE,
            position,
            payload,
            intake.updated_at,
        )
        .await?;
        written += 1;
    }

    for (position, result) in store.results().iter().enumerate() {
        let payload = serde_json::to_value(result)?;
        insert_record(
            &mut tx,
            &format!("{KIND_RESULT}:{}", result.id),
            KIND_RESULT,
            position,
            payload,
            result.created_at,
        )
        .await?;
        written += 1;
    }

    tx.commit().await.context("failed to commit snapshot push")?;
    info!(records = written, "snapshot pushed to Postgres");
    Ok(written)
}

async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    key: &str,
    kind: &str,
    position: usize,
    payload: serde_json::Value,
    updated_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let position = i32::try_from(position).context("snapshot too large to mirror")?;
    sqlx::query(
        r#"
        INSERT INTO ambisight.records (key, kind, position, payload, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(key)
    .bind(kind)
    .bind(position)
    .bind(Json(payload))
    .bind(updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Rebuilds a store from the remote copy. Rows that cannot be decoded are
/// skipped, and the store applies its own record checks on top.
pub async fn pull(pool: &PgPool) -> anyhow::Result<DiagnosticStore> {
    let rows = sqlx::query(
        "SELECT key, kind, payload FROM ambisight.records ORDER BY kind, position",
    )
    .fetch_all(pool)
    .await?;

    let mut intakes = Vec::new();
    let mut results = Vec::new();

    for row in rows {
        let key: String = row.get("key");
        let kind: String = row.get("kind");
        let payload: Json<serde_json::Value> = match row.try_get("payload") {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key = %key, error = %err, "skipping undecodable record");
                continue;
            }
        };

        match kind.as_str() {
            KIND_INTAKE => intakes.push(payload.0),
            KIND_RESULT => results.push(payload.0),
            other => warn!(key = %key, kind = other, "skipping record of unknown kind"),
        }
    }

    let store = DiagnosticStore::from_records(intakes, results);
    info!(
        intakes = store.intakes().len(),
        results = store.results().len(),
        "snapshot pulled from Postgres"
    );
    Ok(store)
}
