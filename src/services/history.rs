use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::models::appointment::{AppointmentHistory, HistoryAction};

/// Append-only audit trail for appointment mutations. One row per
/// create/update/delete; rows are never updated or deleted, and they
/// survive deletion of the parent appointment.
pub struct HistoryService;

impl HistoryService {
    pub async fn record(
        pool: &SqlitePool,
        appointment_id: i64,
        action: HistoryAction,
        details: Value,
    ) -> Result<AppointmentHistory, ApiError> {
        let entry = sqlx::query_as::<_, AppointmentHistory>(
            "INSERT INTO appointment_history (appointment_id, action, details, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING *",
        )
        .bind(appointment_id)
        .bind(action.to_string())
        .bind(details.to_string())
        .bind(Utc::now().naive_utc())
        .fetch_one(pool)
        .await?;
        Ok(entry)
    }

    /// Newest first; id breaks same-second ties.
    pub async fn list(
        pool: &SqlitePool,
        appointment_id: i64,
    ) -> Result<Vec<AppointmentHistory>, ApiError> {
        let entries = sqlx::query_as::<_, AppointmentHistory>(
            "SELECT * FROM appointment_history
             WHERE appointment_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(appointment_id)
        .fetch_all(pool)
        .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util;
    use serde_json::json;

    #[tokio::test]
    async fn records_and_lists_newest_first() {
        let pool = test_util::pool().await;

        let first = HistoryService::record(&pool, 7, HistoryAction::Created, json!({"type": "repair"}))
            .await
            .unwrap();
        assert_eq!(first.action, "created");
        assert_eq!(first.appointment_id, 7);

        HistoryService::record(&pool, 7, HistoryAction::Updated, json!({"status": "completed"}))
            .await
            .unwrap();

        let entries = HistoryService::list(&pool, 7).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "updated");
        assert_eq!(entries[1].action, "created");

        // Other appointments are untouched.
        assert!(HistoryService::list(&pool, 8).await.unwrap().is_empty());
    }
}
