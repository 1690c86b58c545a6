use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::models::account::{Modem, MODEM_STATUSES};
use crate::services::tasks;

/// Reboot sequence length. The HTTP response returns immediately; the
/// sequence runs as a tracked background task.
const REBOOT_SECONDS: u64 = 30;

pub struct ModemService;

impl ModemService {
    pub async fn get(pool: &SqlitePool, customer_id: i64) -> Result<Modem, ApiError> {
        sqlx::query_as::<_, Modem>("SELECT * FROM modems WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found("No modem found for this account"))
    }

    pub async fn set_status(
        pool: &SqlitePool,
        customer_id: i64,
        status: &str,
    ) -> Result<Modem, ApiError> {
        if !MODEM_STATUSES.contains(&status) {
            return Err(ApiError::validation(format!(
                "Invalid status: {status}. Valid statuses: online, offline, rebooting"
            )));
        }

        let modem = sqlx::query_as::<_, Modem>(
            "UPDATE modems SET status = ?, last_seen = ? WHERE customer_id = ? RETURNING *",
        )
        .bind(status)
        .bind(Utc::now().naive_utc())
        .bind(customer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("No modem found for this account"))?;
        Ok(modem)
    }

    /// Kick off the reboot sequence: rebooting now, back online after the
    /// simulated delay. The receiver may be awaited or dropped.
    pub fn start_reboot(
        pool: SqlitePool,
        customer_id: i64,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        Self::start_reboot_with_delay(pool, customer_id, std::time::Duration::from_secs(REBOOT_SECONDS))
    }

    pub fn start_reboot_with_delay(
        pool: SqlitePool,
        customer_id: i64,
        delay: std::time::Duration,
    ) -> oneshot::Receiver<anyhow::Result<()>> {
        tasks::submit("modem-reboot", async move {
            Self::set_status(&pool, customer_id, "rebooting").await?;
            tokio::time::sleep(delay).await;
            Self::set_status(&pool, customer_id, "online").await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util;

    async fn seed_modem(pool: &SqlitePool, customer_id: i64) {
        sqlx::query(
            "INSERT INTO modems (customer_id, mac_address, model, status)
             VALUES (?, '00:11:22:33:44:55', 'DOCSIS 3.1', 'online')",
        )
        .bind(customer_id)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn set_status_validates_enum() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        seed_modem(&pool, customer).await;

        assert!(matches!(
            ModemService::set_status(&pool, customer, "smouldering").await,
            Err(ApiError::Validation(_))
        ));
        let modem = ModemService::set_status(&pool, customer, "offline").await.unwrap();
        assert_eq!(modem.status, "offline");
        assert!(modem.last_seen.is_some());
    }

    #[tokio::test]
    async fn missing_modem_is_not_found() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        assert!(matches!(
            ModemService::get(&pool, customer).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reboot_sequence_ends_online() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        seed_modem(&pool, customer).await;

        let rx = ModemService::start_reboot_with_delay(
            pool.clone(),
            customer,
            std::time::Duration::from_millis(10),
        );
        rx.await.unwrap().unwrap();

        let modem = ModemService::get(&pool, customer).await.unwrap();
        assert_eq!(modem.status, "online");
    }
}
