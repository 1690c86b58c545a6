use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::account::{Billing, Payment, Service};

pub struct BillingService;

impl BillingService {
    /// Most recent bill by due date, if any.
    pub async fn latest_bill(
        pool: &SqlitePool,
        customer_id: i64,
    ) -> Result<Option<Billing>, ApiError> {
        let bill = sqlx::query_as::<_, Billing>(
            "SELECT * FROM billing WHERE customer_id = ? ORDER BY due_date DESC LIMIT 1",
        )
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
        Ok(bill)
    }

    pub async fn list_payments(
        pool: &SqlitePool,
        customer_id: i64,
    ) -> Result<Vec<Payment>, ApiError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE customer_id = ? ORDER BY payment_date DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
        Ok(payments)
    }

    /// Record a payment as pending with a fresh transaction id. Settlement
    /// happens out of band.
    pub async fn make_payment(
        pool: &SqlitePool,
        customer_id: i64,
        amount: f64,
        payment_method: &str,
    ) -> Result<Payment, ApiError> {
        if !(amount > 0.0) {
            return Err(ApiError::validation("Payment amount must be positive"));
        }

        let payment = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments
                (customer_id, amount, payment_date, payment_method, status, transaction_id)
             VALUES (?, ?, ?, ?, 'pending', ?)
             RETURNING *",
        )
        .bind(customer_id)
        .bind(amount)
        .bind(Utc::now().naive_utc())
        .bind(payment_method)
        .bind(Uuid::new_v4().simple().to_string())
        .fetch_one(pool)
        .await?;
        Ok(payment)
    }

    /// Active subscriptions for the dashboard.
    pub async fn active_services(
        pool: &SqlitePool,
        customer_id: i64,
    ) -> Result<Vec<Service>, ApiError> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT s.* FROM services s
             JOIN customer_services cs ON cs.service_id = s.id
             WHERE cs.customer_id = ? AND cs.status = 'active'",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
        Ok(services)
    }
}
