use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::ApiError;
use crate::models::customer::{Customer, PasswordReset};

const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub struct AuthService;

impl AuthService {
    /// Verify credentials and return the customer. Wrong email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<Customer, ApiError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        let Some(customer) = customer else {
            return Err(ApiError::validation("Invalid email or password"));
        };

        let valid = bcrypt::verify(password, &customer.password_hash)
            .map_err(|e| ApiError::Internal(e.into()))?;
        if !valid {
            return Err(ApiError::validation("Invalid email or password"));
        }
        Ok(customer)
    }

    pub async fn get_customer(pool: &SqlitePool, customer_id: i64) -> Result<Customer, ApiError> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer not found"))
    }

    /// Create a one-hour reset token when the email exists. Returns nothing
    /// either way so the route's response never leaks account existence.
    pub async fn start_password_reset(pool: &SqlitePool, email: &str) -> Result<(), ApiError> {
        let customer_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM customers WHERE email = ?")
                .bind(email)
                .fetch_optional(pool)
                .await?;

        let Some(customer_id) = customer_id else {
            return Ok(());
        };

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        sqlx::query(
            "INSERT INTO password_resets (customer_id, token, expiry, used, created_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(customer_id)
        .bind(&token)
        .bind(Utc::now().naive_utc() + Duration::hours(RESET_TOKEN_TTL_HOURS))
        .bind(Utc::now().naive_utc())
        .execute(pool)
        .await?;

        // No outbound email channel; delivery is an operator concern.
        info!("password reset token issued for customer {}", customer_id);
        Ok(())
    }

    pub async fn reset_password(
        pool: &SqlitePool,
        token: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let reset = sqlx::query_as::<_, PasswordReset>(
            "SELECT * FROM password_resets WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        let Some(reset) = reset else {
            return Err(ApiError::validation("Invalid or expired reset token"));
        };
        if reset.used || reset.expiry < Utc::now().naive_utc() {
            return Err(ApiError::validation("Invalid or expired reset token"));
        }

        let hash = hash_password(new_password)?;
        sqlx::query("UPDATE customers SET password_hash = ? WHERE id = ?")
            .bind(&hash)
            .bind(reset.customer_id)
            .execute(pool)
            .await?;
        sqlx::query("UPDATE password_resets SET used = 1 WHERE id = ?")
            .bind(reset.id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| ApiError::Internal(e.into()))
}
