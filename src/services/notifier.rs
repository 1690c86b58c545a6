use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;
use tracing::warn;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::appointment::{Appointment, AppointmentReminder, AppointmentType, ReminderType};
use crate::models::customer::Customer;

/// Outbound reminder dispatch through the SignalWire LaML REST API.
/// Capability comes from the config: with credentials missing, every send
/// records a failed reminder row instead of silently dropping.
pub struct ReminderNotifier {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl ReminderNotifier {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.signalwire_configured()
    }

    /// Send one reminder for an appointment and persist the outcome as an
    /// appointment_reminders row — `sent` on success, `failed` with the
    /// error message otherwise.
    pub async fn send_reminder(
        &self,
        pool: &SqlitePool,
        appointment_id: i64,
        reminder_type: ReminderType,
    ) -> Result<AppointmentReminder, ApiError> {
        let appointment = sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = ?",
        )
        .bind(appointment_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))?;

        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(appointment.customer_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer not found"))?;

        let outcome = match reminder_type {
            ReminderType::Sms => {
                let body = sms_body(&customer.name, &appointment.kind, appointment.start_time);
                self.send_sms(&customer.phone, &body).await
            }
            ReminderType::Call => self.place_call(&customer.phone, appointment.id).await,
        };

        match outcome {
            Ok(()) => {
                let reminder =
                    record_outcome(pool, appointment.id, reminder_type, "sent", None).await?;
                Ok(reminder)
            }
            Err(e) => {
                warn!(
                    "reminder {} for appointment {} failed: {}",
                    reminder_type, appointment.id, e
                );
                record_outcome(pool, appointment.id, reminder_type, "failed", Some(&e.to_string()))
                    .await?;
                Err(ApiError::Provider(e.to_string()))
            }
        }
    }

    async fn send_sms(&self, to: &str, body: &str) -> anyhow::Result<()> {
        let (project, token, from, base) = self.credentials()?;

        let response = self
            .client
            .post(format!("{base}/Messages.json"))
            .basic_auth(&project, Some(&token))
            .form(&[("To", to), ("From", &from), ("Body", body)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("SMS send failed ({status}): {text}");
        }
        Ok(())
    }

    /// Place a voice call; the spoken content comes from the voice webhook
    /// the provider fetches once the call connects.
    async fn place_call(&self, to: &str, appointment_id: i64) -> anyhow::Result<()> {
        let (project, token, from, base) = self.credentials()?;
        let prompt_url = format!(
            "{}/api/reminders/{}/voice",
            self.config.app_base_url.trim_end_matches('/'),
            appointment_id
        );

        let response = self
            .client
            .post(format!("{base}/Calls.json"))
            .basic_auth(&project, Some(&token))
            .form(&[("To", to), ("From", &from), ("Url", &prompt_url)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Call placement failed ({status}): {text}");
        }
        Ok(())
    }

    fn credentials(&self) -> anyhow::Result<(String, String, String, String)> {
        let (Some(project), Some(token), Some(space), Some(from)) = (
            self.config.signalwire_project_id.clone(),
            self.config.signalwire_token.clone(),
            self.config.signalwire_space.clone(),
            self.config.signalwire_from_number.clone(),
        ) else {
            anyhow::bail!("SignalWire credentials not configured");
        };
        let base = format!(
            "https://{space}.signalwire.com/api/laml/2010-04-01/Accounts/{project}"
        );
        Ok((project, token, from, base))
    }

    #[cfg(test)]
    pub fn unconfigured_for_tests() -> Self {
        Self::new(Arc::new(Config {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "test".into(),
            jwt_expiry_seconds: 900,
            host: "127.0.0.1".into(),
            port: 0,
            app_base_url: "http://localhost:8080".into(),
            signalwire_project_id: None,
            signalwire_token: None,
            signalwire_space: None,
            signalwire_from_number: None,
        }))
    }
}

/// Reminder text with a humanized appointment time.
pub fn sms_body(customer_name: &str, kind: &str, start_time: NaiveDateTime) -> String {
    format!(
        "Hi {}, this is Zen Cable. A reminder that your {} appointment is scheduled for {}. Reply to this message if you need to reschedule.",
        customer_name,
        type_label(kind),
        humanize(start_time)
    )
}

pub fn type_label(kind: &str) -> String {
    kind.parse::<AppointmentType>()
        .map(|k| k.label().to_string())
        .unwrap_or_else(|_| kind.replace('_', " "))
}

pub fn humanize(t: NaiveDateTime) -> String {
    t.format("%A, %B %-d at %-I:%M %p").to_string()
}

/// Fired reminders for an appointment, newest first.
pub async fn list_reminders(
    pool: &SqlitePool,
    appointment_id: i64,
) -> Result<Vec<AppointmentReminder>, ApiError> {
    let reminders = sqlx::query_as::<_, AppointmentReminder>(
        "SELECT * FROM appointment_reminders
         WHERE appointment_id = ?
         ORDER BY sent_at DESC, id DESC",
    )
    .bind(appointment_id)
    .fetch_all(pool)
    .await?;
    Ok(reminders)
}

async fn record_outcome(
    pool: &SqlitePool,
    appointment_id: i64,
    reminder_type: ReminderType,
    status: &str,
    error_message: Option<&str>,
) -> Result<AppointmentReminder, ApiError> {
    let reminder = sqlx::query_as::<_, AppointmentReminder>(
        "INSERT INTO appointment_reminders (appointment_id, reminder_type, sent_at, status, error_message)
         VALUES (?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(appointment_id)
    .bind(reminder_type.to_string())
    .bind(Utc::now().naive_utc())
    .bind(status)
    .bind(error_message)
    .fetch_one(pool)
    .await?;
    Ok(reminder)
}
