use std::sync::Arc;

use chrono::{Duration, Local, Timelike};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::appointment::{Appointment, ReminderJob, ReminderType};
use crate::services::notifier::ReminderNotifier;

/// Lead times before the appointment window opens: an SMS the day before,
/// a voice call an hour out.
const LEADS: &[(ReminderType, i64)] = &[(ReminderType::Sms, 24), (ReminderType::Call, 1)];

/// Durable reminder scheduling. Jobs live in the reminder_jobs table, so
/// pending work survives a restart; a minute-boundary loop fires whatever
/// is due against the local clock.
pub struct ReminderScheduler;

impl ReminderScheduler {
    /// Register the T-24h and T-1h jobs for an appointment, dropping any
    /// jobs from an earlier slot first. Candidates already in the past are
    /// skipped outright — there is no catch-up firing.
    pub async fn schedule_for_appointment(
        pool: &SqlitePool,
        appointment: &Appointment,
    ) -> Result<u32, ApiError> {
        Self::cancel_for_appointment(pool, appointment.id).await?;

        let now = Local::now().naive_local();
        let mut registered = 0u32;

        for (reminder_type, lead_hours) in LEADS {
            let fire_at = appointment.start_time - Duration::hours(*lead_hours);
            if fire_at <= now {
                debug!(
                    "appointment {}: {} reminder at {} already past, skipping",
                    appointment.id, reminder_type, fire_at
                );
                continue;
            }

            sqlx::query(
                "INSERT INTO reminder_jobs (appointment_id, reminder_type, fire_at, status, created_at)
                 VALUES (?, ?, ?, 'pending', ?)",
            )
            .bind(appointment.id)
            .bind(reminder_type.to_string())
            .bind(fire_at)
            .bind(chrono::Utc::now().naive_utc())
            .execute(pool)
            .await?;
            registered += 1;
        }

        Ok(registered)
    }

    /// Flip an appointment's pending jobs to cancelled. Called on delete
    /// and before re-registering after a date change.
    pub async fn cancel_for_appointment(pool: &SqlitePool, appointment_id: i64) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE reminder_jobs SET status = 'cancelled'
             WHERE appointment_id = ? AND status = 'pending'",
        )
        .bind(appointment_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Startup reconciliation: cancel pending jobs whose appointment has
    /// already started or no longer exists. Jobs still ahead of their
    /// appointment fire on the next tick even if their fire time passed
    /// while the process was down.
    pub async fn reconcile_on_startup(pool: &SqlitePool) -> Result<u64, ApiError> {
        let result = sqlx::query(
            "UPDATE reminder_jobs SET status = 'cancelled'
             WHERE status = 'pending'
               AND appointment_id NOT IN (
                   SELECT id FROM appointments WHERE start_time > ?
               )",
        )
        .bind(Local::now().naive_local())
        .execute(pool)
        .await?;

        let cancelled = result.rows_affected();
        if cancelled > 0 {
            info!("reminder reconciliation: cancelled {} stale job(s)", cancelled);
        }
        Ok(cancelled)
    }

    /// Claim and fire every due pending job. Failures are logged and the
    /// notifier records the failed reminder row; there is no retry.
    pub async fn run_due_jobs(
        pool: &SqlitePool,
        notifier: &ReminderNotifier,
    ) -> Result<u32, ApiError> {
        let due: Vec<ReminderJob> = sqlx::query_as(
            "SELECT * FROM reminder_jobs
             WHERE status = 'pending' AND fire_at <= ?
             ORDER BY fire_at",
        )
        .bind(Local::now().naive_local())
        .fetch_all(pool)
        .await?;

        let mut fired = 0u32;
        for job in due {
            // Claim the job first so a concurrent loop never double-fires.
            let claimed = sqlx::query(
                "UPDATE reminder_jobs SET status = 'done' WHERE id = ? AND status = 'pending'",
            )
            .bind(job.id)
            .execute(pool)
            .await?;
            if claimed.rows_affected() == 0 {
                continue;
            }

            let reminder_type: ReminderType = match job.reminder_type.parse() {
                Ok(t) => t,
                Err(e) => {
                    warn!("reminder job {}: {}", job.id, e);
                    continue;
                }
            };

            match notifier
                .send_reminder(pool, job.appointment_id, reminder_type)
                .await
            {
                Ok(_) => {
                    fired += 1;
                    info!(
                        "reminder job {} fired ({} for appointment {})",
                        job.id, job.reminder_type, job.appointment_id
                    );
                }
                Err(e) => warn!(
                    "reminder job {} failed ({} for appointment {}): {}",
                    job.id, job.reminder_type, job.appointment_id, e
                ),
            }
        }
        Ok(fired)
    }

    /// Spawn the recurring check: wake at each minute boundary and fire
    /// whatever is due.
    pub fn start(pool: SqlitePool, notifier: Arc<ReminderNotifier>) {
        tokio::spawn(async move {
            loop {
                let secs_past = Local::now().second() as u64;
                let sleep_secs = if secs_past == 0 { 60 } else { 60 - secs_past };
                tokio::time::sleep(tokio::time::Duration::from_secs(sleep_secs)).await;

                if let Err(e) = Self::run_due_jobs(&pool, &notifier).await {
                    warn!("reminder scheduler tick failed: {}", e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util;
    use crate::models::appointment::CreateAppointmentRequest;
    use crate::services::appointments::AppointmentService;
    use chrono::Utc;

    async fn pending_jobs(pool: &SqlitePool, appointment_id: i64) -> Vec<ReminderJob> {
        sqlx::query_as(
            "SELECT * FROM reminder_jobs WHERE appointment_id = ? AND status = 'pending' ORDER BY fire_at",
        )
        .bind(appointment_id)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    /// Insert an appointment row starting `hours` from now, bypassing the
    /// date-only create API.
    async fn appointment_in_hours(pool: &SqlitePool, customer_id: i64, hours: i64) -> Appointment {
        let start = Local::now().naive_local() + Duration::hours(hours);
        sqlx::query_as(
            "INSERT INTO appointments (customer_id, type, status, start_time, end_time, created_at, updated_at)
             VALUES (?, 'repair', 'scheduled', ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(customer_id)
        .bind(start)
        .bind(start + Duration::hours(2))
        .bind(Utc::now().naive_utc())
        .bind(Utc::now().naive_utc())
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn near_appointment_registers_no_jobs() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = appointment_in_hours(&pool, customer, 2).await;

        // Both the T-24h and T-1h candidates are already in the past.
        let registered = ReminderScheduler::schedule_for_appointment(&pool, &appt)
            .await
            .unwrap();
        assert_eq!(registered, 0);
        assert!(pending_jobs(&pool, appt.id).await.is_empty());
    }

    #[tokio::test]
    async fn within_24h_registers_call_only() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = appointment_in_hours(&pool, customer, 3).await;

        let registered = ReminderScheduler::schedule_for_appointment(&pool, &appt)
            .await
            .unwrap();
        assert_eq!(registered, 1);
        let jobs = pending_jobs(&pool, appt.id).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].reminder_type, "call");
        assert_eq!(jobs[0].fire_at, appt.start_time - Duration::hours(1));
    }

    #[tokio::test]
    async fn far_appointment_registers_sms_and_call() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = appointment_in_hours(&pool, customer, 24 * 30).await;

        let registered = ReminderScheduler::schedule_for_appointment(&pool, &appt)
            .await
            .unwrap();
        assert_eq!(registered, 2);
        let jobs = pending_jobs(&pool, appt.id).await;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].reminder_type, "sms");
        assert_eq!(jobs[0].fire_at, appt.start_time - Duration::hours(24));
        assert_eq!(jobs[1].reminder_type, "call");
        assert_eq!(jobs[1].fire_at, appt.start_time - Duration::hours(1));
    }

    #[tokio::test]
    async fn reschedule_cancels_previous_jobs() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = appointment_in_hours(&pool, customer, 24 * 30).await;

        ReminderScheduler::schedule_for_appointment(&pool, &appt).await.unwrap();
        ReminderScheduler::schedule_for_appointment(&pool, &appt).await.unwrap();

        // Re-registration never stacks pending jobs.
        assert_eq!(pending_jobs(&pool, appt.id).await.len(), 2);
        let cancelled: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reminder_jobs WHERE appointment_id = ? AND status = 'cancelled'",
        )
        .bind(appt.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(cancelled, 2);
    }

    #[tokio::test]
    async fn delete_via_service_cancels_jobs() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let req = CreateAppointmentRequest {
            kind: "installation".into(),
            date: "2099-01-01".into(),
            notes: None,
            priority: None,
            technician_id: None,
            location: None,
        };
        let appt = AppointmentService::create(&pool, customer, &req).await.unwrap();
        assert_eq!(pending_jobs(&pool, appt.id).await.len(), 2);

        AppointmentService::delete(&pool, customer, appt.id, None).await.unwrap();
        assert!(pending_jobs(&pool, appt.id).await.is_empty());
    }

    #[tokio::test]
    async fn cancelling_status_update_cancels_jobs() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let req = CreateAppointmentRequest {
            kind: "repair".into(),
            date: "2099-05-01".into(),
            notes: None,
            priority: None,
            technician_id: None,
            location: None,
        };
        let appt = AppointmentService::create(&pool, customer, &req).await.unwrap();
        assert_eq!(pending_jobs(&pool, appt.id).await.len(), 2);

        // A date change while still scheduled keeps jobs registered.
        let moved = crate::models::appointment::UpdateAppointmentRequest {
            date: Some("2099-05-02".into()),
            ..Default::default()
        };
        AppointmentService::update(&pool, customer, appt.id, &moved).await.unwrap();
        assert_eq!(pending_jobs(&pool, appt.id).await.len(), 2);

        // Cancelling the appointment by status must silence them.
        let cancelled = crate::models::appointment::UpdateAppointmentRequest {
            status: Some("cancelled".into()),
            ..Default::default()
        };
        AppointmentService::update(&pool, customer, appt.id, &cancelled).await.unwrap();
        assert!(pending_jobs(&pool, appt.id).await.is_empty());
    }

    #[tokio::test]
    async fn reconcile_cancels_jobs_for_started_and_missing_appointments() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let future = appointment_in_hours(&pool, customer, 24 * 30).await;
        ReminderScheduler::schedule_for_appointment(&pool, &future).await.unwrap();

        // A job pointing at an appointment that already started, and one
        // whose appointment is gone entirely.
        let started = appointment_in_hours(&pool, customer, -2).await;
        for (appt_id, fire_at) in [
            (started.id, started.start_time - Duration::hours(1)),
            (9999, Local::now().naive_local() - Duration::hours(1)),
        ] {
            sqlx::query(
                "INSERT INTO reminder_jobs (appointment_id, reminder_type, fire_at, status, created_at)
                 VALUES (?, 'call', ?, 'pending', ?)",
            )
            .bind(appt_id)
            .bind(fire_at)
            .bind(Utc::now().naive_utc())
            .execute(&pool)
            .await
            .unwrap();
        }

        let cancelled = ReminderScheduler::reconcile_on_startup(&pool).await.unwrap();
        assert_eq!(cancelled, 2);
        // The healthy future jobs are untouched.
        assert_eq!(pending_jobs(&pool, future.id).await.len(), 2);
    }

    #[tokio::test]
    async fn due_job_with_unconfigured_provider_completes_and_records_failure() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = appointment_in_hours(&pool, customer, 5).await;

        sqlx::query(
            "INSERT INTO reminder_jobs (appointment_id, reminder_type, fire_at, status, created_at)
             VALUES (?, 'sms', ?, 'pending', ?)",
        )
        .bind(appt.id)
        .bind(Local::now().naive_local() - Duration::minutes(1))
        .bind(Utc::now().naive_utc())
        .execute(&pool)
        .await
        .unwrap();

        let notifier = ReminderNotifier::unconfigured_for_tests();
        let fired = ReminderScheduler::run_due_jobs(&pool, &notifier).await.unwrap();
        assert_eq!(fired, 0);

        // Job is consumed even though the send failed — no retry loop.
        let status: String = sqlx::query_scalar(
            "SELECT status FROM reminder_jobs WHERE appointment_id = ?",
        )
        .bind(appt.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(status, "done");

        // The failed attempt is persisted as a reminder row.
        let (reminder_status, error): (String, Option<String>) = sqlx::query_as(
            "SELECT status, error_message FROM appointment_reminders WHERE appointment_id = ?",
        )
        .bind(appt.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(reminder_status, "failed");
        assert!(error.is_some());
    }
}
