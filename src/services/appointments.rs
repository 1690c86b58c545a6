use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Value};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::ApiError;
use crate::models::appointment::{
    Appointment, AppointmentPage, AppointmentStatus, AppointmentType, CreateAppointmentRequest,
    HistoryAction, ListAppointmentsQuery, Priority, SortField, SortOrder,
    UpdateAppointmentRequest,
};
use crate::services::history::HistoryService;
use crate::services::reminder_scheduler::ReminderScheduler;

const MAX_RANGE_DAYS: i64 = 365;
const MAX_PER_PAGE: i64 = 100;
const DEFAULT_PER_PAGE: i64 = 20;

/// Validated list filters, held as canonical enum strings.
#[derive(Debug, Default)]
struct ListFilters {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    status: Option<String>,
    kind: Option<String>,
    priority: Option<String>,
    technician: Option<String>,
}

pub struct AppointmentService;

impl AppointmentService {
    /// Filtered, sorted, paginated listing plus the unpaginated total.
    pub async fn list(
        pool: &SqlitePool,
        customer_id: i64,
        q: &ListAppointmentsQuery,
    ) -> Result<AppointmentPage, ApiError> {
        let page = q.page.unwrap_or(1);
        let per_page = q.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page < 1 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(ApiError::validation("per_page must be between 1 and 100"));
        }
        // page comes straight off the query string; an absurd value must
        // fail validation, not wrap into a negative OFFSET.
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| ApiError::validation("page is out of range"))?;

        let from = q.start_date.as_deref().map(parse_date).transpose()?;
        let to = q.end_date.as_deref().map(parse_date).transpose()?;
        if let (Some(f), Some(t)) = (from, to) {
            if t < f {
                return Err(ApiError::validation("end_date must not be before start_date"));
            }
            if (t - f).num_days() > MAX_RANGE_DAYS {
                return Err(ApiError::validation("date range cannot exceed 365 days"));
            }
        }

        let filters = ListFilters {
            from,
            to,
            status: q
                .status
                .as_deref()
                .map(|s| s.parse::<AppointmentStatus>().map(|v| v.to_string()))
                .transpose()
                .map_err(verr)?,
            kind: q
                .kind
                .as_deref()
                .map(|s| s.parse::<AppointmentType>().map(|v| v.to_string()))
                .transpose()
                .map_err(verr)?,
            priority: q
                .priority
                .as_deref()
                .map(|s| s.parse::<Priority>().map(|v| v.to_string()))
                .transpose()
                .map_err(verr)?,
            technician: q.technician.clone(),
        };

        let sort: SortField = q
            .sort_by
            .as_deref()
            .unwrap_or("start_time")
            .parse()
            .map_err(verr)?;
        let order: SortOrder = q.order.as_deref().unwrap_or("asc").parse().map_err(verr)?;

        let mut count_query = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM appointments a
             LEFT JOIN technicians t ON t.id = a.technician_id",
        );
        push_filters(&mut count_query, customer_id, &filters);
        let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut list_query = QueryBuilder::<Sqlite>::new(
            "SELECT a.* FROM appointments a
             LEFT JOIN technicians t ON t.id = a.technician_id",
        );
        push_filters(&mut list_query, customer_id, &filters);
        list_query
            .push(" ORDER BY a.")
            .push(sort.column())
            .push(" ")
            .push(order.sql());
        list_query
            .push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let appointments = list_query
            .build_query_as::<Appointment>()
            .fetch_all(pool)
            .await?;

        Ok(AppointmentPage {
            appointments,
            total,
            page,
            per_page,
        })
    }

    /// Book a visit: validates type/date, enforces one-per-day, assigns the
    /// fixed per-type window, records history, registers reminder jobs.
    pub async fn create(
        pool: &SqlitePool,
        customer_id: i64,
        req: &CreateAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        let kind: AppointmentType = req.kind.parse().map_err(verr)?;
        let priority = match req.priority.as_deref() {
            Some(p) => p.parse::<Priority>().map_err(verr)?,
            None => Priority::Medium,
        };

        let day = parse_date(&req.date)?;
        if day < Local::now().date_naive() {
            return Err(ApiError::validation(
                "Cannot schedule an appointment in the past",
            ));
        }
        if Self::has_same_day(pool, customer_id, day, None).await? {
            return Err(ApiError::validation(
                "You already have an appointment on this date",
            ));
        }

        let (window_start, window_end) = kind.window();
        let start_time = day.and_time(window_start);
        let end_time = day.and_time(window_end);
        let now = Utc::now().naive_utc();

        let appointment = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments
                (customer_id, technician_id, type, status, start_time, end_time,
                 notes, priority, location, created_at, updated_at)
             VALUES (?, ?, ?, 'scheduled', ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(customer_id)
        .bind(req.technician_id)
        .bind(kind.to_string())
        .bind(start_time)
        .bind(end_time)
        .bind(&req.notes)
        .bind(priority.to_string())
        .bind(&req.location)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        HistoryService::record(
            pool,
            appointment.id,
            HistoryAction::Created,
            json!({
                "type": appointment.kind,
                "status": appointment.status,
                "start_time": appointment.start_time,
                "end_time": appointment.end_time,
                "priority": appointment.priority,
                "notes": appointment.notes,
                "technician_id": appointment.technician_id,
                "location": appointment.location,
            }),
        )
        .await?;

        let jobs = ReminderScheduler::schedule_for_appointment(pool, &appointment).await?;
        tracing::debug!(
            "appointment {} created, {} reminder job(s) registered",
            appointment.id,
            jobs
        );

        Ok(appointment)
    }

    /// Partial update. A date change re-derives the window from the
    /// appointment's type and re-registers reminder jobs. The history entry
    /// captures only the fields present in the request.
    pub async fn update(
        pool: &SqlitePool,
        customer_id: i64,
        id: i64,
        req: &UpdateAppointmentRequest,
    ) -> Result<Appointment, ApiError> {
        let existing = Self::get_owned(pool, customer_id, id).await?;
        let mut details = serde_json::Map::new();

        let status = match req.status.as_deref() {
            Some(s) => {
                let status = s.parse::<AppointmentStatus>().map_err(verr)?.to_string();
                details.insert("status".into(), json!(status));
                Some(status)
            }
            None => None,
        };
        let priority = match req.priority.as_deref() {
            Some(p) => {
                let priority = p.parse::<Priority>().map_err(verr)?.to_string();
                details.insert("priority".into(), json!(priority));
                Some(priority)
            }
            None => None,
        };

        let new_window: Option<(NaiveDateTime, NaiveDateTime)> = match req.date.as_deref() {
            Some(d) => {
                let day = parse_date(d)?;
                if Self::has_same_day(pool, customer_id, day, Some(id)).await? {
                    return Err(ApiError::validation(
                        "You already have an appointment on this date",
                    ));
                }
                let kind: AppointmentType = existing.kind.parse().map_err(ApiError::Internal)?;
                let (ws, we) = kind.window();
                details.insert("date".into(), json!(day));
                Some((day.and_time(ws), day.and_time(we)))
            }
            None => None,
        };

        if let Some(notes) = &req.notes {
            details.insert("notes".into(), json!(notes));
        }
        if let Some(technician_id) = req.technician_id {
            details.insert("technician_id".into(), json!(technician_id));
        }
        if let Some(location) = &req.location {
            details.insert("location".into(), json!(location));
        }

        let updated = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET
                status        = COALESCE(?, status),
                priority      = COALESCE(?, priority),
                notes         = COALESCE(?, notes),
                technician_id = COALESCE(?, technician_id),
                location      = COALESCE(?, location),
                start_time    = COALESCE(?, start_time),
                end_time      = COALESCE(?, end_time),
                updated_at    = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(status)
        .bind(priority)
        .bind(&req.notes)
        .bind(req.technician_id)
        .bind(&req.location)
        .bind(new_window.map(|w| w.0))
        .bind(new_window.map(|w| w.1))
        .bind(Utc::now().naive_utc())
        .bind(id)
        .fetch_one(pool)
        .await?;

        HistoryService::record(pool, id, HistoryAction::Updated, Value::Object(details)).await?;

        // A terminal status means no reminders should fire. Otherwise a
        // date change re-registers jobs for the new slot, since stale jobs
        // would fire for the old one.
        if matches!(updated.status.as_str(), "cancelled" | "completed") {
            ReminderScheduler::cancel_for_appointment(pool, id).await?;
        } else if new_window.is_some() {
            ReminderScheduler::schedule_for_appointment(pool, &updated).await?;
        }

        Ok(updated)
    }

    /// Only future appointments can be deleted. The deleted history row is
    /// written before the row is removed and survives it.
    pub async fn delete(
        pool: &SqlitePool,
        customer_id: i64,
        id: i64,
        reason: Option<String>,
    ) -> Result<(), ApiError> {
        let appointment = Self::get_owned(pool, customer_id, id).await?;
        if appointment.start_time <= Local::now().naive_local() {
            return Err(ApiError::validation(
                "Cannot delete an appointment that has already started",
            ));
        }

        let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
        HistoryService::record(
            pool,
            id,
            HistoryAction::Deleted,
            json!({
                "reason": reason,
                "type": appointment.kind,
                "start_time": appointment.start_time,
            }),
        )
        .await?;

        ReminderScheduler::cancel_for_appointment(pool, id).await?;

        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Fetch by id scoped to the caller; 404 otherwise.
    pub async fn get_owned(
        pool: &SqlitePool,
        customer_id: i64,
        id: i64,
    ) -> Result<Appointment, ApiError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = ? AND customer_id = ?",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment not found"))
    }

    /// One-per-day invariant: only the calendar date of start_time counts.
    async fn has_same_day(
        pool: &SqlitePool,
        customer_id: i64,
        day: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM appointments
                WHERE customer_id = ? AND date(start_time) = ? AND id != ?
             )",
        )
        .bind(customer_id)
        .bind(day)
        .bind(exclude_id.unwrap_or(-1))
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, customer_id: i64, f: &ListFilters) {
    qb.push(" WHERE a.customer_id = ").push_bind(customer_id);
    if let Some(from) = f.from {
        qb.push(" AND date(a.start_time) >= ").push_bind(from);
    }
    if let Some(to) = f.to {
        qb.push(" AND date(a.start_time) <= ").push_bind(to);
    }
    if let Some(status) = &f.status {
        qb.push(" AND a.status = ").push_bind(status.clone());
    }
    if let Some(kind) = &f.kind {
        qb.push(" AND a.type = ").push_bind(kind.clone());
    }
    if let Some(priority) = &f.priority {
        qb.push(" AND a.priority = ").push_bind(priority.clone());
    }
    if let Some(technician) = &f.technician {
        qb.push(" AND t.name LIKE ").push_bind(format!("%{technician}%"));
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("Invalid date: {s}. Expected YYYY-MM-DD")))
}

fn verr(e: anyhow::Error) -> ApiError {
    ApiError::Validation(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_util;
    use chrono::{Duration, NaiveTime};

    fn create_req(kind: &str, date: &str) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            kind: kind.to_string(),
            date: date.to_string(),
            notes: None,
            priority: None,
            technician_id: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_window_and_history() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let appt = AppointmentService::create(&pool, customer, &create_req("installation", "2099-01-01"))
            .await
            .unwrap();
        assert_eq!(appt.status, "scheduled");
        assert_eq!(appt.priority, "medium");
        assert_eq!(appt.start_time.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(appt.end_time.time(), NaiveTime::from_hms_opt(11, 0, 0).unwrap());

        let history = HistoryService::list(&pool, appt.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, "created");
    }

    #[tokio::test]
    async fn modem_swap_gets_later_window() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let appt = AppointmentService::create(&pool, customer, &create_req("modem_swap", "2099-03-04"))
            .await
            .unwrap();
        assert_eq!(appt.start_time.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(appt.end_time.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn same_day_conflict_rejected_across_types() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        AppointmentService::create(&pool, customer, &create_req("installation", "2099-01-01"))
            .await
            .unwrap();

        // Any type on the same calendar date conflicts, even with a
        // different derived window.
        let err = AppointmentService::create(&pool, customer, &create_req("modem_swap", "2099-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // A different customer is free to book the same day.
        let other = test_util::seed_customer(&pool, "b@example.com").await;
        AppointmentService::create(&pool, other, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn past_date_rejected() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let yesterday = (Local::now().date_naive() - Duration::days(1)).to_string();
        let err = AppointmentService::create(&pool, customer, &create_req("repair", &yesterday))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_type_and_date_rejected() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        assert!(matches!(
            AppointmentService::create(&pool, customer, &create_req("exorcism", "2099-01-01")).await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            AppointmentService::create(&pool, customer, &create_req("repair", "01/01/2099")).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_invalid_status_leaves_record_untouched() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();

        let req = UpdateAppointmentRequest {
            status: Some("invalid_status".into()),
            ..Default::default()
        };
        let err = AppointmentService::update(&pool, customer, appt.id, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let unchanged = AppointmentService::get_owned(&pool, customer, appt.id)
            .await
            .unwrap();
        assert_eq!(unchanged.status, "scheduled");
        // No history row for the failed mutation.
        assert_eq!(HistoryService::list(&pool, appt.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_writes_history_with_only_supplied_fields() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();

        let req = UpdateAppointmentRequest {
            status: Some("completed".into()),
            notes: Some("all done".into()),
            ..Default::default()
        };
        let updated = AppointmentService::update(&pool, customer, appt.id, &req)
            .await
            .unwrap();
        assert_eq!(updated.status, "completed");
        assert_eq!(updated.notes.as_deref(), Some("all done"));

        let history = HistoryService::list(&pool, appt.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, "updated");
        let details: serde_json::Value =
            serde_json::from_str(history[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details["status"], "completed");
        assert_eq!(details["notes"], "all done");
        assert!(details.get("priority").is_none());
    }

    #[tokio::test]
    async fn update_date_collision_excludes_self() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();
        let second = AppointmentService::create(&pool, customer, &create_req("upgrade", "2099-02-01"))
            .await
            .unwrap();

        // Moving onto another appointment's day fails.
        let collide = UpdateAppointmentRequest {
            date: Some("2099-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::update(&pool, customer, second.id, &collide).await,
            Err(ApiError::Validation(_))
        ));

        // Re-submitting its own day is not a collision.
        let own_day = UpdateAppointmentRequest {
            date: Some("2099-02-01".into()),
            ..Default::default()
        };
        AppointmentService::update(&pool, customer, second.id, &own_day)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_of_foreign_appointment_is_not_found() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let other = test_util::seed_customer(&pool, "b@example.com").await;
        let appt = AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();

        let req = UpdateAppointmentRequest {
            notes: Some("sneaky".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::update(&pool, other, appt.id, &req).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_records_history_then_removes_row() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;
        let appt = AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-01"))
            .await
            .unwrap();

        AppointmentService::delete(&pool, customer, appt.id, None)
            .await
            .unwrap();

        assert!(matches!(
            AppointmentService::get_owned(&pool, customer, appt.id).await,
            Err(ApiError::NotFound(_))
        ));

        // History survives the parent row.
        let history = HistoryService::list(&pool, appt.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, "deleted");
        let details: serde_json::Value =
            serde_json::from_str(history[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details["reason"], "No reason provided");
    }

    #[tokio::test]
    async fn delete_of_elapsed_appointment_rejected() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        // Booked straight into the past; the API would never create this.
        let past = Local::now().naive_local() - Duration::hours(3);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO appointments (customer_id, type, status, start_time, end_time, created_at, updated_at)
             VALUES (?, 'repair', 'scheduled', ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(customer)
        .bind(past)
        .bind(past + Duration::hours(2))
        .bind(Utc::now().naive_utc())
        .bind(Utc::now().naive_utc())
        .fetch_one(&pool)
        .await
        .unwrap();

        let err = AppointmentService::delete(&pool, customer, id, Some("too late".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        // Row untouched, no deleted history row.
        AppointmentService::get_owned(&pool, customer, id).await.unwrap();
        assert!(HistoryService::list(&pool, id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_pagination_bounds() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let bad_page = ListAppointmentsQuery {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &bad_page).await,
            Err(ApiError::Validation(_))
        ));

        let bad_per_page = ListAppointmentsQuery {
            per_page: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &bad_per_page).await,
            Err(ApiError::Validation(_))
        ));

        let overflowing_page = ListAppointmentsQuery {
            page: Some(i64::MAX),
            per_page: Some(100),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &overflowing_page).await,
            Err(ApiError::Validation(_))
        ));

        let max_ok = ListAppointmentsQuery {
            page: Some(1),
            per_page: Some(100),
            ..Default::default()
        };
        AppointmentService::list(&pool, customer, &max_ok).await.unwrap();
    }

    #[tokio::test]
    async fn list_range_validation() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        let inverted = ListAppointmentsQuery {
            start_date: Some("2099-06-01".into()),
            end_date: Some("2099-01-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &inverted).await,
            Err(ApiError::Validation(_))
        ));

        let too_wide = ListAppointmentsQuery {
            start_date: Some("2099-01-01".into()),
            end_date: Some("2100-06-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &too_wide).await,
            Err(ApiError::Validation(_))
        ));

        let exact_year = ListAppointmentsQuery {
            start_date: Some("2099-01-01".into()),
            end_date: Some("2100-01-01".into()),
            ..Default::default()
        };
        AppointmentService::list(&pool, customer, &exact_year).await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_and_sorts() {
        let pool = test_util::pool().await;
        let customer = test_util::seed_customer(&pool, "a@example.com").await;

        AppointmentService::create(&pool, customer, &create_req("installation", "2099-01-01"))
            .await
            .unwrap();
        AppointmentService::create(&pool, customer, &create_req("repair", "2099-01-05"))
            .await
            .unwrap();
        AppointmentService::create(&pool, customer, &create_req("upgrade", "2099-01-03"))
            .await
            .unwrap();

        let by_type = ListAppointmentsQuery {
            kind: Some("repair".into()),
            ..Default::default()
        };
        let page = AppointmentService::list(&pool, customer, &by_type).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.appointments[0].kind, "repair");

        let newest_first = ListAppointmentsQuery {
            sort_by: Some("start_time".into()),
            order: Some("desc".into()),
            ..Default::default()
        };
        let page = AppointmentService::list(&pool, customer, &newest_first).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.appointments[0].start_time.date().to_string(), "2099-01-05");

        let bad_sort = ListAppointmentsQuery {
            sort_by: Some("created_at".into()),
            ..Default::default()
        };
        assert!(matches!(
            AppointmentService::list(&pool, customer, &bad_sort).await,
            Err(ApiError::Validation(_))
        ));
    }
}
