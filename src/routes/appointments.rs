use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::auth::AuthenticatedCustomer,
    models::appointment::{
        CreateAppointmentRequest, DeleteAppointmentRequest, ListAppointmentsQuery,
        TriggerReminderRequest, UpdateAppointmentRequest,
    },
    services::{
        appointments::AppointmentService, history::HistoryService, notifier,
    },
    AppState,
};

/// GET /api/appointments
pub async fn list(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Value>, ApiError> {
    let page = AppointmentService::list(&state.db, caller.customer_id, &query).await?;

    let include_history = query.include_history.unwrap_or(false);
    let include_reminders = query.include_reminders.unwrap_or(false);

    let mut items = Vec::with_capacity(page.appointments.len());
    for appointment in &page.appointments {
        let mut item = serde_json::to_value(appointment).map_err(anyhow::Error::from)?;
        if include_history {
            let history = HistoryService::list(&state.db, appointment.id).await?;
            item["history"] = serde_json::to_value(history).map_err(anyhow::Error::from)?;
        }
        if include_reminders {
            let reminders = notifier::list_reminders(&state.db, appointment.id).await?;
            item["reminders"] = serde_json::to_value(reminders).map_err(anyhow::Error::from)?;
        }
        items.push(item);
    }

    Ok(Json(json!({
        "appointments": items,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
    })))
}

/// POST /api/appointments
pub async fn create(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let appointment = AppointmentService::create(&state.db, caller.customer_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "appointment": appointment })),
    ))
}

/// PUT /api/appointments/{id}
pub async fn update(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, ApiError> {
    let appointment =
        AppointmentService::update(&state.db, caller.customer_id, id, &body).await?;
    Ok(Json(json!({ "appointment": appointment })))
}

/// DELETE /api/appointments/{id} — body optional, may carry a reason.
pub async fn delete(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Path(id): Path<i64>,
    body: Option<Json<DeleteAppointmentRequest>>,
) -> Result<StatusCode, ApiError> {
    let reason = body.and_then(|Json(b)| b.reason);
    AppointmentService::delete(&state.db, caller.customer_id, id, reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/appointments/{id}/history
pub async fn history(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    AppointmentService::get_owned(&state.db, caller.customer_id, id).await?;
    let entries = HistoryService::list(&state.db, id).await?;
    Ok(Json(json!({ "history": entries })))
}

/// GET /api/appointments/{id}/reminders
pub async fn reminders(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    AppointmentService::get_owned(&state.db, caller.customer_id, id).await?;
    let entries = notifier::list_reminders(&state.db, id).await?;
    Ok(Json(json!({ "reminders": entries })))
}

/// POST /api/appointments/{id}/remind — synchronous send of a single
/// reminder over the requested channel.
pub async fn trigger_reminder(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Path(id): Path<i64>,
    Json(body): Json<TriggerReminderRequest>,
) -> Result<Json<Value>, ApiError> {
    let reminder_type = body
        .reminder_type
        .parse()
        .map_err(|e: anyhow::Error| ApiError::Validation(e.to_string()))?;

    AppointmentService::get_owned(&state.db, caller.customer_id, id).await?;
    let reminder = state
        .notifier
        .send_reminder(&state.db, id, reminder_type)
        .await?;

    Ok(Json(json!({
        "message": "Reminder sent",
        "reminder": reminder,
    })))
}
