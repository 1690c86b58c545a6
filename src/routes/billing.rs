use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::auth::AuthenticatedCustomer,
    models::account::MakePaymentRequest,
    services::billing::BillingService,
    AppState,
};

/// GET /api/billing — latest bill, or null when the account has none.
pub async fn latest_bill(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
) -> Result<Json<Value>, ApiError> {
    let bill = BillingService::latest_bill(&state.db, caller.customer_id).await?;
    Ok(Json(json!({ "billing": bill })))
}

/// GET /api/payments
pub async fn list_payments(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
) -> Result<Json<Value>, ApiError> {
    let payments = BillingService::list_payments(&state.db, caller.customer_id).await?;
    Ok(Json(json!({ "payments": payments })))
}

/// POST /api/payments
pub async fn make_payment(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Json(body): Json<MakePaymentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let method = body.payment_method.as_deref().unwrap_or("card");
    let payment =
        BillingService::make_payment(&state.db, caller.customer_id, body.amount, method).await?;
    Ok((StatusCode::CREATED, Json(json!({ "payment": payment }))))
}
