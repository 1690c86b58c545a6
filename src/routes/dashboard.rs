use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::auth::AuthenticatedCustomer,
    models::customer::CustomerProfile,
    services::{auth::AuthService, billing::BillingService, modem::ModemService},
    AppState,
};

/// GET /api/dashboard — account summary: profile, active services, modem,
/// latest bill.
pub async fn summary(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
) -> Result<Json<Value>, ApiError> {
    let customer = AuthService::get_customer(&state.db, caller.customer_id).await?;
    let services = BillingService::active_services(&state.db, caller.customer_id).await?;
    let billing = BillingService::latest_bill(&state.db, caller.customer_id).await?;
    let modem = match ModemService::get(&state.db, caller.customer_id).await {
        Ok(m) => Some(m),
        Err(ApiError::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    Ok(Json(json!({
        "customer": CustomerProfile::from(customer),
        "services": services,
        "modem": modem,
        "billing": billing,
    })))
}
