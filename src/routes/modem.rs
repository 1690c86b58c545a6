use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::auth::AuthenticatedCustomer,
    models::account::SetModemStatusRequest,
    services::modem::ModemService,
    AppState,
};

/// GET /api/modem
pub async fn get_modem(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
) -> Result<Json<Value>, ApiError> {
    let modem = ModemService::get(&state.db, caller.customer_id).await?;
    Ok(Json(serde_json::to_value(modem).map_err(anyhow::Error::from)?))
}

/// POST /api/modem/status — `rebooting` starts the background sequence and
/// returns right away; other statuses are applied directly.
pub async fn set_status(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    Json(body): Json<SetModemStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    if body.status == "rebooting" {
        // Modem must exist before we hand the sequence to a worker.
        ModemService::get(&state.db, caller.customer_id).await?;
        drop(ModemService::start_reboot(state.db.clone(), caller.customer_id));
        return Ok(Json(json!({
            "message": "Reboot initiated. The modem will be back online shortly."
        })));
    }

    let modem = ModemService::set_status(&state.db, caller.customer_id, &body.status).await?;
    Ok(Json(serde_json::to_value(modem).map_err(anyhow::Error::from)?))
}
