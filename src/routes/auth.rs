use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    middleware::auth::{create_access_token, AuthenticatedCustomer, JwtSecret},
    models::customer::{
        CustomerProfile, ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest,
    },
    services::auth::AuthService,
    AppState,
};

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(secret): Extension<JwtSecret>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let customer = AuthService::login(&state.db, &body.email, &body.password).await?;
    let access_token =
        create_access_token(customer.id, &secret.0, state.config.jwt_expiry_seconds)?;

    Ok(Json(LoginResponse {
        access_token,
        customer: customer.into(),
    }))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
) -> Result<Json<CustomerProfile>, ApiError> {
    let customer = AuthService::get_customer(&state.db, caller.customer_id).await?;
    Ok(Json(customer.into()))
}

/// POST /auth/forgot-password — same response whether or not the email
/// exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    AuthService::start_password_reset(&state.db, &body.email).await?;
    Ok(Json(json!({
        "message": "If that email is on file, password reset instructions have been sent."
    })))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    AuthService::reset_password(&state.db, &body.token, &body.new_password).await?;
    Ok(Json(json!({ "message": "Password updated. You can now log in." })))
}
