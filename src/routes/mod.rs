pub mod appointments;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod health;
pub mod modem;
pub mod reminders;
pub mod swaig;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::JwtSecret;
use crate::AppState;

/// Build the full application router with CORS, tracing, and the shared
/// JWT secret attached.
pub fn router(state: AppState) -> Router {
    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    Router::new()
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        // Account
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/modem", get(modem::get_modem))
        .route("/api/modem/status", post(modem::set_status))
        .route("/api/billing", get(billing::latest_bill))
        .route("/api/payments", get(billing::list_payments).post(billing::make_payment))
        // Appointments
        .route("/api/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/api/appointments/{id}",
            put(appointments::update).delete(appointments::delete),
        )
        .route("/api/appointments/{id}/history", get(appointments::history))
        .route("/api/appointments/{id}/reminders", get(appointments::reminders))
        .route("/api/appointments/{id}/remind", post(appointments::trigger_reminder))
        // Telephony callbacks
        .route(
            "/api/reminders/{appointment_id}/voice",
            get(reminders::voice_prompt).post(reminders::voice_prompt),
        )
        // Voice assistant
        .route("/swaig", post(swaig::dispatch))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.app_base_url))
        .with_state(state)
}

// Allow the configured frontend origin plus localhost for development.
fn cors_layer(app_base_url: &str) -> CorsLayer {
    let base = app_base_url.to_string();
    let origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        o == base
    });

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(origin)
}
