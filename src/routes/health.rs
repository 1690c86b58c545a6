use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET /health — liveness probe: SQLite reachability plus whether the
/// SignalWire sender is configured (informational, never degrades status).
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let notifications = if state.notifier.is_configured() {
        "configured"
    } else {
        "disabled"
    };

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "zencable-api",
                "db": "connected",
                "notifications": notifications,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "service": "zencable-api",
                "db": e.to_string(),
                "notifications": notifications,
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::test_util;
    use crate::services::notifier::ReminderNotifier;
    use std::sync::Arc;

    #[tokio::test]
    async fn reports_db_and_notification_state() {
        let config = Arc::new(Config {
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
        });
        let state = AppState {
            db: test_util::pool().await,
            config: config.clone(),
            notifier: Arc::new(ReminderNotifier::new(config)),
        };

        let (status, Json(body)) = health_check(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "zencable-api");
        assert_eq!(body["db"], "connected");
        assert_eq!(body["notifications"], "disabled");
    }
}
