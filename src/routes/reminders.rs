use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    models::appointment::Appointment,
    services::notifier::{humanize, type_label},
    AppState,
};

/// GET|POST /api/reminders/{appointment_id}/voice
///
/// LaML document the telephony provider fetches when a reminder call
/// connects. Unauthenticated: the provider is the caller, and the URL was
/// minted by us when the call was placed.
pub async fn voice_prompt(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
) -> impl IntoResponse {
    let text = spoken_text(&state.db, appointment_id).await;
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Say voice=\"alice\">{}</Say></Response>",
        escape_xml(&text)
    );
    ([(header::CONTENT_TYPE, "application/xml")], xml)
}

async fn spoken_text(pool: &SqlitePool, appointment_id: i64) -> String {
    let appointment: Option<Appointment> =
        sqlx::query_as("SELECT * FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .fetch_optional(pool)
            .await
            .ok()
            .flatten();

    let Some(appointment) = appointment else {
        return "Hello, this is Zen Cable. We could not find the appointment for this \
                reminder. Please call customer service if you have questions. Goodbye."
            .to_string();
    };

    let name: Option<String> = sqlx::query_scalar("SELECT name FROM customers WHERE id = ?")
        .bind(appointment.customer_id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten();

    format!(
        "Hello {}, this is Zen Cable calling to remind you of your {} appointment on {}. \
         A technician will arrive during your scheduled window. Goodbye.",
        name.unwrap_or_else(|| "there".to_string()),
        type_label(&appointment.kind),
        humanize(appointment.start_time),
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("Tom & Co <cable>"), "Tom &amp; Co &lt;cable&gt;");
        assert_eq!(escape_xml("plain"), "plain");
    }
}
