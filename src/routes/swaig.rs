use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    error::ApiError,
    models::appointment::CreateAppointmentRequest,
    models::customer::Customer,
    services::{
        appointments::AppointmentService, billing::BillingService, modem::ModemService,
    },
    AppState,
};

/// Function-call payload from the conversational-AI platform.
#[derive(Debug, Deserialize)]
pub struct SwaigRequest {
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Natural-language reply plus the optional side-channel action list.
#[derive(Debug, Serialize)]
pub struct SwaigResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Vec<Value>>,
}

fn say(text: impl Into<String>) -> Json<SwaigResponse> {
    Json(SwaigResponse {
        response: text.into(),
        action: None,
    })
}

fn say_with(text: impl Into<String>, action: Vec<Value>) -> Json<SwaigResponse> {
    Json(SwaigResponse {
        response: text.into(),
        action: Some(action),
    })
}

/// POST /swaig — dispatch one assistant function call. Failures come back
/// as conversational text; the assistant reads them to the caller.
pub async fn dispatch(
    State(state): State<AppState>,
    Json(req): Json<SwaigRequest>,
) -> Json<SwaigResponse> {
    let args = &req.arguments;

    let Some(customer_id) = arg_i64(args, "customer_id") else {
        return say("I need to verify your identity. Please provide your account number.");
    };
    let customer = match lookup_customer(&state.db, customer_id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return say("I couldn't find your account. Please verify your account number.")
        }
        Err(e) => {
            tracing::error!("swaig customer lookup failed: {e}");
            return say("I'm having trouble reaching your account right now. Please try again in a moment.");
        }
    };

    match req.function.as_str() {
        "check_balance" => check_balance(&state, &customer).await,
        "make_payment" => make_payment(&state, &customer, args).await,
        "check_modem_status" => check_modem_status(&state, &customer).await,
        "reboot_modem" => reboot_modem(&state, &customer).await,
        "schedule_appointment" => schedule_appointment(&state, &customer, args).await,
        "swap_modem" => swap_modem(&state, &customer, args).await,
        _ => say(
            "I'm sorry, I didn't understand that request. You can ask me about your balance, \
             make a payment, check or reboot your modem, schedule an appointment, or swap your modem.",
        ),
    }
}

async fn check_balance(state: &AppState, customer: &Customer) -> Json<SwaigResponse> {
    match BillingService::latest_bill(&state.db, customer.id).await {
        Ok(Some(bill)) => say(format!(
            "Your current balance is ${:.2}, due on {}.",
            bill.amount, bill.due_date
        )),
        Ok(None) => say("I couldn't find any billing information for your account."),
        Err(e) => trouble("billing lookup", e),
    }
}

async fn make_payment(state: &AppState, customer: &Customer, args: &Value) -> Json<SwaigResponse> {
    let Some(amount) = arg_f64(args, "amount") else {
        return say("How much would you like to pay?");
    };

    match BillingService::make_payment(&state.db, customer.id, amount, "phone").await {
        Ok(payment) => say_with(
            format!(
                "I've initiated a payment of ${amount:.2}. You'll receive a confirmation text shortly."
            ),
            vec![json!({ "payment_id": payment.id, "transaction_id": payment.transaction_id })],
        ),
        Err(ApiError::Validation(msg)) => say(format!("I couldn't take that payment: {msg}")),
        Err(e) => trouble("payment", e),
    }
}

async fn check_modem_status(state: &AppState, customer: &Customer) -> Json<SwaigResponse> {
    match ModemService::get(&state.db, customer.id).await {
        Ok(modem) => say(format!(
            "Your modem is currently {}. MAC address: {}.",
            modem.status, modem.mac_address
        )),
        Err(ApiError::NotFound(_)) => {
            say("I couldn't find any modem information for your account.")
        }
        Err(e) => trouble("modem lookup", e),
    }
}

async fn reboot_modem(state: &AppState, customer: &Customer) -> Json<SwaigResponse> {
    match ModemService::get(&state.db, customer.id).await {
        Ok(_) => {
            drop(ModemService::start_reboot(state.db.clone(), customer.id));
            say("I've started a reboot of your modem. It should be back online in about a minute.")
        }
        Err(ApiError::NotFound(_)) => {
            say("I couldn't find any modem information for your account.")
        }
        Err(e) => trouble("modem lookup", e),
    }
}

async fn schedule_appointment(
    state: &AppState,
    customer: &Customer,
    args: &Value,
) -> Json<SwaigResponse> {
    let Some(kind) = arg_str(args, "type") else {
        return say(
            "What type of appointment would you like to schedule? You can choose from \
             installation, repair, upgrade, or modem swap.",
        );
    };
    let Some(date) = arg_str(args, "date") else {
        return say("What date would you prefer for the appointment?");
    };

    // Spoken types arrive as e.g. "modem swap".
    let kind = kind.to_lowercase().replace(' ', "_");
    let req = CreateAppointmentRequest {
        kind: kind.clone(),
        date: date.clone(),
        notes: arg_str(args, "notes"),
        priority: None,
        technician_id: None,
        location: None,
    };
    match AppointmentService::create(&state.db, customer.id, &req).await {
        Ok(appointment) => say_with(
            format!(
                "I've scheduled your {} appointment for {}. You'll receive a confirmation text shortly.",
                crate::services::notifier::type_label(&appointment.kind),
                date
            ),
            vec![json!({ "appointment_id": appointment.id })],
        ),
        Err(ApiError::Validation(msg)) => say(format!("I couldn't schedule that: {msg}")),
        Err(e) => trouble("appointment scheduling", e),
    }
}

async fn swap_modem(state: &AppState, customer: &Customer, args: &Value) -> Json<SwaigResponse> {
    let modem = match ModemService::get(&state.db, customer.id).await {
        Ok(m) => m,
        Err(ApiError::NotFound(_)) => {
            return say("I couldn't find any modem information for your account.")
        }
        Err(e) => return trouble("modem lookup", e),
    };
    let Some(date) = arg_str(args, "date") else {
        return say("What date would you prefer for the modem swap?");
    };

    let req = CreateAppointmentRequest {
        kind: "modem_swap".to_string(),
        date: date.clone(),
        notes: Some(format!("Current MAC: {}", modem.mac_address)),
        priority: None,
        technician_id: None,
        location: None,
    };
    match AppointmentService::create(&state.db, customer.id, &req).await {
        Ok(appointment) => say_with(
            format!(
                "I've scheduled your modem swap for {date}. A technician will bring your new \
                 modem and help you with the installation."
            ),
            vec![json!({ "appointment_id": appointment.id })],
        ),
        Err(ApiError::Validation(msg)) => say(format!("I couldn't schedule that: {msg}")),
        Err(e) => trouble("appointment scheduling", e),
    }
}

fn trouble(what: &str, e: ApiError) -> Json<SwaigResponse> {
    tracing::error!("swaig {what} failed: {e}");
    say("I'm having trouble with that right now. Please try again in a moment.")
}

async fn lookup_customer(pool: &SqlitePool, id: i64) -> Result<Option<Customer>, ApiError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

fn arg_i64(args: &Value, key: &str) -> Option<i64> {
    match args.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn arg_f64(args: &Value, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn arg_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
