//! Per-customer account entities: modem, billing, payments, subscribed
//! services. Read/written by the simple CRUD routes and the SWAIG functions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const MODEM_STATUSES: &[&str] = &["online", "offline", "rebooting"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Modem {
    pub id: i64,
    pub customer_id: i64,
    pub mac_address: String,
    pub model: Option<String>,
    pub status: String,
    pub last_seen: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Billing {
    pub id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub payment_date: NaiveDateTime,
    pub payment_method: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

/// Catalog service joined through customer_services.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SetModemStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct MakePaymentRequest {
    pub amount: f64,
    pub payment_method: Option<String>,
}
