use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Service visit categories. Each type carries a fixed two-hour window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Installation,
    Repair,
    Upgrade,
    ModemSwap,
}

impl AppointmentType {
    /// Fixed start/end slot assigned by type; never caller-specified.
    pub fn window(&self) -> (NaiveTime, NaiveTime) {
        match self {
            // Modem swaps start an hour later so the warehouse run is done.
            AppointmentType::ModemSwap => (
                NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
                NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            ),
            _ => (
                NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
                NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
            ),
        }
    }

    /// Human wording for messages and spoken prompts.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::Installation => "installation",
            AppointmentType::Repair => "repair",
            AppointmentType::Upgrade => "upgrade",
            AppointmentType::ModemSwap => "modem swap",
        }
    }
}

impl std::fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentType::Installation => "installation",
            AppointmentType::Repair => "repair",
            AppointmentType::Upgrade => "upgrade",
            AppointmentType::ModemSwap => "modem_swap",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AppointmentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "installation" => Ok(AppointmentType::Installation),
            "repair" => Ok(AppointmentType::Repair),
            "upgrade" => Ok(AppointmentType::Upgrade),
            "modem_swap" => Ok(AppointmentType::ModemSwap),
            _ => Err(anyhow::anyhow!(
                "Invalid appointment type: {s}. Valid types: installation, repair, upgrade, modem_swap"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Pending,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Pending => "pending",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "pending" => Ok(AppointmentStatus::Pending),
            _ => Err(anyhow::anyhow!(
                "Invalid status: {s}. Valid statuses: scheduled, completed, cancelled, pending"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(anyhow::anyhow!(
                "Invalid priority: {s}. Valid priorities: low, medium, high, urgent"
            )),
        }
    }
}

/// Outbound reminder channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Sms,
    Call,
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReminderType::Sms => "sms",
            ReminderType::Call => "call",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReminderType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sms" => Ok(ReminderType::Sms),
            "call" => Ok(ReminderType::Call),
            _ => Err(anyhow::anyhow!(
                "Invalid reminder type: {s}. Valid types: sms, call"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// Whitelisted list-sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    StartTime,
    EndTime,
    Type,
    Status,
    Priority,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::StartTime => "start_time",
            SortField::EndTime => "end_time",
            SortField::Type => "type",
            SortField::Status => "status",
            SortField::Priority => "priority",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_time" => Ok(SortField::StartTime),
            "end_time" => Ok(SortField::EndTime),
            "type" => Ok(SortField::Type),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            _ => Err(anyhow::anyhow!(
                "Invalid sort field: {s}. Valid fields: start_time, end_time, type, status, priority"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(anyhow::anyhow!("Invalid sort order: {s}. Use asc or desc")),
        }
    }
}

/// DB row struct. Enum columns are kept as TEXT; the typed enums above are
/// for validation only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub customer_id: i64,
    pub technician_id: Option<i64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub notes: Option<String>,
    pub priority: String,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentHistory {
    pub id: i64,
    pub appointment_id: i64,
    pub action: String,
    /// JSON snapshot of the fields touched by the operation.
    pub details: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentReminder {
    pub id: i64,
    pub appointment_id: i64,
    pub reminder_type: String,
    pub sent_at: NaiveDateTime,
    pub status: String,
    pub error_message: Option<String>,
}

/// Durable deferred-notification job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderJob {
    pub id: i64,
    pub appointment_id: i64,
    pub reminder_type: String,
    pub fire_at: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
}

// Request/query DTOs

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(rename = "type")]
    pub kind: String,
    /// YYYY-MM-DD; the time window is derived from the type.
    pub date: String,
    pub notes: Option<String>,
    pub priority: Option<String>,
    pub technician_id: Option<i64>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<String>,
    pub technician_id: Option<i64>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAppointmentRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TriggerReminderRequest {
    #[serde(rename = "type")]
    pub reminder_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListAppointmentsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub priority: Option<String>,
    /// Technician name substring match.
    pub technician: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub include_history: Option<bool>,
    pub include_reminders: Option<bool>,
}

/// One page of list results plus the unpaginated total.
#[derive(Debug, Serialize)]
pub struct AppointmentPage {
    pub appointments: Vec<Appointment>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}
