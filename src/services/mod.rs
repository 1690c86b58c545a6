pub mod appointments;
pub mod auth;
pub mod billing;
pub mod history;
pub mod modem;
pub mod notifier;
pub mod reminder_scheduler;
pub mod tasks;
