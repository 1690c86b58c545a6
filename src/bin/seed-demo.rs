//! Demo data seed script
//!
//! Seeds a demo customer with realistic account data:
//! - 1 customer (test@example.com) with a known password
//! - 3 services (cable, internet, phone), two of them active
//! - 1 online modem
//! - Current bill plus three paid past bills and matching payments
//! - 2 technicians
//! - 1 completed past appointment and 2 upcoming ones
//!
//! Usage:
//!   DATABASE_URL=sqlite://zen_cable.db ./seed-demo
//!
//! Re-running replaces the demo customer and everything attached to it.

use anyhow::{Context, Result};
use chrono::{Duration, Local, Utc};
use clap::Parser;

use zencable_api::db;

#[derive(Parser)]
struct Args {
    /// SQLite connection string
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://zen_cable.db")]
    database_url: String,

    /// Password for the demo account
    #[arg(long, default_value = "password123")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("=== Seed Demo Data ===");

    let pool = db::create_pool(&args.database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;

    // Clean any previous demo customer and attached rows.
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM customers WHERE email = 'test@example.com'")
            .fetch_optional(&pool)
            .await?;
    if let Some(id) = existing {
        println!("Removing existing demo customer (id {id})...");
        for table in [
            "customer_services",
            "modems",
            "billing",
            "payments",
            "password_resets",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE customer_id = ?"))
                .bind(id)
                .execute(&pool)
                .await?;
        }
        for table in ["appointment_history", "appointment_reminders", "reminder_jobs"] {
            sqlx::query(&format!(
                "DELETE FROM {table} WHERE appointment_id IN
                 (SELECT id FROM appointments WHERE customer_id = ?)"
            ))
            .bind(id)
            .execute(&pool)
            .await?;
        }
        sqlx::query("DELETE FROM appointments WHERE customer_id = ?")
            .bind(id)
            .execute(&pool)
            .await?;
        sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?;
    }

    println!("Inserting demo customer...");
    let password_hash = zencable_api::services::auth::hash_password(&args.password)
        .context("Failed to hash demo password")?;
    let customer_id: i64 = sqlx::query_scalar(
        "INSERT INTO customers (name, email, phone, address, password_hash, created_at)
         VALUES ('Test Customer', 'test@example.com', '+15551234567', '123 Main St', ?, ?)
         RETURNING id",
    )
    .bind(&password_hash)
    .bind(Utc::now().naive_utc())
    .fetch_one(&pool)
    .await?;

    println!("Inserting services...");
    let services = [
        ("Basic Cable", "Basic cable package with 100+ channels", 49.99, "cable"),
        ("High-Speed Internet", "100 Mbps internet service", 39.99, "internet"),
        ("Digital Phone", "Unlimited local and long distance", 29.99, "phone"),
    ];
    let mut service_ids = Vec::new();
    for (name, description, price, kind) in services {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO services (name, description, price, type) VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(kind)
        .fetch_one(&pool)
        .await?;
        service_ids.push(id);
    }
    // Cable and internet are active on the demo account.
    for service_id in &service_ids[..2] {
        sqlx::query(
            "INSERT INTO customer_services (customer_id, service_id, status, start_date)
             VALUES (?, ?, 'active', ?)",
        )
        .bind(customer_id)
        .bind(service_id)
        .bind(Utc::now().naive_utc())
        .execute(&pool)
        .await?;
    }

    println!("Inserting modem...");
    sqlx::query(
        "INSERT INTO modems (customer_id, mac_address, model, status, last_seen)
         VALUES (?, '00:11:22:33:44:55', 'DOCSIS 3.1', 'online', ?)",
    )
    .bind(customer_id)
    .bind(Utc::now().naive_utc())
    .execute(&pool)
    .await?;

    println!("Inserting billing and payments...");
    let today = Local::now().date_naive();
    let bills = [
        (89.98, today + Duration::days(15), "pending"),
        (89.98, today - Duration::days(30), "paid"),
        (89.98, today - Duration::days(60), "paid"),
        (89.98, today - Duration::days(90), "paid"),
    ];
    for (amount, due_date, status) in bills {
        sqlx::query(
            "INSERT INTO billing (customer_id, amount, due_date, status) VALUES (?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(amount)
        .bind(due_date)
        .bind(status)
        .execute(&pool)
        .await?;
    }
    let payments = [
        (89.98, 25, "credit_card", "TRX001"),
        (89.98, 55, "debit_card", "TRX002"),
        (89.98, 85, "bank_transfer", "TRX003"),
    ];
    for (amount, days_ago, method, transaction_id) in payments {
        sqlx::query(
            "INSERT INTO payments (customer_id, amount, payment_date, payment_method, status, transaction_id)
             VALUES (?, ?, ?, ?, 'completed', ?)",
        )
        .bind(customer_id)
        .bind(amount)
        .bind((Local::now() - Duration::days(days_ago)).naive_local())
        .bind(method)
        .bind(transaction_id)
        .execute(&pool)
        .await?;
    }

    println!("Inserting technicians...");
    for (name, phone, email) in [
        ("Alex Rivera", "+15550100001", "alex.rivera@zencable.example"),
        ("Sam Chen", "+15550100002", "sam.chen@zencable.example"),
    ] {
        sqlx::query(
            "INSERT OR IGNORE INTO technicians (name, phone, email) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(phone)
        .bind(email)
        .execute(&pool)
        .await?;
    }

    println!("Inserting appointments...");
    let appointments = [
        ("installation", "completed", -120, 9, "Initial service installation"),
        ("repair", "scheduled", 7, 9, "Routine maintenance check"),
        ("upgrade", "scheduled", 14, 9, "Internet speed upgrade"),
    ];
    for (kind, status, day_offset, start_hour, notes) in appointments {
        let day = today + Duration::days(day_offset);
        let start = day.and_hms_opt(start_hour, 0, 0).unwrap();
        sqlx::query(
            "INSERT INTO appointments (customer_id, type, status, start_time, end_time, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(customer_id)
        .bind(kind)
        .bind(status)
        .bind(start)
        .bind(start + Duration::hours(2))
        .bind(notes)
        .bind(Utc::now().naive_utc())
        .bind(Utc::now().naive_utc())
        .execute(&pool)
        .await?;
    }

    println!();
    println!("Demo data seeded.");
    println!("  Login: test@example.com / {}", args.password);
    Ok(())
}
