//! Orbis Worker - backend service for the Orbis property services platform.
//!
//! Connects to NATS and serves the back-office operations: territory and
//! zone coverage, leave tracking, service-request intake with
//! auto-assignment, AMC contract scheduling, and the notification jobs.

mod auth;
mod cli;
mod config;
mod db;
mod defaults;
mod error;
mod handlers;
mod services;
mod types;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::services::email_sender::{create_email_sender, EmailSender};
use crate::services::notifier::{NotificationDispatchJob, ZoneHeadSummaryJob};
use crate::services::scheduler::{Schedule, Scheduler};

/// Assemble the scheduler with the three standing jobs.
pub fn build_scheduler(pool: PgPool) -> Arc<Scheduler> {
    let sender: Arc<dyn EmailSender> = Arc::from(create_email_sender());

    let mut scheduler = Scheduler::new(CancellationToken::new());
    scheduler.register(
        Schedule::DailyAt(defaults::evening_summary_time()),
        Arc::new(ZoneHeadSummaryJob::evening(pool.clone(), sender.clone())),
    );
    scheduler.register(
        Schedule::DailyAt(defaults::morning_summary_time()),
        Arc::new(ZoneHeadSummaryJob::morning(pool.clone(), sender.clone())),
    );
    scheduler.register(
        Schedule::Every(defaults::NOTIFICATION_DISPATCH_INTERVAL),
        Arc::new(NotificationDispatchJob::new(pool, sender)),
    );

    Arc::new(scheduler)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ./logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "worker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,orbis_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    let args = cli::Cli::parse();

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;
    info!("Connected to PostgreSQL");

    match args.command {
        Some(cli::Command::Migrate) => {
            db::run_migrations(&pool).await?;
            return Ok(());
        }
        Some(cli::Command::TriggerJob { name }) => {
            let scheduler = build_scheduler(pool);
            let outcome = scheduler.trigger(&name).await?;
            info!(job = %name, outcome = %outcome, "Job complete");
            println!("{outcome}");
            return Ok(());
        }
        Some(cli::Command::Serve) | None => {}
    }

    info!("Starting Orbis Worker...");

    // Run migrations
    db::run_migrations(&pool).await?;

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers and the job scheduler
    let handler_result = handlers::start_handlers(nats_client, pool, &config).await;

    if let Err(e) = handler_result {
        error!("Handler error: {}", e);
        return Err(e);
    }

    Ok(())
}
