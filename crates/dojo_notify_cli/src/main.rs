//! Operator CLI for the notification store.
//!
//! # Responsibility
//! - Inspect and dismiss stored notifications without the HTTP layer.
//! - Exercise the same service path (and logging) as production callers.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use dojo_notify_core::db::open_db;
use dojo_notify_core::{
    core_version, default_log_level, init_logging, notification_description,
    notification_title, NotificationService, SqliteNotificationRepository, StoreConfig,
};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dojo_notify", version, about = "Inspect and manage dojo notifications")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "DOJO_NOTIFY_DB", global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "DOJO_NOTIFY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "DOJO_NOTIFY_LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// Notifications per page for `list`.
    #[arg(long, env = "DOJO_NOTIFY_PAGE_SIZE", global = true)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of a user's notifications as JSON.
    List {
        #[arg(long)]
        user: String,
        /// Token returned by a previous `list` call.
        #[arg(long)]
        page_token: Option<String>,
    },
    /// Dismiss one notification thread.
    Delete {
        #[arg(long)]
        user: String,
        #[arg(long)]
        thread_id: String,
    },
    /// Print the core crate version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    match &cli.command {
        Command::Version => {
            println!("dojo_notify_core version={}", core_version());
            Ok(())
        }
        Command::List { user, page_token } => list(&cli, user, page_token.as_deref()),
        Command::Delete { user, thread_id } => delete(&cli, user, thread_id),
    }
}

fn list(cli: &Cli, user: &str, page_token: Option<&str>) -> Result<()> {
    let conn = open_db(db_path(cli)?).context("failed to open notification database")?;
    let repo = SqliteNotificationRepository::with_config(
        &conn,
        StoreConfig::with_page_size(cli.page_size),
    )?;
    let service = NotificationService::new(repo);

    let page = service.list_notifications(user, page_token)?;
    let notifications = page
        .items
        .iter()
        .map(|notification| {
            let mut value = serde_json::to_value(notification)?;
            value["title"] = json!(notification_title(notification));
            value["description"] = json!(notification_description(notification));
            Ok(value)
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    let output = json!({
        "notifications": notifications,
        "lastEvaluatedKey": page.next_page_token.unwrap_or_default(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn delete(cli: &Cli, user: &str, thread_id: &str) -> Result<()> {
    let conn = open_db(db_path(cli)?).context("failed to open notification database")?;
    let service = NotificationService::new(SqliteNotificationRepository::try_new(&conn)?);

    service.delete_notification(user, thread_id)?;
    println!("deleted thread_id={thread_id}");
    Ok(())
}

fn db_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.db {
        Some(path) => Ok(path.clone()),
        None => bail!("--db or DOJO_NOTIFY_DB is required"),
    }
}
