use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bistro_notifications::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SEC,
    DEFAULT_SLOT_QUOTA_BYTES,
};
use bistro_notifications::notifications::{
    codec::format_timestamp, DurableSlot, HttpNotificationsRemote, Notification,
    NotificationFilter, NotificationStore, NotificationsRemote, NullRemote, PersistentStore,
    SqliteSlot, SyncStatus,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct CliArgs {
    /// Path to a TOML config file. Its values override command line flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite file holding the local notification slot.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Base URL of the restaurant backend.
    #[clap(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Scope backend requests to this user.
    #[clap(long)]
    pub user_id: Option<String>,

    /// Timeout in seconds for backend requests.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Largest serialized collection the local slot accepts. 0 disables the limit.
    #[clap(long, default_value_t = DEFAULT_SLOT_QUOTA_BYTES)]
    pub slot_quota_bytes: usize,

    /// Never contact the backend.
    #[clap(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists notifications, newest first.
    List {
        /// One of: all, unread, success, pending, failed, info.
        #[clap(long, default_value = "all")]
        filter: NotificationFilter,
    },

    /// Prints the number of unread notifications.
    UnreadCount,

    /// Marks a notification as read.
    MarkRead { id: String },

    /// Marks every notification as read.
    MarkAllRead,

    /// Fetches notifications from the backend again.
    Refresh,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            api_base_url: self.api_base_url.clone(),
            user_id: self.user_id.clone(),
            request_timeout_sec: self.request_timeout_sec,
            slot_quota_bytes: self.slot_quota_bytes,
            offline: self.offline,
        }
    }
}

fn print_notification(notification: &Notification) {
    println!(
        "{} {:<7} {:<24} {} {}{}",
        if notification.is_read { " " } else { "*" },
        notification.notification_type.as_str(),
        notification.title,
        format_timestamp(&notification.created_at),
        notification.id,
        notification
            .reference_id
            .as_deref()
            .map(|r| format!(" [{}]", r))
            .unwrap_or_default(),
    );
    if !notification.message.is_empty() {
        println!("    {}", notification.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening notification slot at {:?}...", config.db_path);
    let mut slot = SqliteSlot::open(&config.db_path)
        .with_context(|| format!("Failed to open notification slot at {:?}", config.db_path))?;
    if let Some(quota) = config.slot_quota_bytes {
        slot = slot.with_quota(quota);
    }
    let slot: Arc<dyn DurableSlot> = Arc::new(slot);

    let remote: Arc<dyn NotificationsRemote> = if config.offline {
        info!("Offline mode, backend disabled");
        Arc::new(NullRemote)
    } else {
        info!("Notifications backend at {}", config.api_base_url);
        Arc::new(HttpNotificationsRemote::new(
            config.api_base_url.clone(),
            config.user_id.clone(),
            config.request_timeout_sec,
        )?)
    };

    let store = NotificationStore::open(PersistentStore::new(slot), remote);

    // Commands act on the collection as it stands after the startup fetch
    let mut sync_status = store.sync_status();
    let startup_wait = Duration::from_secs(config.request_timeout_sec + 1);
    match tokio::time::timeout(startup_wait, sync_status.wait_for(|s| !s.is_pending())).await {
        Ok(Ok(status)) => info!("Startup sync: {:?}", *status),
        _ => warn!("Startup sync did not finish, using local notifications"),
    }

    match cli_args.command {
        Command::List { filter } => {
            for notification in store.view(filter) {
                print_notification(&notification);
            }
        }
        Command::UnreadCount => {
            println!("{}", store.unread_count());
        }
        Command::MarkRead { id } => {
            if store.get(&id).is_none() {
                warn!("No notification with id {}", id);
            }
            store.mark_as_read(&id);
            println!("{} unread", store.unread_count());
        }
        Command::MarkAllRead => {
            store.mark_all_as_read();
            println!("{} unread", store.unread_count());
        }
        Command::Refresh => {
            let status = store.refresh().await;
            match status {
                SyncStatus::Replaced { count } => println!("Fetched {} notifications", count),
                SyncStatus::KeptLocal => println!("Backend has no notifications, kept local ones"),
                other => println!("Refresh did not complete: {:?}", other),
            }
        }
    }

    // Let dispatched backend calls go out before exiting
    store.settle().await;
    store.shutdown();

    Ok(())
}
