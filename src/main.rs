//! Roost - follower-relationship sync and notifications from the terminal
#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roost::auth::CredentialStore;
use roost::insights::{HeuristicInsightProvider, InsightService};
use roost::{BatchResult, CacheCategory, Config, Database, ItemOutcome, Notification, SyncManager};

/// Refresh interval for `watch` when the config leaves it at 0
const DEFAULT_WATCH_SECS: u64 = 300;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse CLI arguments
    match parse_args()? {
        Command::Login { token } => login(&token),
        Command::Logout => logout(),
        Command::Sync => sync_cli().await,
        Command::Relationships { not_following_back } => {
            relationships_cli(not_following_back).await
        }
        Command::Notifications { unread_only } => notifications_cli(unread_only).await,
        Command::Read { id } => read_cli(id).await,
        Command::DeleteNotification { id } => delete_notification_cli(id).await,
        Command::Remove { ids } => mutate_cli(Mutation::Remove, &ids).await,
        Command::Block { ids } => mutate_cli(Mutation::Block, &ids).await,
        Command::Insights => insights_cli().await,
        Command::ClearCache { category } => clear_cache_cli(category).await,
        Command::Watch { interval_secs } => watch_cli(interval_secs).await,
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Login { token: String },
    Logout,
    Sync,
    Relationships { not_following_back: bool },
    Notifications { unread_only: bool },
    Read { id: Option<u64> },
    DeleteNotification { id: u64 },
    Remove { ids: Vec<String> },
    Block { ids: Vec<String> },
    Insights,
    ClearCache { category: Option<CacheCategory> },
    Watch { interval_secs: Option<u64> },
    Help,
    Version,
}

#[derive(Clone, Copy)]
enum Mutation {
    Remove,
    Block,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Help);
    }

    let has_flag = |flag: &str| args.iter().skip(2).any(|a| a == flag);
    let ids = || -> Vec<String> {
        args.iter()
            .skip(2)
            .filter(|a| !a.starts_with('-'))
            .cloned()
            .collect()
    };

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "login" => {
            let token = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing token\nUsage: roost login <token>"))?
                .clone();
            Ok(Command::Login { token })
        }

        "logout" => Ok(Command::Logout),
        "sync" => Ok(Command::Sync),

        "relationships" | "rel" => Ok(Command::Relationships {
            not_following_back: has_flag("--not-following-back"),
        }),

        "notifications" | "n" => Ok(Command::Notifications {
            unread_only: has_flag("--unread"),
        }),

        "read" => {
            if has_flag("--all") {
                return Ok(Command::Read { id: None });
            }
            let id = parse_id(args.get(2))?;
            Ok(Command::Read { id: Some(id) })
        }

        "delete-notification" => Ok(Command::DeleteNotification {
            id: parse_id(args.get(2))?,
        }),

        "remove" | "block" => {
            let ids = ids();
            if ids.is_empty() {
                return Err(anyhow::anyhow!("Missing user id\nUsage: roost {} <id>...", args[1]));
            }
            Ok(if args[1] == "remove" {
                Command::Remove { ids }
            } else {
                Command::Block { ids }
            })
        }

        "insights" => Ok(Command::Insights),

        "clear-cache" => {
            let category = match args.get(2) {
                Some(name) => Some(CacheCategory::from_str(name).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown cache category: {name}\nKnown: followers, following, notifications, analytics, profile"
                    )
                })?),
                None => None,
            };
            Ok(Command::ClearCache { category })
        }

        "watch" => {
            let interval_secs = args
                .iter()
                .position(|a| a == "--interval" || a == "-i")
                .and_then(|i| args.get(i + 1))
                .and_then(|s| s.parse().ok());
            Ok(Command::Watch { interval_secs })
        }

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'roost --help' for usage"
        )),
    }
}

fn parse_id(arg: Option<&String>) -> Result<u64> {
    let arg = arg.ok_or_else(|| anyhow::anyhow!("Missing notification id"))?;
    arg.parse()
        .with_context(|| format!("Invalid notification id: {arg}"))
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"{}
🪺 Roost - follower sync and notifications

USAGE:
    roost [COMMAND]

COMMANDS:
    login <token>                      Store an API bearer token
    logout                             Forget the stored token

    sync                               Refresh relationships and notifications
    relationships [OPTIONS]            Show followers/following summary
      Options:
        --not-following-back           List accounts that don't follow you back

    notifications [OPTIONS]            Show the notification feed
      Options:
        --unread                       Only unread entries
    read <id> | --all                  Mark notifications read
    delete-notification <id>           Delete one notification

    remove <id>...                     Remove followers (max 10 per batch)
    block <id>...                      Block users (max 10 per batch)

    insights                           Audience analytics and suggestions
    clear-cache [category]             Clear cached data
      Categories: followers, following, notifications, analytics, profile

    watch [OPTIONS]                    Refresh in the background until Ctrl+C
      Options:
        -i, --interval <secs>          Refresh interval (default: config or 300)

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

ENVIRONMENT:
    ROOST_TOKEN                        Bearer token, overrides the stored one
    RUST_LOG                           Log filter (default: warn)

CONFIG:
    {}
"#,
        roost::LOGO,
        config_path
    );
}

fn print_version() {
    println!("roost {}", roost::VERSION);
}

// ==================== Setup ====================

fn load_token() -> Result<Option<String>> {
    if let Ok(token) = std::env::var("ROOST_TOKEN")
        && !token.trim().is_empty()
    {
        return Ok(Some(token));
    }
    CredentialStore::open()?.get_token()
}

fn open_manager() -> Result<(Config, SyncManager)> {
    let config = Config::load()?;
    let db = Database::open()?;
    let token = load_token()?;
    let manager = SyncManager::from_config(&config, db, token, roost::clock::system())?;
    Ok((config, manager))
}

fn login(token: &str) -> Result<()> {
    let store = CredentialStore::open()?;
    store.store_token(token)?;
    println!("✓ Token saved to {}", store.path().display());
    Ok(())
}

fn logout() -> Result<()> {
    let store = CredentialStore::open()?;
    if store.has_token() {
        store.delete_token()?;
        println!("✓ Logged out");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

// ==================== Commands ====================

fn print_notification(n: &Notification) {
    let marker = if n.is_read { " " } else { "•" };
    println!(
        "{} {} [{}] {} · {}",
        marker,
        n.kind.emoji(),
        n.id,
        n.title,
        n.timestamp.format("%Y-%m-%d %H:%M")
    );
    println!("      {}", n.message);
}

async fn sync_cli() -> Result<()> {
    let (_, manager) = open_manager()?;
    let feed = manager.refresh().await;

    let profile = manager.client().fetch_profile().await?;
    println!("@{} ({})", profile.items.username, profile.items.display_name);

    let relationships = manager.client().fetch_follower_relationships().await?;
    if relationships.is_stale() || profile.is_stale() {
        println!("⚠ Offline: showing cached data");
    }
    println!(
        "✓ {} followers · {} following · {} mutual",
        relationships.total_followers, relationships.total_following, relationships.mutual_count
    );
    println!(
        "✓ {} notifications ({} unread)",
        feed.len(),
        feed.iter().filter(|n| !n.is_read).count()
    );
    Ok(())
}

async fn relationships_cli(not_following_back: bool) -> Result<()> {
    let (_, manager) = open_manager()?;
    let rel = manager.client().fetch_follower_relationships().await?;

    if rel.is_stale() {
        println!("⚠ Offline: showing cached data\n");
    }
    println!("Followers:          {}", rel.total_followers);
    println!("Following:          {}", rel.total_following);
    println!("Mutual:             {}", rel.mutual_count);
    println!("Not following back: {}", rel.not_following_back_count);

    if not_following_back {
        println!("\n{}", "─".repeat(60));
        for followed in rel.not_following_back() {
            println!(
                "  {} @{} ({})",
                followed.user.label(),
                followed.user.username,
                followed.user.id
            );
        }
    }
    Ok(())
}

async fn notifications_cli(unread_only: bool) -> Result<()> {
    let (_, manager) = open_manager()?;
    let feed = if manager.notifications().needs_refresh().await {
        manager.refresh().await
    } else {
        manager.notifications().notifications().await
    };

    let shown: Vec<&Notification> = feed.iter().filter(|n| !unread_only || !n.is_read).collect();
    if shown.is_empty() {
        println!("No notifications.");
        return Ok(());
    }
    for n in shown {
        print_notification(n);
    }
    Ok(())
}

async fn read_cli(id: Option<u64>) -> Result<()> {
    let (_, manager) = open_manager()?;
    match id {
        Some(id) => {
            if manager.notifications().mark_read(id).await? {
                println!("✓ Marked {} as read", id);
            } else {
                println!("No notification with id {}", id);
            }
        }
        None => {
            let changed = manager.notifications().mark_all_read().await?;
            println!("✓ Marked {} notifications as read", changed);
        }
    }
    Ok(())
}

async fn delete_notification_cli(id: u64) -> Result<()> {
    let (_, manager) = open_manager()?;
    if manager.notifications().delete(id).await? {
        println!("✓ Deleted {}", id);
    } else {
        println!("No notification with id {}", id);
    }
    Ok(())
}

fn print_batch(result: &BatchResult) {
    for item in &result.items {
        match &item.outcome {
            ItemOutcome::Succeeded => println!("  ✓ {}", item.user_id),
            ItemOutcome::Failed { reason } => println!("  ✗ {}: {}", item.user_id, reason),
            ItemOutcome::Skipped { reason } => {
                println!("  – {}: skipped ({})", item.user_id, reason);
            }
        }
    }
    println!(
        "\n{} succeeded, {} failed, {} skipped",
        result.success_count, result.failure_count, result.skipped_count
    );
    if result.was_aborted() {
        let wait = result.retry_after.map_or(1, |d| d.as_secs().max(1));
        println!("Rate limited. Try again in {}s.", wait);
    }
}

async fn mutate_cli(mutation: Mutation, ids: &[String]) -> Result<()> {
    let (_, manager) = open_manager()?;
    let client = manager.client();

    if matches!(mutation, Mutation::Remove) {
        let known = manager.cache().get_ids(CacheCategory::Followers).await;
        if !known.is_empty() {
            for id in ids.iter().filter(|id| !known.contains(*id)) {
                println!("⚠ {} is not among your cached followers", id);
            }
        }
    }

    if let [id] = ids {
        match mutation {
            Mutation::Remove => client.remove_follower(id).await?,
            Mutation::Block => client.block_user(id).await?,
        }
        println!("✓ Done: {}", id);
        return Ok(());
    }

    let result = match mutation {
        Mutation::Remove => client.batch_remove_followers(ids).await?,
        Mutation::Block => client.batch_block_users(ids).await?,
    };
    print_batch(&result);
    Ok(())
}

async fn insights_cli() -> Result<()> {
    let (_, manager) = open_manager()?;
    let rel = manager.client().fetch_follower_relationships().await?;
    let service = InsightService::new(HeuristicInsightProvider, Arc::clone(manager.cache()));

    let analytics = service.analytics(&rel).await;
    println!("📈 Growth: {:.1}% ({})", analytics.growth_rate, analytics.engagement_trend);
    println!("\nInsights:");
    for insight in &analytics.top_insights {
        println!("  • {}", insight);
    }
    println!("\nRecommendations:");
    for rec in &analytics.recommendations {
        println!("  • {}", rec);
    }

    println!("\nSuggestions:");
    for s in service.suggestions(&rel).await {
        let handle = if s.username.is_empty() {
            String::new()
        } else {
            format!(" @{}", s.username)
        };
        println!(
            "  {}{} [{}] {:.0}%\n      {}",
            s.display_name,
            handle,
            s.category,
            s.potential_value * 100.0,
            s.reason
        );
    }
    Ok(())
}

async fn clear_cache_cli(category: Option<CacheCategory>) -> Result<()> {
    let (_, manager) = open_manager()?;
    match category {
        Some(category) => {
            manager.cache().clear(category).await?;
            println!("✓ Cleared {}", category);
        }
        None => {
            manager.cache().clear_all().await?;
            println!("✓ Cleared all cached data");
        }
    }
    Ok(())
}

async fn watch_cli(interval_secs: Option<u64>) -> Result<()> {
    let (config, manager) = open_manager()?;
    let secs = interval_secs
        .filter(|&s| s > 0)
        .unwrap_or(match config.refresh_interval_secs {
            0 => DEFAULT_WATCH_SECS,
            configured => configured,
        });

    let manager = Arc::new(manager);
    println!("👀 Refreshing every {}s. Press Ctrl+C to stop.", secs);

    tokio::select! {
        () = Arc::clone(&manager).start_background_refresh(secs) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
        }
    }

    let unread = manager.notifications().unread_count().await;
    println!("\n✓ Stopped. {} unread notifications.", unread);
    Ok(())
}
