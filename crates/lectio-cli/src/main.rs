//! `lectio` — manage reading favorites from the terminal.
//!
//! Favorites are kept in a local SQLite file and reconciled with a remote
//! favorites server when one is reachable.
//!
//! # Usage
//!
//! ```text
//! lectio --url http://localhost:3000 --token s3cret add caminho 1 5 --text "…"
//! lectio list --kind scripture --sort book
//! lectio --config ~/.config/lectio/config.toml watch
//! ```

mod client;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::{GatewayConfig, HttpGateway};
use lectio_core::{
  canon::ScriptureCanon,
  favorite::{FavoriteKind, FavoriteSelection, NaturalKey},
  view::{FavoriteEntry, FavoriteFilter, SortOrder},
};
use lectio_store_sqlite::SqliteKv;
use lectio_sync::{Favorites, SyncEngine, SyncOutcome};
use serde::Deserialize;
use tokio::time::{MissedTickBehavior, interval};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

type Store = Favorites<SqliteKv, HttpGateway>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lectio", about = "Reading favorites with remote sync")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the favorites server (default: http://localhost:3000).
  #[arg(long, env = "LECTIO_URL")]
  url: Option<String>,

  /// Bearer token for the favorites server.
  #[arg(long, env = "LECTIO_TOKEN")]
  token: Option<String>,

  /// Path of the local favorites database.
  #[arg(long, env = "LECTIO_DATA")]
  data: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List favorites.
  List {
    #[arg(long, default_value_t = FavoriteFilter::All)]
    kind: FavoriteFilter,
    #[arg(long, default_value_t = SortOrder::Recent)]
    sort: SortOrder,
  },
  /// Favorite one or more paragraphs of a chapter.
  Add(SelectionArgs),
  /// Unfavorite the selected paragraphs that are favorites, favorite the rest.
  Toggle(SelectionArgs),
  /// Remove one favorite.
  Remove {
    book:      String,
    chapter:   u32,
    paragraph: u32,
  },
  /// Remove every favorite of a multi-paragraph group.
  RemoveGroup { group_id: String },
  /// Remove every favorite, locally and remotely.
  Clear,
  /// Reconcile with the remote server.
  Sync,
  /// Show the persisted sync status.
  Status,
  /// Exit with status 0 if the paragraph is a favorite, 1 otherwise.
  Check {
    book:      String,
    chapter:   u32,
    paragraph: u32,
  },
  /// Drop duplicate favorites from local storage.
  Dedupe,
  /// Keep the collection fresh and print its size whenever it changes.
  Watch {
    /// Seconds between full syncs.
    #[arg(long, default_value_t = 60)]
    sync_every: u64,
  },
}

#[derive(ClapArgs, Debug)]
struct SelectionArgs {
  book:         String,
  chapter:      u32,
  #[arg(required = true)]
  paragraphs:   Vec<u32>,
  /// Display title of the book (defaults to the book id).
  #[arg(long)]
  title:        Option<String>,
  /// Display name of the chapter.
  #[arg(long, default_value = "")]
  chapter_name: String,
  /// Paragraph text, once per paragraph in the same order.
  #[arg(long = "text")]
  texts:        Vec<String>,
  /// Override the kind inferred from the book id.
  #[arg(long)]
  kind:         Option<FavoriteKind>,
}

impl SelectionArgs {
  fn into_selection(self, canon: &ScriptureCanon) -> FavoriteSelection {
    let kind = self.kind.unwrap_or_else(|| canon.classify(&self.book));
    let mut texts = self.texts.into_iter();
    let paragraphs = self
      .paragraphs
      .into_iter()
      .map(|n| (n, texts.next().unwrap_or_default()))
      .collect();
    FavoriteSelection {
      book_title: self.title.unwrap_or_else(|| self.book.clone()),
      book_id: self.book,
      chapter_id: self.chapter,
      chapter_name: self.chapter_name,
      kind,
      paragraphs,
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:              String,
  #[serde(default)]
  token:            String,
  data:             Option<PathBuf>,
  /// Replaces the built-in list of scripture book ids.
  scripture_books:  Option<Vec<String>>,
  poll_interval_ms: Option<u64>,
}

const DEFAULT_URL: &str = "http://localhost:3000";
const DEFAULT_DATA: &str = "~/.local/share/lectio/favorites.db";
const DEFAULT_POLL_MS: u64 = 1_000;

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let gateway = HttpGateway::new(GatewayConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone())),
  })
  .context("failed to build HTTP client")?;

  let data = expand_tilde(
    &args
      .data
      .or(file_cfg.data)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA)),
  );
  if let Some(dir) = data.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating data directory {}", dir.display()))?;
  }
  let kv = SqliteKv::open(&data)
    .await
    .with_context(|| format!("failed to open local store at {data:?}"))?;

  let canon = file_cfg
    .scripture_books
    .map(ScriptureCanon::new)
    .unwrap_or_default();
  let engine = SyncEngine::with_canon(Arc::new(kv), Arc::new(gateway), canon);
  let favorites = Arc::new(Favorites::new(Arc::new(engine)));
  favorites.refresh().await;

  let poll = Duration::from_millis(file_cfg.poll_interval_ms.unwrap_or(DEFAULT_POLL_MS));
  run(args.command, &favorites, poll).await
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn run(command: Command, favorites: &Arc<Store>, poll: Duration) -> Result<()> {
  match command {
    Command::List { kind, sort } => {
      let entries = favorites.list(kind, sort);
      if entries.is_empty() {
        println!("no favorites");
      }
      for entry in &entries {
        print_entry(entry);
      }
    }
    Command::Add(selection) => {
      let selection = selection.into_selection(favorites.engine().canon());
      let added = favorites.add_selection(selection, now_millis()).await?;
      println!("added {added}");
    }
    Command::Toggle(selection) => {
      let selection = selection.into_selection(favorites.engine().canon());
      let (added, removed) = favorites.toggle_selection(selection, now_millis()).await?;
      println!("added {added}, removed {removed}");
    }
    Command::Remove { book, chapter, paragraph } => {
      let key = NaturalKey::new(book, chapter, paragraph);
      if favorites.remove_favorite(&key).await? {
        println!("removed {key}");
      } else {
        println!("{key} is not a favorite");
      }
    }
    Command::RemoveGroup { group_id } => {
      let removed = favorites.remove_group(&group_id).await?;
      println!("removed {removed}");
    }
    Command::Clear => {
      favorites.clear_all().await?;
      println!("cleared");
    }
    Command::Sync => print_outcome(&favorites.sync().await?),
    Command::Status => {
      let status = favorites.sync_status().await;
      println!("syncing:   {}", status.is_syncing);
      println!("last sync: {}", format_time(status.last_sync_at));
      println!("pending:   {}", status.pending_sync);
      println!("error:     {}", status.error.as_deref().unwrap_or("-"));
    }
    Command::Check { book, chapter, paragraph } => {
      if !favorites.is_favorite(&book, chapter, paragraph) {
        bail!("{} is not a favorite", NaturalKey::new(book, chapter, paragraph));
      }
      println!("{} is a favorite", NaturalKey::new(book, chapter, paragraph));
    }
    Command::Dedupe => {
      let removed = favorites.clean_duplicates().await?;
      println!("removed {removed} duplicates");
    }
    Command::Watch { sync_every } => watch(favorites, poll, Duration::from_secs(sync_every)).await?,
  }
  Ok(())
}

async fn watch(favorites: &Arc<Store>, poll: Duration, sync_every: Duration) -> Result<()> {
  let poller = favorites.spawn_polling(poll);
  let mut rx = favorites.subscribe();
  let mut ticker = interval(sync_every);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  println!("{} favorites", favorites.favorites().len());
  let result = loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => break Ok(()),
      changed = rx.changed() => {
        if changed.is_err() {
          break Ok(());
        }
        let count = rx.borrow_and_update().favorites.len();
        println!("{count} favorites");
      }
      _ = ticker.tick() => match favorites.sync().await {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => break Err(e).context("sync failed"),
      },
    }
  };
  poller.abort();
  result
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_entry(entry: &FavoriteEntry) {
  let head = entry.head();
  let title = if head.book_title.is_empty() { &head.book_id } else { &head.book_title };
  match entry {
    FavoriteEntry::Single(r) => println!(
      "[{}] {title} {}:{}  {}",
      r.kind,
      r.chapter_id,
      r.paragraph_number,
      preview(&r.paragraph_text),
    ),
    FavoriteEntry::Group { group_id, range, items } => println!(
      "[{}] {title} {}:{} ({} paragraphs, group {group_id})  {}",
      head.kind,
      head.chapter_id,
      range.as_deref().unwrap_or("?"),
      items.len(),
      preview(&head.paragraph_text),
    ),
  }
}

fn print_outcome(outcome: &SyncOutcome) {
  match outcome {
    SyncOutcome::Completed(r) => println!(
      "synced: {} favorites ({} pulled, {} pushed, {} failed)",
      r.merged, r.pulled, r.pushed, r.push_failures
    ),
    SyncOutcome::AlreadyRunning => println!("a sync is already running"),
    SyncOutcome::RemoteUnavailable { reason } => {
      println!("server unavailable, changes kept locally: {reason}")
    }
  }
}

fn preview(text: &str) -> String {
  const MAX: usize = 60;
  let mut chars = text.chars();
  let head: String = chars.by_ref().take(MAX).collect();
  if chars.next().is_some() { format!("{head}…") } else { head }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
  at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| "never".into())
}

fn now_millis() -> i64 { Utc::now().timestamp_millis() }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
