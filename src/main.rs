use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::info;

use newsdesk::cache::{ArticleStore, SqliteStorage};
use newsdesk::config::Config;
use newsdesk::connectivity::{Connectivity, ConnectivityObserver, HttpProbe};
use newsdesk::news::{Article, ArticleLookup, Category, NewsCoordinator, NewsProvider, NewsResult};
use newsdesk::logging;

#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Top headlines with an offline cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/newsdesk/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Only show this category (technology, business, sports, entertainment, health)
  #[arg(short = 'C', long, value_parser = parse_category)]
  category: Option<Category>,

  /// Show a single article by id instead of the list
  #[arg(short, long)]
  article: Option<String>,

  /// Skip the connectivity check and read from the cache
  #[arg(long)]
  offline: bool,

  /// Remove the cached articles and exit
  #[arg(long)]
  clear_cache: bool,
}

fn parse_category(value: &str) -> Result<Category, String> {
  match Category::from_label(value) {
    Category::General if !value.eq_ignore_ascii_case("general") => {
      Err(format!("unknown category '{}'", value))
    }
    category => Ok(category),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let log_dir = logging::default_log_dir();
  let _log_guard = match logging::init(&log_dir) {
    Ok(guard) => Some(guard),
    Err(e) => {
      eprintln!("warning: logging disabled, cannot write to {}: {}", log_dir.display(), e);
      None
    }
  };

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let storage = match &config.cache.path {
    Some(path) => SqliteStorage::open(path),
    None => SqliteStorage::open_default(),
  }
  .map_err(|e| eyre!("Failed to open article cache: {}", e))?;
  let store = ArticleStore::new(storage, &config.cache);

  if args.clear_cache {
    if !store.clear() {
      return Err(eyre!("Failed to clear the article cache"));
    }
    println!("Cache cleared.");
    return Ok(());
  }

  let provider = NewsProvider::from_config(&config)?;
  let coordinator = NewsCoordinator::new(provider, store);

  let connectivity = if args.offline {
    Connectivity::Offline
  } else {
    let probe = HttpProbe::new(&config.connectivity)
      .map_err(|e| eyre!("Failed to create connectivity probe: {}", e))?;
    let observer = ConnectivityObserver::subscribe(probe, config.connectivity.timeout());
    let settled = observer.settled().await;
    observer.stop().await;
    settled
  };
  info!(?connectivity, "connectivity settled");

  if !connectivity.is_online() {
    println!("[offline]");
  }

  match args.article {
    Some(id) => match coordinator.find_article(&id, connectivity).await {
      ArticleLookup::Found(article) => print_article(&article),
      other => println!("{}", other.message().unwrap_or_default()),
    },
    None => match coordinator.load_articles(args.category, connectivity).await {
      NewsResult::Articles(articles) => {
        for article in &articles {
          println!("{:<14} {}  ({})", article.category.as_str(), article.title, article.id);
        }
      }
      other => println!("{}", other.message().unwrap_or_default()),
    },
  }

  Ok(())
}

fn print_article(article: &Article) {
  println!("{}", article.title);
  println!("{} | {} | {}", article.category, article.author, article.published_at);
  println!();
  println!("{}", article.summary);
  println!();
  println!("{}", article.content);
}
