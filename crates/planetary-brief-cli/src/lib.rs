#![allow(clippy::print_stdout)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use planetary_brief_app_state::category::legacy_aliases;
use planetary_brief_app_state::session::EXPLANATION_DATA_KEY;
use planetary_brief_app_state::{
    Article, ArticleIndex, CATEGORY_LABELS, ExplanationPayload, HOME_CATEGORY_LABELS,
    ListingFilter, MemoryEnvironment, NavigationEnvironment, Navigator, RouterConfig, ViewState,
    category_to_slug,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "brief-route")]
#[command(about = "Resolve Planetary Brief deep links the way the web client does")]
pub struct BriefRouteCli {
    /// Overrides PLANETARY_BRIEF_ARTICLES_ENDPOINT
    #[arg(long, global = true)]
    pub articles_endpoint: Option<String>,
    /// Overrides PLANETARY_BRIEF_LISTING_ANCHOR
    #[arg(long, global = true)]
    pub listing_anchor: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cold-load a URL and report the view, canonical URL and history writes
    Resolve(ResolveArgs),
    /// Print the category table with slugs and legacy aliases
    Categories,
    /// List articles from an export, newest first
    Listing(ListingArgs),
    /// Print the effective router configuration
    Config,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    pub url: String,
    /// Article export (JSON array) delivered after cold start
    #[arg(long)]
    pub articles: Option<PathBuf>,
    /// Explanation payload (JSON) to seed the session store with
    #[arg(long)]
    pub explanation: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListingArgs {
    #[arg(long)]
    pub articles: PathBuf,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub query: Option<String>,
}

pub fn run() -> Result<()> {
    let cli = BriefRouteCli::parse();
    let config = router_config(&cli)?;
    init_tracing(&config.log_filter);
    let output = execute(&cli.command, config)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Environment configuration with command-line overrides applied.
pub fn router_config(cli: &BriefRouteCli) -> Result<RouterConfig> {
    let mut config =
        RouterConfig::from_env().context("read router configuration from environment")?;
    if let Some(endpoint) = &cli.articles_endpoint {
        config.articles_endpoint.clone_from(endpoint);
    }
    if let Some(anchor) = &cli.listing_anchor {
        config.listing_anchor_id.clone_from(anchor);
    }
    config.validated().context("validate router configuration")
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn execute(command: &Commands, config: RouterConfig) -> Result<Value> {
    match command {
        Commands::Resolve(args) => resolve_url(args, config),
        Commands::Categories => Ok(category_table()),
        Commands::Listing(args) => listing(args),
        Commands::Config => Ok(json!({
            "articlesEndpoint": config.articles_endpoint,
            "listingAnchorId": config.listing_anchor_id,
            "logFilter": config.log_filter,
        })),
    }
}

fn resolve_url(args: &ResolveArgs, config: RouterConfig) -> Result<Value> {
    let mut env = MemoryEnvironment::new(&args.url);
    if let Some(path) = &args.explanation {
        let payload: ExplanationPayload = read_json(path)?;
        let encoded = serde_json::to_string(&payload).context("encode explanation payload")?;
        env = env.with_session_value(EXPLANATION_DATA_KEY, &encoded);
    }
    let requested = env.current_url().to_string();

    let mut navigator = Navigator::start(&mut env, config);
    let deferred = navigator.pending_article().map(ToString::to_string);
    if let Some(path) = &args.articles {
        let articles: Vec<Article> = read_json(path)?;
        debug!(count = articles.len(), path = %path.display(), "delivering article export");
        navigator.articles_loaded(&mut env, articles);
    }

    Ok(json!({
        "requested": requested,
        "view": navigator.view(),
        "url": env.current_url(),
        "rewritten": env.current_url() != requested,
        "deferredArticle": deferred,
        "pendingArticle": navigator.pending_article(),
        "entry": env.history_entry(),
        "historyLength": env.history_len(),
        "pushes": env.push_count(),
        "replaces": env.replace_count(),
    }))
}

fn category_table() -> Value {
    let categories: Vec<Value> = CATEGORY_LABELS
        .iter()
        .map(|label| {
            let view = ViewState::Category {
                label: (*label).to_string(),
            };
            json!({
                "label": label,
                "slug": category_to_slug(label),
                "path": view.canonical_path(),
            })
        })
        .collect();
    let aliases: Vec<Value> = legacy_aliases()
        .map(|(alias, label)| json!({ "alias": alias, "label": label }))
        .collect();
    json!({
        "home": HOME_CATEGORY_LABELS,
        "categories": categories,
        "legacyAliases": aliases,
    })
}

fn listing(args: &ListingArgs) -> Result<Value> {
    let articles: Vec<Article> = read_json(&args.articles)?;
    let index = ArticleIndex::loaded(articles);
    let filter = ListingFilter {
        category: args.category.clone(),
        tag: args.tag.clone(),
        query: args.query.clone(),
    };
    let rows: Vec<Value> = index
        .listing(&filter)
        .into_iter()
        .map(|article| {
            json!({
                "id": article.id,
                "title": article.title,
                "category": article.category,
                "date": article.date,
                "path": article.reference().path(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::{BriefRouteCli, Commands};

    #[test]
    fn cli_requires_subcommand() {
        let err = match BriefRouteCli::try_parse_from(["brief-route"]) {
            Ok(_) => panic!("expected missing subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn listing_requires_articles_export() {
        let err = match BriefRouteCli::try_parse_from(["brief-route", "listing"]) {
            Ok(_) => panic!("expected missing --articles parse error"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_overrides_parse_after_subcommand() {
        let cli = BriefRouteCli::try_parse_from([
            "brief-route",
            "resolve",
            "/?article=42",
            "--articles",
            "export.json",
            "--listing-anchor",
            "results",
        ])
        .expect("valid invocation");
        assert_eq!(cli.listing_anchor.as_deref(), Some("results"));
        let Commands::Resolve(args) = cli.command else {
            panic!("expected resolve subcommand");
        };
        assert_eq!(args.url, "/?article=42");
        assert_eq!(
            args.articles.as_deref(),
            Some(std::path::Path::new("export.json"))
        );
    }
}
