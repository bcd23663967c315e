//! # discord-search CLI (`dsearch`)
//!
//! Search a guild's messages from the command line and print the matching
//! message ids (default) or full records as JSON.
//!
//! ## Usage
//!
//! ```bash
//! export DISCORD_TOKEN="..."
//!
//! # Ids of pinned messages mentioning a user
//! dsearch 81384788765712384 --mentions 190203190 --pinned
//!
//! # Full records for a text search, newest first, capped at 50
//! dsearch 81384788765712384 --text "release notes" --sort new --amount 50 --full
//!
//! # Through a SOCKS proxy, written to a file
//! dsearch 81384788765712384 --text deploy --proxy socks5://127.0.0.1:9050 \
//!     --full --output messages.json
//! ```
//!
//! Pages are printed as they arrive; set `RUST_LOG=discord_search=debug`
//! for per-page progress.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use discord_search::{
    HasKind, Hit, Projection, SearchClient, SearchFilters, SearchOptions, SortMode,
};

/// Search a Discord guild's messages.
///
/// The token is read from `--token` or the `DISCORD_TOKEN` environment
/// variable. At least one filter besides `--include-nsfw` must be given.
#[derive(Parser)]
#[command(name = "dsearch", version, about = "Search a Discord guild's messages")]
struct Cli {
    /// Guild to search in.
    guild_id: u64,

    /// Text to search for.
    #[arg(long)]
    text: Option<String>,

    /// Only messages authored by this user id.
    #[arg(long)]
    from_user: Option<u64>,

    /// Only messages in this channel id.
    #[arg(long)]
    in_channel: Option<u64>,

    /// Only messages mentioning this user id.
    #[arg(long)]
    mentions: Option<u64>,

    /// Only messages containing this content kind:
    /// link, embed, file, video, image, sound, or sticker.
    #[arg(long)]
    has: Option<HasKind>,

    /// Only messages before this date (YYYY-MM-DD).
    #[arg(long)]
    before: Option<NaiveDate>,

    /// Only messages during this date (YYYY-MM-DD), one day of slack on
    /// each side.
    #[arg(long)]
    during: Option<NaiveDate>,

    /// Only messages after this date (YYYY-MM-DD).
    #[arg(long)]
    after: Option<NaiveDate>,

    /// Only pinned messages.
    #[arg(long)]
    pinned: bool,

    /// Skip messages in nsfw channels.
    #[arg(long)]
    exclude_nsfw: bool,

    /// Result order: relevant, new, or old.
    #[arg(long)]
    sort: Option<SortMode>,

    /// Starting result offset (pagination advances from here).
    #[arg(long)]
    offset: Option<u64>,

    /// Maximum number of messages to fetch. Default: all matches.
    #[arg(long)]
    amount: Option<u64>,

    /// Print full message records as JSON instead of ids.
    #[arg(long)]
    full: bool,

    /// Proxy url (socks5://... or http://...).
    #[arg(long)]
    proxy: Option<String>,

    /// Discord user token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: String,

    /// API host to talk to.
    #[arg(long, default_value = "canary.discord.com")]
    host: String,

    /// Write the results as a JSON array to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::new().guild_id(self.guild_id);
        if let Some(text) = &self.text {
            filters = filters.text(text);
        }
        if let Some(id) = self.from_user {
            filters = filters.from_user(id);
        }
        if let Some(id) = self.in_channel {
            filters = filters.in_channel(id);
        }
        if let Some(id) = self.mentions {
            filters = filters.mentions(id);
        }
        if let Some(kind) = self.has {
            filters = filters.has(kind);
        }
        if let Some(date) = self.before {
            filters = filters.before(date);
        }
        if let Some(date) = self.during {
            filters = filters.during(date);
        }
        if let Some(date) = self.after {
            filters = filters.after(date);
        }
        if self.pinned {
            filters = filters.pinned(true);
        }
        if self.exclude_nsfw {
            filters = filters.include_nsfw(false);
        }
        if let Some(mode) = self.sort {
            filters = filters.sort(mode);
        }
        if let Some(offset) = self.offset {
            filters = filters.offset(offset);
        }
        filters
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = SearchClient::builder(&cli.token).host(&cli.host);
    if let Some(proxy) = &cli.proxy {
        builder = builder.proxy(proxy);
    }
    let client = builder.build()?;

    let options = SearchOptions {
        amount: cli.amount,
        projection: if cli.full {
            Projection::Records
        } else {
            Projection::Ids
        },
    };

    let filters = cli.filters();
    let mut pages = client.pages(&filters, &options)?;
    let mut collected: Vec<Hit> = Vec::new();
    let mut total = 0u64;

    while let Some(page) = pages.next_page().await? {
        total = page.total_results;
        if cli.output.is_none() && !cli.full {
            // Stream ids as pages arrive; records are printed at the end
            // as one JSON array.
            for hit in &page.hits {
                if let Some(id) = hit.id() {
                    println!("{}", id);
                }
            }
        }
        collected.extend(page.hits);
    }

    eprintln!("fetched {} of {} matching messages", collected.len(), total);

    if cli.full || cli.output.is_some() {
        // Hits serialize untagged: ids as strings, records as objects.
        let rendered = serde_json::to_string_pretty(&collected)?;

        match &cli.output {
            Some(path) => std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{}", rendered),
        }
    }

    Ok(())
}
