use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io;
use tracing_subscriber::EnvFilter;

use gofin_core::{summarize, SystemClock, TransactionEdit};
use gofin_finance::{recognize_kind, IngestPipeline};
use gofin_ingest::ChatCompletionsClient;
use gofin_store::SqliteStore;

mod auth;
mod config;
mod output;
mod state;

use config::Config;
use output::{write_list, ListFormat};

#[derive(Parser, Debug)]
#[command(
    name = "gofin",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GOFIN_BUILD_SHA"), ")"),
    about = "Turn plain-language money notes into stored transactions"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from text and store them
    Ingest {
        /// e.g. "Recebi 1000 de salário e gastei 50 no mercado"
        text: Option<String>,

        /// Owner of the new records (defaults to the demo account)
        #[arg(long)]
        user_id: Option<String>,

        /// Raw request body: {"text": "...", "userId": "..."}
        #[arg(long, conflicts_with_all = ["text", "user_id"])]
        json: Option<String>,
    },

    /// List stored transactions, newest first
    List {
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long, value_enum, default_value_t = ListFormat::Json)]
        format: ListFormat,

        /// Shorthand for --format csv
        #[arg(long)]
        csv: bool,
    },

    /// Totals by type, expenses by category and counts by month
    Summary {
        #[arg(long)]
        user_id: Option<String>,
    },

    /// Edit a stored transaction
    Edit {
        id: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        amount: Option<f64>,

        /// receita/despesa (or income/expense)
        #[arg(long = "type")]
        kind: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a stored transaction
    Delete { id: String },

    /// Create (or show) the demo account
    DemoUser,

    /// Manage ~/.gofin/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Manage the model API key
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an API key in ~/.gofin/auth.json
    PasteApiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Ingest {
            text,
            user_id,
            json,
        } => {
            let body = match (json, text) {
                (Some(raw), _) => {
                    serde_json::from_str::<Value>(&raw).context("parse --json body")?
                }
                (None, Some(text)) => json!({ "text": text, "userId": user_id }),
                (None, None) => bail!("pass the text to ingest, or --json '<body>'"),
            };
            ingest(&body).await?;
        }

        Command::List {
            user_id,
            format,
            csv,
        } => {
            let cfg = config::load_config()?;
            let store = open_store(&cfg)?;
            let records = match owner(&store, &cfg, user_id)? {
                Some(id) => store.list_for_user(&id)?,
                None => Vec::new(),
            };
            let format = if csv { ListFormat::Csv } else { format };
            let tz = cfg.pipeline_settings()?.timezone;
            write_list(&mut io::stdout().lock(), &records, format, tz)?;
        }

        Command::Summary { user_id } => {
            let cfg = config::load_config()?;
            let store = open_store(&cfg)?;
            let records = match owner(&store, &cfg, user_id)? {
                Some(id) => store.list_for_user(&id)?,
                None => Vec::new(),
            };
            let summary = summarize(&records, cfg.pipeline_settings()?.timezone);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Edit {
            id,
            description,
            amount,
            kind,
            category,
        } => {
            let kind = match kind {
                Some(k) => Some(
                    recognize_kind(&k)
                        .with_context(|| format!("unknown type '{k}' (use receita or despesa)"))?,
                ),
                None => None,
            };
            let edit = TransactionEdit {
                description,
                amount,
                kind,
                category,
            };
            if edit == TransactionEdit::default() {
                bail!("nothing to change; pass --description, --amount, --type or --category");
            }
            let cfg = config::load_config()?;
            let store = open_store(&cfg)?;
            let updated = store
                .update(&id, &edit)
                .with_context(|| format!("edit {id}"))?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }

        Command::Delete { id } => {
            let cfg = config::load_config()?;
            let store = open_store(&cfg)?;
            store.delete(&id).with_context(|| format!("delete {id}"))?;
            println!("Deleted {id}");
        }

        Command::DemoUser => {
            let cfg = config::load_config()?;
            let store = open_store(&cfg)?;
            let demo = cfg.demo_account();
            let user = store.upsert_user(&demo.email, &demo.name)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteApiKey => auth::paste_api_key()?,
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(cfg: &Config) -> Result<SqliteStore> {
    let path = cfg.db_path()?;
    tracing::debug!(db = %path.display(), "opening store");
    SqliteStore::open(&path).with_context(|| format!("open database {}", path.display()))
}

/// Explicit id, else the demo account if it already exists. Never creates a user.
fn owner(store: &SqliteStore, cfg: &Config, user_id: Option<String>) -> Result<Option<String>> {
    if let Some(id) = user_id.filter(|u| !u.trim().is_empty()) {
        return Ok(Some(id));
    }
    Ok(store
        .find_user_by_email(&cfg.profile.demo_email)?
        .map(|u| u.id))
}

async fn ingest(body: &Value) -> Result<()> {
    let cfg = config::load_config()?;
    let api_key = auth::resolve_api_key()?;
    let mut store = open_store(&cfg)?;
    let client = ChatCompletionsClient::new(cfg.client_settings()).context("build HTTP client")?;
    let pipeline = IngestPipeline::new(client, SystemClock, cfg.pipeline_settings()?);

    let resp = pipeline.handle(&mut store, body, api_key.as_deref()).await;
    println!("{}", serde_json::to_string_pretty(&resp.body)?);

    if !resp.is_success() {
        bail!("ingest failed with status {}", resp.status);
    }
    Ok(())
}
