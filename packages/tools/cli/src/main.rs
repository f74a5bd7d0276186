//! Quill CLI (`quill`)
//!
//! 문장 파라미터(JSON)로 SQL을 조립해 미리 보거나 실제 DB에서 실행하는 도구입니다.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quill_sql::StatementKind;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about = "Quill CLI - typed SQL statement tool", long_about = None)]
struct Cli {
    /// Database URL (overrides QUILL_DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Kind {
    Select,
    Insert,
    Update,
    Delete,
}

impl From<Kind> for StatementKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Select => StatementKind::Select,
            Kind::Insert => StatementKind::Insert,
            Kind::Update => StatementKind::Update,
            Kind::Delete => StatementKind::Delete,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Offline
    // ─────────────────────────────────────────────────────────────────────────
    /// Print the resolved SQL without touching a database
    Render {
        /// Statement kind
        kind: Kind,

        /// Statement params as JSON, or @path to a JSON file
        #[arg(long)]
        params: String,

        /// Also print the template and bindings
        #[arg(long)]
        explain: bool,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Database
    // ─────────────────────────────────────────────────────────────────────────
    /// Run the statement and print rows or the outcome
    Exec {
        /// Statement kind
        kind: Kind,

        /// Statement params as JSON, or @path to a JSON file
        #[arg(long)]
        params: String,
    },
}

fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=info,quill_sql=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            kind,
            params,
            explain,
        } => commands::statement::render(kind.into(), &params, explain, cli.format),
        Commands::Exec { kind, params } => {
            let db = config::database_config(cli.database_url)?;
            commands::statement::exec(&db, kind.into(), &params, cli.format)
        }
    }
}
