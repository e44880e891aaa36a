//! tabula CLI
//!
//! Command-line tool for compiling, creating, inspecting and importing
//! tables whose shape is only known at run time.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tabula_core::dialect::{Dialect, PostgresDialect, SqlServerDialect, SqliteDialect};
use tabula_sqlite::SqliteRepository;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Dynamic tables from the command line.
#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:tabula.sqlite3")]
    database: String,

    /// SQL dialect used to compile DDL.
    #[arg(long, value_enum, env = "TABULA_DIALECT", default_value_t = DialectKind::Sqlite)]
    dialect: DialectKind,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Backends DDL can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DialectKind {
    Sqlite,
    SqlServer,
    Postgres,
}

impl DialectKind {
    fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Sqlite => Arc::new(SqliteDialect::new()),
            Self::SqlServer => Arc::new(SqlServerDialect::new()),
            Self::Postgres => Arc::new(PostgresDialect::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CREATE TABLE statement for a table spec.
    Compile {
        /// JSON file holding the table spec.
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Create a table from a table spec.
    Create {
        /// JSON file holding the table spec.
        #[arg(short, long)]
        spec: PathBuf,
    },

    /// Show the column metadata of a table.
    Columns {
        #[arg(short, long)]
        table: String,
    },

    /// Check a list of column changes against a table.
    ValidateUpdate {
        #[arg(short, long)]
        table: String,

        /// JSON file holding an array of column changes.
        #[arg(short, long)]
        changes: PathBuf,
    },

    /// Print the input template of a table.
    Template {
        #[arg(short, long)]
        table: String,
    },

    /// Import a cell grid into a table.
    Import {
        #[arg(short, long)]
        table: String,

        /// JSON file holding an array of rows of cell texts; row 1 is the header.
        #[arg(short, long)]
        grid: PathBuf,

        /// Upsert rows by this key column instead of inserting.
        #[arg(long)]
        upsert: Option<String>,

        /// Write the rows even when ingestion reported problems.
        #[arg(long)]
        allow_warnings: bool,
    },

    /// Drop a table if it exists.
    Drop {
        #[arg(short, long)]
        table: String,
    },

    /// Rename a table.
    Rename {
        #[arg(short, long)]
        table: String,

        /// New table name.
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = cli.dialect.dialect();
    let repo = SqliteRepository::new(cli.database);

    match cli.command {
        Commands::Compile { spec } => {
            println!("{}", commands::compile(&spec, dialect)?);
        }

        Commands::Create { spec } => {
            if cli.dialect != DialectKind::Sqlite {
                tracing::warn!(
                    dialect = %dialect.name(),
                    "Tables are always created with the SQLite dialect"
                );
            }
            commands::create(&repo, &spec).await?;
        }

        Commands::Columns { table } => {
            println!("{}", commands::columns(&repo, &table).await?);
        }

        Commands::ValidateUpdate { table, changes } => {
            commands::validate_update(&repo, dialect, &table, &changes).await?;
        }

        Commands::Template { table } => {
            println!("{}", commands::template(&repo, &table).await?);
        }

        Commands::Import {
            table,
            grid,
            upsert,
            allow_warnings,
        } => {
            let options = commands::ImportOptions {
                upsert,
                allow_warnings,
            };
            commands::import(&repo, &table, &grid, &options).await?;
        }

        Commands::Drop { table } => {
            repo.drop_table(&table).await?;
        }

        Commands::Rename { table, to } => {
            repo.rename_table(&table, &to).await?;
        }
    }

    Ok(())
}
