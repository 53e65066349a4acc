//! schemascope CLI - Browse Dataverse table metadata
//!
//! Usage:
//!   schemascope tables [--search <query>] [--custom-only]
//!   schemascope columns <table> [--search <query>]
//!   schemascope relationships <table>
//!   schemascope choices <table> <column>
//!   schemascope diagram <table> [--output <file>]
//!   schemascope links <table>
//!
//! Examples:
//!   schemascope --url https://contoso.crm.dynamics.com tables --search acc
//!   schemascope diagram account --output account.mmd
//!   RUST_LOG=schemascope=debug schemascope columns contact

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use schemascope::cache::MetadataCache;
use schemascope::client::MetadataClient;
use schemascope::config::Settings;
use schemascope::diagram::{DiagramInput, ErDiagramBuilder};
use schemascope::links::{build_maker_edit_url, build_view_url};
use schemascope::loader::{DataLoader, LoadStatus};
use schemascope::metadata::HttpMetadataProvider;
use schemascope::search::{filter_columns, filter_tables};

type Loader = DataLoader<HttpMetadataProvider>;

#[derive(Parser)]
#[command(name = "schemascope")]
#[command(about = "schemascope - Browse Dataverse table metadata and draw ER diagrams")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to the usual search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Organization URL, overrides the config file
    #[arg(long, global = true)]
    url: Option<String>,

    /// Bearer token, overrides the config file
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format for listings
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables
    Tables {
        /// Filter by display or logical name
        #[arg(short, long)]
        search: Option<String>,

        /// Only custom tables
        #[arg(long)]
        custom_only: bool,
    },

    /// List the columns of a table
    Columns {
        /// Table logical name
        table: String,

        /// Filter by display or logical name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List the relationships of a table
    Relationships {
        /// Table logical name
        table: String,
    },

    /// List the options of a choice column
    Choices {
        /// Table logical name
        table: String,

        /// Column logical name
        column: String,
    },

    /// Print a Mermaid ER diagram for a table
    Diagram {
        /// Table logical name
        table: String,

        /// Write the diagram to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the web client and maker portal links of a table
    Links {
        /// Table logical name
        table: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Tab-separated text
    Text,
    /// Pretty-printed JSON
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match MetadataClient::from_settings(&settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let org_url = client.org_url().to_string();

    let loader = DataLoader::new(
        Arc::new(HttpMetadataProvider::with_client(client)),
        Arc::new(MetadataCache::new()),
        settings.loader.to_options(),
    );

    let format = cli.format;
    match cli.command {
        Commands::Tables {
            search,
            custom_only,
        } => cmd_tables(&loader, search, custom_only, format).await,
        Commands::Columns { table, search } => cmd_columns(&loader, &table, search, format).await,
        Commands::Relationships { table } => cmd_relationships(&loader, &table, format).await,
        Commands::Choices { table, column } => cmd_choices(&loader, &table, &column, format).await,
        Commands::Diagram { table, output } => {
            cmd_diagram(&loader, &settings, &table, output, format).await
        }
        Commands::Links { table } => cmd_links(&loader, &settings, &org_url, &table, format).await,
    }
}

/// Log to stderr so stdout stays clean for diagram text.
fn init_tracing() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    if let Some(url) = &cli.url {
        settings.connection.url = url.clone();
    }
    if let Some(token) = &cli.token {
        settings.connection.token = Some(token.clone());
    }
    Ok(settings)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Print the stored error of a failed load and return failure.
fn report_failure(what: &str, error: Option<String>) -> ExitCode {
    eprintln!(
        "Error loading {}: {}",
        what,
        error.unwrap_or_else(|| "unknown error".to_string())
    );
    ExitCode::FAILURE
}

async fn cmd_tables(
    loader: &Loader,
    search: Option<String>,
    custom_only: bool,
    format: OutputFormat,
) -> ExitCode {
    loader.load_tables().await;
    if loader.table_status() == LoadStatus::Error {
        return report_failure("tables", loader.table_error());
    }

    let tables = loader.tables().await;
    let matched: Vec<_> = filter_tables(&tables, search.as_deref().unwrap_or_default())
        .into_iter()
        .filter(|t| !custom_only || t.is_custom_entity)
        .collect();

    match format {
        OutputFormat::Json => print_json(&matched),
        OutputFormat::Text => {
            for table in &matched {
                let custom = if table.is_custom_entity { "custom" } else { "" };
                println!("{}\t{}\t{}", table.logical_name, table.display_name, custom);
            }
            eprintln!("{} of {} tables", matched.len(), tables.len());
            ExitCode::SUCCESS
        }
    }
}

async fn cmd_columns(
    loader: &Loader,
    table: &str,
    search: Option<String>,
    format: OutputFormat,
) -> ExitCode {
    loader.load_columns(table).await;
    if loader.column_status(table) == LoadStatus::Error {
        return report_failure("columns", loader.column_error(table));
    }

    let columns = loader.cache().columns(table).unwrap_or_default();
    let matched = filter_columns(&columns, search.as_deref().unwrap_or_default());

    match format {
        OutputFormat::Json => print_json(&matched),
        OutputFormat::Text => {
            for column in matched {
                let pk = if column.is_primary_key { "PK" } else { "" };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    column.logical_name,
                    column.display_name,
                    column.column_type,
                    column.requirement,
                    pk
                );
            }
            ExitCode::SUCCESS
        }
    }
}

async fn cmd_relationships(loader: &Loader, table: &str, format: OutputFormat) -> ExitCode {
    loader.load_relationships(table).await;
    if loader.relationship_status(table) == LoadStatus::Error {
        return report_failure("relationships", loader.relationship_error(table));
    }

    let relationships = loader.cache().relationships(table).unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&relationships),
        OutputFormat::Text => {
            for rel in &relationships {
                let via = rel
                    .intersect_entity_name
                    .as_deref()
                    .or(rel.referencing_attribute.as_deref())
                    .unwrap_or_default();
                println!(
                    "{}\t{}\t{}\t{}",
                    rel.kind, rel.schema_name, rel.related_table_logical_name, via
                );
            }
            ExitCode::SUCCESS
        }
    }
}

async fn cmd_choices(loader: &Loader, table: &str, column: &str, format: OutputFormat) -> ExitCode {
    // Column metadata selects the request shape for the options.
    loader.load_columns(table).await;
    loader.load_choice_options(table, column, None).await;
    if loader.choice_status(table, column) == LoadStatus::Error {
        return report_failure("choice options", loader.choice_error(table, column));
    }

    let options = loader.cache().choices(table, column).unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&options),
        OutputFormat::Text => {
            for option in &options {
                println!("{}\t{}", option.value, option.label);
            }
            ExitCode::SUCCESS
        }
    }
}

async fn cmd_diagram(
    loader: &Loader,
    settings: &Settings,
    table: &str,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> ExitCode {
    let deny_list = match settings.diagram.deny_list() {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::join!(
        loader.load_tables(),
        loader.load_columns(table),
        loader.load_relationships(table),
    );
    if loader.column_status(table) == LoadStatus::Error {
        return report_failure("columns", loader.column_error(table));
    }
    if loader.relationship_status(table) == LoadStatus::Error {
        return report_failure("relationships", loader.relationship_error(table));
    }

    let columns = loader.cache().columns(table).unwrap_or_default();
    let relationships = loader.cache().relationships(table).unwrap_or_default();
    // Without the table list every custom-only relationship is omitted.
    let custom = if loader.table_status() == LoadStatus::Success {
        Some(loader.custom_lookup().await)
    } else {
        None
    };

    let diagram = ErDiagramBuilder::new(deny_list).build(DiagramInput {
        table_logical_name: table,
        columns: &columns,
        relationships: &relationships,
        custom_lookup: custom.as_ref(),
    });

    if let Some(path) = output {
        if let Err(e) = fs::write(&path, &diagram.code) {
            eprintln!("Error writing '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        eprintln!("Wrote {}", path.display());
        eprintln!("{}", diagram.summary());
        return ExitCode::SUCCESS;
    }

    match format {
        OutputFormat::Json => print_json(&diagram),
        OutputFormat::Text => {
            println!("{}", diagram.code);
            eprintln!("{}", diagram.summary());
            ExitCode::SUCCESS
        }
    }
}

#[derive(Serialize)]
struct Links {
    view_url: String,
    maker_url: String,
}

async fn cmd_links(
    loader: &Loader,
    settings: &Settings,
    org_url: &str,
    table: &str,
    format: OutputFormat,
) -> ExitCode {
    let environment_id = match loader.environment_id().await {
        Ok(id) => Some(id),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };

    let links = Links {
        view_url: build_view_url(org_url, table),
        maker_url: build_maker_edit_url(
            &settings.links.maker_portal_url,
            environment_id.as_deref(),
            Some(settings.links.solution_id.as_str()),
            Some(table),
        ),
    };

    match format {
        OutputFormat::Json => print_json(&links),
        OutputFormat::Text => {
            println!("{}", links.view_url);
            println!("{}", links.maker_url);
            ExitCode::SUCCESS
        }
    }
}
