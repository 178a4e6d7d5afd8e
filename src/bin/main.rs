//! Strata CLI - rewrite SQL for a backend and talk to it
//!
//! Usage:
//!   strata compile <sql> [--backend <kind>] [--manifest <file.json>]
//!   strata transpile <sql> --read <dialect> --write <dialect>
//!   strata schema
//!   strata describe <sql>
//!   strata query <sql>
//!   strata cache <name> <sql>
//!
//! Examples:
//!   strata compile "SELECT cat.sch.t.a FROM cat.sch.t" --backend bigquery
//!   strata transpile "SELECT ifnull(a, 0) FROM t" --read sqlite --write postgres
//!   STRATA_CONFIG=./strata.toml strata schema

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use strata::cache::{CacheDelegate, CacheDelegateSelector};
use strata::compile::{transpile, CompileOptions, Compiler};
use strata::config::{BackendKind, Settings};
use strata::connector::{BuiltinConnectors, Connector, ConnectorFactory};
use strata::manifest::Manifest;
use strata::sql::Dialect;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - SQL rewriting and backend connectors for data warehouses")]
#[command(version)]
struct Cli {
    /// Config file (defaults to STRATA_CONFIG, ./strata.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite and emit SQL for a backend
    Compile {
        /// SQL text, or `@path` to read it from a file
        sql: String,

        /// Target backend (defaults to the configured one)
        #[arg(short, long, value_parser = parse_backend)]
        backend: Option<BackendKind>,

        /// Manifest JSON file
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Dialect the input is written in
        #[arg(short, long, default_value = "postgres")]
        read: DialectArg,

        /// Skip the rewrite pipeline
        #[arg(long)]
        no_rewrite: bool,
    },

    /// Translate SQL between dialects
    Transpile {
        /// SQL text, or `@path` to read it from a file
        sql: String,

        #[arg(short, long, default_value = "postgres")]
        read: DialectArg,

        #[arg(short, long)]
        write: DialectArg,
    },

    /// Print the configured backend's columns as JSON
    Schema,

    /// Print the result columns of a statement as JSON
    Describe {
        sql: String,
    },

    /// Run a statement and print each row as a JSON array
    Query {
        sql: String,
    },

    /// Materialize a statement through the configured cache delegate
    Cache {
        name: String,
        sql: String,

        #[arg(long, default_value = "")]
        catalog: String,

        #[arg(long, default_value = "main")]
        schema: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Duckdb,
    Postgres,
    Snowflake,
    Bigquery,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Bigquery => Dialect::BigQuery,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    BackendKind::from_str(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    strata::logging::init(&settings.logging.filter);

    match cli.command {
        Commands::Compile {
            sql,
            backend,
            manifest,
            read,
            no_rewrite,
        } => cmd_compile(&settings, sql, backend, manifest, read, no_rewrite),
        Commands::Transpile { sql, read, write } => cmd_transpile(sql, read, write),
        Commands::Schema => cmd_schema(&settings),
        Commands::Describe { sql } => cmd_describe(&settings, &sql),
        Commands::Query { sql } => cmd_query(&settings, &sql),
        Commands::Cache {
            name,
            sql,
            catalog,
            schema,
        } => cmd_cache(cli.config, &name, &sql, &catalog, &schema),
    }
}

fn load_settings(path: Option<&PathBuf>) -> strata::config::SettingsResult<Settings> {
    match path {
        Some(p) => Settings::from_file(p),
        None => Settings::load(),
    }
}

/// `@path` reads the statement from a file.
fn read_sql(arg: String) -> Result<String, String> {
    match arg.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {}", path, e))
        }
        None => Ok(arg),
    }
}

fn cmd_compile(
    settings: &Settings,
    sql: String,
    backend: Option<BackendKind>,
    manifest: Option<PathBuf>,
    read: DialectArg,
    no_rewrite: bool,
) -> ExitCode {
    let sql = match read_sql(sql) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let manifest = match manifest {
        Some(path) => match Manifest::from_file(&path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error loading manifest '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Manifest::default(),
    };

    let mut options = CompileOptions::default().with_read_dialect(read.into());
    if no_rewrite {
        options = options.without_rewrite();
    }
    let compiler = Compiler::new(Arc::new(manifest), backend.unwrap_or(settings.backend))
        .with_options(options);

    match compiler.compile(&sql) {
        Ok(compiled) => {
            println!("{}", compiled.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_transpile(sql: String, read: DialectArg, write: DialectArg) -> ExitCode {
    let sql = match read_sql(sql) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match transpile(&sql, read.into(), write.into()) {
        Ok(output) => {
            println!("{}", output.sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Transpile error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn connect(settings: &Settings) -> Result<Arc<dyn Connector>, String> {
    match BuiltinConnectors.create(settings.backend, settings) {
        Ok(Some(connector)) => Ok(connector),
        Ok(None) => Err(format!(
            "No connector available for backend '{}'",
            settings.backend
        )),
        Err(e) => Err(format!("Connection error: {}", e)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_schema(settings: &Settings) -> ExitCode {
    let connector = match connect(settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    match connector.get_schema() {
        Ok(columns) => print_json(&columns),
        Err(e) => {
            eprintln!("Schema error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_describe(settings: &Settings, sql: &str) -> ExitCode {
    let connector = match connect(settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    match connector.describe(sql, &[]) {
        Ok(columns) => print_json(&columns),
        Err(e) => {
            eprintln!("Describe error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_query(settings: &Settings, sql: &str) -> ExitCode {
    let connector = match connect(settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let rows = match connector.query(sql, &[]) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Query error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let names: Vec<_> = rows.columns().iter().map(|c| c.name.as_str()).collect();
    println!("{}", names.join("\t"));
    for row in rows {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Query error: {}", e);
                return ExitCode::FAILURE;
            }
        };
        match serde_json::to_string(&row) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Serialization error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_cache(
    config: Option<PathBuf>,
    name: &str,
    sql: &str,
    catalog: &str,
    schema: &str,
) -> ExitCode {
    let source = move || load_settings(config.as_ref());
    let selector = match CacheDelegateSelector::new(source, Arc::new(BuiltinConnectors)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Cache error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match selector.materialize(catalog, schema, name, sql) {
        Ok(Some(location)) => {
            println!("{}", location.quoted());
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("Caching is disabled for backend '{}'", selector.current_kind());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Cache error: {}", e);
            ExitCode::FAILURE
        }
    }
}
