//! Update Map CLI
//!
//! Command-line interface for projecting JSON payloads into update maps.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use update_map::{
    build_document_update_map, build_relational_update_map_with, explain_keys, load_payload,
    load_record_schema, to_snake_case, update_map_to_json, BuildOptions, NamingStrategy,
    RecordSchema, SkipSet, UpdateMap,
};

#[derive(Parser)]
#[command(name = "update-map")]
#[command(about = "Project JSON payloads into column/value update maps")]
#[command(version)]
struct Cli {
    /// Log field resolution decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Naming {
    /// snake_case with acronym handling
    Snake,
    /// Keep declared names as-is
    Identity,
}

impl Naming {
    fn strategy(self) -> NamingStrategy {
        match self {
            Naming::Snake => NamingStrategy::snake_case(),
            Naming::Identity => NamingStrategy::identity(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a relational update map (column annotations, embedding, JSONB)
    Relational {
        /// Payload file
        payload: PathBuf,

        /// Record schema file describing the payload's fields
        #[arg(long)]
        schema: PathBuf,

        /// Key to leave out (repeatable, matched after prefixing)
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// Fallback naming strategy
        #[arg(long, value_enum, default_value_t = Naming::Snake)]
        naming: Naming,

        /// Maximum depth of nested embedded groups
        #[arg(long, default_value_t = update_map::DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Build a document-store update map
    Document {
        /// Payload file
        payload: PathBuf,

        /// Record schema file describing the payload's fields
        #[arg(long)]
        schema: PathBuf,

        /// Key to leave out (repeatable)
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show which key each field resolves to and why
    Explain {
        /// Payload file
        payload: PathBuf,

        /// Record schema file describing the payload's fields
        #[arg(long)]
        schema: PathBuf,

        /// Fallback naming strategy
        #[arg(long, value_enum, default_value_t = Naming::Snake)]
        naming: Naming,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the snake_case form of each name
    Snake {
        /// Names to convert
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Relational {
            payload,
            schema,
            skip,
            naming,
            max_depth,
            output,
            pretty,
        } => {
            let options = BuildOptions::new()
                .naming(naming.strategy())
                .max_depth(max_depth);
            run_relational(&payload, &schema, skip, &options, output, pretty)
        }

        Commands::Document {
            payload,
            schema,
            skip,
            output,
            pretty,
        } => run_document(&payload, &schema, skip, output, pretty),

        Commands::Explain {
            payload,
            schema,
            naming,
            json,
        } => run_explain(&payload, &schema, naming, json),

        Commands::Snake { names } => {
            for name in names {
                println!("{}", to_snake_case(&name));
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_inputs(payload_path: &Path, schema_path: &Path) -> Result<(Value, RecordSchema), u8> {
    let schema = load_record_schema(schema_path).map_err(|e| {
        eprintln!("Error loading schema: {}", e);
        e.exit_code() as u8
    })?;

    let payload = load_payload(payload_path).map_err(|e| {
        eprintln!("Error loading payload: {}", e);
        e.exit_code() as u8
    })?;

    Ok((payload, schema))
}

fn run_relational(
    payload_path: &Path,
    schema_path: &Path,
    skip: Vec<String>,
    options: &BuildOptions,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (payload, schema) = load_inputs(payload_path, schema_path)?;
    let skip: SkipSet = skip.into_iter().collect();

    let record = schema.bind(&payload);

    let map = build_relational_update_map_with(&record, &skip, options).map_err(|e| {
        eprintln!("Error: {}", e);
        if !e.partial.is_empty() {
            eprintln!("  {} field(s) were mapped before the failure", e.partial.len());
        }
        e.exit_code() as u8
    })?;

    write_map(&map, output, pretty)
}

fn run_document(
    payload_path: &Path,
    schema_path: &Path,
    skip: Vec<String>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let (payload, schema) = load_inputs(payload_path, schema_path)?;
    let skip: SkipSet = skip.into_iter().collect();

    let record = schema.bind(&payload);

    let map = build_document_update_map(&record, &skip);
    write_map(&map, output, pretty)
}

fn run_explain(
    payload_path: &Path,
    schema_path: &Path,
    naming: Naming,
    json_output: bool,
) -> Result<(), u8> {
    let (payload, schema) = load_inputs(payload_path, schema_path)?;
    let options = BuildOptions::new().naming(naming.strategy());

    let explanations = explain_keys(&schema.bind(&payload), &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json_output {
        let rendered = serde_json::to_string(&explanations).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    for explanation in explanations {
        let key = if explanation.key.is_empty() {
            "(skipped)"
        } else {
            explanation.key.as_str()
        };
        let source = explanation.source.map(|s| s.as_str()).unwrap_or("none");
        let mut notes = Vec::new();
        if explanation.semi_structured {
            notes.push("jsonb");
        }
        if explanation.absent {
            notes.push("absent");
        }
        if notes.is_empty() {
            println!("{} -> {} [{}]", explanation.field, key, source);
        } else {
            println!(
                "{} -> {} [{}] ({})",
                explanation.field,
                key,
                source,
                notes.join(", ")
            );
        }
    }

    Ok(())
}

fn write_map(map: &UpdateMap<'_>, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let rendered = update_map_to_json(map).and_then(|value| {
        if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    });
    let json_output = rendered.map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        1u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}
