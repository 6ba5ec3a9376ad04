//! Schema Form CLI
//!
//! Command-line interface for building and validating JSON Schema forms.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use schema_form::{
    build_form, get_control_validators, get_from_schema, get_input_type, get_schema_reference,
    is_input_required, load_options, load_schema, validate, validate_controls, FieldError,
    FormOptions, ReferenceLibrary, ValidateError, ValidatorRegistry,
};

#[derive(Parser)]
#[command(name = "schema-form")]
#[command(about = "Derive form-control models from JSON Schema")]
#[command(version)]
struct Cli {
    /// Log resolution details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the form model (layout, control template, field map)
    Build {
        /// Schema file
        schema: PathBuf,

        /// Initial data file
        #[arg(long)]
        data: Option<PathBuf>,

        /// Form options file (defaults and layout overrides)
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the resolved schema, widget, required flag and validators for one field
    Field {
        /// Schema file
        schema: PathBuf,

        /// Data pointer of the field (e.g. /address/street)
        pointer: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a data document against the schema and its form controls
    Validate {
        /// Schema file
        schema: PathBuf,

        /// Data file to validate
        data: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            schema,
            data,
            options,
            output,
            pretty,
        } => run_build(&schema, data.as_deref(), options.as_deref(), output, pretty),
        Commands::Field {
            schema,
            pointer,
            pretty,
        } => run_field(&schema, &pointer, pretty),
        Commands::Validate { schema, data, json } => run_validate(&schema, &data, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_build(
    schema_path: &Path,
    data_path: Option<&Path>,
    options_path: Option<&Path>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let schema = load_schema(schema_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let data = match data_path {
        Some(path) => load_schema(path).map_err(|e| {
            eprintln!("Error loading data: {}", e);
            e.exit_code() as u8
        })?,
        None => json!({}),
    };

    let options = match options_path {
        Some(path) => load_options(path).map_err(|e| {
            eprintln!("Error loading options: {}", e);
            e.exit_code() as u8
        })?,
        None => FormOptions::new(),
    };

    let model = build_form(&schema, &data, &options).map_err(|e| {
        tracing::error!(error = %e, "form build failed");
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = to_json(&model, pretty)?;
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

fn run_field(schema_path: &Path, pointer: &str, pretty: bool) -> Result<(), u8> {
    let schema = load_schema(schema_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let Some(sub_schema) = get_from_schema(&schema, pointer, false) else {
        eprintln!("Error: no schema found for {}", pointer);
        return Err(2);
    };

    let mut library = ReferenceLibrary::new();
    let resolved = get_schema_reference(&schema, sub_schema, Some(&mut library)).map_err(|e| {
        eprintln!("Error: {}", e);
        2u8
    })?;

    let widget = get_input_type(&resolved);
    let output = json!({
        "pointer": pointer,
        "schema": resolved.as_ref(),
        "type": widget,
        "required": is_input_required(&schema, pointer),
        "validators": get_control_validators(&resolved),
    });

    println!("{}", to_json(&output, pretty)?);
    Ok(())
}

fn run_validate(schema_path: &Path, data_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = load_schema(schema_path).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let data = load_schema(data_path).map_err(|e| {
        report_error(json_output, &format!("loading data: {}", e));
        e.exit_code() as u8
    })?;

    let mut errors: Vec<FieldError> = match validate(&schema, &data) {
        Ok(()) => Vec::new(),
        Err(ValidateError::Invalid { errors }) => errors,
        Err(e) => {
            report_error(json_output, &e.to_string());
            return Err(e.exit_code() as u8);
        }
    };

    let model = build_form(&schema, &data, &FormOptions::new()).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })?;
    let control_errors =
        validate_controls(&model, &data, &ValidatorRegistry::standard()).map_err(|e| {
            report_error(json_output, &e.to_string());
            2u8
        })?;
    for error in control_errors {
        if !errors.iter().any(|e| e.path == error.path) {
            errors.push(error);
        }
    }

    if errors.is_empty() {
        if json_output {
            println!(r#"{{"valid":true}}"#);
        } else {
            println!("Valid");
        }
        return Ok(());
    }

    if json_output {
        let output = json!({
            "valid": false,
            "errors": errors
        });
        println!("{}", output);
    } else {
        eprintln!("Validation failed:");
        for error in errors {
            eprintln!("  {}", error);
        }
    }
    Err(1)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
