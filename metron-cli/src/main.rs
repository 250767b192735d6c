//! Metron command line
//!
//! Commands:
//! - convert <from> <to>: conversion factor between two unit expressions
//! - inspect <expr>: canonical form, dimensions, scale and basis form
//! - list: every unit name, abbreviation and plural known to the SI catalog
//!
//! Results are printed as JSON on stdout. Errors go to stderr as
//! `[CODE] message` with exit status 1. `METRON_LOG` sets the log level
//! (default `warn`).

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::str::FromStr;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use metron_core::prelude::*;
use metron_units::{DimensionVector, UnitRegistry};

const USAGE: &str = "usage: metron convert <from> <to> | metron inspect <expr> | metron list";

#[derive(Debug, PartialEq)]
enum Command {
    Convert { from: String, to: String },
    Inspect { expression: String },
    List,
    Help,
}

#[derive(Serialize)]
struct Conversion {
    from: String,
    to: String,
    factor: f64,
}

#[derive(Serialize)]
struct Inspection {
    units: String,
    dimensions: DimensionVector,
    scale: f64,
    basis: String,
}

/// Errors surfaced to the user, each with a stable code
#[derive(Debug)]
enum CliError {
    Usage(String),
    Unit(UnitError),
    Output(String),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            CliError::Usage(_) => "USAGE",
            CliError::Unit(e) => e.code(),
            CliError::Output(_) => "OUTPUT",
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}\n{}", msg, USAGE),
            CliError::Unit(e) => write!(f, "{}", e),
            CliError::Output(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<UnitError> for CliError {
    fn from(e: UnitError) -> Self {
        CliError::Unit(e)
    }
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let mut args = args.iter().map(String::as_str);
    let command = match args.next() {
        Some("convert") => match (args.next(), args.next()) {
            (Some(from), Some(to)) => Command::Convert {
                from: from.to_string(),
                to: to.to_string(),
            },
            _ => return Err(CliError::Usage("convert needs <from> and <to>".to_string())),
        },
        Some("inspect") => match args.next() {
            Some(expression) => Command::Inspect {
                expression: expression.to_string(),
            },
            None => return Err(CliError::Usage("inspect needs <expr>".to_string())),
        },
        Some("list") => Command::List,
        Some("help") | Some("-h") | Some("--help") => Command::Help,
        Some(other) => return Err(CliError::Usage(format!("unknown command '{}'", other))),
        None => return Err(CliError::Usage("missing command".to_string())),
    };

    if let Some(extra) = args.next() {
        return Err(CliError::Usage(format!("unexpected argument '{}'", extra)));
    }
    Ok(command)
}

fn init_logging() {
    let level = env::var("METRON_LOG")
        .ok()
        .and_then(|value| Level::from_str(&value).ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    // Only fails if a subscriber is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))
}

fn run(command: Command, registry: &UnitRegistry) -> Result<String, CliError> {
    match command {
        Command::Convert { from, to } => {
            let factor = registry.materialize(&from)?.scale_to(&to)?;
            to_json(&Conversion { from, to, factor })
        }
        Command::Inspect { expression } => {
            let composite = registry.materialize(&expression)?;
            to_json(&Inspection {
                units: composite.to_string(),
                dimensions: composite.dimensions(),
                scale: composite.relative_scale(),
                basis: composite.to_basis()?.to_string(),
            })
        }
        Command::List => Ok(registry.names().join("\n")),
        Command::Help => Ok(USAGE.to_string()),
    }
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|command| {
        tracing::debug!(?command, "running");
        let registry = metron_si::si_registry()?;
        run(command, &registry)
    });

    match result {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{}", output).is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[{}] {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_args(&args(&["convert", "km/h", "m/s"])).unwrap(),
            Command::Convert {
                from: "km/h".to_string(),
                to: "m/s".to_string()
            }
        );
        assert_eq!(
            parse_args(&args(&["inspect", "N"])).unwrap(),
            Command::Inspect {
                expression: "N".to_string()
            }
        );
        assert_eq!(parse_args(&args(&["list"])).unwrap(), Command::List);
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_usage_errors() {
        let cases: [&[&str]; 5] = [&[], &["convert", "m"], &["inspect"], &["frobnicate"], &["list", "x"]];
        for bad in cases {
            let err = parse_args(&args(bad)).unwrap_err();
            assert_eq!(err.code(), "USAGE");
        }
    }

    #[test]
    fn test_convert_output() {
        let registry = metron_si::si_registry().unwrap();
        let command = Command::Convert {
            from: "km".to_string(),
            to: "m".to_string(),
        };
        let output: serde_json::Value = serde_json::from_str(&run(command, &registry).unwrap()).unwrap();
        assert_eq!(output["from"], "km");
        assert_eq!(output["to"], "m");
        assert_eq!(output["factor"], 1000.0);
    }

    #[test]
    fn test_inspect_output() {
        let registry = metron_si::si_registry().unwrap();
        let command = Command::Inspect {
            expression: "N".to_string(),
        };
        let output: serde_json::Value = serde_json::from_str(&run(command, &registry).unwrap()).unwrap();
        assert_eq!(output["units"], "N");
        assert_eq!(output["basis"], "kg*m/s^2");
        assert_eq!(output["dimensions"]["time"], "-2");
        assert_eq!(output["scale"], 1.0);
    }

    #[test]
    fn test_errors_carry_codes() {
        let registry = metron_si::si_registry().unwrap();
        let convert = Command::Convert {
            from: "m".to_string(),
            to: "s".to_string(),
        };
        assert_eq!(run(convert, &registry).unwrap_err().code(), "UNIT_CONVERSION");

        let inspect = Command::Inspect {
            expression: "furlong".to_string(),
        };
        assert_eq!(run(inspect, &registry).unwrap_err().code(), "INVALID_UNIT");
    }
}
