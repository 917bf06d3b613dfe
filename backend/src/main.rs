//! Outlook CLI - serve and convert agricultural outlook data
//!
//! # Main Commands
//!
//! ```bash
//! outlook serve                     # Start HTTP server (port 3000)
//! outlook validate upload.csv       # Check a CSV or JSON file against the schema
//! ```
//!
//! # Conversion Commands
//!
//! ```bash
//! outlook parse upload.csv          # Decode column-major CSV to raw JSON records
//! outlook encode outlook.json       # Validate JSON records and render canonical CSV
//! ```
//!
//! Server settings are read from `OUTLOOK_*` environment variables (and a
//! `.env` file); flags passed to `serve` take precedence.

use clap::{Parser, Subcommand};
use outlook::{
    decode_csv, decode_upload_bytes, encode_csv, validate, Format, ServerConfig,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "outlook")]
#[command(about = "Validate, convert and serve agricultural outlook data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Directory holding outlook.json and outlook.csv
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Reject uploads covering fewer years
        #[arg(long)]
        min_years: Option<usize>,
    },

    /// Validate a CSV or JSON file against the indicator schema
    Validate {
        /// Input file (.csv or .json)
        input: PathBuf,
    },

    /// Decode a CSV upload and output raw JSON records
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate JSON records and output canonical CSV
    Encode {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            data_dir,
            min_years,
        } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if let Some(min) = min_years {
                config.min_years = min;
            }
            cmd_serve(config).await
        }

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Encode { input, output } => cmd_encode(&input, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    outlook::server::start_server(config).await?;
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Validating: {}", input.display());

    let candidate = match Format::from_path(input) {
        Some(Format::Csv) => read_csv_records(input)?,
        Some(Format::Json) => read_json(input)?,
        None => return Err(format!("Unknown file type: {}", input.display()).into()),
    };

    let dataset = validate(&candidate).map_err(|e| format!("Invalid: {}", e))?;
    eprintln!(
        "Valid: {} years ({})",
        dataset.len(),
        dataset.years().join(", ")
    );
    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Parsing CSV: {}", input.display());

    let records = read_csv_records(input)?;
    let count = records.as_array().map_or(0, Vec::len);
    eprintln!("Decoded {} records", count);

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)
}

fn cmd_encode(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Encoding: {}", input.display());

    let dataset = validate(&read_json(input)?)?;
    eprintln!("Validated {} years", dataset.len());

    let csv = encode_csv(&dataset)?;
    write_output(&csv, output)
}

fn read_csv_records(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    let text = decode_upload_bytes(&bytes)?;
    Ok(decode_csv(&text)?)
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_reports_invalid_file_as_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("outlook.json");
        fs::write(&input, r#"[{"year": 2024}]"#).unwrap();

        let err = cmd_validate(&input).unwrap_err();
        assert!(err.to_string().starts_with("Invalid: "));
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("outlook.txt");
        fs::write(&input, "").unwrap();

        assert!(cmd_validate(&input).is_err());
    }
}
