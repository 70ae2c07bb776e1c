//! sent CLI - Summarize a climbing-log CSV export
//!
//! ```bash
//! sent serve                          # Start HTTP server (port 3000)
//! sent summarize ticks.csv            # Climbs + stats as JSON
//! sent summarize ticks.csv --stats-only
//! sent parse ticks.csv                # Normalized climbs only
//! sent grade 5.10a V3 5.9+            # Parse and rank grades
//! ```

use clap::{Parser, Subcommand};
use sent::{normalize_csv, parse_grade, sort_grades, summarize_csv, Grade, ServerConfig};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sent")]
#[command(about = "Summarize climbing-log CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Address to bind (default: SENT_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (default: SENT_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize an export: climbs plus statistics
    Summarize {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only output the statistics
        #[arg(long)]
        stats_only: bool,
    },

    /// Normalize an export and output the climbs
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse grades and print them easiest first
    Grade {
        /// Grades of one family, e.g. 5.10a 5.9+ or V3 V-easy
        #[arg(required = true)]
        grades: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { host, port } => cmd_serve(host, port).await,

        Commands::Summarize {
            input,
            output,
            stats_only,
        } => cmd_summarize(&input, output.as_deref(), stats_only),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Grade { grades } => cmd_grade(&grades),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    host: Option<IpAddr>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?.with_host(host).with_port(port);
    sent::server::start_server(config).await?;
    Ok(())
}

fn cmd_summarize(
    input: &Path,
    output: Option<&Path>,
    stats_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = summarize_csv(input)?;

    let json = if stats_only {
        serde_json::to_string_pretty(&result.summary.stats)?
    } else {
        serde_json::to_string_pretty(&result.summary)?
    };
    write_output(&json, output)?;

    Ok(())
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let climbs = normalize_csv(input)?;

    let json = serde_json::to_string_pretty(&climbs)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_grade(raw: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let grades = raw
        .iter()
        .map(|g| parse_grade(g))
        .collect::<Result<Vec<Grade>, _>>()?;

    for grade in sort_grades(grades)? {
        println!("{}", grade);
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
