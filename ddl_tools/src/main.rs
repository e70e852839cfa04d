//! ddl_tools CLI
//!
//! Command-line front end for converting foreign DDL to TQL, validating it, and diffing two
//! schemas.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use ddl_tools::config::{self, Config, LoggingConfig};
use ddl_tools::utils::logging::init_logging;
use ddl_tools::{CaseMode, Database, DdlToolsClient, Difference};

/// Convert, validate and diff TQL schemas.
#[derive(Parser)]
#[command(name = "ddl_tools")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert DDL from another database to TQL.
    Convert {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Case applied to generated identifiers.
        #[arg(long)]
        case: Option<CaseMode>,

        /// Emit CREATE DATABASE and CREATE SCHEMA statements.
        #[arg(long)]
        create_db: bool,

        /// Validate the parsed schema and report issues on stderr.
        #[arg(long)]
        validate: bool,
    },

    /// Parse DDL and report validation issues.
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Compare two DDL files.
    Diff {
        /// First DDL file.
        #[arg(long)]
        ddl1: PathBuf,

        /// Second DDL file.
        #[arg(long)]
        ddl2: PathBuf,

        /// Database name used for both files.
        #[arg(short, long)]
        database: Option<String>,

        /// Schema name used for both files.
        #[arg(short, long)]
        schema: Option<String>,

        /// Print the alters that make the first file match the second.
        #[arg(long)]
        alter1: bool,

        /// Print the alters that make the second file match the first.
        #[arg(long)]
        alter2: bool,

        /// Case applied to generated identifiers.
        #[arg(long)]
        case: Option<CaseMode>,

        /// Format of the difference listing.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// DDL file to read ("-" or omitted for stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Database the tables are placed in.
    #[arg(short, long)]
    database: Option<String>,

    /// Schema the tables are placed in.
    #[arg(short, long)]
    schema: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    // Warnings (skipped columns) are always shown unless a config says otherwise
    let logging = if cli.verbose {
        Some(LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone().unwrap_or_default()
        })
    } else {
        config.logging.clone().or_else(|| {
            Some(LoggingConfig {
                level: "warn".to_string(),
                ..LoggingConfig::default()
            })
        })
    };
    init_logging(&logging)?;

    match cli.command {
        Commands::Convert {
            source,
            output,
            case,
            create_db,
            validate,
        } => {
            source.apply(&mut config);
            if let Some(case) = case {
                config.output.case = case;
            }
            config.output.create_database |= create_db;

            let client = DdlToolsClient::new(config);
            let database = read_database(&client, source.input.as_deref())?;

            if validate {
                let result = client.validate(&database);
                for issue in result.issues() {
                    eprintln!("{}", issue);
                }
            }

            write_output(output.as_deref(), &client.to_tql(&database))?;
        }

        Commands::Validate { source } => {
            source.apply(&mut config);
            let client = DdlToolsClient::new(config);
            let database = read_database(&client, source.input.as_deref())?;

            let result = client.validate(&database);
            if result.is_valid() {
                println!("Database {} is valid.", database.database_name());
                return Ok(ExitCode::SUCCESS);
            }

            for issue in result.issues() {
                println!("{}", issue);
            }
            return Ok(ExitCode::FAILURE);
        }

        Commands::Diff {
            ddl1,
            ddl2,
            database,
            schema,
            alter1,
            alter2,
            case,
            format,
        } => {
            if let Some(database) = database {
                config.database.name = database;
            }
            if let Some(schema) = schema {
                config.database.schema = schema;
            }
            if let Some(case) = case {
                config.output.case = case;
            }

            let client = DdlToolsClient::new(config);
            let db1 = read_database(&client, Some(ddl1.as_path()))?;
            let db2 = read_database(&client, Some(ddl2.as_path()))?;
            let diff = client.compare(&db1, &db2);

            let mut stdout = io::stdout().lock();
            if alter1 || alter2 {
                if alter1 {
                    stdout.write_all(client.render_alters(&diff.first).as_bytes())?;
                }
                if alter2 {
                    stdout.write_all(client.render_alters(&diff.second).as_bytes())?;
                }
            } else {
                match format {
                    OutputFormat::Json => {
                        serde_json::to_writer_pretty(&mut stdout, &diff)?;
                        writeln!(stdout)?;
                    }
                    OutputFormat::Text => {
                        print_differences(&mut stdout, &ddl1, &diff.first)?;
                        print_differences(&mut stdout, &ddl2, &diff.second)?;
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

impl SourceArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(database) = &self.database {
            config.database.name = database.clone();
        }
        if let Some(schema) = &self.schema {
            config.database.schema = schema.clone();
        }
    }
}

fn read_database(client: &DdlToolsClient, input: Option<&Path>) -> anyhow::Result<Database> {
    match input {
        Some(path) if path != Path::new("-") => client
            .parse_file(path)
            .with_context(|| format!("failed to parse {}", path.display())),
        _ => client
            .parser()
            .parse_reader(io::stdin().lock())
            .context("failed to parse DDL from stdin"),
    }
}

fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) if path != Path::new("-") => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        _ => {
            io::stdout().lock().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

fn print_differences(
    out: &mut impl Write,
    source: &Path,
    differences: &[Difference],
) -> io::Result<()> {
    writeln!(out, "Changes to {} ({}):", source.display(), differences.len())?;
    for difference in differences {
        writeln!(out, "  {}", difference)?;
    }
    Ok(())
}
