//! Command-line interface for the harvester.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::arguments::Arguments;
use crate::config::{
    Options, DEFAULT_METADATA_PREFIX, DEFAULT_RETRIES, DEFAULT_RETRY_INTERVAL_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::datestamp::Datestamp;
use crate::error::Result;
use crate::repository::Repository;

/// OAI-PMH Harvester - Stream metadata from OAI-PMH repositories.
#[derive(Parser)]
#[command(name = "oai-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository base URL (e.g., http://www.example.com/oai)
    #[arg(short, long)]
    pub url: String,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Times to retry a failed request
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Seconds to wait between retries
    #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL_SECS)]
    pub interval: u64,

    /// Bearer token sent in the Authorization header
    #[arg(long)]
    pub bearer_token: Option<String>,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after this many items
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe the repository.
    Identify,

    /// List metadata formats, for the repository or one item.
    Formats {
        /// Only formats available for this item
        #[arg(short, long)]
        identifier: Option<String>,
    },

    /// List the repository's sets.
    Sets,

    /// List record headers.
    Identifiers(Filter),

    /// List full records.
    Records(Filter),

    /// Fetch a single record.
    Get {
        /// Item identifier (e.g., oai:oai.datacite.org:32355)
        identifier: String,

        /// Metadata format of the record
        #[arg(short, long, default_value = DEFAULT_METADATA_PREFIX)]
        metadata_prefix: String,
    },
}

/// Selective-harvesting filters.
#[derive(Args)]
pub struct Filter {
    /// Metadata format of the records
    #[arg(short, long, default_value = DEFAULT_METADATA_PREFIX)]
    pub metadata_prefix: String,

    /// Lower datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
    #[arg(long)]
    pub from: Option<Datestamp>,

    /// Upper datestamp bound (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
    #[arg(long)]
    pub until: Option<Datestamp>,

    /// Set spec to harvest
    #[arg(short, long)]
    pub set: Option<String>,

    /// Resume an earlier harvest
    #[arg(long)]
    pub resumption_token: Option<String>,
}

impl Filter {
    fn to_arguments(&self) -> Arguments {
        Arguments {
            metadata_prefix: self.metadata_prefix.clone(),
            from: self.from,
            until: self.until,
            set: self.set.clone(),
            resumption_token: self.resumption_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// One YAML document per item
    Yaml,
}

fn parse_header(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME:VALUE, got '{value}'")),
    }
}

impl Cli {
    /// Request options from the connection flags.
    pub fn options(&self) -> Options {
        let timeout = (self.timeout > 0).then(|| Duration::from_secs(self.timeout));
        let mut options = Options::default()
            .with_timeout(timeout)
            .with_retries(self.retries)
            .with_interval(Duration::from_secs(self.interval));

        if let Some(token) = &self.bearer_token {
            options = options.with_bearer_token(token);
        }
        for (name, value) in &self.headers {
            options = options.with_header(name, value);
        }

        options
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    execute(&Cli::parse())
}

/// Execute parsed arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    let repository = Repository::new(&cli.url, &cli.options())?;

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut output = Output::new(BufWriter::new(writer), cli.format, cli.limit);

    let (label, result) = match &cli.command {
        Commands::Identify => ("identify", output.write_all(std::iter::once(repository.identify()))),
        Commands::Formats { identifier } => (
            "metadata formats",
            output.write_all(repository.metadata_formats(identifier.as_deref())),
        ),
        Commands::Sets => ("sets", output.write_all(repository.sets())),
        Commands::Identifiers(filter) => (
            "identifiers",
            repository
                .identifiers(&filter.to_arguments())
                .and_then(|items| output.write_all(items)),
        ),
        Commands::Records(filter) => (
            "records",
            repository
                .records(&filter.to_arguments())
                .and_then(|items| output.write_all(items)),
        ),
        Commands::Get {
            identifier,
            metadata_prefix,
        } => (
            "record",
            output.write_all(std::iter::once(repository.get(identifier, metadata_prefix))),
        ),
    };

    let flushed = output.finish();
    let count = result?;
    flushed?;

    eprintln!(
        "{} {} {} from {}",
        style("Harvested").green().bold(),
        style(count).cyan(),
        label,
        style(repository.paginator().base_url()).dim()
    );

    Ok(())
}

/// Serializes harvested items to the output while reporting progress.
struct Output<W: Write> {
    writer: W,
    format: OutputFormat,
    limit: Option<usize>,
    progress: ProgressBar,
}

impl<W: Write> Output<W> {
    fn new(writer: W, format: OutputFormat, limit: Option<usize>) -> Self {
        let progress = ProgressBar::new_spinner();
        #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({elapsed})")
                .expect("valid template"),
        );
        progress.set_message("Harvesting...");
        progress.enable_steady_tick(Duration::from_millis(100));

        Self {
            writer,
            format,
            limit,
            progress,
        }
    }

    /// Write items until the source or the limit runs out.
    ///
    /// Items written before a failure stay written.
    fn write_all<T: Serialize>(&mut self, items: impl Iterator<Item = Result<T>>) -> Result<usize> {
        let mut count = 0;
        for item in items.take(self.limit.unwrap_or(usize::MAX)) {
            self.write(&item?)?;
            count += 1;
            self.progress.set_message(format!("Harvested {count} items..."));
        }
        Ok(count)
    }

    fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, item)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml_ng::to_string(item)?;
                write!(self.writer, "---\n{yaml}")?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.progress.finish_and_clear();
        self.writer.flush()?;
        Ok(())
    }
}
