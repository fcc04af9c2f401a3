use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use holdings_import::{
    dispatch, extract_holdings, read_statement, suggest_column_mapping, BrokerFormat,
    ColumnMapping, CostBasisType, Dispatch, ImportStrategy,
};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "holdings_import=info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let statement = read_statement(&cli.input, cli.delimiter_byte()?)?;
    info!(
        columns = statement.headers.len(),
        rows = statement.rows.len(),
        "statement loaded"
    );

    if cli.suggest {
        let suggested = suggest_column_mapping(&statement.headers);
        println!("{}", serde_json::to_string_pretty(&suggested)?);
        return Ok(());
    }

    let strategy = match cli.format {
        Some(FormatArg::Fidelity) => ImportStrategy::Broker(BrokerFormat::Fidelity),
        Some(FormatArg::Etrade) => ImportStrategy::Broker(BrokerFormat::ETrade),
        Some(FormatArg::Generic) => ImportStrategy::Generic(cli.confirmed_mapping(&statement.headers)?),
        None => match dispatch(&statement.headers) {
            Dispatch::Detected(format) => ImportStrategy::Broker(format),
            Dispatch::NeedsMapping(suggested) => {
                ImportStrategy::Generic(cli.confirm(suggested)?)
            }
        },
    };

    let holdings = extract_holdings(&strategy, &statement.rows, &statement.headers);
    println!(
        "{}",
        serde_json::to_string_pretty(&holdings).context("Failed to serialize holdings")?
    );

    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn brokerage position exports into normalized holdings (JSON)."
)]
struct Cli {
    /// Statement file (CSV or other delimited text)
    input: PathBuf,

    /// Field delimiter, a single character
    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Force a strategy instead of detecting one
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Header holding the ticker symbol
    #[arg(long)]
    ticker: Option<String>,

    /// Header holding the share count
    #[arg(long)]
    shares: Option<String>,

    /// Header holding the cost basis
    #[arg(long)]
    cost_basis: Option<String>,

    /// How to read the cost-basis column
    #[arg(long, value_enum)]
    cost_basis_type: Option<CostBasisTypeArg>,

    /// Use the suggested mapping as-is
    #[arg(long)]
    accept_suggested: bool,

    /// Print the suggested mapping and exit
    #[arg(long)]
    suggest: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Fidelity,
    Etrade,
    Generic,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CostBasisTypeArg {
    Total,
    PerShare,
}

impl From<CostBasisTypeArg> for CostBasisType {
    fn from(kind: CostBasisTypeArg) -> Self {
        match kind {
            CostBasisTypeArg::Total => CostBasisType::Total,
            CostBasisTypeArg::PerShare => CostBasisType::PerShare,
        }
    }
}

impl Cli {
    fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ if self.delimiter == "\\t" => Ok(b'\t'),
            _ => bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter),
        }
    }

    fn has_mapping_flags(&self) -> bool {
        self.ticker.is_some()
            || self.shares.is_some()
            || self.cost_basis.is_some()
            || self.cost_basis_type.is_some()
    }

    /// Overlay mapping flags on a suggestion
    fn overlay(&self, mut mapping: ColumnMapping) -> ColumnMapping {
        if let Some(ticker) = &self.ticker {
            mapping.ticker = Some(ticker.clone());
        }
        if let Some(shares) = &self.shares {
            mapping.shares = Some(shares.clone());
        }
        if let Some(cost_basis) = &self.cost_basis {
            mapping.cost_basis = Some(cost_basis.clone());
        }
        if let Some(kind) = self.cost_basis_type {
            mapping.cost_basis_type = kind.into();
        }
        mapping
    }

    fn confirmed_mapping(&self, headers: &[String]) -> Result<ColumnMapping> {
        self.confirm(suggest_column_mapping(headers))
    }

    /// A suggested mapping only goes through when the user accepted it or
    /// supplied columns themselves.
    fn confirm(&self, suggested: ColumnMapping) -> Result<ColumnMapping> {
        if !self.accept_suggested && !self.has_mapping_flags() {
            eprintln!("{}", serde_json::to_string_pretty(&suggested)?);
            bail!(
                "unrecognized statement layout; confirm the suggested mapping with \
                 --accept-suggested or set --ticker/--shares/--cost-basis"
            );
        }

        let mapping = self.overlay(suggested);
        if !mapping.is_complete() {
            bail!("mapping needs both a ticker and a shares column");
        }
        Ok(mapping)
    }
}
