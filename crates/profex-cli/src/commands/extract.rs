//! Extract command - pull fields from a single block file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use profex_core::{Block, Engine, EngineConfig, ExtractionRecord};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input block file (JSON array of positioned text blocks)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence score
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let engine = build_engine(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting fields from {}", args.input.display());

    let blocks = read_blocks(&args.input)?;
    debug!("Loaded {} blocks", blocks.len());

    let record = engine.extract(&blocks);

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            record.confidence * 100.0
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build an engine from an optional config file path.
pub fn build_engine(config_path: Option<&str>) -> anyhow::Result<Engine> {
    let config = if let Some(path) = config_path {
        EngineConfig::from_file(Path::new(path))?
    } else {
        EngineConfig::default()
    };
    Ok(Engine::with_config(config)?)
}

/// Read a JSON array of blocks from a file.
pub fn read_blocks(path: &Path) -> anyhow::Result<Vec<Block>> {
    let content = fs::read_to_string(path)?;
    let blocks: Vec<Block> = serde_json::from_str(&content)?;
    Ok(blocks)
}

pub fn format_record(record: &ExtractionRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &ExtractionRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "proforma_number",
        "order_number",
        "order_reference",
        "customer_name",
        "amount",
        "currency",
        "date",
        "units",
        "shipping_country",
        "shipping_phone",
        "shipping_email",
        "confidence",
        "source",
    ])?;

    wtr.write_record([
        &record.proforma_number,
        &record.order_number,
        &record.order_reference,
        &record.customer_name,
        &record.amount,
        &record.currency,
        &record.date,
        &record.units,
        &record.shipping_country,
        &record.shipping_phone,
        &record.shipping_email,
        &format!("{:.2}", record.confidence),
        &record.source,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractionRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Proforma:  {}\n", record.proforma_number));
    output.push_str(&format!("Order:     {}\n", record.order_number));
    output.push_str(&format!("Reference: {}\n", record.order_reference));
    output.push_str(&format!("Customer:  {}\n", record.customer_name));
    output.push_str(&format!("Date:      {}\n", record.date));
    output.push_str(&format!("Amount:    {} {}\n", record.amount, record.currency));
    output.push_str(&format!("Units:     {}\n", record.units));
    output.push('\n');

    output.push_str("Shipping:\n");
    output.push_str(&format!("  Country: {}\n", record.shipping_country));
    output.push_str(&format!("  Phone:   {}\n", record.shipping_phone));
    output.push_str(&format!("  Email:   {}\n", record.shipping_email));
    output.push('\n');

    output.push_str(&format!("Confidence: {:.2}\n", record.confidence));

    output
}
