//! ZABA Convert - CLI tool for converting ZABA spreadsheet statements.

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use zaba_statement::{
    csv_format::CsvStatement,
    ofx_format::OfxStatement,
    parser::DEFAULT_BANK_ID,
    xls_format::XlsStatement,
    Format, ParserOptions, Result,
};

#[derive(Parser)]
#[command(name = "zaba_convert")]
#[command(about = "Convert ZABA spreadsheet statements to OFX or CSV", long_about = None)]
struct Cli {
    /// Input workbook path (.xls, .xlsx, .ods)
    #[arg(short, long)]
    input: String,

    /// Output format (ofx, csv)
    #[arg(long = "output-format", default_value = "ofx")]
    output_format: String,

    /// Output file path (or stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Bank identifier written to the statement
    #[arg(long = "bank-id", default_value = DEFAULT_BANK_ID)]
    bank_id: String,

    /// Log parser progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let output_format = cli.output_format.parse::<Format>()?;

    let options = ParserOptions {
        bank_id: cli.bank_id,
    };
    let xls = XlsStatement::from_path(&cli.input, options)?;

    for warning in &xls.statement.warnings {
        eprintln!("Warning: {}", warning);
    }
    tracing::info!(
        transactions = xls.statement.transactions.len(),
        "parsed {}",
        cli.input
    );

    // Output based on output file or stdout
    if let Some(ref output_path) = cli.output {
        let mut file = File::create(output_path)?;
        write_output(&mut file, xls, output_format)?;
    } else {
        let mut stdout = io::stdout();
        write_output(&mut stdout, xls, output_format)?;
    }

    Ok(())
}

fn write_output<W: Write>(writer: &mut W, xls: XlsStatement, format: Format) -> Result<()> {
    match format {
        Format::Ofx => {
            let ofx: OfxStatement = xls.into();
            ofx.write_to(writer)?;
        }
        Format::Csv => {
            let csv: CsvStatement = xls.into();
            csv.write_to(writer)?;
        }
    }
    Ok(())
}
