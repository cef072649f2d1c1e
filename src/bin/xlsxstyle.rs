use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use xlsxstyle::{BatchReport, ConverterBuilder, FailureStage, FileOutcome, SheetSelector};

#[derive(Parser)]
#[command(name = "xlsxstyle")]
#[command(about = "Convert Excel workbooks into styled JSON grids")]
#[command(version)]
struct Cli {
    /// Folder containing the Excel files
    #[arg(value_name = "INPUT_DIR", default_value = "Analysis")]
    input: PathBuf,

    /// Folder where the JSON files are written
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = "excel_data")]
    output: PathBuf,

    /// Convert the sheet at this 0-based index instead of the active sheet
    #[arg(long, value_name = "N", conflicts_with = "sheet_name")]
    sheet_index: Option<usize>,

    /// Convert the sheet with this name instead of the active sheet
    #[arg(long, value_name = "NAME")]
    sheet_name: Option<String>,

    /// Write JSON without indentation
    #[arg(long)]
    compact: bool,

    /// Process files one at a time
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let selector = match (cli.sheet_index, cli.sheet_name) {
        (Some(index), _) => SheetSelector::Index(index),
        (None, Some(name)) => SheetSelector::Name(name),
        (None, None) => SheetSelector::Active,
    };

    let converter = ConverterBuilder::new()
        .with_sheet_selector(selector)
        .with_pretty_json(!cli.compact)
        .with_parallel(!cli.sequential)
        .build()
        .context("Invalid options")?;

    let report = converter
        .convert_dir(&cli.input, &cli.output)
        .with_context(|| format!("Failed to process folder: {}", cli.input.display()))?;

    if report.created_output_dir {
        println!("Created output folder: {}", cli.output.display());
    }

    if report.found() == 0 {
        println!("No Excel files found in {}", cli.input.display());
        return Ok(());
    }

    print_report(&report);
    print_json_files(&report.output_dir)?;

    println!("\n✓ Processing complete!");
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("Found {} Excel files:", report.found());
    for entry in &report.entries {
        println!("  - {}", entry.file_name());
    }

    for entry in &report.entries {
        println!("\nProcessing: {}", entry.file_name());
        match &entry.outcome {
            FileOutcome::Converted { output, rows, cols } => {
                let json_name = output
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("  ✓ Created: {}", json_name);
                println!("    Rows: {}", rows);
                if *rows > 0 {
                    println!("    Columns: {}", cols);
                }
            }
            FileOutcome::Failed {
                stage: FailureStage::Read,
                error,
            } => {
                println!("  ✗ Failed to process {}: {}", entry.file_name(), error);
            }
            FileOutcome::Failed {
                stage: FailureStage::Write,
                error,
            } => {
                println!("  ✗ Error writing JSON: {}", error);
            }
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("PROCESSING SUMMARY:");
    println!("  Total files found: {}", report.found());
    println!("  Successfully processed: {}", report.succeeded());
    println!("  Failed: {}", report.failed());
    println!("  Output folder: {}", report.output_dir.display());
}

fn print_json_files(output_dir: &Path) -> Result<()> {
    let mut files: Vec<(String, u64)> = Vec::new();
    for entry in fs::read_dir(output_dir)
        .with_context(|| format!("Failed to list output folder: {}", output_dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            let size = entry.metadata()?.len();
            files.push((entry.file_name().to_string_lossy().into_owned(), size));
        }
    }

    if files.is_empty() {
        return Ok(());
    }
    files.sort();

    println!("\nJSON files created:");
    for (name, size) in files {
        println!("  - {} ({} bytes)", name, format_thousands(size));
    }
    Ok(())
}

/// 3桁ごとにカンマで区切る
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
