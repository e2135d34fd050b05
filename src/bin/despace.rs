//! despace CLI — phantom-space fix for .docx / .odt files.

use std::path::Path;
use std::process;

use clap::{Args, Parser, Subcommand};
use despace::FixReport;

#[derive(Parser)]
#[command(name = "despace", about = "Removes phantom spaces from .docx / .odt documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fix a document and write the normalized copy
    Fix(FixArgs),
    /// Run the self-check battery and exit
    Check,
}

#[derive(Args)]
struct FixArgs {
    /// Input file (.docx / .odt)
    #[arg(short, long)]
    input: String,

    /// Output file (optional; without -o "<stem>_fixed.<ext>" next to the input)
    #[arg(short, long)]
    output: Option<String>,

    /// Print the report as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Print a line diff of the before/after plain text
    #[arg(long, conflicts_with = "json")]
    diff: bool,

    /// Suppress the summary (errors still go to stderr)
    #[arg(long, conflicts_with = "json")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Fix(args) => run_fix(args),
        Command::Check => run_check(),
    }
}

fn run_check() -> Result<(), String> {
    despace::selfcheck::run().map_err(|e| format!("Selbsttest fehlgeschlagen: {e}"))?;
    println!("Selbsttest bestanden.");
    Ok(())
}

fn run_fix(args: FixArgs) -> Result<(), String> {
    // Schlaegt die Battery fehl, fassen wir kein Dokument an.
    despace::selfcheck::run().map_err(|e| format!("Selbsttest fehlgeschlagen: {e}"))?;

    let output = resolve_output_path(args.output.as_deref(), &args.input)?;
    let report = despace::fix_file(Path::new(&args.input), Path::new(&output))
        .map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("JSON encode error: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    if !args.quiet {
        print_summary(&report, &output);
    }
    if args.diff {
        print_diff(&report.before, &report.after);
    }
    Ok(())
}

fn print_summary(report: &FixReport, output: &str) {
    if report.is_clean() {
        println!("No phantom spaces found — file was already clean.");
    } else {
        println!(
            "{} space group(s) collapsed, {} extra character(s) removed.",
            report.runs_collapsed, report.chars_removed
        );
    }
    println!("Saved: {output}");
}

/// Zeilen-Diff der Vorher/Nachher-Projektion: unveraenderte Zeilen
/// eingerueckt, geaenderte als `-`/`+`-Paar.
fn print_diff(before: &str, after: &str) {
    let mut changed = 0usize;
    for (bl, al) in before.lines().zip(after.lines()) {
        if bl == al {
            println!("  {al}");
        } else {
            changed += 1;
            println!("- {bl}");
            println!("+ {al}");
        }
    }
    if changed == 0 {
        println!("(no differences — file was already clean)");
    }
}

/// Leitet den Output-Pfad aus der Eingabe ab: `<stem>_fixed.<ext>` neben
/// der Eingabedatei. Bei explizitem `-o` wird dieser Pfad direkt verwendet.
fn resolve_output_path(explicit: Option<&str>, input: &str) -> Result<String, String> {
    if let Some(path) = explicit {
        return Ok(path.to_string());
    }
    let path = Path::new(input);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| "ungueltiger Eingabepfad".to_string())?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = if ext.is_empty() {
        format!("{stem}_fixed")
    } else {
        format!("{stem}_fixed.{ext}")
    };
    Ok(parent.join(name).to_string_lossy().to_string())
}
