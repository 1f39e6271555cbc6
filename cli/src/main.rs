//! repdf CLI - rebuild a PDF page with text edits at the original positions

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use repdf::edit::{build_modification_map, CompanionDocument, LabelRecognizer, RecognizerRules};
use repdf::reconstruct::{extract_images_to_folder, DEFAULT_OUTPUT_PATH};
use repdf::render::{to_json, PageAnalysis};
use repdf::{
    ExtractOptions, JsonFormat, ModificationMap, ReconstructOptions, Reconstructor,
    SourceDocument, TextAnchor,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "repdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild a PDF page with text edits at the original positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply edits from a companion document and write a new PDF
    Reconstruct {
        /// Source PDF file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Edited companion document (DOCX or text)
        #[arg(value_name = "COMPANION")]
        companion: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Page to rebuild (1-indexed)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Recognizer rules (JSON)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Draw text from the original baseline instead of the top-left corner
        #[arg(long)]
        baseline: bool,

        /// Skip form XObjects that cannot be decoded
        #[arg(long)]
        lenient: bool,

        /// Write uncompressed content streams
        #[arg(long)]
        no_compress: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Export a page's structure as JSON
    Analyze {
        /// Source PDF file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the page's images to this directory
        #[arg(long, value_name = "DIR")]
        images: Option<PathBuf>,

        /// Page to analyze (1-indexed)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show the edits recognized in a companion document
    Modifications {
        /// Edited companion document (DOCX or text)
        #[arg(value_name = "COMPANION")]
        companion: PathBuf,

        /// Recognizer rules (JSON)
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Print the map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reconstruct {
            source,
            companion,
            output,
            page,
            rules,
            baseline,
            lenient,
            no_compress,
            yes,
        } => {
            let mut extract = ExtractOptions::new().with_page(page);
            if lenient {
                extract = extract.lenient();
            }
            let options = ReconstructOptions::new()
                .with_output(output)
                .with_extract_options(extract)
                .with_anchor(if baseline {
                    TextAnchor::Baseline
                } else {
                    TextAnchor::TopLeft
                })
                .with_compression(!no_compress);
            cmd_reconstruct(&source, &companion, rules.as_deref(), options, yes)
        }
        Commands::Analyze {
            source,
            output,
            images,
            page,
            compact,
        } => cmd_analyze(&source, output.as_deref(), images.as_deref(), page, compact),
        Commands::Modifications {
            companion,
            rules,
            json,
        } => cmd_modifications(&companion, rules.as_deref(), json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_modifications(companion: &Path, rules: Option<&Path>) -> repdf::Result<ModificationMap> {
    let rules = match rules {
        Some(path) => RecognizerRules::load(path)?,
        None => RecognizerRules::default(),
    };
    let recognizer = LabelRecognizer::with_rules(rules)?;
    let companion = CompanionDocument::open(companion)?;
    build_modification_map(&companion, &recognizer)
}

fn print_modifications(map: &ModificationMap) {
    if map.is_empty() {
        println!("{}", "No modifications recognized".yellow());
        return;
    }
    println!("{} {}", "Modifications:".cyan().bold(), map.len());
    for (original, replacement) in map.iter() {
        println!("  {:?} {} {:?}", original, "->".dimmed(), replacement);
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} (y/n): ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn cmd_reconstruct(
    source: &Path,
    companion: &Path,
    rules: Option<&Path>,
    options: ReconstructOptions,
    yes: bool,
) -> CliResult {
    let map = load_modifications(companion, rules)?;
    print_modifications(&map);

    let output = options.output.clone();
    if !yes && !confirm(&format!("Write {}?", output.display()))? {
        println!("{}", "Aborted".yellow());
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Rebuilding {}...", source.display()));

    let result = Reconstructor::new(options).run_with_map(source, &map);
    pb.finish_and_clear();
    let report = result?;

    println!("{} {}", "Saved to".green(), output.display());
    println!("  {} {}x{} pt", "├─ page size".dimmed(), report.width, report.height);
    println!(
        "  {} {} drawn, {} modified, {} blank skipped",
        "├─ spans".dimmed(),
        report.spans_drawn,
        report.spans_modified,
        report.spans_skipped
    );
    println!(
        "  {} {} approximated",
        "├─ fonts".dimmed(),
        report.fonts_approximated
    );
    println!(
        "  {} {} placements of {} images",
        "└─ images".dimmed(),
        report.image_draws,
        report.image_references
    );

    Ok(())
}

fn cmd_analyze(
    source: &Path,
    output: Option<&Path>,
    images: Option<&Path>,
    page: u32,
    compact: bool,
) -> CliResult {
    let document = SourceDocument::open(source)?;
    let options = ExtractOptions::new().with_page(page).lenient();
    let analysis = PageAnalysis::analyze(&document, &options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&analysis, format)?;

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    if let Some(dir) = images {
        let written = extract_images_to_folder(&document, &analysis.page.images, dir)?;
        for path in &written {
            println!("{} {}", "Extracted".green(), path.display());
        }
        println!("\n{} {} images extracted", "Done!".green().bold(), written.len());
    }

    Ok(())
}

fn cmd_modifications(companion: &Path, rules: Option<&Path>, json: bool) -> CliResult {
    let map = load_modifications(companion, rules)?;
    if json {
        println!("{}", to_json(&map, JsonFormat::Pretty)?);
    } else {
        print_modifications(&map);
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "repdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Layout-preserving PDF page reconstruction");
    println!();
    println!("Library: {}", repdf::version());
    println!("Repository: {}", "https://github.com/iyulab/repdf".dimmed());
    println!("License: MIT");
}
