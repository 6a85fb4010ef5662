//! pdfoutline CLI - PDF outline detection and section ranking tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::detect::list_pdf_files;
use pdfoutline::outline::{collect_blocks, FontProfile};
use pdfoutline::pipeline::{process_files, run_ranking_file};
use pdfoutline::{
    analyze_file, outline_to_json, parse_file_with_options, sections_to_json, HashingEmbedder,
    HeadingLevel, HeadingOrder, HeuristicProfile, JsonFormat, PipelineOptions,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Detect PDF outlines and rank sections for a persona", long_about = None)]
struct Cli {
    /// Heading heuristic profile (default: strict, relaxed for `rank`)
    #[arg(long, value_enum, global = true, env = "PDFOUTLINE_PROFILE")]
    profile: Option<Profile>,

    /// Ordering of headings within a page
    #[arg(long, value_enum, global = true, default_value = "text")]
    order: Order,

    /// Per-document time budget in seconds
    #[arg(long, global = true, env = "PDFOUTLINE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Output compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Treat unreadable pages as empty instead of failing the document
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an outline JSON for every PDF in a folder
    Outline {
        /// Folder containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Folder for JSON outlines (created if missing)
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,
    },

    /// Write the outline JSON of one PDF
    File {
        /// Input PDF file
        #[arg(value_name = "INPUT_PDF")]
        input: PathBuf,

        /// Output JSON file
        #[arg(value_name = "OUTPUT_JSON")]
        output: PathBuf,
    },

    /// Write the section texts of one PDF
    Sections {
        /// Input PDF file
        #[arg(value_name = "INPUT_PDF")]
        input: PathBuf,

        /// Output JSON file (stdout if not specified)
        #[arg(value_name = "OUTPUT_JSON")]
        output: Option<PathBuf>,
    },

    /// Rank sections of the requested documents for a persona and job
    Rank {
        /// Request descriptor (persona, job_to_be_done, documents)
        #[arg(value_name = "INPUT_JSON")]
        request: PathBuf,

        /// Folder containing the requested PDFs
        #[arg(value_name = "PDFS_DIR")]
        pdfs_dir: PathBuf,

        /// Output JSON file
        #[arg(value_name = "OUTPUT_JSON")]
        output: PathBuf,

        /// Number of sections to keep
        #[arg(value_name = "TOP_N")]
        top_n: usize,
    },

    /// Show font statistics and heading counts of one PDF
    Info {
        /// Input PDF file
        #[arg(value_name = "INPUT_PDF")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Keyword and numbering patterns, padding on both sides
    Strict,
    /// Bold alone suffices, padding on either side
    Relaxed,
}

impl From<Profile> for HeuristicProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Strict => HeuristicProfile::Strict,
            Profile::Relaxed => HeuristicProfile::Relaxed,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Page, then heading text
    Text,
    /// Page, then vertical position
    Position,
}

impl From<Order> for HeadingOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Text => HeadingOrder::PageThenText,
            Order::Position => HeadingOrder::PageThenPosition,
        }
    }
}

impl Cli {
    fn options(&self, default_profile: HeuristicProfile) -> PipelineOptions {
        let mut options = PipelineOptions::new()
            .with_profile(self.profile.map(Into::into).unwrap_or(default_profile));
        options.outline.order = self.order.into();

        if let Some(secs) = self.timeout_secs {
            options = options.with_time_budget(Duration::from_secs(secs));
        }
        if self.lenient {
            options = options.lenient();
        }
        options
    }

    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Outline { input, output } => cmd_outline(&cli, input, output),
        Commands::File { input, output } => cmd_file(&cli, input, output),
        Commands::Sections { input, output } => cmd_sections(&cli, input, output.as_deref()),
        Commands::Rank {
            request,
            pdfs_dir,
            output,
            top_n,
        } => cmd_rank(&cli, request, pdfs_dir, output, *top_n),
        Commands::Info { input } => cmd_info(&cli, input),
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

fn cmd_outline(cli: &Cli, input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options(HeuristicProfile::Strict);
    let inputs = list_pdf_files(input)?;
    log::info!("Found {} PDF files in {}", inputs.len(), input.display());

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Detecting outlines...");

    let report = process_files(&inputs, output, &options, cli.format(), &|_| pb.inc(1))?;
    pb.finish_and_clear();

    println!(
        "{} {} outlines written to {}",
        "Done!".green().bold(),
        report.written.len(),
        output.display()
    );
    for (path, e) in &report.failed {
        println!("  {} {}: {}", "Failed".red(), path.display(), e);
    }

    Ok(())
}

fn cmd_file(cli: &Cli, input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options(HeuristicProfile::Strict);
    let outline = pdfoutline::pipeline::outline_file(input, &options)?;

    fs::write(output, outline_to_json(&outline, cli.format())?)?;
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_sections(
    cli: &Cli,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options(HeuristicProfile::Strict);
    let analysis = analyze_file(input, &options)?;
    let json = sections_to_json(&analysis.sections, cli.format())?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_rank(
    cli: &Cli,
    request: &Path,
    pdfs_dir: &Path,
    output: &Path,
    top_n: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = cli.options(HeuristicProfile::Relaxed).with_top_n(top_n);
    if let Some(secs) = cli.timeout_secs {
        options.rank.deadline = Some(Duration::from_secs(secs));
    }
    let mut embedder = HashingEmbedder::default();
    log::debug!(
        "Ranking with {} profile, top {}",
        options.outline.profile,
        options.rank.top_n
    );

    let pb = ProgressBar::new_spinner();
    pb.set_message("Ranking sections...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = run_ranking_file(
        request,
        pdfs_dir,
        output,
        &options,
        &mut embedder,
        cli.format(),
    );
    pb.finish_and_clear();
    let report = report?;

    println!("{}", "Top sections:".green().bold());
    for section in &report.extracted_sections {
        println!(
            "  {} {} {} (p. {})",
            format!("{}.", section.importance_rank).dimmed(),
            section.section_title,
            format!("[{}]", section.document).cyan(),
            section.page_number
        );
    }
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_info(cli: &Cli, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let options = cli.options(HeuristicProfile::Strict);
    let doc = parse_file_with_options(input, options.parse.clone())?;
    let outline = pdfoutline::extract_outline(&doc, &options.outline)?;
    let blocks = collect_blocks(&doc)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Title".bold(), outline.title);

    println!();
    println!("{}", "Font Profile".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Text blocks".bold(), blocks.len());
    match FontProfile::from_blocks(&blocks) {
        Some(profile) => {
            println!("{}: {:.1}", "p50".bold(), profile.p50);
            println!("{}: {:.1}", "p75".bold(), profile.p75);
            println!("{}: {:.1}", "p90".bold(), profile.p90);
            println!("{}: {:.1}", "p98".bold(), profile.p98);
        }
        None => println!("{}", "No text found".yellow()),
    }

    println!();
    println!("{} ({} profile)", "Headings".cyan().bold(), options.outline.profile);
    println!("{}", "─".repeat(40).dimmed());

    for level in HeadingLevel::ALL {
        let count = outline.headings.iter().filter(|h| h.level == level).count();
        println!("{}: {}", level.to_string().bold(), count);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline detection and section ranking tool");
    println!();
    println!("License: MIT");
}
