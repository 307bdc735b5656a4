//! pdfknowledge CLI - PDF page dump to knowledge records

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfknowledge::render::{self, JsonFormat};
use pdfknowledge::{
    DocumentInfo, ExtractOptions, LayoutMode, OcrConfig, PageAssembler, PdfKnowledge, TitleEntry,
};

#[derive(Parser)]
#[command(name = "pdfknowledge")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract ordered records and section indexes from PDF page dumps", long_about = None)]
struct Cli {
    /// Input page dump (JSON)
    #[arg(value_name = "PAGES")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a page dump into per-page output items
    Convert {
        /// Input page dump (JSON)
        #[arg(value_name = "PAGES")]
        input: PathBuf,

        /// Original PDF, enables OCR for scanned documents
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write every record as JSON Lines
        #[arg(long, value_name = "FILE")]
        dump: Option<PathBuf>,

        /// Document title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Minimum words for a page to count as native text
        #[arg(long, default_value = "5")]
        min_words: usize,

        /// OCR language(s), e.g. "chi_sim" or "chi_sim+eng"
        #[arg(long, default_value = "chi_sim+eng", env = "PDFKNOWLEDGE_OCR_LANG")]
        lang: String,

        /// OCR page layout
        #[arg(long, value_enum, default_value = "single-column")]
        layout: OcrLayout,

        /// Rasterization resolution for OCR
        #[arg(long, default_value = "300")]
        dpi: u32,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },

    /// Print the section index of a page dump
    Titles {
        /// Input page dump (JSON)
        #[arg(value_name = "PAGES")]
        input: PathBuf,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },

    /// Re-assemble output items from a record dump
    Assemble {
        /// Record dump (JSON Lines)
        #[arg(value_name = "DUMP")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Document title (defaults to the file stem)
        #[arg(long)]
        title: Option<String>,

        /// Compact JSON output
        #[arg(short, long)]
        compact: bool,
    },

    /// Show conversion statistics and sections
    Info {
        /// Input page dump (JSON)
        #[arg(value_name = "PAGES")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum OcrLayout {
    /// Fully automatic page segmentation
    Auto,
    /// One column of text
    SingleColumn,
    /// One uniform block of text
    SingleBlock,
    /// Scattered text in no particular order
    Sparse,
}

impl From<OcrLayout> for LayoutMode {
    fn from(layout: OcrLayout) -> Self {
        match layout {
            OcrLayout::Auto => LayoutMode::Auto,
            OcrLayout::SingleColumn => LayoutMode::SingleColumn,
            OcrLayout::SingleBlock => LayoutMode::SingleBlock,
            OcrLayout::Sparse => LayoutMode::SparseText,
        }
    }
}

struct ConvertArgs {
    pdf: Option<PathBuf>,
    output: Option<PathBuf>,
    dump: Option<PathBuf>,
    title: Option<String>,
    min_words: usize,
    ocr: OcrConfig,
    format: JsonFormat,
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            pdf,
            output,
            dump,
            title,
            min_words,
            lang,
            layout,
            dpi,
            compact,
        }) => cmd_convert(
            &input,
            ConvertArgs {
                pdf,
                output,
                dump,
                title,
                min_words,
                ocr: OcrConfig::new()
                    .with_language(lang)
                    .with_layout(layout.into())
                    .with_dpi(dpi),
                format: json_format(compact),
            },
        ),
        Some(Commands::Titles { input, compact }) => cmd_titles(&input, compact),
        Some(Commands::Assemble {
            input,
            output,
            title,
            compact,
        }) => cmd_assemble(&input, output.as_deref(), title, compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert with default settings if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    ConvertArgs {
                        pdf: None,
                        output: None,
                        dump: None,
                        title: None,
                        min_words: ExtractOptions::default().scan.min_words,
                        ocr: OcrConfig::default(),
                        format: JsonFormat::Pretty,
                    },
                )
            } else {
                println!("{}", "Usage: pdfknowledge <PAGES>".yellow());
                println!("       pdfknowledge --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(input: &Path, args: ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Converting {}...", input.display()));

    let mut builder = PdfKnowledge::new()
        .with_min_words(args.min_words)
        .with_ocr_config(args.ocr);
    if let Some(pdf) = args.pdf {
        builder = builder.with_pdf(pdf);
    }
    if let Some(title) = args.title {
        builder = builder.with_title(title);
    }
    let conversion = builder.convert(input)?;
    pb.finish_and_clear();
    log::info!(
        "{}: {} pages, {} items, {} sections",
        input.display(),
        conversion.stats.pages,
        conversion.items.len(),
        conversion.titles().section_count()
    );

    if let Some(path) = &args.dump {
        let writer = BufWriter::new(File::create(path)?);
        render::save_records(&conversion.index, writer)?;
        eprintln!("{} {}", "Records saved to".green(), path.display());
    }

    if conversion.stats.scanned && conversion.stats.ocr_pages == 0 {
        eprintln!(
            "{}",
            "Document looks scanned; pass --pdf to enable OCR".yellow()
        );
    }

    let json = render::to_json(&conversion.items, args.format)?;
    if let Some(path) = &args.output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_titles(input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = pdfknowledge::convert_file(input)?;
    let json = render::to_json(conversion.titles(), json_format(compact))?;
    println!("{}", json);
    Ok(())
}

fn cmd_assemble(
    input: &Path,
    output: Option<&Path>,
    title: Option<String>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = render::load_records(BufReader::new(File::open(input)?))?;
    log::debug!("{}: loaded {} records", input.display(), index.records.len());

    let mut info = DocumentInfo::from_path(input);
    if let Some(title) = title {
        info.title = title;
    }
    let items = PageAssembler::new().assemble(&index, &info);

    let json = render::to_json(&items, json_format(compact))?;
    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let conversion = pdfknowledge::convert_file(input)?;
    let stats = &conversion.stats;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Title".bold(), conversion.info.title);
    println!("{}: {}", "Pages".bold(), stats.pages);
    println!(
        "{}: {}",
        "Scanned".bold(),
        if stats.scanned { "Yes" } else { "No" }
    );
    if stats.empty_pages > 0 {
        println!("{}: {}", "Empty pages".bold(), stats.empty_pages);
    }

    println!();
    println!("{}", "Record Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Text".bold(), stats.text_records);
    println!("{}: {}", "Tables".bold(), stats.table_records);
    println!("{}: {}", "Headers".bold(), stats.header_records);
    println!("{}: {}", "Footers".bold(), stats.footer_records);
    if stats.ragged_rows > 0 {
        println!("{}: {}", "Ragged rows".bold(), stats.ragged_rows);
    }

    let titles = conversion.titles();
    if !titles.is_empty() {
        println!();
        println!("{}", "Sections".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());

        for entry in titles.entries() {
            match entry {
                TitleEntry::Section(node) => {
                    println!(
                        "{} {}",
                        node.label.bold(),
                        format!("({} tables)", node.tables.len()).dimmed()
                    );
                    for sub in &node.subsections {
                        println!(
                            "    {} {}",
                            sub.label,
                            format!("({} tables)", sub.tables.len()).dimmed()
                        );
                    }
                }
                TitleEntry::Table(table) => {
                    println!(
                        "{} {} {}",
                        "table".dimmed(),
                        table.caption,
                        format!("(page {})", table.page).dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfknowledge".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page dump to knowledge records");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfknowledge".dimmed());
    println!("License: MIT");
}
