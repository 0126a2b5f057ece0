mod logger;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use logger::CliLogger;
use pdf_images::{ConversionOptions, Direction, PageLayout, set_flag};
use pdf_outline::BookmarkNode;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "images2pdf", about = "Assemble a directory of page images into a PDF", version)]
struct Cli {
    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More output (-v for commands, -vv for outline tracing)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image directory into one PDF
    Convert {
        /// Directory of page images (.tif .tiff .png .jpg .jpeg)
        input: PathBuf,

        /// Output PDF file
        output: PathBuf,

        /// Initial page layout
        #[arg(long = "pagelayout", value_enum)]
        page_layout: Option<PageLayout>,

        /// Reading direction (R2L for right-bound books)
        #[arg(long, value_enum)]
        direction: Option<Direction>,

        /// Resample PNG and JPEG images to this resolution in dpi (0 keeps them)
        #[arg(long)]
        resample: Option<u32>,

        /// Generate an outline from the image file names
        #[arg(long, overrides_with = "no_outlines")]
        outlines: bool,

        /// Do not generate an outline
        #[arg(long, overrides_with = "outlines")]
        no_outlines: bool,

        /// Compress the output's streams
        #[arg(long, alias = "objectstream", overrides_with = "no_compress")]
        compress: bool,

        /// Leave the output's streams uncompressed
        #[arg(long, alias = "no-objectstream", overrides_with = "compress")]
        no_compress: bool,

        /// Read settings from an `@pdf ...` file in the input directory
        #[arg(long, overrides_with = "no_metafile")]
        metafile: bool,

        /// Ignore `@pdf ...` files in the input directory
        #[arg(long, overrides_with = "metafile")]
        no_metafile: bool,

        /// Path to ImageMagick's mogrify
        #[arg(long)]
        mogrify: Option<PathBuf>,

        /// JSON options file used as the base for the flags above
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show what would be done without converting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the outline for an image directory or an existing PDF
    Outline {
        /// Image directory or PDF file
        input: PathBuf,

        /// Print the outline as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(CliLogger::level_for(cli.quiet, cli.verbose))
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            page_layout,
            direction,
            resample,
            outlines,
            no_outlines,
            compress,
            no_compress,
            metafile,
            no_metafile,
            mogrify,
            config,
            dry_run,
        } => {
            let mut options = match config {
                Some(path) => ConversionOptions::load(&path)
                    .await
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => ConversionOptions::default(),
            };
            options.input_dir = input;
            options.output = output;
            options.page_layout = page_layout.or(options.page_layout);
            options.direction = direction.or(options.direction);
            options.resample_dpi = resample.unwrap_or(options.resample_dpi);
            set_flag(&mut options.outlines, outlines, no_outlines);
            set_flag(&mut options.compress, compress, no_compress);
            set_flag(&mut options.metafile, metafile, no_metafile);
            options.dry_run |= dry_run;
            if let Some(mogrify) = mogrify {
                options.mogrify_path = mogrify;
            }

            let report = pdf_images::convert(&options).await?;
            if !cli.quiet {
                println!("Conversion Summary:");
                println!("  Images: {}", report.images);
                println!("  Pages: {}", report.pages);
                println!("  Outline entries: {}", report.outline_entries);
                println!("  PDF version: {}", report.version);
                match report.output {
                    Some(path) => println!("Converted → {}", path.display()),
                    None => println!("Dry run, nothing written"),
                }
            }
        }

        Commands::Outline { input, json } => {
            let roots = load_outline(&input).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&roots)?);
            } else if roots.is_empty() {
                println!("No outline entries found.");
            } else {
                print_outline(&roots);
            }
        }
    }

    Ok(())
}

async fn load_outline(input: &Path) -> Result<Vec<BookmarkNode>> {
    if input.is_dir() {
        return Ok(pdf_images::preview_outline(input).await?);
    }
    let doc = pdf_images::load_pdf(input)
        .await
        .with_context(|| format!("Failed to load {}", input.display()))?;
    Ok(pdf_outline::read_outline(&doc)?)
}

fn print_outline(roots: &[BookmarkNode]) {
    for root in roots {
        for (depth, node) in root.walk() {
            println!("{}{} (p. {})", "  ".repeat(depth), node.title, node.target_page + 1);
        }
    }
}
