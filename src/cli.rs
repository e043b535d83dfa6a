// ============================================================================
// Paletta CLI — headless palette extraction via command-line arguments
// ============================================================================
//
// Usage examples:
//   paletta --input photo.png
//   paletta -i photo.jpg --colors 8 --json
//   paletta -i photo.png -o palette.json
//
// No GUI is opened in CLI mode. Extraction runs synchronously on the
// current thread.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{self, ExportFormat};
use crate::ops::extract;

/// Paletta headless palette extractor.
///
/// Extract dominant colors from an image file without opening the GUI.
#[derive(Parser, Debug)]
#[command(
    name = "paletta",
    about = "Paletta headless palette extractor",
    long_about = "Extract the dominant colors of an image and print or save them\n\
                  without opening the GUI.\n\n\
                  Example:\n  \
                  paletta --input photo.png --colors 5\n  \
                  paletta -i photo.jpg -o palette.json"
)]
pub struct CliArgs {
    /// Input image file (PNG, JPEG, WEBP, BMP).
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Number of dominant colors to extract.
    #[arg(short, long, default_value_t = 5, value_name = "1-20")]
    pub colors: usize,

    /// Print the palette as a JSON array instead of one hex color per line.
    #[arg(long)]
    pub json: bool,

    /// Write the palette to a file (.json → JSON array, anything else →
    /// one hex color per line) instead of printing it.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Run the extraction and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    if args.colors == 0 || args.colors > 20 {
        eprintln!("error: --colors must be between 1 and 20.");
        return ExitCode::FAILURE;
    }

    let started = Instant::now();

    let image = match io::load_image_sync(&args.input) {
        Ok(img) => img,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let colors = match extract::extract_colors(&image, args.colors) {
        Ok(colors) => colors,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(output) = &args.output {
        if let Err(e) = io::export_palette(output, &colors) {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
        if args.verbose {
            println!(
                "{} colors written to {} in {:.0?}",
                colors.len(),
                output.display(),
                started.elapsed()
            );
        }
    } else {
        let format = if args.json {
            ExportFormat::Json
        } else {
            ExportFormat::Text
        };
        print!("{}", io::render_palette(&colors, format));
        if args.verbose {
            eprintln!("extracted in {:.0?}", started.elapsed());
        }
    }

    ExitCode::SUCCESS
}
