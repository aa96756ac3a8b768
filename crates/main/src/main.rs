use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use log::debug;

use estimate_pdf::output::{default_output_path, today};
use estimate_pdf::{build_and_save, GenerationOptions};

/// Renders the 참신한 게시대 development estimate to PDF.
///
/// A Korean font has to be available: `malgun.ttf`/`malgunbd.ttf` (or `NanumGothic.ttf`/
/// `NanumGothicBold.ttf`) under `assets/fonts`, in the directory named by `ESTIMATE_FONTS_DIR`,
/// or in the Windows font directory.
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate the web application development estimate PDF")]
struct Cli {
    /// Destination file; its directory must already exist. Existing files are overwritten.
    #[arg(short, long, env = "ESTIMATE_OUTPUT", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Issue date printed in the estimate (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Add a PDF outline entry for every section.
    #[arg(long)]
    bookmarks: bool,
}

fn options_from(cli: &Cli) -> Result<GenerationOptions, Box<dyn Error>> {
    let output = cli.output.clone().unwrap_or_else(default_output_path);
    let options = GenerationOptions::new(output).with_issue_date(cli.date.unwrap_or_else(today));

    #[cfg(feature = "bookmarks")]
    let options = options.with_bookmarks(cli.bookmarks);

    #[cfg(not(feature = "bookmarks"))]
    {
        if cli.bookmarks {
            return Err("Enable the `bookmarks` feature to render section bookmarks:\n    cargo run -p main --features bookmarks -- --bookmarks".into());
        }
    }

    Ok(options)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let options = options_from(cli)?;
    debug!("Generating with {:?}", options);
    let report = build_and_save(&options)?;
    println!("{}", report.completion_message());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
