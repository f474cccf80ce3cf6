// probe-cli/src/main.rs
//
// Command-line interface for the media probe system. Parses arguments with
// clap, configures logging, runs a probe via probe-core, and prints the
// resulting record as JSON on stdout. Exit code 0 means the probe completed
// (even with partial or no analyzer data); non-zero means a fatal error
// such as a missing input file.

use clap::Parser;
use probe_core::{MediaProbe, ProbeConfig, ProbeError};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "probe",
    version,
    about = "Probe a media file for technical metadata",
    long_about = "Combines the output of ffprobe, ImageMagick identify, file, and pdfinfo \
                  into a single normalized metadata record. Missing analyzer tools reduce \
                  the detail of the record but never fail the probe."
)]
struct Cli {
    /// File to probe
    #[arg(required = true, value_name = "MEDIAFILE")]
    mediafile: PathBuf,

    /// Override the location of the 'file' type detector binary
    #[arg(long, value_name = "PATH")]
    file_path: Option<PathBuf>,

    /// Override the location of the ffprobe binary
    #[arg(long, value_name = "PATH")]
    ffprobe_path: Option<PathBuf>,

    /// Override the location of the ImageMagick identify binary
    #[arg(long, value_name = "PATH")]
    identify_path: Option<PathBuf>,

    /// Override the location of the pdfinfo binary
    #[arg(long, value_name = "PATH")]
    pdfinfo_path: Option<PathBuf>,

    /// Per-tool execution timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = probe_core::DEFAULT_TOOL_TIMEOUT_SECS)]
    timeout: u64,

    /// Print single-line JSON instead of pretty-printed output
    #[arg(long)]
    compact: bool,

    /// Enable detailed logging output
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<(), ProbeError> {
    let config = ProbeConfig {
        file_path: cli.file_path,
        ffprobe_path: cli.ffprobe_path,
        identify_path: cli.identify_path,
        pdfinfo_path: cli.pdfinfo_path,
        tool_timeout: Duration::from_secs(cli.timeout),
    };
    config.validate()?;

    let probe = MediaProbe::new(config);
    let record = probe.probe(&cli.mediafile)?;

    let json = if cli.compact {
        serde_json::to_string(&record)
    } else {
        serde_json::to_string_pretty(&record)
    }
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    println!("{json}");

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over the --verbose flag.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
