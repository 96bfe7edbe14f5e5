use std::io::stdout;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use structopt::StructOpt;

mod chunker;
mod config;
mod paint;
mod presentation;
mod session;
mod surface;
mod viewer;

use crate::config::ZeroStyle;
use crate::surface::WindowService;

/// Hex dump files into editor windows
#[derive(StructOpt, Debug)]
#[structopt(name = "hexa")]
struct Opts {
    /// Bytes shown on each line
    #[structopt(short = "c", long = "bytes-per-line", default_value = "16")]
    bytes_per_line: usize,

    /// Print genuine zero bytes as `00` instead of blanking them like padding
    #[structopt(long)]
    strict_zeros: bool,

    /// Write the dumps to stdout instead of opening the viewer
    #[structopt(long)]
    print: bool,

    /// Where log output goes
    #[structopt(long, default_value = "hexa.log", parse(from_os_str))]
    log_file: PathBuf,

    /// Log debug detail
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(parse(from_os_str), required = true)]
    filenames: Vec<PathBuf>,
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let requests = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} - {m}{n}")))
        .append(false)
        .build(path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let config = Config::builder()
        .appender(Appender::builder().build("requests", Box::new(requests)))
        .logger(Logger::builder().build("hexa", level))
        .build(
            Root::builder()
                .appender("requests")
                .build(LevelFilter::Warn),
        )
        .map_err(|e| anyhow!("configuring logging: {}", e))?;

    let _handle = log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::from_args();

    let zero_style = if opts.strict_zeros {
        ZeroStyle::Strict
    } else {
        ZeroStyle::Blank
    };

    init_logging(&opts.log_file, opts.verbose)?;
    log::info!("logging set up");
    log::debug!("{:?}", opts);

    let mut service = WindowService::new();
    let windows = session::open_all(
        &mut service,
        &opts.filenames,
        opts.bytes_per_line,
        zero_style,
    )?;

    if opts.print {
        let out = stdout();
        let lock = out.lock();
        viewer::print(&windows, lock)?;
    } else {
        viewer::run(windows)?;
    }

    Ok(())
}
