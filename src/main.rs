use clap::Parser;
use log::{debug, info};

use std::path::PathBuf;

mod analysis;
mod args;

use analysis::config_reader::{read_config, AnalysisConfig};
use analysis::{PollResult, Settings};
use args::{Args, Command};

fn build_settings(args: &Args) -> PollResult<Settings> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => AnalysisConfig::default(),
    };
    debug!("config: {:?}", config);
    let mut settings = Settings::from_config(&config);
    if let Some(dir) = &args.raw_data_dir {
        settings.raw_data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = &args.results_dir {
        settings.results_dir = PathBuf::from(dir);
    }
    if let Some(dir) = &args.figures_dir {
        settings.figures_dir = PathBuf::from(dir);
    }
    info!("settings: {:?}", settings);
    Ok(settings)
}

fn run(args: Args) -> PollResult<()> {
    let settings = build_settings(&args)?;
    match args.command {
        Command::Compile { year, reference } => analysis::run_compile(&settings, year, reference),
        Command::Compare { year } => analysis::run_polling_comparison(&settings, year).map(|_| ()),
        Command::Correlation => analysis::run_yearly_correlation(&settings).map(|_| ()),
        Command::Outliers { year, exclude } => {
            let excluded = settings.excluded_with(&exclude);
            analysis::run_outlier_detection(&settings, year, &excluded).map(|_| ())
        }
        Command::Points { year, country } => {
            analysis::run_points(&settings, year, country.as_deref()).map(|_| ())
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    debug!("args: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("An error occured: {}", e);
        if let Some(source) = std::error::Error::source(&e) {
            eprintln!("caused by: {}", source);
        }
        std::process::exit(1);
    }
}
