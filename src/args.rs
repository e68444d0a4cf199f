use clap::{Parser, Subcommand};

/// This program allocates song contest points and compares the votes with the polls.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the directories and the years to process.
    /// See the manual of the contest_points crate for the keys.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory) Where the countries, points and poll text files are. Overrides the config file.
    #[clap(long, value_parser)]
    pub raw_data_dir: Option<String>,

    /// (directory) Where the compiled JSON vote records are written and read.
    #[clap(long, value_parser)]
    pub results_dir: Option<String>,

    /// (directory) Where the SVG charts are written.
    #[clap(long, value_parser)]
    pub figures_dir: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Turn the raw vote files into JSON vote records.
    Compile {
        /// (optional) Only this year. All the configured years otherwise.
        #[clap(short, long, value_parser)]
        year: Option<u32>,
        /// (file path, optional) A reference JSON record. The compiled record must match it.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Correlation between the polling and the votes of one year.
    Compare {
        #[clap(short, long, value_parser)]
        year: u32,
    },
    /// Correlation between the polling and the votes for every configured year.
    Correlation,
    /// Contestants whose votes deviate the most from their polling.
    Outliers {
        #[clap(short, long, value_parser)]
        year: u32,
        /// (repeatable) A contestant left out of the comparison.
        #[clap(short, long, value_parser)]
        exclude: Vec<String>,
    },
    /// Allocate the contest points of a compiled year.
    Points {
        #[clap(short, long, value_parser)]
        year: u32,
        /// (optional) Also chart the points received by this contestant.
        #[clap(long, value_parser)]
        country: Option<String>,
    },
}
