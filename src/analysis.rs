use log::{debug, info, warn};

use contest_points::comparison::{Comparison, OutlierRow, DEFAULT_OUTLIER_THRESHOLD};
use contest_points::stats::Correlation;
use contest_points::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use text_diff::print_diff;

use crate::analysis::charts::ChartLayout;
use crate::analysis::config_reader::*;

pub mod charts;
mod io_common;
mod io_polling;
mod io_votes;

pub use io_polling::read_polling;
pub use io_votes::{read_record, write_record};

#[derive(Debug, Snafu)]
pub enum PollError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("{path} is not an object of voting countries to vote counts"))]
    MalformedResults { path: String },
    #[snafu(display("{path}, line {lineno}: cannot read a vote count in {content:?}"))]
    PollingCount {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("{path}, line {lineno}: vote count without a contestant"))]
    PollingMissingName { path: String, lineno: usize },
    #[snafu(display("Cannot compute the statistics of {year}"))]
    Statistics {
        source: AnalysisErrors,
        year: u32,
    },
    #[snafu(display("Cannot draw chart {path}: {message}"))]
    Chart { path: String, message: String },
    #[snafu(display("Difference detected between {path} and the reference {reference}"))]
    ReferenceMismatch { path: String, reference: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PollResult<T> = Result<T, PollError>;

pub mod config_reader {
    use crate::analysis::*;

    #[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AnalysisConfig {
        #[serde(rename = "rawDataDir")]
        pub raw_data_dir: Option<String>,
        #[serde(rename = "resultsDir")]
        pub results_dir: Option<String>,
        #[serde(rename = "figuresDir")]
        pub figures_dir: Option<String>,
        #[serde(rename = "firstYear")]
        pub first_year: Option<u32>,
        #[serde(rename = "lastYear")]
        pub last_year: Option<u32>,
        #[serde(rename = "excludedCountries")]
        pub excluded_countries: Option<Vec<String>>,
        #[serde(rename = "outlierThreshold")]
        pub outlier_threshold: Option<f64>,
    }

    pub fn read_config(path: &str) -> PollResult<AnalysisConfig> {
        let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
        debug!("read config: {:?}", contents);
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
    }
}

/// Where the files of each year are, and which years to process.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub raw_data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub first_year: u32,
    pub last_year: u32,
    pub excluded_countries: Vec<String>,
    pub outlier_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            raw_data_dir: PathBuf::from("raw_data"),
            results_dir: PathBuf::from("results"),
            figures_dir: PathBuf::from("figures"),
            first_year: 2021,
            last_year: 2025,
            excluded_countries: Vec::new(),
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
        }
    }
}

impl Settings {
    pub fn from_config(config: &AnalysisConfig) -> Settings {
        let default = Settings::default();
        Settings {
            raw_data_dir: config
                .raw_data_dir
                .clone()
                .map(PathBuf::from)
                .unwrap_or(default.raw_data_dir),
            results_dir: config
                .results_dir
                .clone()
                .map(PathBuf::from)
                .unwrap_or(default.results_dir),
            figures_dir: config
                .figures_dir
                .clone()
                .map(PathBuf::from)
                .unwrap_or(default.figures_dir),
            first_year: config.first_year.unwrap_or(default.first_year),
            last_year: config.last_year.unwrap_or(default.last_year),
            excluded_countries: config.excluded_countries.clone().unwrap_or_default(),
            outlier_threshold: config
                .outlier_threshold
                .unwrap_or(default.outlier_threshold),
        }
    }

    /// The configured exclusions followed by the extra ones, without duplicates.
    pub fn excluded_with(&self, extra: &[String]) -> Vec<String> {
        let mut excluded: Vec<String> = Vec::new();
        for name in self.excluded_countries.iter().chain(extra.iter()) {
            if !excluded.contains(name) {
                excluded.push(name.clone());
            }
        }
        excluded
    }

    pub fn years(&self) -> Vec<u32> {
        (self.first_year..=self.last_year).collect()
    }

    pub fn countries_path(&self, year: u32) -> PathBuf {
        self.raw_data_dir.join(format!("{}_countries.txt", year))
    }

    pub fn votes_path(&self, year: u32) -> PathBuf {
        self.raw_data_dir.join(format!("{}_points.txt", year))
    }

    pub fn polling_path(&self, year: u32) -> PathBuf {
        self.raw_data_dir.join(format!("{}_poll.txt", year))
    }

    pub fn results_path(&self, year: u32) -> PathBuf {
        self.results_dir.join(format!("{}_points.json", year))
    }

    pub fn figure_path(&self, name: &str) -> PathBuf {
        self.figures_dir.join(format!("{}.svg", name))
    }
}

/// The correlation between polling and votes for one year.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct YearCorrelation {
    pub year: u32,
    pub correlation: Correlation,
}

/// Reads the raw files of a year and writes its intermediate vote record.
pub fn compile_year(settings: &Settings, year: u32) -> PollResult<VotingRecord> {
    let countries = io_votes::read_countries(&settings.countries_path(year))?;
    let record = io_votes::read_votes(&settings.votes_path(year), &countries)?;
    let out = settings.results_path(year);
    write_record(&out, &record)?;
    info!(
        "compile_year: {}: {} voting countries written to {:?}",
        year,
        record.rows.len(),
        out
    );
    Ok(record)
}

pub fn run_compile(
    settings: &Settings,
    year: Option<u32>,
    reference: Option<String>,
) -> PollResult<()> {
    if let Some(year) = year {
        compile_year(settings, year)?;
        if let Some(reference) = reference {
            check_reference(&settings.results_path(year), &reference)?;
        }
        return Ok(());
    }
    if reference.is_some() {
        whatever!("A reference file can only be checked for a single --year");
    }

    let mut compiled = 0;
    for year in settings.years() {
        match compile_year(settings, year) {
            Ok(_) => compiled += 1,
            Err(e) => warn!("Error compiling year {}: {}", year, e),
        }
    }
    if compiled == 0 {
        whatever!(
            "No year between {} and {} could be compiled",
            settings.first_year,
            settings.last_year
        );
    }
    info!("run_compile: {} years compiled", compiled);
    Ok(())
}

fn check_reference(path: &Path, reference: &str) -> PollResult<()> {
    let produced = io_common::read_json(path)?;
    let expected = io_common::read_json(Path::new(reference))?;
    let pretty_produced =
        serde_json::to_string_pretty(&produced).context(SerializingJsonSnafu {})?;
    let pretty_expected =
        serde_json::to_string_pretty(&expected).context(SerializingJsonSnafu {})?;
    if pretty_expected != pretty_produced {
        warn!("Found differences with the reference file");
        print_diff(pretty_expected.as_str(), pretty_produced.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: path.display().to_string(),
            reference,
        }
        .fail();
    }
    info!("check_reference: {:?} matches {:?}", path, reference);
    Ok(())
}

/// Pairs the polling of a year with the votes recorded for it.
pub fn polling_comparison(
    settings: &Settings,
    year: u32,
    excluded: &[String],
) -> PollResult<Comparison> {
    let polling = read_polling(&settings.polling_path(year))?;
    let record = read_record(&settings.results_path(year))?;
    let actual = record.totals();
    Comparison::build(&polling, &actual, excluded).context(StatisticsSnafu { year })
}

pub fn run_polling_comparison(settings: &Settings, year: u32) -> PollResult<Correlation> {
    let comparison = polling_comparison(settings, year, &[])?;
    let correlation = comparison
        .correlation()
        .context(StatisticsSnafu { year })?;
    println!(
        "Correlation between polling and actual results for {}: {:.2} (p-value: {:.2e})",
        year, correlation.coefficient, correlation.p_value
    );

    let layout = ChartLayout::new(
        format!(
            "Polling vs Actual Results for {} (Correlation: {:.2})",
            year, correlation.coefficient
        ),
        "Polling Results",
        "Actual Results",
        settings.figure_path(&format!("{}_polling_vs_actual", year)),
    )
    .with_ranges(0.0..0.2, 0.0..0.2);
    let points: Vec<(f64, f64)> = comparison
        .rows
        .iter()
        .map(|r| (r.polling, r.actual))
        .collect();
    charts::draw_scatter_with_diagonal(&layout, &points)?;
    Ok(correlation)
}

/// Runs the polling comparison of every configured year.
///
/// A year that fails (missing file, too little data, ...) is logged and left
/// out; the remaining years are still processed.
pub fn collect_yearly_correlations(settings: &Settings) -> Vec<YearCorrelation> {
    let mut res: Vec<YearCorrelation> = Vec::new();
    for year in settings.years() {
        match run_polling_comparison(settings, year) {
            Ok(correlation) => res.push(YearCorrelation { year, correlation }),
            Err(e) => {
                warn!("Error processing year {}: {}", year, e);
                eprintln!("Error processing year {}: {}", year, e);
            }
        }
    }
    res
}

pub fn run_yearly_correlation(settings: &Settings) -> PollResult<Vec<YearCorrelation>> {
    let yearly = collect_yearly_correlations(settings);
    if yearly.is_empty() {
        whatever!(
            "No year between {} and {} could be processed",
            settings.first_year,
            settings.last_year
        );
    }

    let correlations: Vec<(u32, f64)> = yearly
        .iter()
        .map(|y| (y.year, y.correlation.coefficient))
        .collect();
    let layout = ChartLayout::new(
        "Correlation between polling and actual results",
        "Year",
        "Correlation",
        settings.figure_path("polling_vs_actual_correlation"),
    );
    charts::draw_yearly_line(&layout, &correlations)?;

    let p_values: Vec<(u32, f64)> = yearly
        .iter()
        .map(|y| (y.year, y.correlation.p_value))
        .collect();
    let layout = ChartLayout::new(
        "p-value for correlation between polling and actual results",
        "Year",
        "p-value",
        settings.figure_path("polling_vs_actual_p_value"),
    );
    charts::draw_yearly_line(&layout, &p_values)?;
    Ok(yearly)
}

/// Looks for the contestants whose votes deviate the most from their poll.
pub fn run_outlier_detection(
    settings: &Settings,
    year: u32,
    excluded: &[String],
) -> PollResult<Vec<OutlierRow>> {
    let comparison = polling_comparison(settings, year, excluded)?;
    let rows = comparison
        .outliers(settings.outlier_threshold)
        .context(StatisticsSnafu { year })?;

    let name = if excluded.is_empty() {
        format!("{}_outlier_detection", year)
    } else {
        let correlation = comparison
            .correlation()
            .context(StatisticsSnafu { year })?;
        println!(
            "Correlation between polling and actual results for {} (excluding countries): {:.2} (p-value: {:.2e})",
            year, correlation.coefficient, correlation.p_value
        );
        format!("{}_outlier_detection_excluding_countries", year)
    };

    for r in rows.iter().filter(|r| r.is_outlier) {
        println!("Outlier in {}: {} (z-score {:.2})", year, r.name, r.z_score);
    }

    let layout = ChartLayout::new(
        format!("Outlier Detection for {} (Z-scores)", year),
        "Polling Results",
        "Actual Results",
        settings.figure_path(&name),
    )
    .with_ranges(0.0..0.2, 0.0..0.2);
    charts::draw_outliers(&layout, &rows)?;
    Ok(rows)
}

/// Allocates the contest points of a compiled year and charts them.
pub fn run_points(
    settings: &Settings,
    year: u32,
    country: Option<&str>,
) -> PollResult<PointsTable> {
    let record = read_record(&settings.results_path(year))?;
    let table = allocate_points(&record);

    let totals = table.totals_received();
    let mut ranking: Vec<&(String, u64)> = totals.iter().collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1));
    for (name, points) in ranking {
        println!("{:>5} {}", points, name);
    }

    let layout = ChartLayout::new(
        "Points allocated to each country",
        "Countries",
        "Points",
        settings.figure_path(&format!("{}_points_received", year)),
    );
    charts::draw_bar_chart(&layout, &totals)?;

    if let Some(country) = country {
        let received = table.received_from_each(country);
        if received.is_empty() {
            whatever!("{} did not receive any vote in {}", country, year);
        }
        let values: Vec<u32> = received.iter().map(|(_, p)| *p).collect();
        let layout = ChartLayout::new(
            format!("Points allocated to {}", country),
            "Points",
            "Frequency",
            settings.figure_path(&format!(
                "{}_points_histogram_{}",
                year,
                io_common::file_slug(country)
            )),
        );
        charts::draw_histogram(&layout, &values)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COUNTRIES: &str = "Malta\nalbania\nItaly\n";
    // Columns: albania, Italy, Malta, Rest of the World
    const VOTES: &str = "\
Sweden\t40\t10\t12\t8\t10
Italy\t30\t12\t0\t10\t8
Malta\t18\t8\t10\t0\t0
Norway\t6\t0\t6\t0\t0
";
    const POLL: &str = "1,000\nSweden\n700\nItaly\n150\nMalta\n150\nNorway\n";

    fn settings_in(dir: &TempDir) -> Settings {
        Settings {
            raw_data_dir: dir.path().join("raw_data"),
            results_dir: dir.path().join("results"),
            figures_dir: dir.path().join("figures"),
            first_year: 2021,
            last_year: 2023,
            ..Settings::default()
        }
    }

    fn write_year(settings: &Settings, year: u32, with_poll: bool) {
        fs::create_dir_all(&settings.raw_data_dir).unwrap();
        fs::write(settings.countries_path(year), COUNTRIES).unwrap();
        fs::write(settings.votes_path(year), VOTES).unwrap();
        if with_poll {
            fs::write(settings.polling_path(year), POLL).unwrap();
        }
    }

    #[test]
    fn compile_writes_ordered_record() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_year(&settings, 2021, false);
        compile_year(&settings, 2021).unwrap();

        let record = read_record(&settings.results_path(2021)).unwrap();
        assert_eq!(
            record.countries(),
            vec!["albania", "Italy", "Malta", REST_OF_THE_WORLD]
        );
        assert_eq!(record.row("Italy").unwrap().get("Norway"), Some(6));
        let names: Vec<&str> = record.rows[0].votes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Sweden", "Italy", "Malta", "Norway"]);
    }

    #[test]
    fn compile_checks_reference() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_year(&settings, 2021, false);
        compile_year(&settings, 2021).unwrap();
        let reference = dir.path().join("reference.json");
        fs::copy(settings.results_path(2021), &reference).unwrap();
        let reference = reference.display().to_string();

        run_compile(&settings, Some(2021), Some(reference.clone())).unwrap();

        fs::write(settings.votes_path(2021), "Sweden\t1\t1\n").unwrap();
        let res = run_compile(&settings, Some(2021), Some(reference));
        assert!(matches!(res, Err(PollError::ReferenceMismatch { .. })));
    }

    #[test]
    fn missing_year_is_skipped() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_year(&settings, 2021, true);
        write_year(&settings, 2023, true);
        run_compile(&settings, None, None).unwrap();
        assert!(!settings.results_path(2022).exists());

        let yearly = collect_yearly_correlations(&settings);
        let years: Vec<u32> = yearly.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2021, 2023]);
        assert!(yearly[0].correlation.coefficient > 0.5);
    }

    #[test]
    fn compile_fails_without_any_year() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        let res = run_compile(&settings, None, None);
        assert!(matches!(res, Err(PollError::Whatever { .. })));
    }

    #[test]
    fn exclusions_merged_without_duplicates() {
        let settings = Settings {
            excluded_countries: vec!["Israel".to_string(), "Ukraine".to_string()],
            ..Settings::default()
        };
        let merged = settings.excluded_with(&[
            "Ukraine".to_string(),
            "Malta".to_string(),
            "Malta".to_string(),
        ]);
        assert_eq!(merged, vec!["Israel", "Ukraine", "Malta"]);
        assert_eq!(Settings::default().excluded_with(&[]), Vec::<String>::new());
    }

    #[test]
    fn yearly_run_fails_without_any_year() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        assert!(run_yearly_correlation(&settings).is_err());
    }

    #[test]
    fn points_from_compiled_year() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_year(&settings, 2021, false);
        compile_year(&settings, 2021).unwrap();
        let table = run_points(&settings, 2021, Some("Sweden")).unwrap();
        // Four contestants per voter: 12, 10, 8, 7 in vote order.
        assert_eq!(table.row("albania").unwrap().get("Italy"), Some(12));
        assert_eq!(table.row("albania").unwrap().get("Norway"), Some(7));
        // Malta and Norway tie at 0 for Rest of the World, Malta comes first.
        assert_eq!(table.row(REST_OF_THE_WORLD).unwrap().get("Malta"), Some(8));
        assert_eq!(table.row(REST_OF_THE_WORLD).unwrap().get("Norway"), Some(7));
        assert!(settings.figure_path("2021_points_received").exists());
        assert!(settings.figure_path("2021_points_histogram_sweden").exists());
    }

    #[test]
    fn outliers_with_exclusion_use_own_chart() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        write_year(&settings, 2021, true);
        compile_year(&settings, 2021).unwrap();
        let rows = run_outlier_detection(&settings, 2021, &["Norway".to_string()]).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Italy", "Malta", "Sweden"]);
        assert!(settings
            .figure_path("2021_outlier_detection_excluding_countries")
            .exists());
    }

    #[test]
    fn config_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"rawDataDir": "data", "lastYear": 2024}"#).unwrap();
        let settings = Settings::from_config(&config);
        assert_eq!(settings.raw_data_dir, PathBuf::from("data"));
        assert_eq!(settings.results_dir, PathBuf::from("results"));
        assert_eq!(settings.years(), vec![2021, 2022, 2023, 2024]);
        assert_eq!(settings.outlier_threshold, 2.0);
    }
}
