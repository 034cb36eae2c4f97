use std::path::PathBuf;
use std::str::FromStr;

use crate::batch::{run_batch, BatchSummaryRow};
use crate::data_collector::DailyRecord;
use crate::error::SeirvError;
use crate::log::{info, set_log_level, set_module_filters, LevelFilter};
use crate::parameters::{load_parameters, Parameters};
use crate::report::{ReportOptions, ReportWriter};
use crate::simulation::Simulation;
use clap::{Args, Command, FromArgMatches as _};

/// Short name of the per-day counts report.
pub const RESULTS_REPORT: &str = "simulation_results";
/// Short name of the across-run summary report written for batches.
pub const SUMMARY_REPORT: &str = "batch_summary";

/// Default cli arguments for the seirv runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed, overriding the seed in the config file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional path for report output
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Optional prefix for report files
    #[arg(short = 'p', long, default_value = "")]
    pub prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Log level, or comma separated `module=level` filters
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Number of days to simulate
    #[arg(short, long, default_value = "200")]
    pub days: usize,

    /// Number of independent runs
    #[arg(short = 'n', long, default_value = "1")]
    pub runs: usize,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: None,
            config: String::new(),
            output_dir: ".".to_string(),
            prefix: String::new(),
            force_overwrite: false,
            log_level: None,
            days: 200,
            runs: 1,
        }
    }
}

fn create_seirv_cli() -> Command {
    let cli = Command::new("seirv").about("Stochastic agent-based SEIRV epidemic model");
    BaseArgs::augment_args(cli)
}

/// A global level and per-module filters parsed from `--log-level`.
#[derive(Debug, PartialEq)]
pub struct LogFilters {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

fn parse_level(level: &str) -> Result<LevelFilter, SeirvError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| SeirvError::InvalidConfiguration(format!("unknown log level `{level}`")))
}

/// Parses either a single level (`info`) or a comma separated list mixing a level with
/// `module=level` pairs (`warn,ixa_seirv::simulation=trace`).
///
/// # Errors
///
/// Returns [`SeirvError::InvalidConfiguration`] for an unknown level name.
pub fn parse_log_filters(value: &str) -> Result<LogFilters, SeirvError> {
    let mut filters = LogFilters {
        global: None,
        modules: Vec::new(),
    };
    for item in value.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        match item.split_once('=') {
            Some((module, level)) => filters
                .modules
                .push((module.trim().to_string(), parse_level(level)?)),
            None => filters.global = Some(parse_level(item)?),
        }
    }
    Ok(filters)
}

fn apply_log_filters(filters: &LogFilters) -> Result<(), SeirvError> {
    if let Some(level) = filters.global {
        set_log_level(level)?;
    }
    if !filters.modules.is_empty() {
        set_module_filters(&filters.modules)?;
    }
    Ok(())
}

/// Runs the model with arguments parsed from the command line.
///
/// # Errors
/// Returns an error if argument parsing, configuration or report output fails
#[allow(clippy::missing_errors_doc)]
pub fn run_with_args() -> Result<Vec<DailyRecord>, Box<dyn std::error::Error>> {
    let cli = create_seirv_cli();
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    Ok(run_with_args_internal(base_args_matches)?)
}

/// Resolves the parameters for a run: the config file if one is given, otherwise the defaults,
/// with the seed replaced by `--random-seed` when present.
///
/// # Errors
/// Returns an error if the config file cannot be read or does not validate
pub fn resolve_parameters(args: &BaseArgs) -> Result<Parameters, SeirvError> {
    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        load_parameters(&PathBuf::from(&args.config))?
    };
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }
    parameters.validate()?;
    Ok(parameters)
}

/// Runs the model described by `args` and writes its reports. Returns the daily records of the
/// single run, or of run 0 for a batch.
///
/// # Errors
/// Returns an error if the configuration is invalid or a report cannot be written
pub fn run_with_args_internal(args: BaseArgs) -> Result<Vec<DailyRecord>, SeirvError> {
    if let Some(log_level) = args.log_level.as_deref() {
        apply_log_filters(&parse_log_filters(log_level)?)?;
    }

    let parameters = resolve_parameters(&args)?;
    // Checked before any report file is created so a rejected run leaves no output behind.
    if args.runs == 0 {
        return Err(SeirvError::InvalidConfiguration(
            "--runs must be at least 1".to_string(),
        ));
    }
    if args.days == 0 {
        return Err(SeirvError::InvalidConfiguration(
            "--days must be at least 1".to_string(),
        ));
    }

    let mut options = ReportOptions::new();
    options
        .directory(PathBuf::from(&args.output_dir))
        .file_prefix(args.prefix.clone())
        .overwrite(args.force_overwrite);
    let mut writer = ReportWriter::with_options(options);
    writer.add_report::<DailyRecord>(RESULTS_REPORT)?;

    if args.runs == 1 {
        let mut simulation = Simulation::new(parameters)?;
        let records = simulation.run(args.days);
        simulation.data_collector().write_report(&mut writer)?;
        return Ok(records);
    }

    writer.add_report::<BatchSummaryRow>(SUMMARY_REPORT)?;
    let batch = run_batch(&parameters, args.runs, args.days)?;
    let records = batch.runs()[0].clone();
    for record in &records {
        writer.send_report(*record)?;
    }
    batch.write_summary_report(&mut writer)?;
    Ok(records)
}
