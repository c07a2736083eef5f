//! Command Line Interface for robustify
//!
//! robustify uses the `clap` crate to parse command line arguments and create
//! the CLI interface. This module defines all available commands and options
//! (and their documentation) as well as the functions executing them.

use std::{fmt::Display, fs, path::Path, path::PathBuf};

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, error, info, warn};
use log4rs::{
    Config,
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use robustify_lts::lts::LTS;
use robustify_parser::{ParseLTS, lts_format::LTSParser};
use robustify_tolerance::{
    ToleranceProblem,
    budget::SearchResult,
    conformance::verify_deltas,
    search::{Algorithm, compute_deltas},
};

use crate::cli::output::{render_deltas, render_violations, translate};
use crate::robustify_config::RobustifyConfig;

mod output;

/// robustify - tolerance analysis of environment models
///
/// Given an environment model, a controller and a safety property as
/// labelled transition systems over a shared alphabet, robustify computes the
/// maximal sets of additional environment transitions (deltas) under which
/// the controlled system still satisfies the property.
///
/// Automata are read from files in the explicit `.lts` format. You can use
/// the --help / -h flag to get all available commands and options.
#[derive(Parser, Debug)]
#[command(version, name = "robustify", about, long_about)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) log_config: LoggerConfig,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Compute the maximal environment perturbations tolerated by the
    /// controller
    Tolerance(ToleranceArgs),
    /// Check whether the environment composed with the controller satisfies
    /// the property
    Check {
        #[command(flatten)]
        input: ProblemInput,
    },
    #[cfg(feature = "dot")]
    /// Read an automaton and visualize it
    Visualize {
        /// Location of the automaton file
        input_file: PathBuf,

        #[command(flatten)]
        output: VisualizationOutput,
    },
    /// Translate an automaton into another textual format
    Translate {
        /// Location of the automaton file
        input_file: PathBuf,

        #[command(flatten)]
        output: TranslationOutput,
    },
}

#[derive(Args, Debug)]
pub(crate) struct ToleranceArgs {
    /// Search strategy to use
    #[arg(value_enum)]
    algorithm: AlgorithmOption,

    #[command(flatten)]
    input: ProblemInput,

    /// Configuration file for the search
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Seed of the random number generator of the heuristic search
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of explored search nodes
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Maximum depth of the search
    #[arg(long)]
    max_depth: Option<usize>,

    /// Time limit of the search in seconds
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Evaluate the pruned search in parallel (default: false / off)
    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    /// Write the difference between the environment and each perturbed
    /// environment in DOT format into this directory
    #[arg(long, value_name = "DIR")]
    dot_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ProblemInput {
    /// Location of the environment model
    env_file: PathBuf,

    /// Location of the controller
    ctrl_file: PathBuf,

    /// Location of the safety property
    prop_file: PathBuf,

    /// Route every undefined transition of the property to a new violating
    /// state instead of rejecting incomplete properties
    #[arg(long, default_value_t = false)]
    complete_property: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum AlgorithmOption {
    /// Check every superset of the required transitions (small instances
    /// only)
    Exhaustive,
    /// Enumerate subsets of the winning region
    Pruned,
    /// Randomized depth first search over the winning region
    Heuristic,
}

impl From<AlgorithmOption> for Algorithm {
    fn from(value: AlgorithmOption) -> Self {
        match value {
            AlgorithmOption::Exhaustive => Algorithm::Exhaustive,
            AlgorithmOption::Pruned => Algorithm::Pruned,
            AlgorithmOption::Heuristic => Algorithm::Heuristic,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct VisualizationOutput {
    /// Output file to save the visualization
    output_file: PathBuf,
    /// Output format for the visualization
    ///
    /// Supported formats are: `dot`, `svg`, `png`; default is `dot`
    /// Note that `svg` and `png` formats require the `graphviz` library to be
    /// installed on the system
    #[arg(short, long, value_name = "OUT_FORMAT", default_value = "dot")]
    output_format: OutputFormat,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Output as DOT
    DOT,
    /// Output as SVG
    SVG,
    /// Output as PNG
    PNG,
}

#[derive(Debug, Args)]
pub(crate) struct TranslationOutput {
    /// Output file to save the translated output to
    output_file: PathBuf,
    /// Format to translate to (default: fsp)
    #[arg(short, long, value_name = "OUT_FORMAT", default_value = "fsp")]
    output_format: TranslationFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub(crate) enum TranslationFormat {
    /// FSP-like process equations
    Fsp,
    /// Explicit `.lts` format
    Lts,
}

impl Display for TranslationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationFormat::Fsp => write!(f, "FSP"),
            TranslationFormat::Lts => write!(f, "LTS"),
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct LoggerConfig {
    /// Read the logger configuration from file.
    /// Logger configuration can be provided in the log4rs configuration format.
    #[arg(long)]
    logger_config_file: Option<String>,

    /// Enable debug output.
    /// **Note**: This flag must be passed first, before any command.
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Initialize the logger as specified in `cfg`
///
/// By default the logger is configured to log to stdout. If a log4rs
/// configuration file is given in `cfg`, the configuration from that file will
/// be used instead
pub(crate) fn initialize_logger(cfg: LoggerConfig) -> Result<(), anyhow::Error> {
    if let Some(f) = cfg.logger_config_file {
        log4rs::init_file(f, Default::default())
            .with_context(|| "Failed to read logger config file")?;
        return Ok(());
    }

    let p_encoder = match cfg.debug {
        true => PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} - {h({l})} - [{f}:{L} - {M}] - {m}{n}"),
        false => PatternEncoder::new("{d(%H:%M:%S)} - {h({l})} - {m}{n}"),
    };

    // Log to stderr, stdout is reserved for the results
    let console = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(p_encoder))
        .build();

    let mut level = LevelFilter::Info;
    if cfg.debug {
        level = LevelFilter::Debug;
    }

    let log_config = Config::builder()
        .appender(Appender::builder().build("console", Box::new(console)))
        .build(Root::builder().appender("console").build(level))
        .with_context(|| "Failed to initialize logger")?;

    log4rs::init_config(log_config).with_context(|| "Failed to initialize console logger")?;
    Ok(())
}

/// Read and parse an automaton file in the `.lts` format
pub(crate) fn parse_lts_file(path: &Path) -> Result<LTS, anyhow::Error> {
    let f = fs::read_to_string(path)
        .with_context(|| format!("Unable to read automaton file '{}'", path.display()))?;

    let lts = LTSParser::new()
        .parse_lts(&f)
        .with_context(|| format!("Failed to parse automaton file '{}'", path.display()))?;

    info!(
        "Parsed automaton '{}' with {} states and {} transitions from '{}'",
        lts.name(),
        lts.num_states(),
        lts.num_transitions(),
        path.display()
    );
    Ok(lts)
}

/// Parse the three automata and set up the tolerance problem
pub(crate) fn load_problem(input: &ProblemInput) -> Result<ToleranceProblem, anyhow::Error> {
    let env = parse_lts_file(&input.env_file)?;
    let ctrl = parse_lts_file(&input.ctrl_file)?;
    let mut prop = parse_lts_file(&input.prop_file)?;

    if input.complete_property {
        prop = prop.complete_with_error_state();
        info!(
            "Completed property '{}', it now has {} states",
            prop.name(),
            prop.num_states()
        );
    }

    ToleranceProblem::new(env, ctrl, prop).with_context(|| "Invalid input automata")
}

/// Load the configuration from `config_file` (if given) and from environment
/// variables
pub(crate) fn load_config(config_file: Option<PathBuf>) -> Result<RobustifyConfig, anyhow::Error> {
    let mut settings = ::config::Config::builder();
    if let Some(config_file) = config_file {
        if !config_file.exists() {
            return Err(anyhow!(
                "Specified configuration file '{}' does not exist.",
                config_file.display()
            ));
        }

        settings = settings.add_source(::config::File::from(config_file));
    }

    settings = settings.add_source(
        ::config::Environment::with_prefix("ROBUSTIFY")
            .prefix_separator("_")
            .separator("__"),
    );

    settings
        .build()?
        .try_deserialize::<RobustifyConfig>()
        .with_context(|| "Failed to read configuration")
}

/// Compute the tolerated deltas, print them and re-verify each of them
///
/// Returns an error if any delta violates the property.
pub(crate) fn run_tolerance(args: ToleranceArgs) -> Result<(), anyhow::Error> {
    let problem = load_problem(&args.input)?;

    let mut config = load_config(args.config_file)?;
    if let Some(seed) = args.seed {
        config.set_seed(seed);
    }
    if let Some(max_nodes) = args.max_nodes {
        config.set_max_nodes(max_nodes);
    }
    if let Some(max_depth) = args.max_depth {
        config.set_max_depth(max_depth);
    }
    if let Some(secs) = args.time_limit {
        config.set_time_limit_secs(secs);
    }
    if args.parallel {
        config.set_parallel(true);
    }

    let options = config.get_search_options(args.algorithm.into())?;
    let result = compute_deltas(&problem, &options);
    print!("{}", render_deltas(&problem, &result));

    if let Some(dir) = args.dot_dir {
        write_delta_diffs(&problem, &result, &dir)?;
    }

    check_soundness(&problem, &result)
}

fn check_soundness(problem: &ToleranceProblem, result: &SearchResult) -> Result<(), anyhow::Error> {
    let violations = verify_deltas(problem, &result.deltas);
    if !violations.is_empty() {
        print!("{}", render_violations(&violations));
        error!(
            "Soundness check failed: {} of {} deltas violate the property",
            violations.len(),
            result.deltas.len()
        );
        return Err(anyhow!(
            "{} deltas violate the property",
            violations.len()
        ));
    }

    info!(
        "Soundness check passed for all {} deltas",
        result.deltas.len()
    );
    Ok(())
}

#[cfg(feature = "dot")]
fn write_delta_diffs(
    problem: &ToleranceProblem,
    result: &SearchResult,
    dir: &Path,
) -> Result<(), anyhow::Error> {
    use robustify_lts::dot::DOTDiff;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;

    for (i, delta) in result.deltas.iter().enumerate() {
        let diff = problem.env().get_dot_diff(&problem.perturbed_env(delta));
        let file = dir.join(format!("delta_{}.dot", i + 1));
        fs::write(&file, diff)
            .with_context(|| format!("Failed to write output file '{}'", file.display()))?;
    }

    info!(
        "Wrote {} DOT files to '{}'",
        result.deltas.len(),
        dir.display()
    );
    Ok(())
}

#[cfg(not(feature = "dot"))]
fn write_delta_diffs(
    _problem: &ToleranceProblem,
    _result: &SearchResult,
    dir: &Path,
) -> Result<(), anyhow::Error> {
    warn!(
        "Built without the `dot` feature, not writing DOT files to '{}'",
        dir.display()
    );
    Ok(())
}

/// Check whether the unperturbed environment conforms and print a
/// counterexample otherwise
pub(crate) fn run_check(input: ProblemInput) -> Result<(), anyhow::Error> {
    let problem = load_problem(&input)?;

    match problem.checker().check(problem.env()) {
        Ok(()) => println!(
            "Environment '{}' composed with '{}' satisfies '{}'",
            problem.env().name(),
            problem.ctrl().name(),
            problem.prop().as_lts().name()
        ),
        Err(cex) => {
            println!(
                "Environment '{}' composed with '{}' violates '{}': {cex}",
                problem.env().name(),
                problem.ctrl().name(),
                problem.prop().as_lts().name()
            );
            warn!("Found counterexample of length {}", cex.trace().len());
        }
    }

    Ok(())
}

/// Visualize the automaton in the given format
///
/// When `svg` or `png` format is selected, the `graphviz` library must be
/// installed on the system.
#[cfg(feature = "dot")]
pub(crate) fn visualize_lts(lts: &LTS, cfg: VisualizationOutput) -> Result<(), anyhow::Error> {
    use std::{
        io::Write,
        process::{Command, Stdio},
    };

    use robustify_lts::dot::ToDOT;
    let out_str = lts.get_dot_graph();

    let out_arg = match cfg.output_format {
        OutputFormat::DOT => {
            fs::write(cfg.output_file, out_str).with_context(|| "Failed to write output file")?;
            return Ok(());
        }
        OutputFormat::SVG => "-Tsvg",
        OutputFormat::PNG => "-Tpng",
    };

    let mut dot_cmd = Command::new("dot")
        .arg(out_arg)
        .arg("-o")
        .arg(cfg.output_file)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|_| anyhow!("Graphviz is not installed on the system"))?;

    dot_cmd
        .stdin
        .take()
        .ok_or_else(|| anyhow!("Failed to open stdin of graphviz"))?
        .write_all(out_str.as_bytes())
        .with_context(|| "Failed to pass graph to graphviz")?;

    let status = dot_cmd.wait().with_context(|| "Failed to execute graphviz")?;
    if !status.success() {
        return Err(anyhow!("Graphviz exited with {status}"));
    }

    Ok(())
}

/// Translate an automaton into the specified format and write the result to
/// the specified output file
pub(crate) fn translate_lts(lts: &LTS, out: TranslationOutput) -> Result<(), anyhow::Error> {
    let translated = translate(lts, out.output_format);

    fs::write(out.output_file, translated).with_context(|| "Failed to write output file")?;
    info!("Finished writing {} output file", out.output_format);

    Ok(())
}
