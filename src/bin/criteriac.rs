use clap::Parser;
use criteria_bson::cli::{self, Command, ConfigSources};
use criteria_bson::config::{MergePolicy, ScalarEncoding};
use criteria_bson::utils::logger;
use criteria_bson::{Converter, CriteriaError};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "criteriac", version, about = "Compile query criteria to BSON queries", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a converter config file (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, value_parser = parse_merge, help = "Merge policy: last_write_wins|conjunction")]
    merge: Option<MergePolicy>,
    #[arg(long, value_parser = parse_encoding, help = "Scalar encoding: canonical|typed")]
    encoding: Option<ScalarEncoding>,
    #[arg(long, help = "Log level: error|warn|info|debug|trace")]
    log_level: Option<String>,
    #[arg(long, help = "Directory for log files; logging is off unless set")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "log4rs config file; overrides --log-dir and --log-level")]
    log_config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

fn parse_merge(s: &str) -> Result<MergePolicy, String> {
    s.parse().map_err(|e: CriteriaError| e.to_string())
}

fn parse_encoding(s: &str) -> Result<ScalarEncoding, String> {
    s.parse().map_err(|e: CriteriaError| e.to_string())
}

fn run(cli: Cli) -> Result<(), CriteriaError> {
    let cwd = std::env::current_dir().ok();
    let sources = ConfigSources {
        config: cli.config.as_deref(),
        merge: cli.merge,
        encoding: cli.encoding,
        cwd: cwd.as_deref(),
    };
    let cfg = cli::load_config(&sources, |k| std::env::var(k).ok())?;
    let stdout = std::io::stdout();
    cli::run(&Converter::new(cfg), cli.command, &mut stdout.lock())
}

fn main() {
    let cli = Cli::parse();
    // Precedence: --log-config > --log-dir > CRITERIA_LOG_DIR
    let logging = if let Some(path) = cli.log_config.as_deref() {
        Some(logger::init_path(path))
    } else if cli.log_dir.is_some() {
        Some(logger::configure_logging(cli.log_dir.as_deref(), cli.log_level.as_deref(), None, false))
    } else if std::env::var_os("CRITERIA_LOG_DIR").is_some() {
        Some(logger::configure_from_env())
    } else {
        None
    };
    if let Some(Err(e)) = logging {
        eprintln!("warning: logging disabled: {e}");
    }
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
