use clap::{arg, command, Arg, Command};

const DEFAULT_VALIDATORS: &str = "v1,v2,v3";

#[derive(Debug)]
pub struct Args {
    // NOTE: it is best if property names match config file fields
    pub appdir: Option<String>,
    pub log_level: String,
    pub no_log_files: bool,
    /// Comma-separated validator ids the workflow requires signatures from, in
    /// priority order. The first `required_validations` entries are tasked on submit.
    pub validators: Vec<String>,
    pub required_validations: usize,
}

pub fn cli() -> Command {
    Command::new("cubicd")
        .about(format!("{} v{}", env!("CARGO_PKG_DESCRIPTION"), env!("CARGO_PKG_VERSION")))
        .version(env!("CARGO_PKG_VERSION"))
        .arg(arg!(-b --appdir <DATA_DIR> "Directory to store the ledger and mempool databases."))
        .arg(
            Arg::new("log_level")
                .short('d')
                .long("loglevel")
                .value_name("log_level")
                .default_value("info")
                .num_args(0..=1)
                .require_equals(true)
                .help("Specify log level, e.g. `info` or `info,cubic_ledger=debug`."),
        )
        .arg(Arg::new("no_log_files").long("no-log-files").num_args(0).help("Disable logging to file."))
        .arg(
            Arg::new("validators")
                .long("validators")
                .value_name("validators")
                .default_value(DEFAULT_VALIDATORS)
                .num_args(0..=1)
                .require_equals(true)
                .help("Comma-separated validator ids accepted onto the validator set."),
        )
        .arg(
            Arg::new("required_validations")
                .long("required-validations")
                .value_name("required_validations")
                .default_value("3")
                .num_args(0..=1)
                .require_equals(true)
                .help("Distinct validator completions required to promote a transaction to processing."),
        )
}

impl Args {
    pub fn parse() -> Args {
        let m = cli().get_matches();
        let validators = m.get_one::<String>("validators").cloned().unwrap_or_default();
        Args {
            appdir: m.get_one::<String>("appdir").cloned(),
            log_level: m.get_one::<String>("log_level").cloned().unwrap(),
            no_log_files: m.get_flag("no_log_files"),
            validators: validators.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect(),
            required_validations: m.get_one::<String>("required_validations").and_then(|s| s.parse().ok()).unwrap_or(3),
        }
    }
}
