use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub trials: Option<usize>,
    pub threads: Option<usize>,
    pub results_out: Option<PathBuf>,
    pub dispatch_out: Option<PathBuf>,
    pub sensitivity: bool,
    pub sensitivity_algorithm: Option<String>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut preset = None;
    let mut trials = None;
    let mut threads = None;
    let mut results_out = None;
    let mut dispatch_out = None;
    let mut sensitivity = false;
    let mut sensitivity_algorithm = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--trials" => {
                i += 1;
                trials = Some(parse_count(args, i, "--trials")?);
            }
            "--threads" => {
                i += 1;
                threads = Some(parse_count(args, i, "--threads")?);
            }
            "--results-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --results-out (expected a file path)")?;
                if results_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--results-out provided more than once".to_string());
                }
            }
            "--dispatch-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --dispatch-out (expected a file path)")?;
                if dispatch_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--dispatch-out provided more than once".to_string());
                }
            }
            "--sensitivity" => {
                sensitivity = true;
            }
            "--sensitivity-algorithm" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --sensitivity-algorithm (expected an algorithm name)",
                )?;
                if sensitivity_algorithm.replace(name.to_string()).is_some() {
                    return Err("--sensitivity-algorithm provided more than once".to_string());
                }
                sensitivity = true;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if config.is_none() && preset.is_none() {
        preset = Some("baseline".to_string());
    }

    Ok(CliOptions {
        config,
        preset,
        trials,
        threads,
        results_out,
        dispatch_out,
        sensitivity,
        sensitivity_algorithm,
    })
}

fn parse_count(args: &[String], index: usize, flag: &str) -> Result<usize, String> {
    let raw = args.next_or_err(index, &format!("missing value for {flag} (expected an integer)"))?;
    raw.parse::<usize>()
        .map_err(|_| format!("{flag} value \"{raw}\" is not a valid non-negative integer"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("microgrid-sizing: battery sizing and dispatch comparison across metaheuristics");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  microgrid-sizing [--config <path> | --preset <name>] [--trials <n>] [--threads <n>]"
    );
    eprintln!("                   [--results-out <path>] [--dispatch-out <path>] [--sensitivity]");
    eprintln!("                   [--sensitivity-algorithm <name>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load settings from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (baseline, quick, stress)");
    eprintln!("  --trials <n>           Override the number of trials");
    eprintln!("  --threads <n>          Worker threads (1 = sequential, 0 = all cores)");
    eprintln!("  --results-out <path>   Export per-trial results to CSV");
    eprintln!("  --dispatch-out <path>  Export the hourly dispatch of the best solution to CSV");
    eprintln!("  --sensitivity          Also sweep population sizes on trial 0");
    eprintln!("  --sensitivity-algorithm <name>");
    eprintln!("                         Algorithm to sweep (implies --sensitivity; default GWWOA,");
    eprintln!("                         or the first configured algorithm without it)");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
}
