//! Stowage benchmark entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use env_logger::{Builder, Env};
use stowage_driver::{DriverConfig, Workload};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    entities: Option<u32>,
    threshold: Option<u32>,
    checked_prefix: Option<u32>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    *i += 1;
    let Some(raw) = args.get(*i) else {
        return Err(format!("{flag} requires a value").into());
    };
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}").into())
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--entities" => config.entities = Some(parse_value(args, &mut i, "--entities")?),
            "--threshold" => config.threshold = Some(parse_value(args, &mut i, "--threshold")?),
            "--checked-prefix" => {
                config.checked_prefix = Some(parse_value(args, &mut i, "--checked-prefix")?);
            }
            "--seed" => config.seed = Some(parse_value(args, &mut i, "--seed")?),
            "--output" => config.output = Some(parse_value(args, &mut i, "--output")?),
            arg => {
                return Err(format!("unknown option: {arg}").into());
            }
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(&args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("stowage-bench {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = DriverConfig::default();
    if let Some(entities) = cli.entities {
        // keep the default 70% split unless a threshold was given
        config = match cli.threshold {
            Some(_) => config.with_entity_count(entities),
            None => config.scaled_to(entities),
        };
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_threshold(threshold);
    }
    config = match cli.checked_prefix {
        Some(prefix) => config.with_checked_prefix(prefix),
        None => config.fit_checked_prefix(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }

    let report = Workload::new(config)?.run_to_file()?;
    println!("{report}");
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mstowage-bench\x1b[0m - Packed component storage benchmark

\x1b[1mUSAGE:\x1b[0m
    stowage-bench [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    --entities N       Number of entities to create (default 1000000)
    --threshold N      Entities above this index get TestData (default 70%)
    --checked-prefix N Entities below this index get a checked add (default 100)
    --seed N           Seed for random payloads (default 1234)
    --output PATH      View output file (default ecs_view.txt)

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG           Log filter (default info)"
    );
}
