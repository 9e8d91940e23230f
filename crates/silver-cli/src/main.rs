//! Silver pipeline CLI.

use clap::{ColorChoice, Parser};
use silver_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use silver_cli::commands::{
    load_config, run_bronze_command, run_categories, run_full_command, run_silver_command,
};
use silver_cli::logging::{LogConfig, LogFormat, init_logging};
use silver_cli::summary::{print_bronze_summary, print_silver_summary};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    if matches!(cli.command, Command::Categories) {
        run_categories();
        return 0;
    }
    let config = match load_config(cli) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            return 1;
        }
    };
    let outcome = match &cli.command {
        Command::Silver(args) => run_silver_command(&config, args).map(|report| {
            print_silver_summary(&report);
            report.has_failures()
        }),
        Command::Bronze(args) => run_bronze_command(&config, args).map(|report| {
            print_bronze_summary(&report);
            false
        }),
        Command::Run(args) => run_full_command(&config, args).map(|report| {
            print_bronze_summary(&report.bronze);
            println!();
            print_silver_summary(&report.silver);
            report.silver.has_failures()
        }),
        Command::Categories => Ok(false),
    };
    match outcome {
        Ok(failed) => i32::from(failed),
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
