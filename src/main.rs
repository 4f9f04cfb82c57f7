use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use synthloop::guess::{BisectProposer, GuessBounds, GuessJudge, LlmGuessProposer};
use synthloop::llm::anthropic::API_KEY_ENV;
use synthloop::llm::{AnthropicClient, LlmClient};
use synthloop::refine::{LoopReport, Proposer, RefinementLoop};
use synthloop::synth::{ScriptProposer, SynthesisTarget, YosysExecutor};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use cli::report;
use config::Config;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("synthloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("synthloop.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Fail early instead of burning a round on a client that cannot call out
fn ensure_ready<L: LlmClient>(client: &L) -> Result<()> {
    if !client.is_ready() {
        eyre::bail!(
            "LLM client for {} is not ready; is {} set?",
            client.model(),
            API_KEY_ENV
        );
    }
    Ok(())
}

fn anthropic_client(config: &Config) -> Result<Arc<AnthropicClient>> {
    let client = AnthropicClient::new(config.llm.anthropic()).context("Failed to create LLM client")?;
    ensure_ready(&client)?;
    Ok(Arc::new(client))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<bool> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
        println!("{}", serde_yaml::to_string(config).context("Failed to render config")?);
    }

    match &cli.command {
        Commands::Synth {
            verilog,
            sdc,
            output,
            max_rounds,
            report,
        } => {
            handle_synth_command(
                verilog,
                sdc,
                output.as_deref(),
                *max_rounds,
                report.as_deref(),
                config,
            )
            .await
        }
        Commands::Guess {
            min,
            max,
            target,
            max_attempts,
            llm,
        } => handle_guess_command(*min, *max, *target, *max_attempts, *llm, config).await,
        Commands::Check => handle_check_command(config).await,
    }
}

async fn handle_synth_command(
    verilog: &Path,
    sdc: &Path,
    output: Option<&Path>,
    max_rounds: Option<u32>,
    report_path: Option<&Path>,
    config: &Config,
) -> Result<bool> {
    let mut target = SynthesisTarget::new(verilog, sdc);
    if let Some(output) = output {
        target = target.with_output(output);
    }
    target.validate()?;

    let client = anthropic_client(config)?;
    let mut proposer = ScriptProposer::new(client)?
        .with_max_log_chars(config.yosys.max_log_chars)
        .with_max_tokens(config.llm.max_tokens);
    if let Some(temperature) = config.llm.temperature {
        proposer = proposer.with_temperature(temperature);
    }
    let executor = YosysExecutor::new(config.yosys.executor_config()).expect_output(&target.output_file);

    let rounds = max_rounds.unwrap_or(config.refine.max_rounds);
    info!("Synthesizing {} with up to {} round(s)", target.design_name(), rounds);
    println!(
        "{} {} (up to {} round(s))",
        "Synthesizing".cyan(),
        target.verilog_path.display(),
        rounds
    );

    let refinement = RefinementLoop::with_config(
        Arc::new(proposer),
        Arc::new(executor),
        config.refine.refinement(),
    );
    let loop_report = refinement.run(rounds, &target).await;

    report::print_summary("Synthesis:", &loop_report);
    report::print_history(&loop_report);
    if let Some(output) = loop_report.output() {
        if let Some(netlist) = &output.netlist {
            println!("{} {}", "Netlist:".green(), netlist.display());
        }
        println!("{}", "Final log:".bold());
        println!("{}", output.log);
    }

    if let Some(path) = report_path {
        report::write_json(&loop_report, path)?;
        println!("{} {}", "Report written to".cyan(), path.display());
    }

    Ok(loop_report.is_success())
}

async fn play<P>(
    proposer: P,
    judge: GuessJudge,
    attempts: u32,
    bounds: &GuessBounds,
    config: &Config,
) -> LoopReport<u32, ()>
where
    P: Proposer<Artifact = u32, Output = (), Context = GuessBounds>,
{
    RefinementLoop::with_config(Arc::new(proposer), Arc::new(judge), config.refine.refinement())
        .run(attempts, bounds)
        .await
}

async fn handle_guess_command(
    min: Option<u32>,
    max: Option<u32>,
    target: Option<u32>,
    max_attempts: Option<u32>,
    llm: bool,
    config: &Config,
) -> Result<bool> {
    let bounds = GuessBounds::new(
        min.unwrap_or(config.guess.min),
        max.unwrap_or(config.guess.max),
    )?;
    let judge = match target {
        Some(target) if !bounds.contains(target) => {
            eyre::bail!("Target {} is outside {}..={}", target, bounds.min, bounds.max)
        }
        Some(target) => GuessJudge::new(target),
        None => GuessJudge::random(bounds.min, bounds.max),
    };
    let attempts = max_attempts.unwrap_or(config.guess.max_attempts);
    info!("Guessing game: {}..={}, {} attempt(s), llm={}", bounds.min, bounds.max, attempts, llm);
    println!(
        "I'm thinking of a number between {} and {}. {} attempt(s) allowed.",
        bounds.min, bounds.max, attempts
    );

    let loop_report = if llm {
        let client = anthropic_client(config)?;
        let mut proposer = LlmGuessProposer::new(client)?;
        if let Some(temperature) = config.llm.temperature {
            proposer = proposer.with_temperature(temperature);
        }
        play(proposer, judge, attempts, &bounds, config).await
    } else {
        play(BisectProposer, judge, attempts, &bounds, config).await
    };

    report::print_summary("Game:", &loop_report);
    report::print_history(&loop_report);
    if loop_report.is_success() {
        println!(
            "{} Guessed {} in {} attempt(s).",
            "Congratulations!".green().bold(),
            judge.target(),
            loop_report.rounds
        );
    } else {
        println!("{} The number was {}.", "Game over!".red().bold(), judge.target());
    }

    Ok(loop_report.is_success())
}

async fn handle_check_command(config: &Config) -> Result<bool> {
    let executor = YosysExecutor::new(config.yosys.executor_config());
    match executor.version().await {
        Ok(version) => {
            println!("{} {}", "Found:".green(), version);
            Ok(true)
        }
        Err(e) => {
            println!(
                "{} {} is not installed or not in PATH ({})",
                "Missing:".red(),
                config.yosys.program,
                e
            );
            println!("Install Yosys from https://github.com/YosysHQ/yosys");
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    let success = run_application(&cli, &config).await.context("Application failed")?;

    Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
