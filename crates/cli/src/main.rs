use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clioraops_core::logging::{LoggingConfig, init_logging};
use clioraops_core::{Config, Mode, PipelineContext};
use clioraops_pipeline::{
    ClarificationChoice, Confirmation, Form, Outcome, Pipeline, ReviewedCandidate, classify_form, classify_intent,
};
use clioraops_providers::{ProviderFactory, ProviderHealthChecker, is_retryable_error};
use clioraops_review::{format_review, review, review_script};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG: &str = "clioraops.toml";
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// ClioraOps - natural language to reviewed shell commands
#[derive(Parser, Debug)]
#[command(name = "clioraops")]
#[command(about = "Turn requests into shell commands and review every command for risk", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the config file (default: ./clioraops.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured mode (beginner or architect)
    #[arg(short, long, value_name = "MODE", global = true)]
    mode: Option<Mode>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Review a shell command for risk
    Review {
        /// Command to review
        #[arg(required = true, value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Print the review as JSON
        #[arg(long)]
        json: bool,
    },
    /// Review a shell script line by line
    ReviewScript {
        /// Script to review
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show how input text is classified
    Classify {
        #[arg(required = true, value_name = "TEXT", trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Run input through the full pipeline
    Handle {
        #[arg(required = true, value_name = "TEXT", trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,

        /// Answer a clarification up front (command or explain)
        #[arg(long, value_name = "CHOICE")]
        choice: Option<ClarificationChoice>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current status
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = load_or_create_config(&config_path)?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    let _guard = init_logging(Some(LoggingConfig::from(config.logging.clone()))).context("Failed to initialize logging")?;

    if cli.verbose {
        eprintln!("{} Using config: {}", "Info:".blue().bold(), config_path.display());
        eprintln!("{} Mode: {}", "Info:".blue().bold(), config.mode);
    }

    match cli.command {
        Commands::Review { command, json } => cmd_review(&config, &command.join(" "), json)?,
        Commands::ReviewScript { file } => cmd_review_script(&config, &file)?,
        Commands::Classify { text } => cmd_classify(&config, &text.join(" ")),
        Commands::Handle { text, choice, json } => cmd_handle(&config, &text.join(" "), choice, json, cli.verbose)?,
        Commands::Status => cmd_status(&config, cli.verbose)?,
    }

    Ok(())
}

/// Load config from file, or write the example and continue with defaults
fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e));
    }

    eprintln!("{} Config not found at {}", "Warning:".yellow().bold(), path.display());
    std::fs::write(path, Config::example()).context("Failed to create config")?;
    eprintln!(
        "{} Created example config at {}. Edit it to enable command generation.",
        "Info:".blue().bold(),
        path.display()
    );

    Ok(Config::default())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

fn cmd_review(config: &Config, command: &str, json: bool) -> Result<()> {
    let result = review(command, config.mode);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{} {}", "Command:".bold(), command.cyan());
    println!("{}", format_review(&result));
    Ok(())
}

fn cmd_review_script(config: &Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read script {}", file.display()))?;
    let result = review_script(&content, config.mode);

    println!(
        "{} {} {} ({} lines reviewed)",
        result.risk_level.symbol(),
        "Script risk:".bold(),
        result.risk_level,
        result.lines_reviewed
    );

    if result.findings.is_empty() {
        println!("{} No known risky patterns found", "Info:".green().bold());
        return Ok(());
    }

    for finding in &result.findings {
        println!();
        println!("{}", finding.summary().yellow());
        println!("  {}", finding.line.cyan());
        println!("  {}", finding.review.explanation());
        if let Some(alternative) = finding.review.safe_alternative() {
            println!("  Safer alternative: {}", alternative);
        }
    }

    Ok(())
}

fn cmd_classify(config: &Config, text: &str) {
    let form = if config.nl.enabled { classify_form(text) } else { Form::Explicit };
    println!("{} {}", "Form:".bold(), form.cyan());

    if form == Form::Natural {
        let (intent, confidence) = classify_intent(text);
        println!("{} {} ({:.2})", "Intent:".bold(), intent.cyan(), confidence);
    }
}

fn cmd_handle(config: &Config, text: &str, choice: Option<ClarificationChoice>, json: bool, verbose: bool) -> Result<()> {
    let pipeline = Pipeline::from_config(config).context("Failed to set up the text-generation provider")?;
    let working_dir = std::env::current_dir().context("Failed to read current directory")?;
    let ctx = config.pipeline_context(working_dir);

    let rt = runtime()?;
    let outcome = rt.block_on(async {
        match choice {
            Some(choice) => pipeline.resolve_clarification(choice, text, &ctx).await,
            None => pipeline.handle(text, &ctx).await,
        }
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if verbose {
        eprintln!("{} Outcome: {}", "Info:".blue().bold(), outcome.action());
    }

    match &outcome {
        Outcome::ExecuteCandidate(candidate) => print_candidate(candidate),
        Outcome::Explain { text } => print_explanation(&rt, &pipeline, text, &ctx),
        Outcome::AskClarification(clarification) => {
            println!("{} Not sure what you meant by \"{}\"", "Question:".yellow().bold(), clarification.text);
            for (index, interpretation) in clarification.interpretations.iter().enumerate() {
                println!("  {}. {} (--choice {})", index + 1, interpretation.label(), interpretation);
            }
        }
        Outcome::Reject(rejection) => {
            println!("{} {}", "Rejected:".red().bold(), rejection.message);
            if rejection.retryable {
                println!("{} This looks temporary; try again.", "Info:".blue().bold());
            }
            if let Some(hint) = &rejection.hint {
                println!("{} {}", "Hint:".blue().bold(), hint);
            }
        }
    }

    Ok(())
}

fn print_candidate(candidate: &ReviewedCandidate) {
    println!("{} {}", "Command:".bold(), candidate.command().cyan());

    if let Some(generated) = candidate.generated() {
        if !generated.explanation.is_empty() {
            println!("{} {}", "Explanation:".bold(), generated.explanation);
        }
        println!("{} {}", "Confidence:".bold(), generated.confidence);
        for warning in &generated.warnings {
            println!("{} {}", "Warning:".yellow().bold(), warning);
        }
    }

    println!();
    println!("{}", format_review(candidate.review()));
    println!();

    match candidate.confirmation() {
        Confirmation::Required => println!("{} Confirm before running this command.", "Confirm:".yellow().bold()),
        Confirmation::AutoConfirmable => println!("{} Eligible for automatic confirmation.", "Success:".green().bold()),
    }
}

fn print_explanation(rt: &tokio::runtime::Runtime, pipeline: &Pipeline, text: &str, ctx: &PipelineContext) {
    if !pipeline.synthesizer().is_available() {
        println!("{} Routed to explanation: {}", "Info:".blue().bold(), text);
        return;
    }

    match rt.block_on(pipeline.explain(text, ctx)) {
        Ok(answer) => println!("{}", answer),
        Err(e) => {
            println!("{} Explanation unavailable: {}", "Warning:".yellow().bold(), e);
            if is_retryable_error(&e) {
                println!("{} This looks temporary; try again.", "Info:".blue().bold());
            }
        }
    }
}

fn cmd_status(config: &Config, verbose: bool) -> Result<()> {
    println!("{}", "ClioraOps Status".green().bold().underline());
    println!();

    println!("{} Configuration", "Info:".blue().bold());
    println!("  Mode: {}", config.mode.cyan());
    println!("  OS context: {}", config.os_context().cyan());
    println!("  Natural language: {}", if config.nl.enabled { "enabled" } else { "disabled" });
    println!("  Auto-execute: {}", if config.nl.auto_execute { "allowed" } else { "off" });

    let Some(provider_config) = &config.provider else {
        println!("  Provider: {}", "not configured".yellow());
        return Ok(());
    };
    println!(
        "  Provider: {} ({})",
        provider_config.name().cyan(),
        provider_config.model().unwrap_or("scripted")
    );

    if verbose {
        let provider = ProviderFactory::create_from_config(provider_config).context("Failed to create provider")?;
        let checker = ProviderHealthChecker::new(provider, HEALTH_CHECK_TIMEOUT);
        let result = runtime()?.block_on(checker.check());

        println!();
        if result.healthy {
            println!("{} Provider healthy ({}ms)", "Success:".green().bold(), result.latency_ms);
        } else {
            println!(
                "{} Provider unhealthy: {}",
                "Warning:".yellow().bold(),
                result.error.unwrap_or_default()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    const DOCKER_REPLY: &str =
        r#"{"success":true,"command":"docker ps -a","explanation":"Lists all containers","confidence":"high","warnings":[]}"#;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["clioraops", "status"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.mode.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::try_parse_from(["clioraops", "--config", "/path/to/clioraops.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/clioraops.toml")));
    }

    #[test]
    fn test_cli_mode_override() {
        let cli = Cli::try_parse_from(["clioraops", "review", "--mode", "architect", "ls"]).unwrap();
        assert_eq!(cli.mode, Some(Mode::Architect));

        let cli = Cli::try_parse_from(["clioraops", "--mode", "beginner", "status"]).unwrap();
        assert_eq!(cli.mode, Some(Mode::Beginner));

        assert!(Cli::try_parse_from(["clioraops", "--mode", "wizard", "status"]).is_err());
    }

    #[test]
    fn test_cli_review_collects_command_words() {
        let cli = Cli::try_parse_from(["clioraops", "review", "rm", "-rf", "/"]).unwrap();
        if let Commands::Review { command, json } = cli.command {
            assert_eq!(command.join(" "), "rm -rf /");
            assert!(!json);
        } else {
            panic!("Expected Review command");
        }
    }

    #[test]
    fn test_cli_review_requires_command() {
        assert!(Cli::try_parse_from(["clioraops", "review"]).is_err());
    }

    #[test]
    fn test_cli_handle_with_choice() {
        let cli = Cli::try_parse_from(["clioraops", "handle", "--choice", "explain", "show", "kubernetes", "concepts"]).unwrap();
        if let Commands::Handle { text, choice, .. } = cli.command {
            assert_eq!(text.join(" "), "show kubernetes concepts");
            assert_eq!(choice, Some(ClarificationChoice::Explain));
        } else {
            panic!("Expected Handle command");
        }
    }

    #[test]
    fn test_cli_review_script_command() {
        let cli = Cli::try_parse_from(["clioraops", "review-script", "deploy.sh"]).unwrap();
        assert!(matches!(cli.command, Commands::ReviewScript { .. }));
    }

    #[test]
    fn test_load_or_create_config_existing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("clioraops.toml");
        std::fs::write(&config_path, "mode = \"architect\"\n").unwrap();

        let config = load_or_create_config(&config_path).unwrap();
        assert_eq!(config.mode, Mode::Architect);
    }

    #[test]
    fn test_load_or_create_config_not_existing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("clioraops.toml");

        let config = load_or_create_config(&config_path).unwrap();
        assert!(config.provider.is_none());
        assert!(config_path.exists());

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[provider]"));
        assert!(content.contains("mode = \"beginner\""));
    }

    #[test]
    fn test_written_example_config_handles_commands_on_next_run() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("clioraops.toml");
        load_or_create_config(&config_path).unwrap();

        let config = load_or_create_config(&config_path).unwrap();
        assert!(config.provider.is_none());
        assert!(cmd_handle(&config, "docker ps", None, true, false).is_ok());
    }

    #[test]
    fn test_load_or_create_config_invalid() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("clioraops.toml");
        std::fs::write(&config_path, "invalid toml").unwrap();

        assert!(load_or_create_config(&config_path).is_err());
    }

    #[test]
    fn test_cmd_review() {
        let config = Config::default();
        assert!(cmd_review(&config, "rm -rf /", false).is_ok());
        assert!(cmd_review(&config, "docker ps -a", true).is_ok());
    }

    #[test]
    fn test_cmd_review_script() {
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("deploy.sh");
        std::fs::write(&script, "#!/bin/sh\nsudo su\nls -la\n").unwrap();

        assert!(cmd_review_script(&Config::default(), &script).is_ok());
        assert!(cmd_review_script(&Config::default(), &temp.path().join("missing.sh")).is_err());
    }

    #[test]
    fn test_cmd_handle_with_mock_provider() {
        let temp = TempDir::new().unwrap();
        let responses = temp.path().join("responses.toml");
        std::fs::write(&responses, format!("[[responses]]\ntype = \"text\"\ncontent = '{DOCKER_REPLY}'\n")).unwrap();

        let toml = format!("[provider]\nprovider = \"mock\"\nresponses_file = \"{}\"\n", responses.display());
        let config = Config::from_toml_str(&toml).unwrap();

        assert!(cmd_handle(&config, "show me all running containers", None, false, true).is_ok());
        assert!(cmd_handle(&config, "show kubernetes concepts", None, true, false).is_ok());
        assert!(cmd_handle(&config, "show kubernetes concepts", Some(ClarificationChoice::Command), false, false).is_ok());
    }

    #[test]
    fn test_cmd_handle_without_provider() {
        let config = Config::default();
        assert!(cmd_handle(&config, "what is docker?", None, false, false).is_ok());
        assert!(cmd_handle(&config, "list all docker images", None, false, false).is_ok());
    }

    #[test]
    fn test_cmd_status() {
        assert!(cmd_status(&Config::default(), false).is_ok());

        let config = Config::from_toml_str("[provider]\nprovider = \"mock\"\n").unwrap();
        assert!(cmd_status(&config, true).is_ok());
    }

    #[test]
    fn test_cmd_classify() {
        let config = Config::default();
        cmd_classify(&config, "show me running containers");
        cmd_classify(&config, "docker ps");
    }
}
