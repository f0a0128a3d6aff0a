use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use freshbot::{AnswerGenerator, GeminiClientTrait, GeminiError, Settings, render_prompt};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// freshbot - food safety answers grounded in your manual
#[derive(Parser)]
#[command(name = "freshbot")]
#[command(about = "Answer food safety questions from supplied context using Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a question grounded in the given context
    Ask(AskCommand),
    /// Print the prompt that would be sent, without calling the model
    Prompt(PromptCommand),
}

/// Where the context text comes from
#[derive(Args)]
struct ContextArgs {
    /// Context text to answer from
    #[arg(short, long, value_name = "TEXT", conflicts_with = "context_file")]
    context: Option<String>,

    /// Read the context text from a file
    #[arg(short = 'f', long, value_name = "PATH")]
    context_file: Option<PathBuf>,
}

/// Ask a question
#[derive(Parser)]
struct AskCommand {
    /// The question to answer
    #[arg(value_name = "QUESTION")]
    question: String,

    #[command(flatten)]
    context: ContextArgs,

    /// Model identifier (overrides GENERATIVE_MODEL_NAME)
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,
}

/// Render the prompt only
#[derive(Parser)]
struct PromptCommand {
    /// The question to render
    #[arg(value_name = "QUESTION")]
    question: String,

    #[command(flatten)]
    context: ContextArgs,
}

/// Printed when the model returned no text at all.
const NO_ANSWER: &str = "No answer available.";

/// Problems with the user's input or configuration (exit code 1).
#[derive(Debug, Error)]
enum UserError {
    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Failed to read context file: {path}")]
    ContextFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0:#}")]
    Settings(anyhow::Error),
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version are not errors
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Ask(cmd) => handle_ask(cmd),
        Commands::Prompt(cmd) => handle_prompt(cmd),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad input or missing configuration. Service and transport
/// failures are internal, even when an I/O error sits underneath them.
fn is_user_error(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<UserError>().is_some() {
        return true;
    }
    matches!(
        error.downcast_ref::<GeminiError>(),
        Some(GeminiError::MissingApiKey | GeminiError::InvalidUrl(_))
    )
}

/// Handles the ask command by building a client from the environment.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    validate_question(&cmd.question)?;
    let context = resolve_context(&cmd.context)?;

    let mut settings = Settings::from_env().map_err(UserError::Settings)?;
    if let Some(model) = &cmd.model {
        settings = settings.with_model(model);
    }
    let client = settings
        .client_builder()
        .build()
        .context("Failed to create Gemini client")?;

    execute_ask(&cmd.question, &context, Arc::new(client), &mut std::io::stdout())
}

/// Executes the ask command with a provided client.
///
/// Separated from `handle_ask` so it can be tested with a mock client.
fn execute_ask(
    question: &str,
    context: &str,
    client: Arc<dyn GeminiClientTrait>,
    out: &mut impl Write,
) -> Result<()> {
    let generator = AnswerGenerator::new(client);

    let response = generator
        .generate(question, context)
        .context("Failed to generate answer")?;

    if response.text().trim().is_empty() {
        writeln!(out, "{NO_ANSWER}")?;
    } else {
        writeln!(out, "{}", response.text().trim_end())?;
    }
    Ok(())
}

/// Handles the prompt command.
fn handle_prompt(cmd: &PromptCommand) -> Result<()> {
    validate_question(&cmd.question)?;
    let context = resolve_context(&cmd.context)?;
    print!("{}", render_prompt(&cmd.question, &context));
    Ok(())
}

fn validate_question(question: &str) -> Result<(), UserError> {
    if question.trim().is_empty() {
        return Err(UserError::EmptyQuestion);
    }
    Ok(())
}

/// Returns the context text from `--context`, `--context-file`, or empty.
fn resolve_context(args: &ContextArgs) -> Result<String, UserError> {
    match (&args.context, &args.context_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => read_context_file(path),
        (None, None) => Ok(String::new()),
    }
}

fn read_context_file(path: &Path) -> Result<String, UserError> {
    std::fs::read_to_string(path).map_err(|source| UserError::ContextFile {
        path: path.to_path_buf(),
        source,
    })
}
