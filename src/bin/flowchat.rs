//! # flowchat
//!
//! 命令行聊天前端：单次提问或交互式会话。
//!
//! Command-line front-end for a hosted flow.
//!
//! ## Usage
//!
//! ```bash
//! # One question, answer on stdout
//! flowchat "What is substance?" --application_token "$APPLICATION_TOKEN"
//!
//! # Keep the raw response for inspection
//! flowchat "What is substance?" --response-file response.json
//!
//! # Interactive chat (/new, /history, /quit)
//! flowchat
//! ```
//!
//! Exit codes: 0 success, 1 upstream or parse error, 2 configuration or usage
//! error, 3 transport error.

use anyhow::{Context, Result};
use clap::Parser;
use flowchat::config::{ConfigOverrides, ConfigResolver, CredentialFile, KeyringCredentials};
use flowchat::{AppError, AppErrorKind, ChatSession, FlowClient, IoType, Query, Role, Tweaks};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const EXIT_APP: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_TRANSPORT: u8 = 3;

/// Run a flow with a given message and optional tweaks.
#[derive(Parser, Debug)]
#[command(name = "flowchat")]
#[command(about = "Ask a hosted flow a question, once or interactively", long_about = None)]
#[command(version)]
struct Cli {
    /// The message to send to the flow. Omit to start an interactive chat.
    #[arg(value_name = "MESSAGE")]
    message: Option<String>,

    /// The ID or the endpoint name of the flow
    #[arg(long, value_name = "ENDPOINT")]
    endpoint: Option<String>,

    /// JSON object of per-component overrides, e.g. '{"Model-1": {"temperature": 0.2}}'
    #[arg(long, value_name = "JSON")]
    tweaks: Option<String>,

    /// Application token for authentication
    #[arg(long = "application_token", value_name = "TOKEN")]
    application_token: Option<String>,

    /// The output type (chat or text)
    #[arg(long = "output_type", value_name = "TYPE", default_value = "chat")]
    output_type: IoType,

    /// The input type (chat or text)
    #[arg(long = "input_type", value_name = "TYPE", default_value = "chat")]
    input_type: IoType,

    /// Organization scope sent with each request
    #[arg(long, value_name = "ORG_ID")]
    org_id: Option<String>,

    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    #[arg(long, value_name = "FLOW_ID")]
    flow_id: Option<String>,

    /// Upstream session id; keeps conversational memory across calls
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,

    /// Per-call timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Read token and identifiers from a JSON or YAML credential file
    #[arg(long, value_name = "PATH", conflicts_with = "keyring")]
    credentials: Option<PathBuf>,

    /// Read the credential record from the OS keyring
    #[arg(long)]
    keyring: bool,

    /// Load environment variables from a dotenv file first
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Write the raw response (or error diagnostic) as pretty JSON to this path
    #[arg(long, value_name = "PATH")]
    response_file: Option<PathBuf>,

    /// Print the raw JSON response instead of the answer text
    #[arg(long)]
    raw: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "flowchat=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
    }

    let tweaks = match &cli.tweaks {
        Some(raw) => Tweaks::from_json_str(raw).context("Invalid tweaks JSON string")?,
        None => Tweaks::new(),
    };

    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        flow_id: cli.flow_id.clone(),
        endpoint_id: cli.endpoint.clone(),
        org_id: cli.org_id.clone(),
        token: cli.application_token.clone(),
        timeout_ms: cli.timeout_ms,
        ..Default::default()
    };

    let mut resolver = ConfigResolver::new();
    if let Some(path) = &cli.credentials {
        resolver = resolver.with_credentials(CredentialFile::new(path));
    } else if cli.keyring {
        resolver = resolver.with_credentials(KeyringCredentials::default());
    }
    let config = resolver.resolve(&overrides)?;
    let client = FlowClient::new(config)?;

    match cli.message.clone() {
        Some(message) => {
            let mut query = Query::new(message)?
                .input_type(cli.input_type)
                .output_type(cli.output_type)
                .tweaks(tweaks);
            if let Some(id) = &cli.session_id {
                query = query.session_id(id.clone());
            }
            one_shot(&client, &query, &cli).await
        }
        None => interactive(&client, tweaks, &cli).await,
    }
}

async fn one_shot(client: &FlowClient, query: &Query, cli: &Cli) -> Result<ExitCode> {
    match client.ask(query).await {
        Ok(answer) => {
            if let Some(path) = &cli.response_file {
                write_json(path, &answer.raw)?;
            }
            if cli.raw {
                println!("{}", serde_json::to_string_pretty(&answer.raw)?);
            } else {
                println!("{}", answer.text);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", err.user_message);
            if let Some(path) = &cli.response_file {
                if let Err(e) = write_json(path, &err.diagnostic()) {
                    warn!(path = %path.display(), error = %e, "could not write error diagnostic");
                }
            }
            Ok(exit_code_for(&err))
        }
    }
}

async fn interactive(client: &FlowClient, tweaks: Tweaks, cli: &Cli) -> Result<ExitCode> {
    let mut session = match &cli.session_id {
        Some(id) if !id.trim().is_empty() => ChatSession::with_session_id(id.clone()),
        _ => ChatSession::with_generated_session(),
    };
    eprintln!("flowchat: type a question, /new to start over, /history to review, /quit to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/new" => {
                session.new_session();
                println!("-- new session --");
                continue;
            }
            "/history" => {
                print_history(&session);
                continue;
            }
            _ => {}
        }

        let query = Query::new(input)?
            .input_type(cli.input_type)
            .output_type(cli.output_type)
            .tweaks(tweaks.clone());
        match session.submit(client, query).await {
            Ok(answer) => println!("{}", answer.text),
            Err(err) => println!("[error] {}", err.user_message),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_history(session: &ChatSession) {
    for entry in session.history().all() {
        let label = match (entry.role, entry.is_error) {
            (Role::User, _) => "you",
            (Role::Assistant, false) => "flow",
            (Role::Assistant, true) => "flow [error]",
        };
        match entry.response_time_ms {
            Some(ms) => println!("{label} ({ms} ms): {}", entry.content),
            None => println!("{label}: {}", entry.content),
        }
    }
}

fn exit_code_for(err: &AppError) -> ExitCode {
    match err.kind {
        AppErrorKind::Transport => ExitCode::from(EXIT_TRANSPORT),
        AppErrorKind::Upstream | AppErrorKind::Parse => ExitCode::from(EXIT_APP),
    }
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
