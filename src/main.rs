//! # lms-admin-session
//!
//! Command-line client for the LMS admin session: signs in and out,
//! reports the stored session, and retries the backend steps. Wires the
//! Firebase identity provider, the file-backed session store and the LMS
//! backend adapters into a `SessionOrchestrator`.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use lms_admin_session::adapters::{
    BackendClient, ChannelNavigator, ConsoleNotifier, FileSessionStore, FirebaseIdentityProvider,
    HttpSessionValidator, LinePrompt, ShimUserResolver,
};
use lms_admin_session::application::SessionOrchestrator;
use lms_admin_session::config::{AppConfig, ClientConfig};
use lms_admin_session::domain::session::Route;

/// LMS admin session client.
#[derive(Parser, Debug)]
#[command(name = "lms-admin-session", about = "Sign in to the LMS admin client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password. The password is read from stdin.
    SignIn {
        #[arg(long)]
        email: String,
    },
    /// Sign in through the federated provider. Paste the provider's id token on stdin.
    SignInFederated,
    /// Sign out and clear the stored session.
    SignOut,
    /// Print the stored session and its status.
    Status,
    /// Ask the backend to validate the stored session again.
    Validate,
    /// Retry resolving the LMS user id for a degraded session.
    Resolve,
}

fn init_tracing(config: &ClientConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout is reserved for notifications and command output.
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn read_password() -> Result<SecretString> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read password from stdin")?;
    Ok(SecretString::new(
        line.trim_end_matches(|c| c == '\r' || c == '\n').to_string(),
    ))
}

async fn build(config: &AppConfig) -> Result<(SessionOrchestrator, Arc<ChannelNavigator>)> {
    let store = Arc::new(
        FileSessionStore::open(&config.session.store_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to open session store: {}",
                    config.session.store_path.display()
                )
            })?,
    );

    let backend = BackendClient::new(store.clone(), config.backend.request_timeout())
        .context("Failed to build backend HTTP client")?;
    let resolver = Arc::new(ShimUserResolver::new(
        backend.clone(),
        &config.backend.shim_base_url,
    ));
    let validator = Arc::new(HttpSessionValidator::new(
        backend,
        &config.backend.auth_base_url,
    ));

    let provider = Arc::new(
        FirebaseIdentityProvider::new(config.identity.firebase(), Arc::new(LinePrompt::stdin()))
            .context("Failed to build identity provider client")?,
    );
    let navigator = Arc::new(ChannelNavigator::new(Route::SignIn));

    let orchestrator = SessionOrchestrator::new(
        provider,
        store,
        resolver,
        validator,
        navigator.clone(),
        Arc::new(ConsoleNotifier),
    )
    .with_config(config.orchestrator());

    Ok((orchestrator, navigator))
}

fn print_status(orchestrator: &SessionOrchestrator) -> Result<()> {
    let session = orchestrator.current_session();
    let report = json!({
        "status": orchestrator.status(),
        "email": session.as_ref().map(|s| s.email.clone()),
        "userId": session.as_ref().and_then(|s| s.internal_user_id.as_ref().map(|id| id.to_string())),
        "user": session.as_ref().and_then(|s| s.display_name.clone()),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(&config.client);

    let (orchestrator, navigator) = build(&config).await?;

    let succeeded = match cli.command {
        Command::SignIn { email } => {
            let password = read_password().await?;
            orchestrator.sign_in_with_password(&email, &password).await.is_ok()
        }
        Command::SignInFederated => orchestrator.sign_in_with_federated_provider().await.is_ok(),
        Command::SignOut => orchestrator.sign_out().await.is_ok(),
        Command::Status => {
            print_status(&orchestrator)?;
            true
        }
        Command::Validate => orchestrator.revalidate().await.is_ok(),
        Command::Resolve => orchestrator.retry_resolution().await.is_ok(),
    };

    tracing::debug!(route = %navigator.current(), "Command finished");
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
