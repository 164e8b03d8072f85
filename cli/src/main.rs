//! Healix command-line front end.
//!
//! Usage:
//!   healix chat                         # interactive intake on stdin
//!   healix run --session s1 Alice 29 female "fever and a cough"
//!   healix reports
//!   healix signup --email a@b.c --password pw [--role doctor]
//!   healix login --email a@b.c --password pw
//!   healix whoami --token <TOKEN>
//!   healix doctors

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use healix_auth::{AuthService, JsonFileUserStore, SignupRequest};
use healix_contracts::{
    conversation::SessionId,
    error::{HealixError, HealixResult},
    report::ChatResponse,
};
use healix_core::{
    conversation::NAME_PROMPT, traits::ReportStore, HealixConfig, IntakePipeline, ReportAssembler,
};
use healix_models::load_models;
use healix_nlp::{build_extractor, catalog};
use healix_store::{JsonDocumentWriter, JsonFileReportStore};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Healix: symptom-intake assistant.
#[derive(Parser)]
#[command(
    name = "healix",
    about = "Healix symptom-intake assistant",
    long_about = "Collects patient demographics, extracts symptoms from free text,\n\
                  and produces a reconciled disease suggestion with a stored report."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "healix.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive intake conversation on stdin.
    Chat {
        #[arg(long, default_value = SessionId::DEFAULT)]
        session: String,
    },
    /// Feed scripted messages to one session and print each response as JSON.
    Run {
        #[arg(long, default_value = SessionId::DEFAULT)]
        session: String,
        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Print every stored report as JSON.
    Reports,
    /// Create an account.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        age: String,
        #[arg(long, default_value = "")]
        gender: String,
        #[arg(long, default_value = "")]
        specialty: String,
        #[arg(long, default_value = "")]
        mobile: String,
        #[arg(long, default_value = "")]
        hospital_code: String,
    },
    /// Sign in and print a bearer token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<String>,
    },
    /// Print the claims of a bearer token.
    Whoami {
        #[arg(long)]
        token: String,
    },
    /// List doctor accounts.
    Doctors,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-stage pipeline output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> HealixResult<()> {
    let config = HealixConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Chat { session } => chat(&build_pipeline(&config)?, &SessionId::new(session)),
        Command::Run { session, messages } => {
            let pipeline = build_pipeline(&config)?;
            let session = SessionId::new(session);
            for message in messages {
                print_json(&pipeline.handle_message(&session, &message)?)?;
            }
            Ok(())
        }
        Command::Reports => {
            let store = JsonFileReportStore::new(config.storage.reports_file());
            print_json(&store.list()?)
        }
        Command::Signup {
            email,
            password,
            role,
            name,
            age,
            gender,
            specialty,
            mobile,
            hospital_code,
        } => {
            let session = auth_service(&config).signup(SignupRequest {
                email,
                password,
                role,
                full_name: name,
                age,
                gender,
                specialty,
                mobile,
                hospital_code,
            })?;
            print_json(&session)
        }
        Command::Login { email, password, role } => {
            print_json(&auth_service(&config).login(&email, &password, role.as_deref())?)
        }
        Command::Whoami { token } => print_json(&auth_service(&config).verify(&token)?),
        Command::Doctors => print_json(&auth_service(&config).doctors()?),
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Load the vocabulary, pick the extractor, load the models, open storage.
///
/// Vocabulary problems are fatal before any model is touched.
fn build_pipeline(config: &HealixConfig) -> HealixResult<IntakePipeline> {
    let vocabulary = catalog::load(&config.vocabulary)?;
    let extractor = build_extractor(&config.extractor, &vocabulary)?;
    let models = load_models(&config.models, &vocabulary)?;
    let (classical, sequence) = models.into_adapters(Arc::new(vocabulary), &config.models);

    info!(
        reports = %config.storage.reports_file().display(),
        documents = %config.storage.reports_dir.display(),
        "storage configured"
    );

    Ok(IntakePipeline::new(
        extractor,
        classical,
        sequence,
        ReportAssembler::from_settings(&config.report),
        Arc::new(JsonFileReportStore::new(config.storage.reports_file())),
        Arc::new(JsonDocumentWriter::new(config.storage.reports_dir.clone())),
    )
    .with_session_idle_timeout(config.sessions.idle_timeout()))
}

fn auth_service(config: &HealixConfig) -> AuthService {
    let users = Arc::new(JsonFileUserStore::new(config.storage.users_file()));
    AuthService::from_settings(users, &config.auth)
}

// ── Interactive chat ──────────────────────────────────────────────────────────

fn chat(pipeline: &IntakePipeline, session: &SessionId) -> HealixResult<()> {
    println!("Healix symptom-intake assistant. Type 'quit' to leave.");
    println!();
    say(NAME_PROMPT)?;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(console_error)?;
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        let response = pipeline.handle_message(session, &line)?;
        say(&response.reply)?;
        print_report_summary(&response);
    }
    pipeline.sessions().end(session)?;
    Ok(())
}

fn say(text: &str) -> HealixResult<()> {
    print!("Healix: {text}\n> ");
    std::io::stdout().flush().map_err(console_error)
}

fn print_report_summary(response: &ChatResponse) {
    let Some(report) = &response.report else {
        return;
    };
    println!();
    println!("  Report {}", report.report_id.0);
    println!("  Symptoms: {}", response.extracted_symptoms.joined());
    for (label, percent) in report.predictions.iter() {
        println!("  {label:<40} {percent:>5.1}%");
    }
    for doctor in &report.recommended_doctors {
        println!("  See: {} ({}, {})", doctor.name, doctor.specialty, doctor.experience);
    }
    println!("  {}", report.notes);
    print!("> ");
    let _ = std::io::stdout().flush();
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> HealixResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| HealixError::ConsoleError {
        reason: format!("failed to render JSON: {e}"),
    })?;
    println!("{json}");
    Ok(())
}

fn console_error(e: std::io::Error) -> HealixError {
    HealixError::ConsoleError { reason: e.to_string() }
}
