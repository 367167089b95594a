use clap::Args;
use repo_intake::config::{AppConfig, SourcegraphConfig};
use repo_intake::error::AppError;
use repo_intake::intake::{
    validate_reference, HttpReachabilityProbe, RepoIntake, SubmissionClient, ValidationOutcome,
};
use repo_intake::telemetry;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RepoArgs {
    /// Repository URL, SSH shorthand, or bare host/path reference
    pub(crate) repo_url: String,
}

pub(crate) async fn run_submit(args: RepoArgs) -> Result<ExitCode, AppError> {
    let sourcegraph = load_sourcegraph_config()?;
    let token = sourcegraph.require_token()?;

    let probe = HttpReachabilityProbe::new(sourcegraph.request_timeout)?;
    let client = SubmissionClient::new(&sourcegraph.server, token, sourcegraph.request_timeout)?;
    info!(endpoint = %client.endpoint(), "submitting repository reference");
    let intake = RepoIntake::new(
        sourcegraph.code_hosts.clone(),
        sourcegraph.server.clone(),
        Arc::new(probe),
        Arc::new(client),
    );

    let report = intake.submit(&args.repo_url).await;

    println!("# {}", report.thread_name());
    for message in report.messages() {
        println!("{message}\n");
    }

    Ok(exit_code(report.is_success()))
}

pub(crate) async fn run_check(args: RepoArgs) -> Result<ExitCode, AppError> {
    let sourcegraph = load_sourcegraph_config()?;
    let probe = HttpReachabilityProbe::new(sourcegraph.request_timeout)?;

    let outcome = validate_reference(&args.repo_url, &sourcegraph.code_hosts, &probe).await;
    for message in check_messages(&args.repo_url, &outcome) {
        println!("{message}\n");
    }

    Ok(exit_code(outcome.is_accepted()))
}

fn load_sourcegraph_config() -> Result<SourcegraphConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config.sourcegraph)
}

fn check_messages(raw: &str, outcome: &ValidationOutcome) -> Vec<String> {
    let mut messages = Vec::new();

    // A rejection is shown once, in the final line.
    let diagnostics = outcome.diagnostics().as_slice();
    let shown = diagnostics.len().saturating_sub(usize::from(!outcome.is_accepted()));
    if shown > 0 {
        let mut block = vec!["Input sanitizer messages:".to_string()];
        block.extend(diagnostics[..shown].iter().cloned());
        messages.push(block.join("\n"));
    }

    match outcome {
        ValidationOutcome::Accepted { identifier, .. } => {
            messages.push(format!("✅ {identifier} can be submitted for embeddings"));
        }
        ValidationOutcome::Rejected { rejection, .. } => {
            messages.push(format!(
                "❌ Could not submit {}: {}",
                raw.trim(),
                rejection.diagnostic()
            ));
        }
    }

    messages
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
