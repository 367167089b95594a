use super::decompose::{decompose, expand_scp_shorthand};
use super::domain::{Diagnostics, Rejection, RepoIdentifier, ValidationOutcome};
use super::filter::filter_characters;
use super::host::{is_valid_hostname, strip_www, CodeHostAllowlist, WWW_PREFIX};
use super::path::clean_path;
use super::probe::ReachabilityProbe;
use super::report::IntakeReport;
use super::scheme::strip_scheme;
use super::submission::EmbeddingScheduler;
use crate::config::SourcegraphServer;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs every offline stage in order: filter, scheme, decompose, host, path.
///
/// Hostname checks are the only hard gate; everything else cleans the input
/// and records what it changed.
pub fn normalize(raw: &str, code_hosts: &CodeHostAllowlist) -> ValidationOutcome {
    let mut diagnostics = Diagnostics::new();

    let filtered = filter_characters(raw);
    if let Some(line) = filtered.diagnostic() {
        debug!(removed = ?filtered.removed, "removed invalid characters");
        diagnostics.push(line);
    }

    let stripped = strip_scheme(&filtered.retained);
    let candidate = expand_scp_shorthand(&stripped).unwrap_or(stripped);

    let parts = match decompose(&candidate) {
        Ok(parts) => parts,
        Err(err) => {
            return reject(
                Rejection::MalformedInput {
                    input: raw.trim().to_string(),
                    reason: err.to_string(),
                },
                diagnostics,
            )
        }
    };

    match (&parts.username, parts.has_password) {
        (_, true) => diagnostics.push("Removed credentials from URL"),
        (Some(username), false) => diagnostics.push(format!("Removed: {username}@")),
        (None, false) => {}
    }
    if let Some(query) = &parts.query {
        diagnostics.push(format!("Removed query: ?{query}"));
    }
    if let Some(fragment) = &parts.fragment {
        diagnostics.push(format!("Removed fragment: #{fragment}"));
    }

    if !is_valid_hostname(&parts.hostname) {
        return reject(
            Rejection::InvalidHostname {
                hostname: parts.hostname,
            },
            diagnostics,
        );
    }

    let hostname = match strip_www(&parts.hostname) {
        Some(rest) => {
            diagnostics.push(format!("Removed: {WWW_PREFIX}"));
            rest.to_string()
        }
        None => parts.hostname.clone(),
    };

    if !code_hosts.contains(&hostname) {
        return reject(Rejection::UnsupportedCodeHost { hostname }, diagnostics);
    }

    let path = clean_path(&parts.path, &mut diagnostics);
    if path.is_empty() {
        return reject(Rejection::MissingRepositoryPath { hostname }, diagnostics);
    }

    let identifier = RepoIdentifier::new(hostname, path);
    info!(%identifier, "accepted repository reference");

    ValidationOutcome::Accepted {
        identifier,
        diagnostics,
    }
}

fn reject(rejection: Rejection, mut diagnostics: Diagnostics) -> ValidationOutcome {
    let line = rejection.diagnostic();
    warn!(reason = %line, "rejected repository reference");
    diagnostics.push(line);
    ValidationOutcome::Rejected {
        rejection,
        diagnostics,
    }
}

/// Offline stages followed by the advisory reachability probe.
///
/// The probe result is appended as a diagnostic and never changes the outcome.
pub async fn validate_reference<P>(
    raw: &str,
    code_hosts: &CodeHostAllowlist,
    probe: &P,
) -> ValidationOutcome
where
    P: ReachabilityProbe + ?Sized,
{
    let mut outcome = normalize(raw, code_hosts);

    if let ValidationOutcome::Accepted {
        identifier,
        diagnostics,
    } = &mut outcome
    {
        let reachability = probe.probe(identifier).await;
        diagnostics.push(reachability.diagnostic(identifier));
    }

    outcome
}

/// Request-scoped pipeline: validate, probe, then schedule at most once.
pub struct RepoIntake<P, S> {
    code_hosts: CodeHostAllowlist,
    server: SourcegraphServer,
    probe: Arc<P>,
    scheduler: Arc<S>,
}

impl<P, S> RepoIntake<P, S>
where
    P: ReachabilityProbe + 'static,
    S: EmbeddingScheduler + 'static,
{
    pub fn new(
        code_hosts: CodeHostAllowlist,
        server: SourcegraphServer,
        probe: Arc<P>,
        scheduler: Arc<S>,
    ) -> Self {
        Self {
            code_hosts,
            server,
            probe,
            scheduler,
        }
    }

    pub fn server(&self) -> &SourcegraphServer {
        &self.server
    }

    pub async fn validate(&self, raw: &str) -> ValidationOutcome {
        validate_reference(raw, &self.code_hosts, self.probe.as_ref()).await
    }

    /// Validates and, only when accepted, submits the identifier for embeddings.
    pub async fn submit(&self, raw: &str) -> IntakeReport {
        let mut validation = self.validate(raw).await;

        let submission = match &mut validation {
            ValidationOutcome::Accepted {
                identifier,
                diagnostics,
            } => {
                let outcome = self.scheduler.schedule(identifier).await;
                diagnostics.push(outcome.diagnostic(identifier));
                Some(outcome)
            }
            ValidationOutcome::Rejected { .. } => None,
        };

        IntakeReport::new(raw, &self.server, validation, submission)
    }
}
