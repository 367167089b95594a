use serde::{Serialize, Serializer};
use std::fmt;

/// Canonical `host/path` reference accepted by the embeddings scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoIdentifier {
    hostname: String,
    path: String,
}

impl RepoIdentifier {
    pub fn new(hostname: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            path: path.into(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Public web address used for the reachability probe.
    pub fn https_url(&self) -> String {
        format!("https://{self}")
    }
}

impl fmt::Display for RepoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.hostname, self.path)
    }
}

impl Serialize for RepoIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered, user-facing audit trail of every change or rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<String>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Why a reference was refused before any submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    MalformedInput { input: String, reason: String },
    InvalidHostname { hostname: String },
    UnsupportedCodeHost { hostname: String },
    MissingRepositoryPath { hostname: String },
}

impl Rejection {
    pub fn diagnostic(&self) -> String {
        match self {
            Rejection::MalformedInput { input, reason } => {
                format!("Could not parse repository URL: {input} ({reason})")
            }
            Rejection::InvalidHostname { hostname } => {
                format!("Unsupported hostname provided: {hostname}")
            }
            Rejection::UnsupportedCodeHost { hostname } => {
                format!("Code host not configured on Sourcegraph instance: {hostname}")
            }
            Rejection::MissingRepositoryPath { hostname } => {
                format!("No repository path found after hostname: {hostname}")
            }
        }
    }
}

/// Result of the validation stages; nothing runs after a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Accepted {
        identifier: RepoIdentifier,
        diagnostics: Diagnostics,
    },
    Rejected {
        rejection: Rejection,
        diagnostics: Diagnostics,
    },
}

impl ValidationOutcome {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            ValidationOutcome::Accepted { diagnostics, .. }
            | ValidationOutcome::Rejected { diagnostics, .. } => diagnostics,
        }
    }

    pub fn identifier(&self) -> Option<&RepoIdentifier> {
        match self {
            ValidationOutcome::Accepted { identifier, .. } => Some(identifier),
            ValidationOutcome::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ValidationOutcome::Accepted { .. } => None,
            ValidationOutcome::Rejected { rejection, .. } => Some(rejection),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted { .. })
    }
}

/// Advisory result of probing the public repository page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable { reason: String },
}

impl Reachability {
    pub fn diagnostic(&self, identifier: &RepoIdentifier) -> String {
        match self {
            Reachability::Reachable => {
                format!("Validated repo exists: {}", identifier.https_url())
            }
            Reachability::Unreachable { reason } => format!(
                "Could not validate if repo exists: {} ({reason})",
                identifier.https_url()
            ),
        }
    }
}

pub const TIMEOUT_MESSAGE: &str =
    "⚠️ Timed out submitting embeddings job to the Sourcegraph server, please try again!";
pub const SEND_FAILURE_MESSAGE: &str =
    "⚠️ Could not reach the Sourcegraph server to submit the embeddings job, please try again!";

/// Classified result of the single scheduling call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Succeeded,
    FailedWithMessage(String),
    TimedOut,
    TransportError(String),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded)
    }

    /// Text shown to the requester for this outcome.
    pub fn message(&self) -> &str {
        match self {
            SubmissionOutcome::Succeeded => "Embeddings job scheduled",
            SubmissionOutcome::FailedWithMessage(message)
            | SubmissionOutcome::TransportError(message) => message,
            SubmissionOutcome::TimedOut => TIMEOUT_MESSAGE,
        }
    }

    pub fn diagnostic(&self, identifier: &RepoIdentifier) -> String {
        match self {
            SubmissionOutcome::Succeeded => {
                format!("Scheduled {identifier} for embeddings")
            }
            other => format!(
                "Failed to schedule {identifier} for embeddings: {}",
                other.message()
            ),
        }
    }
}
