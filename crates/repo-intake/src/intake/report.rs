use super::domain::{SubmissionOutcome, ValidationOutcome};
use crate::config::SourcegraphServer;
use serde::Serialize;

const SANITIZER_HEADING: &str = "Input sanitizer messages:";
const SUBMISSION_ERROR_PREFIX: &str = "❌ Error submitting embeddings job to the Sourcegraph server";
const THREAD_NAME_LIMIT: usize = 100;

/// Everything one request produced, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReport {
    pub requested: String,
    pub server: String,
    pub validation: ValidationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionOutcome>,
}

impl IntakeReport {
    pub(crate) fn new(
        requested: &str,
        server: &SourcegraphServer,
        validation: ValidationOutcome,
        submission: Option<SubmissionOutcome>,
    ) -> Self {
        Self {
            requested: requested.to_string(),
            server: server.base_url().to_string(),
            validation,
            submission,
        }
    }

    pub fn is_success(&self) -> bool {
        self.submission
            .as_ref()
            .is_some_and(SubmissionOutcome::is_success)
    }

    /// Title for the reply thread.
    pub fn thread_name(&self) -> String {
        let name = match self.validation.identifier() {
            Some(identifier) => {
                let canonical = identifier.to_string();
                canonical
                    .strip_prefix("github.com/")
                    .map(str::to_string)
                    .unwrap_or(canonical)
            }
            None => self.requested.trim().to_string(),
        };
        name.chars().take(THREAD_NAME_LIMIT).collect()
    }

    /// Messages for the requester, each one posted separately.
    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();

        // The last line (scheduling or rejection) is reported in the final status instead.
        let diagnostics = self.validation.diagnostics().as_slice();
        let concluded = self.submission.is_some() || !self.validation.is_accepted();
        let validation_lines = &diagnostics[..diagnostics.len().saturating_sub(usize::from(concluded))];
        if !validation_lines.is_empty() {
            let mut block = vec![SANITIZER_HEADING.to_string()];
            block.extend(validation_lines.iter().cloned());
            messages.push(block.join("\n"));
        }

        match (&self.validation, &self.submission) {
            (ValidationOutcome::Rejected { rejection, .. }, _) => {
                messages.push(format!(
                    "❌ Could not submit {}: {}",
                    self.requested.trim(),
                    rejection.diagnostic()
                ));
            }
            (ValidationOutcome::Accepted { identifier, .. }, submission) => {
                messages.push(format!(
                    "Submitting {identifier} for embeddings on {}",
                    self.server
                ));
                match submission {
                    Some(SubmissionOutcome::Succeeded) => {
                        messages.push(success_message(&format!("{}/{identifier}", self.server)));
                    }
                    Some(outcome) => {
                        messages.push(format!("{SUBMISSION_ERROR_PREFIX}: {}", outcome.message()));
                    }
                    None => {}
                }
            }
        }

        messages
    }
}

fn success_message(repo_page: &str) -> String {
    format!(
        "✅ Embeddings are processing!\n\
Embeddings are usually available within ~30 minutes, depending on the size of the repo.\n\
To check if they're completed:\n\
1. Go to your repo on Sourcegraph {repo_page}\n\
2. Log in with your GitHub.com account\n\
3. Click on the Ask Cody button near the top right\n\
4. Check the Chat Context menu in the bottom left corner of the chat pane for a checkmark or X"
    )
}
