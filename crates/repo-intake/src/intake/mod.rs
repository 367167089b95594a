//! Repository reference intake: normalization, validation, and scheduling.
//!
//! Each stage lives in its own module and only ever adds to the ordered
//! diagnostics; `pipeline` sequences them and decides whether to submit.

pub mod decompose;
pub mod domain;
pub mod filter;
pub mod host;
mod http;
pub mod path;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod router;
pub mod scheme;
pub mod submission;

pub use decompose::DecomposeError;
pub use domain::{
    Diagnostics, Reachability, Rejection, RepoIdentifier, SubmissionOutcome, ValidationOutcome,
    SEND_FAILURE_MESSAGE, TIMEOUT_MESSAGE,
};
pub use host::{CodeHostAllowlist, DEFAULT_CODE_HOSTS};
pub use http::HttpClientError;
pub use pipeline::{normalize, validate_reference, RepoIntake};
pub use probe::{HttpReachabilityProbe, ReachabilityProbe};
pub use report::IntakeReport;
pub use router::{intake_router, EmbeddingRequest, EmbeddingResponse};
pub use submission::{EmbeddingScheduler, SubmissionClient};
