use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Scheme used only to give the parser a well-formed URL.
const PARSE_SCHEME: &str = "https://";

#[derive(Debug, thiserror::Error)]
pub enum DecomposeError {
    #[error("{0}")]
    Parse(#[from] url::ParseError),
    #[error("no hostname found")]
    MissingHost,
    #[error("path contains '.' or '..' segments")]
    DotSegment,
}

/// Components of a scheme-less reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecomposedUrl {
    pub hostname: String,
    pub path: String,
    pub username: Option<String>,
    pub has_password: bool,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// The parser resolves `.` and `..` segments, which would silently name a
/// different repository, so they are refused up front.
pub fn decompose(input: &str) -> Result<DecomposedUrl, DecomposeError> {
    if has_dot_segment(input) {
        return Err(DecomposeError::DotSegment);
    }

    let url = Url::parse(&format!("{PARSE_SCHEME}{input}"))?;
    let hostname = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or(DecomposeError::MissingHost)?
        .to_string();

    let username = Some(url.username())
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    Ok(DecomposedUrl {
        hostname,
        path: url.path().to_string(),
        username,
        has_password: url.password().is_some(),
        query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
        fragment: url.fragment().filter(|f| !f.is_empty()).map(str::to_string),
    })
}

fn has_dot_segment(input: &str) -> bool {
    let before_query = input.split(['?', '#']).next().unwrap_or_default();
    before_query
        .find('/')
        .map(|start| &before_query[start..])
        .is_some_and(|path| path.split('/').any(|segment| segment == "." || segment == ".."))
}

fn scp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<user>[^@/:]+@)?(?P<host>[^@/:]+):(?P<path>[^\d/@][^/@]*(?:/.*)?)$")
            .expect("scp shorthand pattern is valid")
    })
}

/// Rewrites `git@host:org/repo` into `git@host/org/repo`.
///
/// A colon followed by a digit is a port and is left alone.
pub fn expand_scp_shorthand(input: &str) -> Option<String> {
    let captures = scp_pattern().captures(input)?;
    let user = captures.name("user").map_or("", |m| m.as_str());
    Some(format!("{user}{}/{}", &captures["host"], &captures["path"]))
}
