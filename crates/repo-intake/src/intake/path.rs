use super::domain::Diagnostics;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn revision_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@[^@]*$").expect("revision pattern is valid"))
}

fn extension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\.\w+$").expect("extension pattern is valid"))
}

/// Removes trailing `@ref` and `.ext` suffixes until neither remains.
///
/// Only the HEAD of the default branch can be embedded, so a pinned ref is
/// dropped rather than passed along. Each removal is recorded in order.
pub fn clean_path(path: &str, diagnostics: &mut Diagnostics) -> String {
    let mut current = path.trim_end_matches('/').to_string();

    loop {
        if let Some(found) = revision_pattern().find(&current) {
            let revision = found.as_str().to_string();
            current.truncate(found.start());
            debug!(%revision, "removed revision suffix");
            diagnostics.push(format!(
                "Removed rev: {revision}, only the HEAD revision of the default branch is supported for embeddings at this time."
            ));
        } else if let Some(found) = extension_pattern().find(&current) {
            let extension = found.as_str().to_string();
            current.truncate(found.start());
            debug!(%extension, "removed file type extension");
            diagnostics.push(format!("Removed file type extension: {extension}"));
        } else {
            break;
        }

        current = current.trim_end_matches('/').to_string();
    }

    current
}
