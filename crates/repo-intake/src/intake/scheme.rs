use regex::Regex;
use std::sync::OnceLock;

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9+.\-]*://").expect("scheme pattern is valid"))
}

/// Lowercases the reference and drops a leading `<scheme>://`.
///
/// A `://` later in the string (inside a query or fragment) is not a scheme
/// and is left for the decomposer to report.
pub fn strip_scheme(input: &str) -> String {
    let lowered = input.to_ascii_lowercase();
    match scheme_pattern().find(&lowered) {
        Some(found) => lowered[found.end()..].to_string(),
        None => lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_any_scheme_and_lowercases() {
        assert_eq!(strip_scheme("HTTPS://GitHub.com/Org/Repo"), "github.com/org/repo");
        assert_eq!(strip_scheme("http://github.com/org/repo"), "github.com/org/repo");
        assert_eq!(
            strip_scheme("git+ssh://git@github.com/org/repo"),
            "git@github.com/org/repo"
        );
    }

    #[test]
    fn leaves_schemeless_input_alone() {
        assert_eq!(strip_scheme("www.github.com/org/repo"), "www.github.com/org/repo");
    }

    #[test]
    fn only_the_first_separator_is_removed() {
        assert_eq!(strip_scheme("https://https://github.com/a/b"), "https://github.com/a/b");
    }

    #[test]
    fn urls_inside_query_or_fragment_are_not_schemes() {
        assert_eq!(
            strip_scheme("gitlab.com/group/project?ref=https://github.com/other/repo"),
            "gitlab.com/group/project?ref=https://github.com/other/repo"
        );
        assert_eq!(
            strip_scheme("github.com/org/repo#see-https://gitlab.com/x/y"),
            "github.com/org/repo#see-https://gitlab.com/x/y"
        );
        assert_eq!(
            strip_scheme("https://github.com/org/repo?next=https://example.com/x"),
            "github.com/org/repo?next=https://example.com/x"
        );
    }
}
