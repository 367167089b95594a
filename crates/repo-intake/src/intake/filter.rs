/// Punctuation that may appear in a repository reference besides ASCII letters and digits.
pub const ALLOWED_PUNCTUATION: &str = ":/@-_.;?=&+#";

pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c)
}

/// Input with disallowed characters dropped, plus the distinct characters that were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredInput {
    pub retained: String,
    pub removed: Vec<char>,
}

impl FilteredInput {
    pub fn diagnostic(&self) -> Option<String> {
        if self.removed.is_empty() {
            return None;
        }

        let listed = self
            .removed
            .iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!("Removed invalid characters: [{listed}]"))
    }
}

/// Never fails; removed characters are reported in order of first appearance.
pub fn filter_characters(raw: &str) -> FilteredInput {
    let mut removed = Vec::new();
    let retained = raw
        .chars()
        .filter(|&c| {
            if is_allowed(c) {
                return true;
            }
            if !removed.contains(&c) {
                removed.push(c);
            }
            false
        })
        .collect();

    FilteredInput { retained, removed }
}
