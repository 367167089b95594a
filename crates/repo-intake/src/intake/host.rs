use std::collections::BTreeSet;

/// Code hosts a stock Sourcegraph.com instance can index.
pub const DEFAULT_CODE_HOSTS: [&str; 4] = [
    "github.com",
    "gitlab.com",
    "git.eclipse.org",
    "git.savannah.gnu.org",
];

pub const WWW_PREFIX: &str = "www.";

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Hostnames the target instance has code host connections for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeHostAllowlist {
    hosts: BTreeSet<String>,
}

impl CodeHostAllowlist {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|host| host.as_ref().trim().to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();
        Self { hosts }
    }

    /// Parses a comma-separated list; `None` when it names no host.
    pub fn from_list(value: &str) -> Option<Self> {
        let allowlist = Self::new(value.split(','));
        if allowlist.hosts.is_empty() {
            None
        } else {
            Some(allowlist)
        }
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.hosts.contains(hostname)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

impl Default for CodeHostAllowlist {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_HOSTS)
    }
}

/// Syntactic domain-name check: dotted, LDH labels, alphabetic top-level label.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return false;
    }

    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    });

    let tld_ok = labels
        .last()
        .and_then(|tld| tld.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic());

    labels_ok && tld_ok
}

/// Drops a cosmetic `www.` prefix, returning `None` when there is none.
pub fn strip_www(hostname: &str) -> Option<&str> {
    hostname
        .strip_prefix(WWW_PREFIX)
        .filter(|rest| !rest.is_empty())
}
