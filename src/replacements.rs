//! Find/replace rewriting of remote URLs.
//!
//! Users map internal remote hosts onto the canonical ones with a
//! comma-separated list of pairs:
//!
//! ```toml
//! remote-url-replacements = "git.internal.example.com, github.com, ssh://, https://"
//! ```
//!
//! Whitespace around the commas is ignored. A list with an odd number of
//! entries is considered malformed and disables rewriting entirely; it is
//! not reported as an error.

/// Parsed list of find/replace pairs, applied in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlReplacements {
    pairs: Vec<(String, String)>,
}

impl UrlReplacements {
    /// Parse a comma-separated pair list.
    ///
    /// Trailing empty entries (`"a,b,"`) are dropped before the pair count is
    /// checked. An odd count yields an empty list.
    pub fn parse(list: &str) -> Self {
        let mut entries: Vec<&str> = list.trim().split(',').map(str::trim).collect();
        while entries.last().is_some_and(|e| e.is_empty()) {
            entries.pop();
        }

        if entries.len() % 2 != 0 {
            log::debug!(
                "Ignoring remote URL replacements with an odd number of entries ({})",
                entries.len()
            );
            return Self::default();
        }

        let pairs = entries
            .chunks_exact(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();
        Self { pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Rewrite `url`, each pair applied to the result of the previous one.
    ///
    /// Pairs with an empty needle are skipped.
    pub fn apply(&self, url: &str) -> String {
        self.pairs
            .iter()
            // An empty needle matches between every character
            .filter(|(find, _)| !find.is_empty())
            .fold(url.to_string(), |url, (find, replace)| {
                url.replace(find.as_str(), replace)
            })
    }
}
