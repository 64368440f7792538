//! Pre-dispatch content policy.
//!
//! Matching is plain case-insensitive substring containment, so "car" also
//! matches "carpet". That is the established behaviour callers rely on.

/// Terms that mark a prompt as outside the architecture domain.
pub const DEFAULT_BANNED_TERMS: &[&str] = &[
    "amazon",
    "sale",
    "discount",
    "marketing",
    "car",
    "fashion",
    "celebrity",
];

#[derive(Debug, Clone)]
pub struct BannedTermList {
    terms: Vec<String>,
}

impl BannedTermList {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// First banned term contained in `prompt`, if any.
    pub fn find_match(&self, prompt: &str) -> Option<&str> {
        let prompt = prompt.to_lowercase();
        self.terms
            .iter()
            .find(|term| prompt.contains(term.as_str()))
            .map(String::as_str)
    }
}

impl Default for BannedTermList {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_TERMS)
    }
}
