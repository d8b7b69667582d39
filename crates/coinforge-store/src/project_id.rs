//! Project and owner identifiers safe to use as path components
//!
//! Identifiers come from user input (plan names, `--owner` flags) and
//! end up as directory and file names, so they are normalized and
//! restricted before anything touches the filesystem.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use coinforge_utils::error::StoreError;

/// A sanitized identifier: NFKC-normalized, restricted to
/// `[A-Za-z0-9._-]`, with traversal sequences neutralized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Sanitize a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` when the input is empty or
    /// contains nothing representable after sanitization.
    pub fn new(raw: &str) -> Result<Self, StoreError> {
        sanitize_component(raw).map(Self)
    }

    /// Derive an id from a project's display name: lowercased, with
    /// whitespace collapsed to single hyphens.
    ///
    /// # Errors
    ///
    /// See [`ProjectId::new`].
    pub fn from_project_name(name: &str) -> Result<Self, StoreError> {
        let collapsed = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        Self::new(&collapsed)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared sanitizer for project ids and owner names.
pub(crate) fn sanitize_component(raw: &str) -> Result<String, StoreError> {
    let normalized: String = raw.trim().nfkc().collect();
    if normalized.is_empty() {
        return Err(StoreError::InvalidId(
            "identifier is empty".to_string(),
        ));
    }

    let mut cleaned: String = normalized
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    // ".." anywhere could alias a traversal sequence after joins
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", "__");
    }

    if cleaned.chars().all(|c| matches!(c, '-' | '.')) {
        return Err(StoreError::InvalidId(format!(
            "identifier '{raw}' contains no usable characters"
        )));
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifiers_pass_through() {
        assert_eq!(ProjectId::new("novacoin").unwrap().as_str(), "novacoin");
        assert_eq!(ProjectId::new("nova_coin-2").unwrap().as_str(), "nova_coin-2");
    }

    #[test]
    fn traversal_sequences_are_neutralized() {
        assert_eq!(ProjectId::new("../../etc").unwrap().as_str(), "__-__-etc");
        let id = ProjectId::new("a/../b").unwrap();
        assert!(!id.as_str().contains(".."));
        assert!(!id.as_str().contains('/'));
    }

    #[test]
    fn unicode_is_normalized_before_filtering() {
        // Fullwidth letters fold to ASCII under NFKC
        assert_eq!(ProjectId::new("ｎｏｖａ").unwrap().as_str(), "nova");
    }

    #[test]
    fn empty_and_degenerate_inputs_are_rejected() {
        assert!(matches!(
            ProjectId::new("   "),
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(
            ProjectId::new("///"),
            Err(StoreError::InvalidId(_))
        ));
    }

    #[test]
    fn derived_from_display_name() {
        let id = ProjectId::from_project_name("Nova Coin  Classic").unwrap();
        assert_eq!(id.as_str(), "nova-coin-classic");
    }
}
