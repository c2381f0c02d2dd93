//! Mission requirements and term normalization
//!
//! Skills, certifications and capabilities are free-form names taken from
//! the roster sheets ("Mapping", "thermal-imaging", "DGCA"). They are
//! compared after normalization: lowercase, `-`/`_` as spaces, whitespace
//! collapsed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Normalizes a skill/certification/capability name for comparison
pub fn normalize_term(term: &str) -> String {
    term.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a comma-separated list of terms, dropping empty entries
pub fn parse_terms(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true if `offered` contains `required` after normalization
pub fn has_term<'a>(offered: impl IntoIterator<Item = &'a String>, required: &str) -> bool {
    let required = normalize_term(required);
    offered.into_iter().any(|o| normalize_term(o) == required)
}

/// Returns the required terms that `offered` lacks, in sorted order
pub fn missing_terms(required: &BTreeSet<String>, offered: &BTreeSet<String>) -> Vec<String> {
    required
        .iter()
        .filter(|r| !has_term(offered, r))
        .cloned()
        .collect()
}

/// What a mission needs from its pilot and drone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Pilot skills
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skills: BTreeSet<String>,

    /// Pilot certifications (never matched by similarity)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub certifications: BTreeSet<String>,

    /// Drone capabilities
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub capabilities: BTreeSet<String>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    pub fn certification(mut self, cert: impl Into<String>) -> Self {
        self.certifications.insert(cert.into());
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.certifications.is_empty() && self.capabilities.is_empty()
    }
}
