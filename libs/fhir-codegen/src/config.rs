//! Resolver configuration

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Canonical prefix every base-profile URL must carry
pub const DEFAULT_PROFILE_URL_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";

/// Knobs for a resolution run.
///
/// Missing fields fall back to their defaults when deserialized, so a partial
/// TOML table is enough to override a single setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResolverConfig {
    /// Display and description texts must be shorter than this to become member names
    pub max_member_name_length: usize,
    pub profile_url_prefix: String,
    /// Known-bad terminology references and their replacements
    pub url_rewrites: IndexMap<String, String>,
    /// Inject `resourceType` into Resource and `fhir_comments` into Element
    pub legacy_shims: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let mut url_rewrites = IndexMap::new();
        url_rewrites.insert(
            "http://www.rfc-editor.org/bcp/bcp13.txt".to_string(),
            "http://hl7.org/fhir/ValueSet/mimetypes".to_string(),
        );
        Self {
            max_member_name_length: 56,
            profile_url_prefix: DEFAULT_PROFILE_URL_PREFIX.to_string(),
            url_rewrites,
            legacy_shims: true,
        }
    }
}

impl ResolverConfig {
    /// Apply the rewrite table to a terminology reference
    pub fn rewrite_url<'a>(&'a self, url: &'a str) -> &'a str {
        self.url_rewrites
            .get(url)
            .map(String::as_str)
            .unwrap_or(url)
    }
}
