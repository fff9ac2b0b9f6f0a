//! Sanity checks for the pinned dependency table

use semver::VersionReq;
use std::collections::BTreeMap;

/// Protocol prefixes npm-style manifests accept that are not semver ranges
const NON_SEMVER_PROTOCOLS: &[&str] = &["workspace:", "npm:", "file:", "link:", "git+", "github:"];

/// Return one warning per pinned version that is neither a semver range nor a
/// known protocol reference. The pins are still applied as written.
pub fn validate_pins(pins: &BTreeMap<String, String>) -> Vec<String> {
    pins.iter()
        .filter(|(_, version)| !is_acceptable(version))
        .map(|(name, version)| {
            format!(
                "Pinned version for '{}' is not a valid semver range: '{}'",
                name, version
            )
        })
        .collect()
}

fn is_acceptable(version: &str) -> bool {
    let version = version.trim();
    if NON_SEMVER_PROTOCOLS.iter().any(|p| version.starts_with(p)) {
        return true;
    }
    // npm joins alternatives with `||`; semver only understands each side.
    version
        .split("||")
        .all(|part| VersionReq::parse(&npm_to_semver(part.trim())).is_ok())
}

// npm separates comparators with spaces, the semver crate with commas.
fn npm_to_semver(range: &str) -> String {
    range.split_whitespace().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_exact_and_caret_versions_are_valid() {
        let table = pins(&[("react", "18.3.1"), ("vite", "^5.2.0"), ("zod", "~3.23")]);
        assert!(validate_pins(&table).is_empty());
    }

    #[test]
    fn test_npm_ranges_are_valid() {
        let table = pins(&[
            ("a", ">=1.2.0 <2.0.0"),
            ("b", "^1.0.0 || ^2.0.0"),
            ("c", "workspace:*"),
        ]);
        assert!(validate_pins(&table).is_empty());
    }

    #[test]
    fn test_tags_produce_warnings() {
        let table = pins(&[("react", "latest"), ("vite", "^5.2.0")]);
        let warnings = validate_pins(&table);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("react"));
        assert!(warnings[0].contains("latest"));
    }
}
