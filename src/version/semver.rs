use std::cmp::Ordering;

use semver::Version;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
/// A leading 'v' is stripped.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "v1.2.3" -> Version(1, 2, 3)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim().trim_start_matches('v');
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Order two version strings by semver precedence
///
/// Returns None if either side does not parse.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    Some(parse_version(a)?.cmp(&parse_version(b)?))
}

/// Whether `candidate` may replace `current` without going backwards
///
/// Both parseable: only a strictly newer candidate wins.
/// Otherwise: any different value wins, since no order can be inferred.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    match compare(candidate, current) {
        Some(ordering) => ordering == Ordering::Greater,
        None => candidate != current,
    }
}
