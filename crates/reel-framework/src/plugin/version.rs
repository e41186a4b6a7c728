//! Minimum-version checks for registered plugins.

use std::cmp::Ordering;

/// Compares two dotted version strings numerically.
///
/// Only the leading digits of each component count, so `8.1.0-beta` compares
/// as `8.1.0`; missing components are zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = components(a);
    let b = components(b);
    let len = a.len().max(b.len()).max(3);
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Returns `true` when `actual` is at least `minimum`.
///
/// An empty minimum is always satisfied.
pub fn satisfies_minimum(minimum: &str, actual: &str) -> bool {
    minimum.trim().is_empty() || compare_versions(actual, minimum).is_ge()
}

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        assert_eq!(compare_versions("8.0.0", "8.0"), Ordering::Equal);
        assert_eq!(compare_versions("8.1.0", "8.0.9"), Ordering::Greater);
        assert_eq!(compare_versions("7.12", "8"), Ordering::Less);
        assert_eq!(compare_versions("8.1.0-beta", "8.1.0"), Ordering::Equal);
    }

    #[test]
    fn test_minimum() {
        assert!(satisfies_minimum("", "0.1.0"));
        assert!(satisfies_minimum("0.1", "0.1.0"));
        assert!(!satisfies_minimum("1.0.0", "0.9.9"));
    }
}
