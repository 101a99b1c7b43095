//! Slug generation
//!
//! URL-safe identifiers derived from human-readable names. Slug creation
//! is an explicit step performed by workflows before insert; uniqueness
//! is resolved with a numeric-suffix retry loop at the repository level.

/// Converts a name to a URL-safe slug.
///
/// - Converts to lowercase
/// - Replaces non-alphanumeric runs with a single hyphen
/// - Removes leading/trailing hyphens
/// - Returns "n-a" if nothing slug-worthy remains
pub fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "n-a".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the candidate slug for a retry attempt.
///
/// Attempt 0 is the base slug itself; attempt N appends `-{N+1}`,
/// so collisions resolve as `one-piece`, `one-piece-2`, `one-piece-3`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("One Piece"), "one-piece");
        assert_eq!(slugify("Dr. STONE"), "dr-stone");
        assert_eq!(slugify("  Attack   on Titan  "), "attack-on-titan");
    }

    #[test]
    fn test_slugify_decimal_numbers() {
        // Chapter slugs are built from "{manga title} {number}"
        assert_eq!(slugify("One Piece 10.5"), "one-piece-10-5");
    }

    #[test]
    fn test_slugify_strips_symbols() {
        assert_eq!(slugify("Love*Com!"), "love-com");
        assert_eq!(slugify("---"), "n-a");
        assert_eq!(slugify(""), "n-a");
    }

    #[test]
    fn test_slug_candidate_suffixes() {
        assert_eq!(slug_candidate("one-piece", 0), "one-piece");
        assert_eq!(slug_candidate("one-piece", 1), "one-piece-2");
        assert_eq!(slug_candidate("one-piece", 2), "one-piece-3");
    }
}
