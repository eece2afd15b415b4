//! Classification of a resolved version literal against a requested update.

use crate::util::version;

/// What should happen at one declaration site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The literal is a range or wildcard; left alone.
    Unsupported,

    /// The literal already equals the requested version.
    AlreadyCorrect,

    /// The literal equals the known previous version; replace it.
    StaleExact,

    /// Peer mode: no previous version known, and the literal parses as a
    /// version strictly below the requested one.
    StalePeer,

    /// Nothing to do at this site.
    Untouched,
}

/// Strip pinned-range punctuation so `[1.2.3]` classifies by its inner
/// version.
pub fn trim_range_brackets(raw: &str) -> &str {
    raw.trim_start_matches(['[', '(']).trim_end_matches([']', ')'])
}

/// Rebuild a literal around its original range punctuation, so updating
/// `[1.0.0]` yields `[1.1.0]` rather than dropping the pin form.
pub fn replace_within_brackets(raw: &str, new_version: &str) -> String {
    let inner = trim_range_brackets(raw);
    let start = raw.find(inner).unwrap_or(0);
    format!("{}{}{}", &raw[..start], new_version, &raw[start + inner.len()..])
}

/// Classify one resolved literal against the requested update, in the
/// priority order Unsupported > AlreadyCorrect > StaleExact > StalePeer.
pub fn classify(raw: &str, previous: Option<&str>, new_version: &str) -> Classification {
    let literal = trim_range_brackets(raw);

    // Multi-version separators survive bracket trimming only in genuine
    // ranges and wildcards.
    if literal.contains([',', '*']) {
        return Classification::Unsupported;
    }

    if literal == new_version {
        return Classification::AlreadyCorrect;
    }

    match previous {
        Some(prev) => {
            if literal == prev {
                Classification::StaleExact
            } else {
                Classification::Untouched
            }
        }
        None => {
            let below = match (version::parse_lenient(literal), version::parse_lenient(new_version))
            {
                (Some(current), Some(requested)) => current < requested,
                _ => false,
            };
            if below {
                Classification::StalePeer
            } else {
                Classification::Untouched
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_trimming() {
        assert_eq!(trim_range_brackets("[1.2.3]"), "1.2.3");
        assert_eq!(trim_range_brackets("(1.2.3]"), "1.2.3");
        assert_eq!(trim_range_brackets("1.2.3"), "1.2.3");
    }

    #[test]
    fn test_bracket_preserving_replacement() {
        assert_eq!(replace_within_brackets("[1.0.0]", "1.1.0"), "[1.1.0]");
        assert_eq!(replace_within_brackets("1.0.0", "1.1.0"), "1.1.0");
    }

    #[test]
    fn test_ranges_are_unsupported() {
        assert_eq!(
            classify(">=1.0,<2.0", Some("1.0.0"), "2.0.0"),
            Classification::Unsupported
        );
        assert_eq!(classify("1.*", None, "2.0.0"), Classification::Unsupported);
    }

    #[test]
    fn test_already_correct_beats_stale() {
        assert_eq!(
            classify("1.1.0", Some("1.1.0"), "1.1.0"),
            Classification::AlreadyCorrect
        );
        // A pinned range form counts by its inner version.
        assert_eq!(
            classify("[1.1.0]", Some("1.0.0"), "1.1.0"),
            Classification::AlreadyCorrect
        );
    }

    #[test]
    fn test_stale_exact_requires_previous_match() {
        assert_eq!(
            classify("1.0.0", Some("1.0.0"), "1.1.0"),
            Classification::StaleExact
        );
        assert_eq!(
            classify("0.9.0", Some("1.0.0"), "1.1.0"),
            Classification::Untouched
        );
    }

    #[test]
    fn test_peer_mode_compares_by_order() {
        assert_eq!(classify("1.0.0", None, "1.1.0"), Classification::StalePeer);
        assert_eq!(classify("1.2", None, "1.3.0"), Classification::StalePeer);
        assert_eq!(classify("2.0.0", None, "1.1.0"), Classification::Untouched);
    }
}
