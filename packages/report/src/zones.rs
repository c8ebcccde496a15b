//! Protecting-office normalization.
//!
//! Situation reports carry the protecting office as free text, usually of
//! the form `"Upper Yukon Zone Office (UYD)"` but sometimes already the
//! bare zone name and occasionally something else entirely. Normalization
//! is an ordered sequence of lookup strategies where the first match wins:
//!
//! 1. a parenthesized 3-letter dispatch code found in the text,
//! 2. the whole text equal to a canonical zone name,
//! 3. pass the text through unchanged.
//!
//! The chain is total: it always produces a usable label and never drops a
//! record. Unresolved labels group as their own one-off region downstream,
//! which is the intended behavior for genuinely unknown offices.

use ak_fire_models::ProtectingOffice;

/// Sentinel used for report rows with a blank protecting-office field.
pub const NA_OFFICE: &str = "n/a";

/// Normalizes a raw protecting-office value to `(zone name, code label)`.
///
/// Missing or blank input maps to the [`NA_OFFICE`] sentinel for both.
#[must_use]
pub fn normalize(raw: Option<&str>) -> (String, String) {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let Some(raw) = raw else {
        return (NA_OFFICE.to_owned(), NA_OFFICE.to_owned());
    };
    let name = zone_name(raw);
    let label = code_label(&name);
    (name, label)
}

/// Resolves raw protecting-office text to a canonical zone name, falling
/// back to the raw text itself.
#[must_use]
pub fn zone_name(raw: &str) -> String {
    parenthesized_code(raw)
        .and_then(ProtectingOffice::from_code)
        .or_else(|| ProtectingOffice::from_name(raw))
        .map_or_else(|| raw.to_owned(), |office| office.name().to_owned())
}

/// Maps a normalized zone name back to its 3-letter code label.
///
/// The `"n/a"` sentinel and labels that did not resolve to a canonical zone
/// pass through unchanged.
#[must_use]
pub fn code_label(name: &str) -> String {
    ProtectingOffice::from_name(name)
        .map_or_else(|| name.to_owned(), |office| office.code().to_owned())
}

/// Extracts a parenthesized 3-letter code such as `(UYD)` from the text.
fn parenthesized_code(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let code = text.get(open + 1..open + 4)?;
    text[open + 4..].starts_with(')').then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_parenthesized_code() {
        let (name, label) = normalize(Some("Upper Yukon Zone Office (UYD)"));
        assert_eq!(name, "Upper Yukon Zone");
        assert_eq!(label, "UYD");
    }

    #[test]
    fn canonical_name_passes_through_with_code() {
        let (name, label) = normalize(Some("Galena Zone"));
        assert_eq!(name, "Galena Zone");
        assert_eq!(label, "GAD");
    }

    #[test]
    fn unknown_text_passes_through_as_both() {
        let (name, label) = normalize(Some("Yukon Flats Dispatch"));
        assert_eq!(name, "Yukon Flats Dispatch");
        assert_eq!(label, "Yukon Flats Dispatch");
    }

    #[test]
    fn unknown_parenthesized_code_falls_back() {
        // (QQQ) is not in the table and the text is not a canonical name,
        // so the whole raw string survives.
        let (name, label) = normalize(Some("Somewhere Office (QQQ)"));
        assert_eq!(name, "Somewhere Office (QQQ)");
        assert_eq!(label, "Somewhere Office (QQQ)");
    }

    #[test]
    fn blank_and_missing_map_to_sentinel() {
        assert_eq!(normalize(None), (NA_OFFICE.to_owned(), NA_OFFICE.to_owned()));
        assert_eq!(
            normalize(Some("   ")),
            (NA_OFFICE.to_owned(), NA_OFFICE.to_owned())
        );
    }

    #[test]
    fn code_anywhere_in_text_resolves() {
        let (name, label) = normalize(Some("Office (MSS) - state"));
        assert_eq!(name, "Mat-Su Area");
        assert_eq!(label, "MSS");
    }

    #[test]
    fn normalization_is_deterministic() {
        for raw in ["Tok Area", "Chugach N.F.", "(TAD)", "garbage"] {
            assert_eq!(normalize(Some(raw)), normalize(Some(raw)));
        }
    }
}
