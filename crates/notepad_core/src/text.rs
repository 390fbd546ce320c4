//! Text normalization for titles, bodies and pasted content.
//!
//! # Responsibility
//! - Canonicalize curly single quotes to the plain apostrophe.
//! - Apply the stored-title and tab-label length limits.
//!
//! # Invariants
//! - `normalize_text` is idempotent.
//! - Limits count `char`s, never bytes, so multi-byte text is not split.

/// Maximum stored title length in characters.
pub const TITLE_MAX_CHARS: usize = 40;

/// Maximum visible tab label length before the ellipsis marker.
pub const DISPLAY_TITLE_MAX_CHARS: usize = 20;

const ELLIPSIS: &str = "...";
const UNTITLED_LABEL: &str = "Untitled";

/// Maps U+2018 and U+2019 to `'`.
pub fn normalize_text(value: &str) -> String {
    value.replace(['\u{2018}', '\u{2019}'], "'")
}

/// Normalizes and hard-truncates a title to [`TITLE_MAX_CHARS`].
pub fn clamp_title(value: &str) -> String {
    normalize_text(value).chars().take(TITLE_MAX_CHARS).collect()
}

/// Builds the tab label shown for a stored title.
pub fn display_title(title: &str) -> String {
    if title.is_empty() {
        return UNTITLED_LABEL.to_string();
    }
    let mut label: String = title.chars().take(DISPLAY_TITLE_MAX_CHARS).collect();
    if title.chars().count() > DISPLAY_TITLE_MAX_CHARS {
        label.push_str(ELLIPSIS);
    }
    label
}
