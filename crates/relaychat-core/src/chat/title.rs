//! Chat title derivation.
//!
//! A chat is titled after its first user message. Long messages are cut to
//! [`TITLE_MAX_CHARS`] characters followed by [`TITLE_ELLIPSIS`].

/// Maximum number of characters kept from the first user message.
pub const TITLE_MAX_CHARS: usize = 40;

/// Marker appended to truncated titles.
pub const TITLE_ELLIPSIS: &str = "...";

/// Derive a chat title from the first user message.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside
/// a character. Messages of at most 40 characters are returned verbatim.
pub fn derive_title(first_user_message: &str) -> String {
    match first_user_message.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{TITLE_ELLIPSIS}", &first_user_message[..cut]),
        None => first_user_message.to_string(),
    }
}
