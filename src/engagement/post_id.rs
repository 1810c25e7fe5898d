//! External post-id extraction from share URLs.

/// Extract the numeric post id from a shared status URL.
///
/// Accepts the usual share-link shapes (`x.com`/`twitter.com`, query
/// strings, trailing path segments). `None` when the URL carries no
/// `/status/<digits>` segment.
pub fn extract_post_id(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/status/")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}
