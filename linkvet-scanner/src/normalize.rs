/// Scheme prepended to addresses that arrive without one.
pub const DEFAULT_SCHEME: &str = "https://";

/// Turn a raw address into the URL that gets probed.
///
/// Addresses that already start with `http://` or `https://` pass through
/// untouched (the match is case-sensitive); anything else gets `https://`.
pub fn normalize(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("{}{}", DEFAULT_SCHEME, address)
    }
}
