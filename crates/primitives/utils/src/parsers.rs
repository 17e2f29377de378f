//! Parsers shared between the CLI layer and the library crates.

use starknet_types_core::felt::Felt;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid field element (expected a decimal or 0x-prefixed hex value)")]
pub struct FeltParseError(pub String);

/// Parses a field element from either its decimal or `0x`-prefixed
/// hexadecimal representation.
pub fn parse_felt(s: &str) -> Result<Felt, FeltParseError> {
    let s = s.trim();
    let parsed = if s.starts_with("0x") || s.starts_with("0X") {
        Felt::from_hex(&s.to_lowercase())
    } else {
        Felt::from_dec_str(s)
    };
    parsed.map_err(|_| FeltParseError(s.to_string()))
}

/// Clap-compatible URL parser.
pub fn parse_url(s: &str) -> Result<Url, url::ParseError> {
    s.parse()
}

/// Appends a path segment to a URL, tolerating bases with or without a
/// trailing slash.
pub fn url_join_segment(url: &mut Url, segment: &str) {
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", Felt::ZERO)]
    #[case("123", Felt::from(123u64))]
    #[case("0x0", Felt::ZERO)]
    #[case("0x7b", Felt::from(123u64))]
    #[case("0X7B", Felt::from(123u64))]
    #[case(" 42 ", Felt::from(42u64))]
    fn parse_felt_accepts_decimal_and_hex(#[case] input: &str, #[case] expected: Felt) {
        assert_eq!(parse_felt(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("0xzz")]
    #[case("not a felt")]
    fn parse_felt_rejects_garbage(#[case] input: &str) {
        assert!(parse_felt(input).is_err());
    }

    #[rstest]
    #[case("http://localhost:5050", "add_transaction", "http://localhost:5050/add_transaction")]
    #[case("http://localhost:5050/gateway", "add_transaction", "http://localhost:5050/gateway/add_transaction")]
    #[case("http://localhost:5050/gateway/", "add_transaction", "http://localhost:5050/gateway/add_transaction")]
    fn url_join_handles_trailing_slashes(#[case] base: &str, #[case] segment: &str, #[case] expected: &str) {
        let mut url: Url = base.parse().unwrap();
        url_join_segment(&mut url, segment);
        assert_eq!(url.as_str(), expected);
    }
}
