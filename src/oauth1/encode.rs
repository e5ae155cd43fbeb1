//! RFC 5849 percent-encoding and normalization helpers.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::_prelude::*;

// RFC 5849 §3.6: everything except ALPHA, DIGIT, '-', '.', '_', '~'.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a value with uppercase hex per RFC 5849 §3.6.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Returns the base string URI for `url` (RFC 5849 §3.4.1.2).
///
/// Scheme and host are lowercase, default ports are dropped, and the query and fragment
/// never participate.
pub fn normalize_url(url: &Url) -> String {
	let scheme = url.scheme().to_ascii_lowercase();
	let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
	let mut normalized = format!("{scheme}://{host}");

	// `Url::port` already hides the scheme's default port.
	if let Some(port) = url.port() {
		normalized.push(':');
		normalized.push_str(&port.to_string());
	}

	normalized.push_str(url.path());

	normalized
}

/// Encodes, sorts, and joins request parameters (RFC 5849 §3.4.1.3.2).
pub fn normalize_parameters<'a, I>(params: I) -> String
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let mut encoded: Vec<(String, String)> =
		params.into_iter().map(|(k, v)| (percent_encode(k), percent_encode(v))).collect();

	encoded.sort();

	encoded.into_iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

/// Parses a `key=value&key=value` response body into a map.
///
/// Later duplicates win; the handshake only reads single-valued fields.
pub fn parse_form(body: &str) -> BTreeMap<String, String> {
	url::form_urlencoded::parse(body.trim().as_bytes()).into_owned().collect()
}
