//! OAuth 1.0a HMAC-SHA1 signature generation (RFC 5849).

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Signature method advertised in `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol version advertised in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string per RFC 3986, as OAuth requires.
#[must_use]
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Build the signature base string per RFC 5849 Section 3.4.1.
///
/// Format: `METHOD&encoded_url&encoded_parameters`, where parameters are
/// encoded first and then sorted by encoded key and value.
#[must_use]
pub fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> =
        params.iter().map(|(k, v)| (percent_encode(k), percent_encode(v))).collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        percent_encode(&method.to_uppercase()),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Build the HMAC signing key: `encoded_consumer_secret&encoded_token_secret`.
///
/// The token secret is absent for the request-token step.
#[must_use]
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        token_secret.map(percent_encode).unwrap_or_default()
    )
}

/// Raw HMAC-SHA1 signature, base64-encoded.
#[must_use]
pub fn hmac_sha1_base64(base_string: &str, signing_key: &str) -> String {
    let mut mac =
        HmacSha1::new_from_slice(signing_key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(base_string.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Sign a base string: HMAC-SHA1, base64, then percent-encoded.
///
/// The result is ready to drop into an `Authorization` header as-is.
#[must_use]
pub fn sign(base_string: &str, signing_key: &str) -> String {
    percent_encode(&hmac_sha1_base64(base_string, signing_key))
}

/// Consumer credentials issued by the provider.
#[derive(Clone)]
pub struct ConsumerCredentials<'a> {
    pub key: &'a str,
    pub secret: &'a str,
}

/// Create the `Authorization` header for the request-token step.
///
/// `nonce` and `timestamp` must be fresh for every call.
#[must_use]
pub fn request_token_header(
    method: &str,
    url: &str,
    consumer: &ConsumerCredentials<'_>,
    callback: &str,
    nonce: &str,
    timestamp: &str,
) -> String {
    let oauth_params = [
        ("oauth_callback", callback),
        ("oauth_consumer_key", consumer.key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp),
        ("oauth_version", OAUTH_VERSION),
    ];

    let base_string = signature_base_string(method, url, &oauth_params);
    let signature = sign(&base_string, &signing_key(consumer.secret, None));

    let mut parts: Vec<String> = oauth_params
        .into_iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
        .collect();
    parts.push(format!("oauth_signature=\"{signature}\""));
    parts.sort();

    format!("OAuth {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_encode_unreserved() {
        assert_eq!(percent_encode("abc123"), "abc123");
        assert_eq!(percent_encode("ABC"), "ABC");
        assert_eq!(percent_encode("-._~"), "-._~");
    }

    #[test]
    fn test_percent_encode_reserved() {
        assert_eq!(percent_encode(" "), "%20");
        assert_eq!(percent_encode("&"), "%26");
        assert_eq!(percent_encode("="), "%3D");
        assert_eq!(percent_encode("/"), "%2F");
        assert_eq!(percent_encode("+"), "%2B");
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    // Published Twitter developer documentation example ("Creating a signature").
    const TWITTER_BASE_STRING: &str = "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521";

    #[test]
    fn test_base_string_matches_twitter_example() {
        let params = [
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
            ("include_entities", "true"),
            ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
            ("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", "1318622958"),
            ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
            ("oauth_version", "1.0"),
        ];

        let base = signature_base_string(
            "post",
            "https://api.twitter.com/1.1/statuses/update.json",
            &params,
        );
        assert_eq!(base, TWITTER_BASE_STRING);
    }

    #[test]
    fn test_sign_matches_twitter_example() {
        let key = signing_key(
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"),
        );

        assert_eq!(hmac_sha1_base64(TWITTER_BASE_STRING, &key), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
        assert_eq!(sign(TWITTER_BASE_STRING, &key), "hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D");
    }

    #[test]
    fn test_sign_is_deterministic() {
        let key = signing_key("secret", None);
        assert_eq!(sign("POST&a&b", &key), sign("POST&a&b", &key));
        assert_ne!(sign("POST&a&b", &key), sign("POST&a&c", &key));
    }

    #[test]
    fn test_signing_key_without_token_secret() {
        assert_eq!(signing_key("cs", None), "cs&");
        assert_eq!(signing_key("a b", Some("c&d")), "a%20b&c%26d");
    }

    #[test]
    fn test_request_token_header() {
        let consumer = ConsumerCredentials { key: "ck", secret: "cs" };
        let header = request_token_header(
            "POST",
            "https://api.twitter.com/oauth/request_token",
            &consumer,
            "https://rose.example.com/tvii/getAccessTokenTW?code=482913",
            "00112233445566778899aabbccddeeff",
            "1700000000",
        );

        assert_eq!(
            header,
            "OAuth oauth_callback=\"https%3A%2F%2Frose.example.com%2Ftvii%2FgetAccessTokenTW%3Fcode%3D482913\", \
             oauth_consumer_key=\"ck\", \
             oauth_nonce=\"00112233445566778899aabbccddeeff\", \
             oauth_signature=\"S9K9Ca4Lm3%2FAdljHuO%2BpgnJqWJY%3D\", \
             oauth_signature_method=\"HMAC-SHA1\", \
             oauth_timestamp=\"1700000000\", \
             oauth_version=\"1.0\""
        );
    }
}
