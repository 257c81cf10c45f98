//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849)

use crate::config::Credentials;
use crate::{ConfigError, ConfigResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Signs requests with a consumer key pair and an access token pair
#[derive(Clone)]
pub struct OAuthSigner {
    consumer_key: String,
    token: String,
    /// HMAC keyed with `consumer_secret&token_secret`
    mac: HmacSha1,
}

impl OAuthSigner {
    /// Builds a signer if the credentials carry all four values
    ///
    /// Returns `Ok(None)` for incomplete credentials.
    pub fn from_credentials(credentials: &Credentials) -> ConfigResult<Option<Self>> {
        let (Some(consumer_secret), Some(token), Some(token_secret)) = (
            &credentials.consumer_secret,
            &credentials.oauth_token,
            &credentials.oauth_token_secret,
        ) else {
            return Ok(None);
        };

        let key = format!(
            "{}&{}",
            percent_encode(consumer_secret),
            percent_encode(token_secret)
        );
        let mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| ConfigError::Validation(format!("Unusable OAuth signing key: {e}")))?;

        Ok(Some(Self {
            consumer_key: credentials.consumer_key.clone(),
            token: token.clone(),
            mac,
        }))
    }

    /// Produces the `Authorization` header value for a request
    ///
    /// `url` must not carry a query string; query parameters are passed in
    /// `query` so they can be folded into the signature.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        query: &[(String, String)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let mut oauth_params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];

        let mut all_params = oauth_params.clone();
        all_params.extend(query.iter().cloned());
        let base = signature_base_string(method, url, &all_params);
        let signature = self.sign(&base);

        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }

    fn sign(&self, base: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Builds the signature base string from method, base URL, and parameters
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(&base_url(url)),
        percent_encode(&normalized)
    )
}

/// Scheme, host, non-default port, and path; no query or fragment
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

/// RFC 3986 percent-encoding: everything but unreserved characters
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        let is_unreserved = matches!(
            b,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~'
        );
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
