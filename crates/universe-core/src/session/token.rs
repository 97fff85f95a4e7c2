//! Access credential claims decoding.
//!
//! The access credential is a JWT. Only its payload segment is read, to learn
//! the expiry and the canonical username. Signatures are the backend's job.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use universe_types::auth::AccessClaims;
use universe_types::error::TokenError;

/// Decode the claims of a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<AccessClaims, TokenError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    // Some issuers pad the segment anyway.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenError::Encoding)?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Build an unsigned token carrying `claims`, with an empty signature segment.
///
/// Stub backends use it to mint credentials the client can decode.
pub fn encode_unsigned(claims: &AccessClaims) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = serde_json::to_vec(claims).unwrap_or_default();
    format!("{header}.{}.", URL_SAFE_NO_PAD.encode(payload))
}
