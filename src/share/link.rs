//! Share link format: `<base-url>#/share?data=<token>`

use crate::error::DecodeError;
use super::codec::{decode, ShareSnapshot};

/// Fragment route of the preview view
pub const SHARE_ROUTE: &str = "#/share";
/// Query parameter holding the token
pub const DATA_PARAM: &str = "data";

/// Full share link for a token. Any fragment already on `base_url` is
/// dropped.
pub fn share_url(base_url: &str, token: &str) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    format!("{}{}?{}={}", base, SHARE_ROUTE, DATA_PARAM, urlencoding::encode(token))
}

/// Pull the token out of a share link
pub fn extract_token(url: &str) -> Result<String, DecodeError> {
    let fragment = url.split_once('#').map_or(url, |(_, f)| f);
    let query = fragment
        .split_once('?')
        .map(|(_, q)| q)
        .ok_or(DecodeError::MissingData)?;

    let raw = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == DATA_PARAM)
        .map(|(_, value)| value)
        .ok_or(DecodeError::MissingData)?;

    let token = urlencoding::decode(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    if token.trim().is_empty() {
        return Err(DecodeError::MissingData);
    }
    Ok(token.into_owned())
}

/// Extract and decode in one step
pub fn parse_share_url(url: &str) -> Result<ShareSnapshot, DecodeError> {
    decode(&extract_token(url)?)
}
