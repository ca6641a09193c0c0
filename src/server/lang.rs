//! Request language extraction

use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

use crate::core::localized::is_language_tag;

/// Language of the request, from the first `Accept-Language` tag.
///
/// `en-US,en;q=0.9` yields `en`. Anything that is not a plain language tag
/// yields `None`, and localized values then fall back to the default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLang(pub Option<String>);

/// Primary language subtag of the first `Accept-Language` entry
pub fn request_lang(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(ACCEPT_LANGUAGE)?.to_str().ok()?;
    let first = header.split(',').next()?;
    let tag = first.split(';').next()?.trim();
    let primary = tag.split(['-', '_']).next()?.to_lowercase();
    is_language_tag(&primary).then_some(primary)
}

impl<S: Send + Sync> FromRequestParts<S> for RequestLang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestLang(request_lang(&parts.headers)))
    }
}
