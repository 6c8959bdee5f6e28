use std::collections::BTreeMap;

use crate::errors::api_error::ApiError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    RequestPartsExt,
};

/// Query parameters forwarded verbatim to the upstream series endpoint.
///
/// Kept sorted so they can take part in the cache key.
#[derive(Debug, Default)]
pub struct ForwardedQuery(pub BTreeMap<String, String>);

impl<S> FromRequestParts<S> for ForwardedQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = parts
            .extract::<Query<BTreeMap<String, String>>>()
            .await
            .map_err(|err| ApiError::InvalidQuery(err.body_text()))?;
        Ok(ForwardedQuery(params))
    }
}
