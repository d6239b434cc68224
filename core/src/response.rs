//! Status classification and JSON decoding of responses.
//!
//! # Design
//! The status table is narrow: 200 is success, 400 and 404
//! carry a decodable error envelope, 401 is a fixed sentinel, and every
//! other status (402 declines and 429 throttling included) is reported as
//! `UnexpectedStatus` without looking at the body.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, ErrorEnvelope, Result};
use crate::http::{HttpMethod, HttpResponse};

/// Maps a response to success or to the error it represents.
pub fn classify(method: HttpMethod, url: &str, response: &HttpResponse) -> Result<()> {
    match response.status {
        200 => Ok(()),
        400 | 404 => Err(decode_error(response.status, &response.body)),
        401 => Err(Error::Unauthorized),
        status => Err(Error::UnexpectedStatus {
            status,
            method,
            url: url.to_string(),
        }),
    }
}

/// Decodes `body` into `target`. With no target the body is ignored,
/// whatever it contains.
pub fn decode_into<R: DeserializeOwned>(body: &str, target: Option<&mut R>) -> Result<()> {
    let Some(target) = target else {
        return Ok(());
    };
    *target = serde_json::from_str(body)?;
    Ok(())
}

fn decode_error(status: u16, body: &str) -> Error {
    let mut envelope = ErrorEnvelope::default();
    if let Err(err) = decode_into(body, Some(&mut envelope)) {
        return err;
    }
    let err = envelope.error;
    warn!(
        status,
        kind = %err.kind,
        code = %err.code,
        param = err.param.as_deref().unwrap_or(""),
        message = %err.message,
        "request rejected"
    );
    Error::Domain(err)
}
