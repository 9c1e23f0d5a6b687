//! JSON envelope shared by every handler: `{success, data?, error?}`.

use crate::error::ServiceError;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

pub fn json_response(status: StatusCode, body: &Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

pub fn success<T: Serialize>(status: StatusCode, data: &T) -> Result<Response<Body>, Error> {
    let data = serde_json::to_value(data)?;
    json_response(status, &json!({ "success": true, "data": data }))
}

pub fn failure(status: StatusCode, message: impl std::fmt::Display) -> Result<Response<Body>, Error> {
    json_response(status, &json!({ "success": false, "error": message.to_string() }))
}

/// Default status for a facade error: bad input is the caller's fault,
/// everything the store reports is ours.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Validation(_) | ServiceError::Upload(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_failure(err: ServiceError) -> Result<Response<Body>, Error> {
    let status = error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {:?}", err);
    }
    failure(status, err)
}

/// Parses a JSON request body; the error is the 400 response to send back.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, Result<Response<Body>, Error>> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("Rejected malformed JSON body: {}", e);
        failure(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
    })
}

#[cfg(test)]
pub(crate) fn body_json(resp: &Response<Body>) -> Value {
    serde_json::from_slice(resp.body().as_ref()).unwrap_or(Value::Null)
}
