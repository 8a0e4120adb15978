//! `/api/external` and `/api/request` endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::dispatch::envelope::{parse_data, ResponseEnvelope};
use crate::history::RequestLog;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::headers::{external_headers, with_json_content_type};
use crate::proxy::types::{ProxyRequest, ProxyResponse};
use crate::request::RequestDescriptor;

pub fn setup_proxy_router() -> Router<AppState> {
    Router::new()
        .route("/api/external", post(external))
        .route("/api/request", post(request))
}

/// Proxy a call to an arbitrary external URL.
pub async fn external(
    State(state): State<AppState>,
    inbound: HeaderMap,
    payload: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<Json<ProxyResponse>, ProxyError> {
    let request_id = request_id(&inbound);
    let start = Instant::now();

    let mut descriptor = parse_payload(payload)?.into_descriptor()?;
    descriptor.headers = external_headers(&descriptor, &state.user_agent);

    tracing::info!(
        request_id = %request_id,
        method = %descriptor.method,
        url = %descriptor.url,
        "Proxying request"
    );
    tracing::debug!(request_id = %request_id, headers = ?descriptor.headers, "Outbound headers");

    match state.transport.send(&descriptor).await {
        Ok(raw) => {
            let elapsed = start.elapsed();
            tracing::info!(
                request_id = %request_id,
                status = raw.status,
                elapsed_ms = elapsed.as_millis() as u64,
                "Response received"
            );
            metrics::record_proxy_request(descriptor.method.as_str(), raw.status, start);

            let data = parse_data(&raw.body_text);
            if data.is_string() {
                tracing::debug!(request_id = %request_id, "Response is not valid JSON, returning as text");
            }
            Ok(Json(ProxyResponse {
                status: raw.status,
                status_text: raw.status_text.clone(),
                success: raw.is_success(),
                size_bytes: raw.size_bytes(),
                headers: raw.headers,
                data,
                response_time_ms: millis(elapsed),
                url: descriptor.url,
            }))
        }
        Err(e) => {
            let error = ProxyError::upstream(&e, &descriptor.url, state.transport.timeout(), start.elapsed());
            tracing::error!(
                request_id = %request_id,
                url = %descriptor.url,
                error_type = %e.error_type(),
                error = %e,
                "External API proxy error"
            );
            metrics::record_transport_error(e.error_type());
            Err(error)
        }
    }
}

/// Perform a call and append it to the server-side request log.
pub async fn request(
    State(state): State<AppState>,
    inbound: HeaderMap,
    payload: Result<Json<ProxyRequest>, JsonRejection>,
) -> Response {
    let request_id = request_id(&inbound);
    let start = Instant::now();

    let mut descriptor = match parse_payload(payload).and_then(ProxyRequest::into_descriptor) {
        Ok(descriptor) => descriptor,
        Err(e) => return e.into_response(),
    };
    let caller_headers = descriptor.headers.clone();
    descriptor.headers = with_json_content_type(descriptor.headers.clone(), &descriptor);

    tracing::info!(
        request_id = %request_id,
        method = %descriptor.method,
        url = %descriptor.url,
        "Sending logged request"
    );

    match state.transport.send(&descriptor).await {
        Ok(raw) => {
            let elapsed = start.elapsed();
            metrics::record_proxy_request(descriptor.method.as_str(), raw.status, start);
            let envelope = ResponseEnvelope {
                status: raw.status,
                status_text: raw.status_text.clone(),
                size_bytes: Some(raw.size_bytes()),
                data: parse_data(&raw.body_text),
                headers: raw.headers,
                response_time_ms: millis(elapsed),
            };

            let mut log = base_log(&descriptor, caller_headers);
            log.response_status = envelope.status;
            log.response_headers = envelope.headers.clone();
            log.response_body = envelope.data.clone();
            log.response_time_ms = envelope.response_time_ms;
            persist(&state, log, &request_id);

            Json(envelope).into_response()
        }
        Err(e) => {
            let elapsed = start.elapsed();
            tracing::error!(
                request_id = %request_id,
                url = %descriptor.url,
                error_type = %e.error_type(),
                error = %e,
                "Logged request failed"
            );
            metrics::record_transport_error(e.error_type());

            let mut log = base_log(&descriptor, caller_headers);
            log.response_body = Value::String(e.to_string());
            log.response_time_ms = millis(elapsed);
            log.error = true;
            persist(&state, log, &request_id);

            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": true,
                    "message": e.to_string(),
                    "responseTime": millis(elapsed),
                })),
            )
                .into_response()
        }
    }
}

fn parse_payload(payload: Result<Json<ProxyRequest>, JsonRejection>) -> Result<ProxyRequest, ProxyError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ProxyError::InvalidBody(rejection.body_text()))
}

fn base_log(descriptor: &RequestDescriptor, caller_headers: crate::request::Headers) -> RequestLog {
    let mut log = RequestLog::new(descriptor.url.clone(), descriptor.method);
    log.request_headers = caller_headers;
    log.request_body = descriptor.body.clone();
    log
}

/// Best-effort append; storage problems never reach the caller.
fn persist(state: &AppState, log: RequestLog, request_id: &str) {
    let Some(store) = &state.history else {
        tracing::debug!(request_id = %request_id, "History storage disabled, request not logged");
        return;
    };
    if let Err(e) = store.append(log) {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to save request to history");
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
