use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check.
///
/// Readiness (`GET /readyz`) lives in each service because it checks the
/// service's own backing resources.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
