use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Static bearer token checked on every protected route.
#[derive(Clone)]
pub struct BearerAuth {
    token: Arc<str>,
}

impl BearerAuth {
    pub fn new(token: &str) -> Self {
        Self {
            token: Arc::from(token),
        }
    }

    /// Scheme is matched case-insensitively, the token byte-for-byte.
    fn authorizes(&self, header: Option<&str>) -> bool {
        let Some(value) = header else {
            return false;
        };
        let Some((scheme, token)) = value.split_once(' ') else {
            return false;
        };
        scheme.eq_ignore_ascii_case("bearer") && token.trim() == self.token.as_ref()
    }
}

/// Middleware enforcing bearer auth; rejected requests never reach a
/// handler, so no entity is mutated.
pub async fn require_bearer(
    State(auth): State<BearerAuth>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if auth.authorizes(header) {
        next.run(request).await
    } else {
        unauthorized()
    }
}

/// 401 with the `WWW-Authenticate` challenge standard for bearer auth.
pub fn unauthorized() -> Response {
    let body = Json(json!({
        "error": {
            "kind": "unauthorized",
            "message": "Unauthorized",
        }
    }));
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        body,
    )
        .into_response()
}
