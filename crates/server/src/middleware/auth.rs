use axum::{
    Json,
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Header carrying the inbound API key
const API_KEY_HEADER: &str = "X-API-Key";

/// API key authentication state
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    /// Check a presented key. When no key is configured, all requests pass.
    fn allows(&self, presented: Option<&str>) -> bool {
        match &self.api_key {
            None => true,
            Some(expected) => presented == Some(expected.as_str()),
        }
    }
}

/// API key authentication middleware
pub async fn auth_middleware(request: Request<Body>, next: Next) -> Response {
    let auth = request.extensions().get::<ApiKeyAuth>().cloned();

    if let Some(auth) = auth {
        let presented = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if !auth.allows(presented) {
            let body = json!({
                "error": "UNAUTHORIZED",
                "message": "A valid X-API-Key header is required.",
            });
            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_auth_allows_everything() {
        let auth = ApiKeyAuth::new(None);
        assert!(auth.allows(None));
        assert!(auth.allows(Some("anything")));
    }

    #[test]
    fn configured_auth_requires_exact_match() {
        let auth = ApiKeyAuth::new(Some("secret".to_string()));
        assert!(auth.allows(Some("secret")));
        assert!(!auth.allows(Some("wrong")));
        assert!(!auth.allows(None));
    }
}
