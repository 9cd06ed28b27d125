use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, middleware::Next, response::Response};
use chrono::Utc;

use coursedesk_auth::JwtValidator;
use coursedesk_core::AppError;

use crate::classify::RawError;
use crate::context::{PrincipalContext, RequestContext};
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub pipeline: Pipeline,
}

/// Bearer-token authentication for all protected routes.
///
/// Rejections go through the same classify/envelope path as handler
/// failures, so an unauthenticated caller sees the uniform body.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let ctx = RequestContext::new(req.method().as_str(), req.uri().path(), None);

    let token = match extract_bearer(req.headers()) {
        Ok(t) => t,
        Err(raw) => return state.pipeline.fail(&ctx, raw),
    };

    match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => {
            req.extensions_mut()
                .insert(PrincipalContext::new(claims.sub, claims.roles));
            next.run(req).await
        }
        Err(e) => state.pipeline.fail(&ctx, RawError::Token(e)),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, RawError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing_credentials)?;

    let header = header.to_str().map_err(|_| missing_credentials())?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or_else(missing_credentials)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing_credentials());
    }

    Ok(token)
}

fn missing_credentials() -> RawError {
    RawError::App(AppError::authentication("Missing bearer token"))
}
