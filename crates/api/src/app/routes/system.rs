use std::sync::Arc;

use axum::{
    extract::{Extension, OriginalUri},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::AppState;
use crate::context::{PrincipalContext, RequestContext};
use crate::pipeline::Reply;

/// Liveness probe; outside the pipeline on purpose (no auth, no envelope).
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

pub async fn whoami(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let ctx = RequestContext::new(
        method.as_str(),
        uri.path(),
        Some(principal.principal_id()),
    );
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            Ok(Reply::ok(
                "Authenticated",
                Some(serde_json::json!({
                    "principal_id": principal.principal_id(),
                    "roles": principal.roles(),
                })),
            ))
        })
        .await
}
