//! User routes: the entity surface that exercises the full pipeline.
//!
//! Reads go through the cache-aside layer (`user:<id>`, 1h TTL); mutations
//! write the durable store first and then refresh (`set`) or drop
//! (`invalidate`) the same key before responding, so the next read never
//! sees the pre-mutation value.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, OriginalUri, Path, Query},
    http::{Method, Uri},
    response::Response,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use coursedesk_core::{AppError, EntityId, FieldError, PublicView};
use coursedesk_infra::{DEFAULT_ENTITY_TTL_SECS, EntityStore, entity_key};

use crate::app::{AppState, dto};
use crate::classify::RawError;
use crate::context::{PrincipalContext, RequestContext};
use crate::envelope::Pagination;
use crate::pipeline::Reply;

/// Max accepted size for an uploaded avatar payload (base64 characters).
const MAX_AVATAR_BYTES: usize = 64 * 1024;

/// Stored user record. Carries the credential hash and must never be
/// serialized to a caller directly; handlers return [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public projection of [`User`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: EntityId,
    pub email: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl PublicView for User {
    type Public = UserView;

    fn public_view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            active: self.active,
            created_at: self.created_at,
        }
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_user).get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/avatar", post(upload_avatar))
}

pub async fn register_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Json(body): Json<dto::RegisterUserRequest>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            body.validate()?;

            let id = EntityId::new();
            let user = User {
                id,
                email: body.email.trim().to_lowercase(),
                name: body.name.trim().to_string(),
                password_hash: hash_password(&body.password),
                avatar: None,
                active: true,
                created_at: Utc::now(),
            };

            let created = state.store.create(id, user).await?;
            state
                .cache
                .set(entity_key("user", id), created.clone(), DEFAULT_ENTITY_TTL_SECS);

            Ok(Reply::created("User registered", Some(created.public_view())))
        })
        .await
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let id = parse_id(&id)?;
            let key = entity_key("user", id);

            let store = state.store.clone();
            let user = state
                .cache
                .get_or_load(&key, DEFAULT_ENTITY_TTL_SECS, || async move {
                    store.get(id).await
                })
                .await?;

            Ok(Reply::ok("User fetched", Some(user.public_view())))
        })
        .await
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<dto::ListQuery>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let total = state.store.count().await?;
            let pagination =
                Pagination::new(query.page.unwrap_or(1), query.limit.unwrap_or(20), total);

            let users = state
                .store
                .list(pagination.offset(), pagination.limit)
                .await?;
            let views: Vec<UserView> = users.iter().map(PublicView::public_view).collect();

            Ok(Reply::ok("Users listed", Some(views)).with_pagination(pagination))
        })
        .await
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let id = parse_id(&id)?;
            body.validate()?;

            let mut user = state.store.get(id).await?;
            if let Some(email) = body.email {
                user.email = email.trim().to_lowercase();
            }
            if let Some(name) = body.name {
                user.name = name.trim().to_string();
            }

            let updated = state.store.update(id, user).await?;
            state
                .cache
                .set(entity_key("user", id), updated.clone(), DEFAULT_ENTITY_TTL_SECS);

            Ok(Reply::ok("User updated", Some(updated.public_view())))
        })
        .await
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let id = parse_id(&id)?;

            state.store.delete(id).await?;
            state.cache.invalidate(&entity_key("user", id));

            Ok(Reply::ok("User deleted", None::<UserView>))
        })
        .await
}

pub async fn deactivate_user(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let id = parse_id(&id)?;

            let mut user = state.store.get(id).await?;
            // Expected branch, pre-classified: same envelope path as any
            // other validation failure.
            if !user.active {
                return Err(AppError::validation("User is already deactivated").into());
            }
            user.active = false;

            let updated = state.store.update(id, user).await?;
            state
                .cache
                .set(entity_key("user", id), updated.clone(), DEFAULT_ENTITY_TTL_SECS);

            Ok(Reply::ok("User deactivated", Some(updated.public_view())))
        })
        .await
}

pub async fn upload_avatar(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(body): Json<dto::UploadAvatarRequest>,
) -> Response {
    let ctx = request_ctx(&method, &uri, &principal);
    let pipeline = state.pipeline;

    pipeline
        .run(ctx, async move {
            let id = parse_id(&id)?;
            if body.content_base64.len() > MAX_AVATAR_BYTES {
                return Err(RawError::UploadTooLarge {
                    limit_bytes: MAX_AVATAR_BYTES,
                });
            }

            let mut user = state.store.get(id).await?;
            user.avatar = Some(body.content_base64);

            let updated = state.store.update(id, user).await?;
            state
                .cache
                .set(entity_key("user", id), updated.clone(), DEFAULT_ENTITY_TTL_SECS);

            Ok(Reply::ok("Avatar updated", Some(updated.public_view())))
        })
        .await
}

fn request_ctx(method: &Method, uri: &Uri, principal: &PrincipalContext) -> RequestContext {
    RequestContext::new(method.as_str(), uri.path(), Some(principal.principal_id()))
}

fn parse_id(raw: &str) -> Result<EntityId, RawError> {
    raw.parse().map_err(|_| {
        RawError::Invalid(vec![FieldError::new("id", "must be a valid id", "invalid_id")])
    })
}

// Not a KDF; placeholder until real credential storage lands.
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
