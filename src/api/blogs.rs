//! Blog posts API.
//!
//! Reads are public. Create requires a bearer token; update and delete also
//! require that the caller authored the post. Checks run in the order
//! authentication, existence, ownership.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{ApiError, ResultExt, parse_body, required_text};
use crate::auth::{Action, Auth, AuthenticatedUser, Decision, authorize};
use crate::db::{Database, Post};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::models::Blog;

/// State for blog endpoints.
#[derive(Clone)]
pub struct BlogsState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(BlogsState);

pub fn router(state: BlogsState) -> Router {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route(
            "/{id}",
            get(get_blog).put(update_blog).delete(delete_blog),
        )
        .with_state(state)
}

// --- Request types ---

#[derive(Deserialize)]
struct CreateBlogRequest {
    title: Option<String>,
    content: Option<String>,
}

#[derive(Deserialize)]
struct UpdateBlogRequest {
    title: Option<String>,
    content: Option<String>,
}

// --- Helpers ---

/// Load a post and run the ownership check for `action`.
/// A missing post is 404 before ownership is considered.
async fn find_authorized(
    db: &Database,
    id: &str,
    requestor: Option<&AuthenticatedUser>,
    action: Action,
) -> Result<Post, ApiError> {
    let post = db
        .posts()
        .get_by_uuid(id)
        .await
        .db_err("Failed to get post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let requestor_id = requestor.map(|u| u.user_id.as_str());
    match authorize(&post.author_uuid, requestor_id, action) {
        Decision::Allow => Ok(post),
        Decision::Deny => {
            warn!(
                post = %post.uuid,
                user = requestor_id.unwrap_or("anonymous"),
                ?action,
                "Ownership check denied"
            );
            Err(ApiError::forbidden("Forbidden"))
        }
    }
}

/// Reject a field that is present but blank. Absent fields stay `None`.
fn optional_text(value: Option<String>, field: &str) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) => required_text(Some(v))
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("{} cannot be empty", field))),
    }
}

// --- Handlers ---

async fn list_blogs(State(state): State<BlogsState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .db
        .posts()
        .list_all()
        .await
        .db_err("Failed to list posts")?;

    let response: Vec<Blog> = posts.into_iter().map(Blog::from).collect();
    Ok(Json(response))
}

async fn get_blog(
    State(state): State<BlogsState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post = find_authorized(&state.db, &id, None, Action::Read).await?;
    Ok(Json(Blog::from(post)))
}

async fn create_blog(
    State(state): State<BlogsState>,
    Auth(user): Auth,
    payload: Result<Json<CreateBlogRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = parse_body(payload)?;

    let (Some(title), Some(content)) = (
        required_text(payload.title),
        required_text(payload.content),
    ) else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    let author = state
        .db
        .users()
        .get_by_uuid(&user.user_id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let uuid = state
        .db
        .posts()
        .create(author.id, &title, &content)
        .await
        .db_err("Failed to create post")?;

    let post = state
        .db
        .posts()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to get created post")?
        .ok_or_else(|| ApiError::internal("Created post not found"))?;

    info!(post = %uuid, user = %user.user_id, "Post created");

    Ok((StatusCode::CREATED, Json(Blog::from(post))))
}

async fn update_blog(
    State(state): State<BlogsState>,
    Auth(user): Auth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBlogRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    find_authorized(&state.db, &id, Some(&user), Action::Update).await?;

    let payload = parse_body(payload)?;
    let title = optional_text(payload.title, "Title")?;
    let content = optional_text(payload.content, "Content")?;

    let updated = state
        .db
        .posts()
        .update(&id, title.as_deref(), content.as_deref())
        .await
        .db_err("Failed to update post")?;

    if !updated {
        return Err(ApiError::not_found("Post not found"));
    }

    let post = state
        .db
        .posts()
        .get_by_uuid(&id)
        .await
        .db_err("Failed to get updated post")?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    info!(post = %id, user = %user.user_id, "Post updated");

    Ok(Json(Blog::from(post)))
}

async fn delete_blog(
    State(state): State<BlogsState>,
    Auth(user): Auth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    find_authorized(&state.db, &id, Some(&user), Action::Delete).await?;

    let deleted = state
        .db
        .posts()
        .delete(&id)
        .await
        .db_err("Failed to delete post")?;

    if !deleted {
        return Err(ApiError::not_found("Post not found"));
    }

    info!(post = %id, user = %user.user_id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}
