use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::parse_body;
use crate::dtos::{BlogDraftRequest, BlogDraftResponse};
use crate::startup::AppState;

/// `POST /generate-blog-content`
#[tracing::instrument(skip_all)]
pub async fn generate_blog_content(
    State(state): State<AppState>,
    payload: Result<Json<BlogDraftRequest>, JsonRejection>,
) -> Json<BlogDraftResponse> {
    Json(state.blog.respond(parse_body(payload)).await)
}
