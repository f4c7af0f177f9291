use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use service::article::Article;

use crate::errors::{article_not_found, JsonApiError};
use crate::routes::auth::ServerState;

/// Public index: every article, newest first, raw content.
pub async fn home(State(state): State<ServerState>) -> Result<Json<Vec<Article>>, JsonApiError> {
    Ok(Json(state.articles.list().await?))
}

/// Public article page with rendered content.
pub async fn article(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Response, JsonApiError> {
    match state.articles.get(&filename).await? {
        Some(article) => Ok(Json(article).into_response()),
        None => Ok(article_not_found()),
    }
}
