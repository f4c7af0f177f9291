use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use tracing::info;

use service::article::{Article, ArticleInput};
use service::errors::ServiceError;

use crate::errors::{article_not_found, JsonApiError};
use crate::routes::auth::{ServerState, DASHBOARD_PATH};

pub async fn dashboard(State(state): State<ServerState>) -> Result<Json<Vec<Article>>, JsonApiError> {
    let articles = state.articles.list().await?;
    info!(count = articles.len(), "dashboard listed");
    Ok(Json(articles))
}

pub async fn add_article(
    State(state): State<ServerState>,
    Form(input): Form<ArticleInput>,
) -> Result<Redirect, JsonApiError> {
    let filename = state.articles.save(input, None).await?;
    info!(%filename, "article created");
    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Raw article for prefilling the edit form.
pub async fn edit_form(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Response, JsonApiError> {
    match state.articles.read(&filename).await? {
        Some(article) => Ok(Json(article).into_response()),
        None => Ok(article_not_found()),
    }
}

pub async fn edit_article(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
    Form(input): Form<ArticleInput>,
) -> Result<Response, JsonApiError> {
    // a malformed unit still exists and may be repaired by overwriting it
    match state.articles.read(&filename).await {
        Ok(Some(_)) | Err(ServiceError::Malformed { .. }) => {}
        Ok(None) => return Ok(article_not_found()),
        Err(e) => return Err(e.into()),
    }
    state.articles.save(input, Some(&filename)).await?;
    info!(%filename, "article updated");
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

pub async fn delete_article(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> Result<Redirect, JsonApiError> {
    let existed = state.articles.delete(&filename).await?;
    info!(%filename, existed, "article delete requested");
    Ok(Redirect::to(DASHBOARD_PATH))
}
