//! Landing page

use axum::{extract::State, response::Html};
use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Serve `index.html` from the assets directory
#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses(
        (status = 200, description = "Landing page", body = String, content_type = "text/html"),
        (status = 404, description = "Page not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let path = Path::new(&state.config.assets.dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(Html(body)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("Landing page not found".to_string()))
        }
        Err(e) => Err(AppError::Internal(format!("{}: {}", path.display(), e))),
    }
}
