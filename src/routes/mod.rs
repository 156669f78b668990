pub mod item_routes;
pub mod system_routes;
pub mod ui_routes;

use axum::{
    http::Uri,
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::errors::ApiError;
use crate::state::items::Item;
use crate::views;

/// How a handler renders its outcome. Chosen by the router, never by the
/// request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Html,
}

impl ResponseMode {
    /// JSON for anything under the API collection path, HTML elsewhere.
    pub fn for_path(path: &str, api_prefix: &str) -> Self {
        let under_api = path
            .strip_prefix(api_prefix)
            .map(|rest| rest.is_empty() || rest.starts_with('/'))
            .unwrap_or(false);

        if under_api {
            ResponseMode::Json
        } else {
            ResponseMode::Html
        }
    }

    pub fn error(self, err: ApiError) -> Response {
        match self {
            ResponseMode::Json => err.into_response(),
            ResponseMode::Html => {
                err.log();
                let status = err.status();
                (status, Html(views::error_page(status, &err.public_message()))).into_response()
            }
        }
    }

    /// Render a freshly created item: the item itself for JSON, an entering
    /// list element for HTML.
    pub fn created(self, result: Result<Item, ApiError>) -> Response {
        match result {
            Err(err) => self.error(err),
            Ok(item) => match self {
                ResponseMode::Json => Json(item).into_response(),
                ResponseMode::Html => Html(views::item_fragment(&item, true)).into_response(),
            },
        }
    }
}

/// Fallback for paths and methods no route matched.
pub async fn not_found(mode: ResponseMode, uri: Uri) -> Response {
    mode.error(ApiError::RouteNotFound(uri.path().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_follows_the_api_prefix() {
        assert_eq!(ResponseMode::for_path("/api/items", "/api/items"), ResponseMode::Json);
        assert_eq!(ResponseMode::for_path("/api/items/abc", "/api/items"), ResponseMode::Json);
        assert_eq!(ResponseMode::for_path("/api/itemsx", "/api/items"), ResponseMode::Html);
        assert_eq!(ResponseMode::for_path("/testinvalid", "/api/items"), ResponseMode::Html);
    }
}
