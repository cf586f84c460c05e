pub mod admin;
pub mod api;
pub mod health;
pub mod index;

use askama::Template;
use axum::response::Html;

use crate::error::ApiResult;

fn render<T: Template>(template: &T) -> ApiResult<Html<String>> {
    Ok(Html(template.render()?))
}
