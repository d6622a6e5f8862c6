pub mod model;
pub mod templates;

use crate::database::PageStore;
use crate::domain::PageId;
use crate::error::WikiError;
use crate::parser::markdown::{render_markdown, wiki_path};
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use model::{CreateForm, DeleteForm, EMPTY_PAGE_MARKDOWN, NEW_PAGE_ID, PageView, SaveForm};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PageStore>,
}

pub fn wiki_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index_handler))
        .route("/wiki/{page}", get(page_rendering_handler))
        .route("/save", post(page_update_handler))
        .route("/create", post(page_create_handler))
        .route("/delete", post(page_deletion_handler))
}

/// Handler-side view of a failure.
pub enum WikiHttpError {
    BadRequest(String),
    Store(WikiError),
}

impl From<WikiError> for WikiHttpError {
    fn from(err: WikiError) -> Self {
        WikiHttpError::Store(err)
    }
}

impl IntoResponse for WikiHttpError {
    fn into_response(self) -> Response {
        match self {
            WikiHttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            WikiHttpError::Store(err @ WikiError::DuplicateName(_)) => {
                (StatusCode::CONFLICT, err.to_string()).into_response()
            }
            WikiHttpError::Store(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, WikiHttpError> {
    let pages = state.store.list_pages().await?;
    Ok(Html(templates::render_index(&pages)))
}

async fn page_rendering_handler(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> Result<Html<String>, WikiHttpError> {
    let view = match state.store.fetch_page(&page).await? {
        Some(found) => PageView {
            title: page,
            id: found.id,
            new_page: false,
            html_content: render_markdown(&found.raw_content),
            raw_content: found.raw_content,
            timestamp: now(),
        },
        None => PageView {
            title: page,
            id: NEW_PAGE_ID,
            new_page: true,
            html_content: render_markdown(EMPTY_PAGE_MARKDOWN),
            raw_content: EMPTY_PAGE_MARKDOWN.to_string(),
            timestamp: now(),
        },
    };

    Ok(Html(templates::render_page(&view)))
}

async fn page_update_handler(
    State(state): State<AppState>,
    Form(form): Form<SaveForm>,
) -> Result<Response, WikiHttpError> {
    if form.title.trim().is_empty() {
        return Err(WikiHttpError::BadRequest("a page needs a title".to_string()));
    }

    if form.is_new_page() {
        state.store.create_page(&form.title, &form.markdown).await?;
    } else {
        let id = parse_id(&form.id)?;
        state.store.save_page(id, &form.markdown).await?;
    }

    Ok(see_other(&page_location(&form.title)))
}

async fn page_create_handler(Form(form): Form<CreateForm>) -> Response {
    let name = form.name.trim();
    let location = if name.is_empty() {
        "/".to_string()
    } else {
        page_location(name)
    };
    see_other(&location)
}

async fn page_deletion_handler(
    State(state): State<AppState>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, WikiHttpError> {
    let id = parse_id(&form.id)?;
    state.store.delete_page(id).await?;
    Ok(see_other("/"))
}

fn parse_id(raw: &str) -> Result<PageId, WikiHttpError> {
    raw.trim()
        .parse::<PageId>()
        .map_err(|_| WikiHttpError::BadRequest(format!("'{}' is not a page id", raw)))
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

// locations are always ascii after encoding, so they are valid header values
fn see_other(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn page_location(name: &str) -> String {
    wiki_path(name)
}
