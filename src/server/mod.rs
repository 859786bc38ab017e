//! Blog server: renders pages on demand and serves them from the page cache

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cache::{Lookup, PageCache};
use crate::comments::{CommentDraft, CommentForm, CommentIntake, SubmitOutcome};
use crate::content::ContentError;
use crate::generator::{GenerateError, Generator, PageOutcome};
use crate::helpers::post_path;
use crate::Blog;

/// Shared server state
pub struct AppState {
    generator: Generator,
    cache: Arc<PageCache>,
    intake: Arc<dyn CommentIntake>,
}

impl AppState {
    pub fn new(generator: Generator, cache: Arc<PageCache>, intake: Arc<dyn CommentIntake>) -> Self {
        Self {
            generator,
            cache,
            intake,
        }
    }

    async fn render(&self, page: &Page) -> Result<PageOutcome, GenerateError> {
        match page {
            Page::Index => Ok(PageOutcome::Rendered(self.generator.index().await?)),
            Page::Post(slug) => self.generator.generate(slug).await,
        }
    }

    fn not_found(&self) -> Response {
        match self.generator.not_found() {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => ServerError::from(e).into_response(),
        }
    }
}

/// A cacheable page
#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Index,
    Post(String),
}

impl Page {
    fn path(&self) -> String {
        match self {
            Page::Index => "/".to_string(),
            Page::Post(slug) => post_path(slug),
        }
    }
}

/// Page generation failures; no partial page is ever sent
#[derive(Debug)]
pub struct ServerError(GenerateError);

impl From<GenerateError> for ServerError {
    fn from(err: GenerateError) -> Self {
        ServerError(err)
    }
}

impl From<ContentError> for ServerError {
    fn from(err: ContentError) -> Self {
        ServerError(GenerateError::Content(err))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Page generation failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/post/:slug", get(post_handler).post(comment_form_handler))
        .route("/api/createComment", post(create_comment_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Generate every known page before accepting requests.
/// A failing content query aborts startup.
pub async fn prerender(state: &AppState) -> Result<usize, GenerateError> {
    let mut pages = vec![Page::Index];
    pages.extend(
        state
            .generator
            .paths()
            .await?
            .into_iter()
            .map(|target| Page::Post(target.slug.current)),
    );

    let mut count = 0;
    for page in pages {
        if let PageOutcome::Rendered(html) = state.render(&page).await? {
            state.cache.store(page.path(), html).await;
            count += 1;
        }
    }
    Ok(count)
}

/// Start the blog server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let backend = blog.backend()?;
    let generator = Generator::new(&blog.config, backend.source)?;
    let cache = Arc::new(PageCache::new(blog.config.revalidate()));
    let state = Arc::new(AppState::new(generator, cache, backend.intake));

    let count = prerender(&state).await?;
    tracing::info!(
        "Prerendered {} pages, revalidating every {}s",
        count,
        state.cache.revalidate().as_secs()
    );

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a page from the cache, generating or refreshing it as needed
async fn serve_page(state: Arc<AppState>, page: Page) -> Result<Response, ServerError> {
    let path = page.path();

    match state.cache.lookup(&path).await {
        Lookup::Fresh(html) => Ok(Html(html).into_response()),
        Lookup::Stale(html) => {
            if let Some(refresh) = state.cache.try_begin_refresh(&path) {
                tracing::debug!("Regenerating stale page {}", path);
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    match state.render(&page).await {
                        Ok(PageOutcome::Rendered(html)) => {
                            refresh.cache().store(refresh.path(), html).await;
                        }
                        Ok(PageOutcome::NotFound) => {
                            tracing::info!("{} no longer exists, dropping it", refresh.path());
                            refresh.cache().remove(refresh.path()).await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Regenerating {} failed, keeping the cached page: {}",
                                refresh.path(),
                                e
                            );
                        }
                    }
                });
            }
            Ok(Html(html).into_response())
        }
        Lookup::Missing => match state.render(&page).await? {
            PageOutcome::Rendered(html) => {
                state.cache.store(path, html.clone()).await;
                Ok(Html(html).into_response())
            }
            PageOutcome::NotFound => Ok(state.not_found()),
        },
    }
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Result<Response, ServerError> {
    serve_page(state, Page::Index).await
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, ServerError> {
    serve_page(state, Page::Post(slug)).await
}

/// HTML form submission. The page is re-rendered with this reader's form
/// state and is never cached.
async fn comment_form_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(draft): Form<CommentDraft>,
) -> Result<Response, ServerError> {
    let Some(post) = state.generator.load_post(&slug).await? else {
        return Ok(state.not_found());
    };

    let mut form = CommentForm::new(&post.id);
    let outcome = form.submit(draft, state.intake.as_ref()).await;
    let status = match outcome {
        SubmitOutcome::Ok => StatusCode::OK,
        SubmitOutcome::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::TransportError(_) => StatusCode::BAD_GATEWAY,
    };

    let html = state.generator.render_post(&post, &form)?;
    Ok((status, Html(html)).into_response())
}

/// JSON comment intake. The body is parsed as JSON whatever its content type,
/// since browser `fetch` calls without headers send `text/plain`.
async fn create_comment_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let draft: CommentDraft = match serde_json::from_slice(&body) {
        Ok(draft) => draft,
        Err(e) => {
            tracing::debug!("Rejecting malformed comment body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid comment", "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let submission = match draft.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "Invalid comment", "errors": errors })),
            )
                .into_response();
        }
    };

    match state.intake.submit(&submission).await {
        Ok(()) => {
            tracing::info!("Comment submitted for post {}", submission.post_id);
            Json(json!({ "message": "Comment submitted" })).into_response()
        }
        Err(e) => {
            tracing::warn!("Couldn't submit comment for {}: {}", submission.post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Couldn't submit comment", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn fallback_handler(State(state): State<Arc<AppState>>) -> Response {
    state.not_found()
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
