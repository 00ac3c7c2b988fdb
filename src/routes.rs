use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::article::Article;
use crate::layout::{find_article, FrontPage, Tab};
use crate::proxy::encode_component;
use crate::snapshot::{NewsStore, Snapshot};

pub struct AppState {
    pub store: Arc<NewsStore>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/articles", get(api_articles))
        .route("/refresh", post(refresh))
        .route("/refresh/status", get(refresh_status))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

pub struct Card {
    pub title: String,
    pub section: &'static str,
    pub source: String,
    pub minutes: u32,
    pub image: String,
    pub excerpt: String,
    pub href: String,
}

impl Card {
    fn new(article: &Article, tab: Tab) -> Self {
        Self {
            title: article.title.clone(),
            section: article.section.label(),
            source: article.source.clone(),
            minutes: article.minutes,
            image: article.image.clone(),
            excerpt: article.excerpt.clone(),
            href: article_href(tab, &article.id),
        }
    }
}

pub struct Overlay {
    pub title: String,
    pub section: &'static str,
    pub source: String,
    pub minutes: u32,
    pub image: String,
    pub excerpt: String,
    pub body: String,
    pub close_href: String,
}

impl Overlay {
    fn new(article: &Article, tab: Tab) -> Self {
        Self {
            title: article.title.clone(),
            section: article.section.label(),
            source: article.source.clone(),
            minutes: article.minutes,
            image: article.image.clone(),
            excerpt: article.excerpt.clone(),
            body: article.body.clone(),
            close_href: tab_href(tab),
        }
    }
}

fn tab_href(tab: Tab) -> String {
    format!("/?section={}", encode_component(tab.label()))
}

fn article_href(tab: Tab, id: &str) -> String {
    format!("{}&article={}", tab_href(tab), encode_component(id))
}

fn tab_links(active: Tab) -> Vec<TabLink> {
    Tab::ALL
        .into_iter()
        .map(|tab| TabLink {
            label: tab.label(),
            href: tab_href(tab),
            active: tab == active,
        })
        .collect()
}

fn current_year() -> i32 {
    Utc::now().year()
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub tabs: Vec<TabLink>,
    pub refreshing: bool,
    pub year: i32,
    pub active_label: &'static str,
    pub featured: Option<Card>,
    pub trending: Vec<Card>,
    pub latest: Vec<Card>,
    pub grid: Vec<Card>,
    pub overlay: Option<Overlay>,
    pub total: usize,
    pub updated: String,
}

#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub tabs: Vec<TabLink>,
    pub refreshing: bool,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "empty.html")]
pub struct EmptyTemplate {
    pub tabs: Vec<TabLink>,
    pub refreshing: bool,
    pub year: i32,
}

#[derive(Template)]
#[template(path = "failed.html")]
pub struct FailedTemplate {
    pub tabs: Vec<TabLink>,
    pub refreshing: bool,
    pub year: i32,
    pub message: String,
}

#[derive(Template)]
#[template(path = "refresh_button.html")]
pub struct RefreshButtonTemplate {
    pub refreshing: bool,
}

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unavailable(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
            AppError::Unavailable(why) => (StatusCode::SERVICE_UNAVAILABLE, why).into_response(),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", err),
            )
                .into_response(),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError::Internal(err.into())
    }
}

#[derive(Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let tab = query
        .section
        .as_deref()
        .and_then(Tab::from_label)
        .unwrap_or_default();
    let tabs = tab_links(tab);
    let refreshing = state.store.is_refreshing().await;
    let year = current_year();

    let (articles, loaded_at) = match state.store.current().await {
        Snapshot::Loading => {
            return Ok(render(&LoadingTemplate {
                tabs,
                refreshing,
                year,
            })?
            .into_response())
        }
        Snapshot::Failed { message } => {
            let page = render(&FailedTemplate {
                tabs,
                refreshing,
                year,
                message,
            })?;
            return Ok((StatusCode::SERVICE_UNAVAILABLE, page).into_response());
        }
        Snapshot::Loaded { articles, .. } if articles.is_empty() => {
            return Ok(render(&EmptyTemplate {
                tabs,
                refreshing,
                year,
            })?
            .into_response())
        }
        Snapshot::Loaded {
            articles,
            loaded_at,
        } => (articles, loaded_at),
    };

    let overlay = match query.article.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let article = find_article(&articles, id)
                .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;
            Some(Overlay::new(article, tab))
        }
        None => None,
    };

    let page = FrontPage::build(&articles, tab);
    let cards = |list: &[Article]| -> Vec<Card> {
        list.iter().map(|a| Card::new(a, tab)).collect()
    };

    let template = IndexTemplate {
        tabs,
        refreshing,
        year,
        active_label: tab.label(),
        featured: page.featured.map(|a| Card::new(a, tab)),
        trending: cards(page.trending),
        latest: cards(page.latest),
        grid: page.grid.iter().map(|a| Card::new(a, tab)).collect(),
        overlay,
        total: articles.len(),
        updated: loaded_at.format("%H:%M UTC").to_string(),
    };

    Ok(render(&template)?.into_response())
}

pub async fn api_articles(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    match state.store.current().await {
        Snapshot::Loading => Ok(Json(Vec::<Article>::new()).into_response()),
        Snapshot::Loaded { articles, .. } => Ok(Json(articles.as_slice()).into_response()),
        Snapshot::Failed { message } => Err(AppError::Unavailable(message)),
    }
}

pub async fn refresh(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    // Mark the reload before answering so the redirect lands on the loading view
    if state.store.begin_reload().await {
        let store = state.store.clone();
        tokio::spawn(async move {
            store.finish_reload().await;
        });
    }

    if headers.contains_key("hx-request") {
        match render(&RefreshButtonTemplate { refreshing: true }) {
            Ok(html) => html.into_response(),
            Err(err) => err.into_response(),
        }
    } else {
        Redirect::to("/").into_response()
    }
}

#[derive(Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub polling: bool,
}

pub async fn refresh_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, AppError> {
    let refreshing = state.store.is_refreshing().await;
    let html = render(&RefreshButtonTemplate { refreshing })?;

    // A poll that sees the reload finish asks htmx to reload the page.
    if query.polling && !refreshing {
        return Ok(([("HX-Refresh", "true")], html).into_response());
    }
    Ok(html.into_response())
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
