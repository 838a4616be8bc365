//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist drafts as full-record upserts keyed by article id.
//! - Serve the draft persistence contract used by autosave and manual saves.
//!
//! # Invariants
//! - Saving the same snapshot twice leaves one row with identical content.
//! - A non-empty slug belongs to at most one article.
//! - `published_at` is set on the first publish and kept afterwards.
//! - A brand-new draft is only stored once it has a title and more than
//!   [`NEW_DRAFT_MIN_CONTENT_CHARS`] characters of content.

use crate::autosave::clock::{Clock, SystemClock};
use crate::autosave::persistence::{DraftPersistence, SaveResponse, TransportError};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::draft::{ArticleId, ArticleStatus, Category, Draft, Template};
use async_trait::async_trait;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Content length a new draft must exceed before it is first stored.
pub const NEW_DRAFT_MIN_CONTENT_CHARS: usize = 50;

const LIST_DEFAULT_LIMIT: u32 = 20;
const LIST_LIMIT_MAX: u32 = 100;

const ARTICLE_SELECT_SQL: &str = "SELECT
    id,
    title,
    slug,
    excerpt,
    content,
    meta_title,
    meta_description,
    focus_keyword,
    keywords,
    tags,
    category,
    template,
    status,
    featured_image,
    custom_fields,
    created_at,
    updated_at,
    published_at
FROM articles";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(ArticleId),
    /// Another article already owns this slug.
    SlugConflict(String),
    /// New draft does not meet the first-save threshold.
    BelowSaveThreshold,
    InvalidData(String),
    Encoding(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "article not found: {id}"),
            Self::SlugConflict(slug) => write!(f, "slug already in use: {slug}"),
            Self::BelowSaveThreshold => write!(
                f,
                "a new draft needs a title and more than {NEW_DRAFT_MIN_CONTENT_CHARS} characters of content"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored article data: {message}"),
            Self::Encoding(err) => write!(f, "article field encoding failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encoding(err) => Some(err),
            Self::NotFound(_)
            | Self::SlugConflict(_)
            | Self::BelowSaveThreshold
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

/// Stored article with its bookkeeping timestamps (epoch ms).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredArticle {
    pub draft: Draft,
    pub created_at: i64,
    pub updated_at: i64,
    pub published_at: Option<i64>,
}

/// Options for listing articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleListQuery {
    pub status: Option<ArticleStatus>,
    /// Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
}

pub trait ArticleRepository {
    /// Inserts or fully replaces the article `draft.id` with `status`.
    fn upsert_article(&self, draft: &Draft, status: ArticleStatus) -> RepoResult<StoredArticle>;
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<StoredArticle>>;
    /// Most recently updated first.
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<StoredArticle>>;
}

/// SQLite-backed article store.
///
/// Holds its own connection so it can be shared with an autosave coordinator.
pub struct SqliteArticleStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteArticleStore {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    pub fn with_clock(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        Self {
            conn: Mutex::new(conn),
            clock,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        op(&conn)
    }
}

impl ArticleRepository for SqliteArticleStore {
    fn upsert_article(&self, draft: &Draft, status: ArticleStatus) -> RepoResult<StoredArticle> {
        let now = self.clock.now_ms();
        self.with_conn(|conn| {
            let exists = select_article(conn, draft.id)?.is_some();
            if !exists && status == ArticleStatus::Draft && !meets_first_save_threshold(draft) {
                return Err(RepoError::BelowSaveThreshold);
            }

            let published_at = (status == ArticleStatus::Published).then_some(now);
            let result = conn.execute(
                "INSERT INTO articles (
                    id, title, slug, excerpt, content, meta_title, meta_description,
                    focus_keyword, keywords, tags, category, template, status,
                    featured_image, custom_fields, created_at, updated_at, published_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16, ?17)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    slug = excluded.slug,
                    excerpt = excluded.excerpt,
                    content = excluded.content,
                    meta_title = excluded.meta_title,
                    meta_description = excluded.meta_description,
                    focus_keyword = excluded.focus_keyword,
                    keywords = excluded.keywords,
                    tags = excluded.tags,
                    category = excluded.category,
                    template = excluded.template,
                    status = excluded.status,
                    featured_image = excluded.featured_image,
                    custom_fields = excluded.custom_fields,
                    updated_at = excluded.updated_at,
                    published_at = COALESCE(articles.published_at, excluded.published_at);",
                params![
                    draft.id.to_string(),
                    draft.title.as_str(),
                    draft.slug.as_str(),
                    draft.excerpt.as_str(),
                    draft.content.as_str(),
                    draft.meta_title.as_str(),
                    draft.meta_description.as_str(),
                    draft.focus_keyword.as_str(),
                    serde_json::to_string(&draft.keywords)?,
                    serde_json::to_string(&draft.tags)?,
                    draft.category.as_str(),
                    draft.template.as_str(),
                    status.as_str(),
                    draft.featured_image.as_deref(),
                    serde_json::to_string(&draft.custom_fields)?,
                    now,
                    published_at,
                ],
            );

            if let Err(err) = result {
                if is_slug_conflict(&err) {
                    return Err(RepoError::SlugConflict(draft.slug.clone()));
                }
                return Err(err.into());
            }

            select_article(conn, draft.id)?.ok_or(RepoError::NotFound(draft.id))
        })
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<StoredArticle>> {
        self.with_conn(|conn| select_article(conn, id))
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<StoredArticle>> {
        let mut sql = format!("{ARTICLE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC LIMIT ?");
        let limit = query
            .limit
            .unwrap_or(LIST_DEFAULT_LIMIT)
            .clamp(1, LIST_LIMIT_MAX);
        bind_values.push(Value::Integer(i64::from(limit)));

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut articles = Vec::new();
            while let Some(row) = rows.next()? {
                articles.push(parse_article_row(row)?);
            }
            Ok(articles)
        })
    }
}

#[async_trait]
impl DraftPersistence for SqliteArticleStore {
    async fn save(
        &self,
        draft: &Draft,
        status: ArticleStatus,
    ) -> Result<SaveResponse, TransportError> {
        let started_at = Instant::now();
        match self.upsert_article(draft, status) {
            Ok(stored) => {
                info!(
                    "event=article_save module=repo status=ok article_status={} duration_ms={}",
                    status.as_str(),
                    started_at.elapsed().as_millis()
                );
                Ok(SaveResponse::saved(Some(stored.draft)))
            }
            Err(RepoError::SlugConflict(_)) => {
                warn!("event=article_save module=repo status=rejected reason=slug_conflict");
                Ok(SaveResponse::rejected("slug already in use"))
            }
            Err(err @ RepoError::BelowSaveThreshold) => {
                info!("event=article_save module=repo status=rejected reason=below_threshold");
                Ok(SaveResponse::rejected(err.to_string()))
            }
            Err(err) => {
                warn!(
                    "event=article_save module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(TransportError::Storage(err.to_string()))
            }
        }
    }
}

fn meets_first_save_threshold(draft: &Draft) -> bool {
    !draft.title.trim().is_empty() && draft.content.chars().count() > NEW_DRAFT_MIN_CONTENT_CHARS
}

fn is_slug_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, message) => {
            failure.code == ErrorCode::ConstraintViolation
                && message
                    .as_deref()
                    .is_some_and(|text| text.contains("articles.slug"))
        }
        _ => false,
    }
}

fn select_article(conn: &Connection, id: ArticleId) -> RepoResult<Option<StoredArticle>> {
    let mut stmt = conn.prepare(&format!("{ARTICLE_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_article_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<StoredArticle> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid id `{id_text}` in articles.id")))?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid category `{category_text}`"))
    })?;
    let template_text: String = row.get("template")?;
    let template = Template::parse(&template_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid template `{template_text}`"))
    })?;
    let status_text: String = row.get("status")?;
    let status = ArticleStatus::parse(&status_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid status `{status_text}`")))?;

    let keywords: String = row.get("keywords")?;
    let tags: String = row.get("tags")?;
    let custom_fields: String = row.get("custom_fields")?;

    let draft = Draft {
        id,
        title: row.get("title")?,
        slug: row.get("slug")?,
        excerpt: row.get("excerpt")?,
        content: row.get("content")?,
        meta_title: row.get("meta_title")?,
        meta_description: row.get("meta_description")?,
        focus_keyword: row.get("focus_keyword")?,
        keywords: serde_json::from_str(&keywords)?,
        tags: serde_json::from_str(&tags)?,
        category,
        template,
        status,
        featured_image: row.get("featured_image")?,
        custom_fields: serde_json::from_str(&custom_fields)?,
    };

    Ok(StoredArticle {
        draft,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        published_at: row.get("published_at")?,
    })
}
