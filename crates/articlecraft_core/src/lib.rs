//! Core domain logic for ArticleCraft.
//! Scoring, draft state, autosave and article storage live here; front ends
//! only supply edits and render results.

pub mod autosave;
pub mod config;
pub mod db;
pub mod document;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod repo;
pub mod session;
pub mod store;

pub use autosave::clock::{Clock, ManualClock, SystemClock};
pub use autosave::coordinator::{
    AutoSaveConfig, AutoSaveCoordinator, AutoSavePhase, AutoSaveState, AutoSaveStatus,
};
pub use autosave::persistence::{DraftPersistence, SaveError, SaveResponse, TransportError};
pub use config::{load_config, AutoSaveSettings, ConfigError, EditorConfig};
pub use document::{Block, CommandError, Document, EditCommand, TextTarget};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use metrics::engine::{compute_scores, ContentMetricsEngine, ScoreSet};
pub use metrics::lexicon::Locale;
pub use metrics::recommend::{Priority, Recommendation, RecommendationGenerator, RecommendationKind};
pub use metrics::text::TextMetrics;
pub use metrics::{analyze, ContentAnalysis};
pub use model::draft::{
    ArticleId, ArticleStatus, Category, Draft, FieldValue, FieldValueError, Template,
    ValidationError,
};
pub use model::template::TemplateProfile;
pub use repo::article_repo::{
    ArticleListQuery, ArticleRepository, RepoError, RepoResult, SqliteArticleStore, StoredArticle,
};
pub use session::EditorSession;
pub use store::{DraftStore, SlugOrigin};

/// Minimal health-check API for front-end integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
