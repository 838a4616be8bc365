//! One editing session over one article.
//!
//! # Responsibility
//! - Wire a [`DraftStore`] to its autosave coordinator and the scoring engine.
//! - Expose the explicit save, publish and archive actions.
//!
//! # Invariants
//! - Publish is refused before any persistence call when title or content
//!   is empty; autosave state is untouched by the refusal.
//! - Explicit actions share the autosave in-flight guard.

use crate::autosave::clock::Clock;
use crate::autosave::coordinator::{AutoSaveConfig, AutoSaveCoordinator, AutoSaveStatus};
use crate::autosave::persistence::{DraftPersistence, SaveError, SaveResponse};
use crate::config::EditorConfig;
use crate::metrics::engine::ContentMetricsEngine;
use crate::metrics::lexicon::Locale;
use crate::metrics::recommend::RecommendationGenerator;
use crate::metrics::{analyze, ContentAnalysis};
use crate::model::draft::{ArticleStatus, Draft};
use crate::store::DraftStore;
use log::info;
use std::sync::Arc;

pub struct EditorSession {
    store: DraftStore,
    autosave: AutoSaveCoordinator,
    engine: ContentMetricsEngine,
    generator: RecommendationGenerator,
}

impl EditorSession {
    /// Create flow: starts from an empty draft.
    pub fn create(
        persistence: Arc<dyn DraftPersistence>,
        clock: Arc<dyn Clock>,
        config: &EditorConfig,
    ) -> Self {
        Self::with_store(
            DraftStore::empty(),
            persistence,
            clock,
            config.autosave.to_coordinator_config(),
            config.locale,
        )
    }

    /// Edit flow: starts from a stored article.
    pub fn edit(
        article: Draft,
        persistence: Arc<dyn DraftPersistence>,
        clock: Arc<dyn Clock>,
        config: &EditorConfig,
    ) -> Self {
        Self::with_store(
            DraftStore::hydrate(article),
            persistence,
            clock,
            config.autosave.to_coordinator_config(),
            config.locale,
        )
    }

    pub fn with_store(
        store: DraftStore,
        persistence: Arc<dyn DraftPersistence>,
        clock: Arc<dyn Clock>,
        autosave: AutoSaveConfig,
        locale: Locale,
    ) -> Self {
        let coordinator = AutoSaveCoordinator::spawn(store.clone(), persistence, clock, autosave);
        info!(
            "event=session_open module=session status=ok locale={:?}",
            locale
        );
        Self {
            store,
            autosave: coordinator,
            engine: ContentMetricsEngine::for_locale(locale),
            generator: RecommendationGenerator::new(),
        }
    }

    /// The draft being edited. Mutations here drive autosave.
    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn autosave_status(&self) -> AutoSaveStatus {
        self.autosave.status()
    }

    /// Scores the current draft and lists recommendations.
    pub fn analyze(&self) -> ContentAnalysis {
        analyze(&self.engine, &self.generator, &self.store.snapshot())
    }

    /// Saves as draft now.
    pub async fn save_now(&self) -> Result<SaveResponse, SaveError> {
        self.autosave.save_now(ArticleStatus::Draft).await
    }

    /// Validates, then saves as published.
    pub async fn publish(&self) -> Result<SaveResponse, SaveError> {
        self.store.snapshot().validate_for_publish()?;
        self.autosave.save_now(ArticleStatus::Published).await
    }

    pub async fn archive(&self) -> Result<SaveResponse, SaveError> {
        self.autosave.save_now(ArticleStatus::Archived).await
    }

    /// Stops autosave. Further explicit actions fail with [`SaveError::Disposed`].
    pub fn close(&self) {
        self.autosave.dispose();
        info!("event=session_close module=session status=ok");
    }
}
