//! Content quality scoring.
//!
//! # Responsibility
//! - Measure markup-bearing content (`text`).
//! - Compute bounded quality scores (`engine`).
//! - Derive prioritized improvement messages (`recommend`).
//!
//! # Invariants
//! - Nothing in this module performs I/O or fails.
//! - Results are recomputed from scratch for every draft snapshot.

pub mod engine;
pub mod lexicon;
pub mod recommend;
pub mod text;

use crate::model::draft::Draft;
use crate::model::template::TemplateProfile;
use engine::{ContentMetricsEngine, ScoreSet};
use recommend::{Recommendation, RecommendationGenerator};
use serde::Serialize;
use text::TextMetrics;

/// One full evaluation of a draft snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub metrics: TextMetrics,
    pub scores: ScoreSet,
    pub recommendations: Vec<Recommendation>,
}

/// Measures, scores and builds recommendations in one pass.
pub fn analyze(
    engine: &ContentMetricsEngine,
    generator: &RecommendationGenerator,
    draft: &Draft,
) -> ContentAnalysis {
    let profile = TemplateProfile::for_template(draft.template);
    let metrics = TextMetrics::measure(&draft.content);
    let scores = engine.compute_with_metrics(draft, &metrics);
    let recommendations = generator.generate_with_metrics(&scores, &metrics, profile);

    ContentAnalysis {
        metrics,
        scores,
        recommendations,
    }
}
