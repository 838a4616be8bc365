//! Improvement recommendations derived from a score set.
//!
//! # Invariants
//! - Rules run in a fixed order; output order is rule order, not sorted.
//! - Each rule emits at most one recommendation per evaluation.

use crate::metrics::engine::ScoreSet;
use crate::metrics::text::TextMetrics;
use crate::model::draft::Draft;
use crate::model::template::TemplateProfile;
use serde::Serialize;

const READABILITY_THRESHOLD: u8 = 70;
const SEO_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Readability,
    Seo,
    Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One actionable improvement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub priority: Priority,
}

/// Stateless rule evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Builds a fresh recommendation list for `draft`.
    pub fn generate(
        &self,
        scores: &ScoreSet,
        draft: &Draft,
        profile: &TemplateProfile,
    ) -> Vec<Recommendation> {
        let metrics = TextMetrics::measure(&draft.content);
        self.generate_with_metrics(scores, &metrics, profile)
    }

    /// Same as [`generate`](Self::generate) with pre-measured content.
    pub fn generate_with_metrics(
        &self,
        scores: &ScoreSet,
        metrics: &TextMetrics,
        profile: &TemplateProfile,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if scores.readability < READABILITY_THRESHOLD {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Readability,
                message: "shorten your sentences".to_string(),
                priority: Priority::High,
            });
        }

        if scores.seo_strength < SEO_THRESHOLD {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Seo,
                message: "use the focus keyword more in title and body".to_string(),
                priority: Priority::Medium,
            });
        }

        if metrics.word_count < profile.min_word_count {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Length,
                message: format!(
                    "this template recommends at least {} words",
                    profile.min_word_count
                ),
                priority: Priority::High,
            });
        }

        recommendations
    }
}
