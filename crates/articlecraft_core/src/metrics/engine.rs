//! Content score computation.
//!
//! # Responsibility
//! - Turn a draft snapshot into readability, engagement and SEO scores.
//! - Keep the arithmetic stable; stored score expectations depend on it.
//!
//! # Invariants
//! - Every score lies in `[0, 100]`.
//! - `overall == round((readability + engagement + seo_strength) / 3)`.
//! - Computation is pure: equal drafts always produce equal score sets.
//! - Zero denominators substitute `0` for the dependent term; nothing fails.

use crate::metrics::lexicon::{Lexicon, Locale};
use crate::metrics::text::{count_heading_tags, count_occurrences, strip_markup, TextMetrics};
use crate::model::draft::Draft;
use crate::model::template::TemplateProfile;
use serde::Serialize;

const SCORE_MAX: u32 = 100;

/// Bounded quality scores for one draft snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub readability: u8,
    pub engagement: u8,
    pub seo_strength: u8,
    pub overall: u8,
}

impl ScoreSet {
    fn new(readability: u8, engagement: u8, seo_strength: u8) -> Self {
        let sum = f64::from(readability) + f64::from(engagement) + f64::from(seo_strength);
        Self {
            readability,
            engagement,
            seo_strength,
            overall: clamp_score((sum / 3.0).round()),
        }
    }
}

/// Scoring engine bound to one locale's lexicon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentMetricsEngine {
    lexicon: Lexicon,
}

impl ContentMetricsEngine {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn for_locale(locale: Locale) -> Self {
        Self::new(Lexicon::for_locale(locale))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Computes the score set of `draft`.
    ///
    /// Score arithmetic is identical for every template profile.
    pub fn compute_scores(&self, draft: &Draft, _profile: &TemplateProfile) -> ScoreSet {
        let metrics = TextMetrics::measure(&draft.content);
        self.compute_with_metrics(draft, &metrics)
    }

    /// Computes scores reusing already measured content metrics.
    pub fn compute_with_metrics(&self, draft: &Draft, metrics: &TextMetrics) -> ScoreSet {
        let locale = self.lexicon.locale();
        let folded_text = locale.fold_case(&strip_markup(&draft.content));
        let folded_title = locale.fold_case(&draft.title);

        let readability = readability_score(metrics);
        let engagement = self.engagement_score(metrics, &folded_text, &draft.title, &folded_title);
        let seo_strength = seo_score(draft, metrics, &folded_text, &folded_title, locale);

        ScoreSet::new(readability, engagement, seo_strength)
    }

    fn engagement_score(
        &self,
        metrics: &TextMetrics,
        folded_text: &str,
        title: &str,
        folded_title: &str,
    ) -> u8 {
        let mut score = match metrics.word_count {
            n if n >= 800 => 30,
            n if n >= 400 => 20,
            n if n >= 200 => 10,
            _ => 0,
        };

        let question_marks = folded_text.matches('?').count();
        score += capped(question_marks, 5, 20);
        score += capped(self.lexicon.emotional_occurrences(folded_text), 3, 15);

        if self.lexicon.has_interrogative(folded_title) {
            score += 15;
        }
        if title.chars().any(|c| c.is_ascii_digit()) {
            score += 10;
        }

        final_score(score)
    }
}

/// Computes scores with the default (Turkish) lexicon.
pub fn compute_scores(draft: &Draft, profile: &TemplateProfile) -> ScoreSet {
    ContentMetricsEngine::default().compute_scores(draft, profile)
}

fn readability_score(metrics: &TextMetrics) -> u8 {
    if metrics.sentence_count == 0 {
        return 0;
    }

    let avg_words_per_sentence = metrics.word_count as f64 / metrics.sentence_count as f64;
    let avg_chars_per_word = if metrics.word_count == 0 {
        0.0
    } else {
        metrics.word_chars as f64 / metrics.word_count as f64
    };
    let raw = 100.0 - avg_words_per_sentence * 1.5 - avg_chars_per_word * 2.0;
    clamp_score(raw.round())
}

fn seo_score(
    draft: &Draft,
    metrics: &TextMetrics,
    folded_text: &str,
    folded_title: &str,
    locale: Locale,
) -> u8 {
    let keyword = draft.focus_keyword.trim();
    let folded_keyword = locale.fold_case(keyword);
    let mut score = 0;

    // Title length is UTF-8 bytes; the 96-point worked example needs it
    // (DESIGN.md, "Length units"). Meta description length is characters.
    if (30..=60).contains(&draft.title.len()) {
        score += 20;
    }
    if !keyword.is_empty() && folded_title.contains(folded_keyword.as_str()) {
        score += 15;
    }
    if (120..=160).contains(&draft.meta_description.chars().count()) {
        score += 15;
    }
    if !keyword.is_empty() && draft.meta_description.contains(keyword) {
        score += 10;
    }

    let density = if metrics.word_count == 0 {
        0.0
    } else {
        count_occurrences(folded_text, &folded_keyword) as f64 / metrics.word_count as f64 * 100.0
    };
    if (0.5..=2.5).contains(&density) {
        score += 20;
    } else if density > 0.0 {
        score += 10;
    }

    if metrics.word_count >= 800 {
        score += 10;
    }
    if metrics.word_count >= 1200 {
        score += 5;
    }

    score += capped(count_heading_tags(&draft.content), 2, 10);

    final_score(score)
}

fn capped(count: usize, weight: u32, cap: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(weight)
        .min(cap)
}

fn final_score(sum: u32) -> u8 {
    // Fits: SCORE_MAX <= u8::MAX.
    sum.min(SCORE_MAX) as u8
}

fn clamp_score(value: f64) -> u8 {
    value.clamp(0.0, f64::from(SCORE_MAX)) as u8
}
