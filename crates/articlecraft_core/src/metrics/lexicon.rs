//! Localized word lists used by engagement scoring.

use crate::metrics::text::count_occurrences;
use serde::{Deserialize, Serialize};

/// Content language of the authoring surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

impl Locale {
    /// Lowercases `text` using the locale's casing rules.
    ///
    /// Turkish maps dotted/dotless capitals to their own lowercase letters.
    pub fn fold_case(self, text: &str) -> String {
        match self {
            Self::Tr => text
                .chars()
                .flat_map(|c| match c {
                    'I' => 'ı'.to_lowercase(),
                    'İ' => 'i'.to_lowercase(),
                    other => other.to_lowercase(),
                })
                .collect(),
            Self::En => text.to_lowercase(),
        }
    }
}

const TR_EMOTIONAL: &[&str] = &[
    "önemli", "dikkat", "fırsat", "tehlike", "başarı", "kazanç", "uyarı", "risk",
];
const TR_INTERROGATIVE: &[&str] = &["nasıl", "neden", "ne zaman", "niçin"];

const EN_EMOTIONAL: &[&str] = &[
    "important",
    "warning",
    "opportunity",
    "danger",
    "success",
    "gain",
];
const EN_INTERROGATIVE: &[&str] = &["how", "why", "when"];

/// Emotional and interrogative markers for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexicon {
    locale: Locale,
    emotional: &'static [&'static str],
    interrogative: &'static [&'static str],
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl Lexicon {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Tr => Self {
                locale,
                emotional: TR_EMOTIONAL,
                interrogative: TR_INTERROGATIVE,
            },
            Locale::En => Self {
                locale,
                emotional: EN_EMOTIONAL,
                interrogative: EN_INTERROGATIVE,
            },
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn emotional_words(&self) -> &'static [&'static str] {
        self.emotional
    }

    pub fn interrogative_markers(&self) -> &'static [&'static str] {
        self.interrogative
    }

    /// Total substring occurrences of every emotional word in folded text.
    pub fn emotional_occurrences(&self, folded_text: &str) -> usize {
        self.emotional
            .iter()
            .map(|word| count_occurrences(folded_text, word))
            .sum()
    }

    /// Whether folded text contains any interrogative marker.
    pub fn has_interrogative(&self, folded_text: &str) -> bool {
        self.interrogative
            .iter()
            .any(|marker| folded_text.contains(marker))
    }
}
