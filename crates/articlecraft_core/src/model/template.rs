//! Template profile reference data.
//!
//! # Invariants
//! - Exactly one profile exists per [`Template`] variant.
//! - Profiles are `'static` and read-only.

use crate::model::draft::Template;
use serde::Serialize;

/// Per-template editorial constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProfile {
    pub template: Template,
    /// Minimum body length the template recommends.
    pub min_word_count: usize,
    /// Title length ceiling shown to authors.
    pub max_title_length: usize,
    /// Target focus keyword density in percent.
    pub focus_keyword_density: f64,
}

const PROFILES: [TemplateProfile; 5] = [
    TemplateProfile {
        template: Template::Standard,
        min_word_count: 300,
        max_title_length: 60,
        focus_keyword_density: 1.5,
    },
    TemplateProfile {
        template: Template::LegalArticle,
        min_word_count: 800,
        max_title_length: 60,
        focus_keyword_density: 1.5,
    },
    TemplateProfile {
        template: Template::CaseStudy,
        min_word_count: 1000,
        max_title_length: 70,
        focus_keyword_density: 1.2,
    },
    TemplateProfile {
        template: Template::LegalGuide,
        min_word_count: 1500,
        max_title_length: 70,
        focus_keyword_density: 1.0,
    },
    TemplateProfile {
        template: Template::News,
        min_word_count: 300,
        max_title_length: 80,
        focus_keyword_density: 1.0,
    },
];

impl TemplateProfile {
    /// Returns the profile for `template`.
    pub fn for_template(template: Template) -> &'static TemplateProfile {
        match template {
            Template::Standard => &PROFILES[0],
            Template::LegalArticle => &PROFILES[1],
            Template::CaseStudy => &PROFILES[2],
            Template::LegalGuide => &PROFILES[3],
            Template::News => &PROFILES[4],
        }
    }

    /// All profiles in template declaration order.
    pub fn all() -> &'static [TemplateProfile] {
        &PROFILES
    }
}

#[cfg(test)]
mod tests {
    use super::TemplateProfile;
    use crate::model::draft::Template;

    #[test]
    fn every_template_resolves_to_its_own_profile() {
        for template in Template::ALL {
            assert_eq!(TemplateProfile::for_template(template).template, template);
        }
        assert_eq!(TemplateProfile::all().len(), Template::ALL.len());
    }

    #[test]
    fn legal_guide_requires_1500_words() {
        let profile = TemplateProfile::for_template(Template::LegalGuide);
        assert_eq!(profile.min_word_count, 1500);
    }
}
