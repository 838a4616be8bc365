//! Draft domain model.
//!
//! # Responsibility
//! - Define the article draft edited by the authoring surface.
//! - Provide closed enums for category, template and publication status.
//!
//! # Invariants
//! - `id` is stable for the draft lifetime and never reused.
//! - Custom metadata is a closed variant type, never an open object.
//! - Equality is structural over every field; autosave relies on it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one article across saves.
pub type ArticleId = Uuid;

/// Editorial category of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    General,
    FamilyLaw,
    CriminalLaw,
    CommercialLaw,
    LaborLaw,
    RealEstateLaw,
    InheritanceLaw,
    AdministrativeLaw,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 8] = [
        Category::General,
        Category::FamilyLaw,
        Category::CriminalLaw,
        Category::CommercialLaw,
        Category::LaborLaw,
        Category::RealEstateLaw,
        Category::InheritanceLaw,
        Category::AdministrativeLaw,
    ];

    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::FamilyLaw => "family-law",
            Self::CriminalLaw => "criminal-law",
            Self::CommercialLaw => "commercial-law",
            Self::LaborLaw => "labor-law",
            Self::RealEstateLaw => "real-estate-law",
            Self::InheritanceLaw => "inheritance-law",
            Self::AdministrativeLaw => "administrative-law",
        }
    }

    /// Parses a storage value.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

/// Article layout template. Selects a [`TemplateProfile`](super::template::TemplateProfile).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    #[default]
    Standard,
    LegalArticle,
    CaseStudy,
    LegalGuide,
    News,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Standard,
        Template::LegalArticle,
        Template::CaseStudy,
        Template::LegalGuide,
        Template::News,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LegalArticle => "legal-article",
            Self::CaseStudy => "case-study",
            Self::LegalGuide => "legal-guide",
            Self::News => "news",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|template| template.as_str() == value)
    }
}

/// Publication lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleStatus {
    /// Not visible to readers.
    #[default]
    Draft,
    /// Live.
    Published,
    /// Will go live at a later time.
    Scheduled,
    /// Withdrawn from listings.
    Archived,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "scheduled" => Some(Self::Scheduled),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Value of one free-form metadata field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl FieldValue {
    /// NaN and infinities have no JSON form and never compare equal.
    pub fn is_storable(&self) -> bool {
        match self {
            Self::Number(number) => number.is_finite(),
            Self::Flag(_) | Self::Text(_) => true,
        }
    }
}

/// Custom field value the draft cannot hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValueError {
    NonFiniteNumber { key: String },
}

impl Display for FieldValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteNumber { key } => {
                write!(f, "custom field `{key}` must be a finite number")
            }
        }
    }
}

impl Error for FieldValueError {}

/// The in-memory article being edited.
///
/// `content` carries serialized markup; structured editing goes through
/// [`crate::document`] and is flattened back into this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub focus_keyword: String,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub category: Category,
    pub template: Template,
    pub status: ArticleStatus,
    pub featured_image: Option<String>,
    pub custom_fields: BTreeMap<String, FieldValue>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::with_id(Uuid::new_v4())
    }
}

impl Draft {
    /// Creates an empty draft with a generated stable ID.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty draft with a caller-provided ID.
    ///
    /// Used when hydrating from storage where identity already exists.
    pub fn with_id(id: ArticleId) -> Self {
        Self {
            id,
            title: String::new(),
            slug: String::new(),
            excerpt: String::new(),
            content: String::new(),
            meta_title: String::new(),
            meta_description: String::new(),
            focus_keyword: String::new(),
            keywords: Vec::new(),
            tags: Vec::new(),
            category: Category::default(),
            template: Template::default(),
            status: ArticleStatus::default(),
            featured_image: None,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Checks the fields a publish action requires.
    pub fn validate_for_publish(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Draft is missing something a manual action requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyContent,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyContent => write!(f, "content must not be empty"),
        }
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::{ArticleStatus, Category, Draft, FieldValue, Template, ValidationError};

    #[test]
    fn only_finite_numbers_are_storable() {
        assert!(FieldValue::from(2.5).is_storable());
        assert!(FieldValue::from("text").is_storable());
        assert!(!FieldValue::from(f64::NAN).is_storable());
        assert!(!FieldValue::from(f64::NEG_INFINITY).is_storable());
    }

    #[test]
    fn enum_storage_values_parse_back() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        for template in Template::ALL {
            assert_eq!(Template::parse(template.as_str()), Some(template));
        }
        assert_eq!(ArticleStatus::parse("archived"), Some(ArticleStatus::Archived));
        assert_eq!(ArticleStatus::parse("deleted"), None);
    }

    #[test]
    fn publish_validation_requires_title_then_content() {
        let mut draft = Draft::new();
        assert_eq!(
            draft.validate_for_publish(),
            Err(ValidationError::EmptyTitle)
        );
        draft.title = "Title".to_string();
        assert_eq!(
            draft.validate_for_publish(),
            Err(ValidationError::EmptyContent)
        );
        draft.content = "<p>Body</p>".to_string();
        assert!(draft.validate_for_publish().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_fields_and_kebab_enums() {
        let mut draft = Draft::new();
        draft.template = Template::LegalGuide;
        draft.meta_description = "desc".to_string();
        draft
            .custom_fields
            .insert("reviewed".to_string(), FieldValue::from(true));

        let json = serde_json::to_value(&draft).expect("draft should serialize");
        assert_eq!(json["template"], "legal-guide");
        assert_eq!(json["metaDescription"], "desc");
        assert_eq!(json["customFields"]["reviewed"], true);

        let back: Draft = serde_json::from_value(json).expect("draft should deserialize");
        assert_eq!(back, draft);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let draft: Draft =
            serde_json::from_str(r#"{"title":"Only title"}"#).expect("partial draft parses");
        assert_eq!(draft.title, "Only title");
        assert_eq!(draft.status, ArticleStatus::Draft);
        assert!(draft.tags.is_empty());
    }
}
