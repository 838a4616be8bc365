//! Draft holder with change notification.
//!
//! # Responsibility
//! - Own the draft being edited and apply field-level mutations.
//! - Notify subscribers only when the draft actually changed.
//! - Keep the slug in sync with the title until the user takes it over.
//!
//! # Invariants
//! - A notification is emitted iff the draft differs structurally from the
//!   previous value.
//! - Once the slug is manual it is never rewritten from the title.
//! - Server echoes never overwrite edits made after the saved snapshot.

use crate::document::{CommandError, Document, EditCommand};
use crate::model::draft::{ArticleStatus, Category, Draft, FieldValue, FieldValueError, Template};
use crate::model::slug::slugify;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Where the current slug came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugOrigin {
    /// Follows the title.
    Auto,
    /// Typed by the user or loaded from storage.
    Manual,
}

struct StoreInner {
    tx: watch::Sender<Draft>,
    slug_manual: AtomicBool,
}

/// Shared handle to the draft of one editing session.
///
/// Clones share the same draft.
#[derive(Clone)]
pub struct DraftStore {
    inner: Arc<StoreInner>,
}

impl DraftStore {
    /// Create flow: starts from `draft` with an auto-following slug.
    pub fn new(draft: Draft) -> Self {
        Self::build(draft, false)
    }

    /// Create flow with an empty draft.
    pub fn empty() -> Self {
        Self::new(Draft::new())
    }

    /// Edit flow: a stored non-empty slug is treated as manual.
    pub fn hydrate(article: Draft) -> Self {
        let manual = !article.slug.trim().is_empty();
        Self::build(article, manual)
    }

    fn build(draft: Draft, slug_manual: bool) -> Self {
        let (tx, _rx) = watch::channel(draft);
        Self {
            inner: Arc::new(StoreInner {
                tx,
                slug_manual: AtomicBool::new(slug_manual),
            }),
        }
    }

    /// Returns a copy of the current draft.
    pub fn snapshot(&self) -> Draft {
        self.inner.tx.borrow().clone()
    }

    /// Subscribes to change notifications. The current value counts as seen.
    pub fn subscribe(&self) -> watch::Receiver<Draft> {
        self.inner.tx.subscribe()
    }

    pub fn slug_origin(&self) -> SlugOrigin {
        if self.inner.slug_manual.load(Ordering::Acquire) {
            SlugOrigin::Manual
        } else {
            SlugOrigin::Auto
        }
    }

    /// Applies `mutate` and notifies subscribers when the draft changed.
    ///
    /// Returns whether a change was published.
    pub fn update(&self, mutate: impl FnOnce(&mut Draft)) -> bool {
        self.inner.tx.send_if_modified(|draft| {
            let before = draft.clone();
            mutate(draft);
            *draft != before
        })
    }

    /// Sets the title; the slug follows while its origin is automatic.
    pub fn set_title(&self, title: impl Into<String>) -> bool {
        let title = title.into();
        let follow = self.slug_origin() == SlugOrigin::Auto;
        self.update(|draft| {
            if follow {
                draft.slug = slugify(&title);
            }
            draft.title = title;
        })
    }

    /// Sets the slug by hand; the title no longer drives it.
    pub fn set_slug(&self, slug: impl Into<String>) -> bool {
        self.inner.slug_manual.store(true, Ordering::Release);
        let slug = slug.into();
        self.update(|draft| draft.slug = slug)
    }

    pub fn set_excerpt(&self, excerpt: impl Into<String>) -> bool {
        let excerpt = excerpt.into();
        self.update(|draft| draft.excerpt = excerpt)
    }

    pub fn set_content(&self, content: impl Into<String>) -> bool {
        let content = content.into();
        self.update(|draft| draft.content = content)
    }

    pub fn set_meta_title(&self, meta_title: impl Into<String>) -> bool {
        let meta_title = meta_title.into();
        self.update(|draft| draft.meta_title = meta_title)
    }

    pub fn set_meta_description(&self, meta_description: impl Into<String>) -> bool {
        let meta_description = meta_description.into();
        self.update(|draft| draft.meta_description = meta_description)
    }

    pub fn set_focus_keyword(&self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        self.update(|draft| draft.focus_keyword = keyword)
    }

    pub fn set_keywords(&self, keywords: Vec<String>) -> bool {
        self.update(|draft| draft.keywords = keywords)
    }

    pub fn set_tags(&self, tags: Vec<String>) -> bool {
        self.update(|draft| draft.tags = tags)
    }

    pub fn set_category(&self, category: Category) -> bool {
        self.update(|draft| draft.category = category)
    }

    pub fn set_template(&self, template: Template) -> bool {
        self.update(|draft| draft.template = template)
    }

    pub fn set_status(&self, status: ArticleStatus) -> bool {
        self.update(|draft| draft.status = status)
    }

    pub fn set_featured_image(&self, uri: Option<String>) -> bool {
        self.update(|draft| draft.featured_image = uri)
    }

    /// Sets a custom field. Non-finite numbers are refused and leave the
    /// draft untouched.
    pub fn set_custom_field(
        &self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<bool, FieldValueError> {
        let key = key.into();
        let value = value.into();
        if !value.is_storable() {
            return Err(FieldValueError::NonFiniteNumber { key });
        }
        Ok(self.update(|draft| {
            draft.custom_fields.insert(key, value);
        }))
    }

    pub fn remove_custom_field(&self, key: &str) -> bool {
        self.update(|draft| {
            draft.custom_fields.remove(key);
        })
    }

    /// Applies a structured formatting command to the content.
    ///
    /// Content is parsed into a [`Document`], edited, and serialized back.
    /// Content the document cannot reproduce (links, images, `h1`, ...) is
    /// refused with [`CommandError::UnsupportedMarkup`]. The draft is
    /// untouched when the command is rejected.
    pub fn apply_command(&self, command: &EditCommand) -> Result<bool, CommandError> {
        let mut document = Document::from_markup_lossless(&self.inner.tx.borrow().content)?;
        document.apply(command)?;
        let markup = document.to_markup();
        Ok(self.update(|draft| draft.content = markup))
    }

    /// Replaces the whole draft, e.g. after loading a different article.
    pub fn replace(&self, draft: Draft) -> bool {
        self.update(|current| *current = draft)
    }

    /// Applies the server's copy of a saved draft.
    ///
    /// Only replaces the draft when it still equals `saved`; edits made while
    /// the save was in flight win over the echo.
    pub fn apply_server_echo(&self, echo: Draft, saved: &Draft) -> bool {
        self.inner.tx.send_if_modified(|current| {
            if current != saved || *current == echo {
                return false;
            }
            *current = echo;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DraftStore, SlugOrigin};
    use crate::document::{CommandError, EditCommand, TextTarget};
    use crate::model::draft::{Draft, FieldValue, FieldValueError};

    #[test]
    fn slug_follows_title_until_set_manually() {
        let store = DraftStore::empty();
        store.set_title("Miras Hukuku");
        assert_eq!(store.snapshot().slug, "miras-hukuku");
        store.set_title("Miras Hukuku Rehberi");
        assert_eq!(store.snapshot().slug, "miras-hukuku-rehberi");

        store.set_slug("miras");
        assert_eq!(store.slug_origin(), SlugOrigin::Manual);
        store.set_title("Tamamen Yeni Başlık");
        assert_eq!(store.snapshot().slug, "miras");
    }

    #[test]
    fn hydrated_slug_is_never_auto_overwritten() {
        let mut article = Draft::new();
        article.title = "Eski".to_string();
        article.slug = "stored-slug".to_string();
        let store = DraftStore::hydrate(article);

        store.set_title("Yeni");
        assert_eq!(store.snapshot().slug, "stored-slug");
    }

    #[test]
    fn notifies_only_on_structural_change() {
        let store = DraftStore::empty();
        let mut rx = store.subscribe();

        assert!(store.set_content("body"));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!store.set_content("body"));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn server_echo_is_ignored_after_concurrent_edit() {
        let store = DraftStore::empty();
        store.set_content("saved body");
        let saved = store.snapshot();
        store.set_content("newer body");

        let mut echo = saved.clone();
        echo.excerpt = "server excerpt".to_string();
        assert!(!store.apply_server_echo(echo.clone(), &saved));
        assert_eq!(store.snapshot().content, "newer body");

        store.set_content("saved body");
        assert!(store.apply_server_echo(echo, &saved));
        assert_eq!(store.snapshot().excerpt, "server excerpt");
    }

    #[test]
    fn commands_rewrite_content_markup() {
        let store = DraftStore::empty();
        store.set_content("<p>hello world</p>");
        let changed = store
            .apply_command(&EditCommand::ToggleBold {
                target: TextTarget::block(0),
                range: 0..5,
            })
            .unwrap();

        assert!(changed);
        assert_eq!(
            store.snapshot().content,
            "<p><strong>hello</strong> world</p>"
        );
    }

    #[test]
    fn commands_refuse_content_with_links_images_or_h1() {
        let store = DraftStore::empty();
        let content = "<h1>Kapak</h1><p>intro text</p><p>see <a href=\"https://x.test\">the ruling</a></p><img src=\"a.png\" alt=\"kapak\">";
        store.set_content(content);
        let mut rx = store.subscribe();

        let err = store
            .apply_command(&EditCommand::ToggleBold {
                target: TextTarget::block(1),
                range: 0..5,
            })
            .unwrap_err();

        assert_eq!(err, CommandError::UnsupportedMarkup("<h1>".to_string()));
        assert_eq!(store.snapshot().content, content);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn custom_fields_refuse_non_finite_numbers() {
        let store = DraftStore::empty();
        assert_eq!(store.set_custom_field("pages", 12.0), Ok(true));

        let err = store.set_custom_field("ratio", f64::NAN).unwrap_err();
        assert_eq!(
            err,
            FieldValueError::NonFiniteNumber {
                key: "ratio".to_string()
            }
        );
        assert!(store.set_custom_field("pages", f64::INFINITY).is_err());

        let draft = store.snapshot();
        assert_eq!(draft.custom_fields.len(), 1);
        assert_eq!(draft.custom_fields["pages"], FieldValue::Number(12.0));
        assert_eq!(draft, store.snapshot());
    }

    #[test]
    fn rejected_command_leaves_content_untouched() {
        let store = DraftStore::empty();
        store.set_content("<p>abc</p>");
        let result = store.apply_command(&EditCommand::RemoveBlock { index: 3 });
        assert!(result.is_err());
        assert_eq!(store.snapshot().content, "<p>abc</p>");
    }
}
