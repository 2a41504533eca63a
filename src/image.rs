//! Image reference resolution
//!
//! [`resolve_image_url`] is a pure function of the entity. Load failures
//! at render time are tracked separately by [`BrokenImages`], which the
//! presentation layer owns per rendered list and never shares with the
//! session state.

use std::collections::HashMap;

use crate::model::Entity;

/// Where an image is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayContext {
    /// Suggestion dropdown row
    ListRow,
    /// Search result card
    Card,
}

/// Glyph shown when there is no usable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// 40px round user glyph for list rows
    Compact,
    /// Full-width 200px "image off" glyph for cards
    Large,
}

impl Placeholder {
    pub fn for_context(context: DisplayContext) -> Self {
        match context {
            DisplayContext::ListRow => Placeholder::Compact,
            DisplayContext::Card => Placeholder::Large,
        }
    }

    /// Height in pixels
    pub fn height_px(&self) -> u32 {
        match self {
            Placeholder::Compact => 40,
            Placeholder::Large => 200,
        }
    }

    /// Fixed width in pixels; `None` means fill the container
    pub fn width_px(&self) -> Option<u32> {
        match self {
            Placeholder::Compact => Some(40),
            Placeholder::Large => None,
        }
    }

    pub fn is_round(&self) -> bool {
        matches!(self, Placeholder::Compact)
    }
}

/// What to draw in an entity's image slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSlot {
    Url(String),
    Placeholder(Placeholder),
}

/// Primary image, else the first alternate image, else nothing
pub fn resolve_image_url(entity: &Entity) -> Option<&str> {
    entity
        .image_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or_else(|| {
            entity
                .images
                .first()
                .map(|img| img.url.as_str())
                .filter(|u| !u.is_empty())
        })
}

/// Sticky per-render record of image URLs that failed to load.
///
/// Keyed by entity id. A flag only holds for the URL that failed: once the
/// entity resolves to a different URL the flag is dropped and the new URL
/// gets a chance. Broken URLs are never retried.
#[derive(Debug, Default, Clone)]
pub struct BrokenImages {
    failed: HashMap<String, String>,
}

impl BrokenImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `entity`'s currently resolved image failed to load
    pub fn mark_broken(&mut self, entity: &Entity) {
        if let Some(url) = resolve_image_url(entity) {
            tracing::debug!(id = %entity.id, url, "image failed to load, using placeholder");
            self.failed.insert(entity.id.clone(), url.to_string());
        }
    }

    pub fn is_broken(&self, entity: &Entity) -> bool {
        match (self.failed.get(&entity.id), resolve_image_url(entity)) {
            (Some(failed), Some(current)) => failed == current,
            _ => false,
        }
    }

    /// Resolve the slot for `entity` in `context`, honoring load failures
    pub fn slot(&mut self, entity: &Entity, context: DisplayContext) -> ImageSlot {
        match resolve_image_url(entity) {
            Some(url) if !self.stale_or_broken(entity, url) => ImageSlot::Url(url.to_string()),
            _ => ImageSlot::Placeholder(Placeholder::for_context(context)),
        }
    }

    fn stale_or_broken(&mut self, entity: &Entity, url: &str) -> bool {
        let Some(failed) = self.failed.get(&entity.id) else {
            return false;
        };
        if failed == url {
            return true;
        }
        self.failed.remove(&entity.id);
        false
    }

    /// Drop flags for entities no longer rendered
    pub fn retain_ids<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: std::collections::HashSet<&str> = visible.into_iter().collect();
        self.failed.retain(|id, _| keep.contains(id.as_str()));
    }

    pub fn len(&self) -> usize {
        self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }
}
