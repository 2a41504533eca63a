//! Presentation-neutral view models
//!
//! Renderers (TUI, GUI, web bridge) draw these instead of re-deriving
//! labels and image fallbacks from raw entities.

use crate::image::{BrokenImages, DisplayContext, ImageSlot};
use crate::model::Entity;
use crate::session::SessionView;

/// One row of the suggestion dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRow {
    pub id: String,
    pub name: String,
    pub followers: String,
    pub image: ImageSlot,
    pub highlighted: bool,
}

impl SuggestionRow {
    /// "Taylor Swift — 100 followers"
    pub fn label(&self) -> String {
        format!("{} — {}", self.name, self.followers)
    }
}

/// A search result or selected-entity card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCard {
    pub id: String,
    pub name: String,
    pub followers: String,
    pub image: ImageSlot,
    /// Present once detail enrichment has arrived
    pub genres: Vec<String>,
}

/// Rows for the dropdown; empty while the panel is hidden
pub fn suggestion_rows(view: &SessionView, images: &mut BrokenImages) -> Vec<SuggestionRow> {
    if !view.suggestions_visible {
        return Vec::new();
    }
    view.suggestions
        .iter()
        .enumerate()
        .map(|(idx, entity)| SuggestionRow {
            id: entity.id.clone(),
            name: entity.name.clone(),
            followers: entity.followers_label(),
            image: images.slot(entity, DisplayContext::ListRow),
            highlighted: view.highlighted == Some(idx),
        })
        .collect()
}

pub fn entity_card(entity: &Entity, images: &mut BrokenImages) -> EntityCard {
    EntityCard {
        id: entity.id.clone(),
        name: entity.name.clone(),
        followers: entity.followers_label(),
        image: images.slot(entity, DisplayContext::Card),
        genres: entity.genres.clone(),
    }
}

/// Cards for the submitted result grid, in server order
pub fn result_cards(view: &SessionView, images: &mut BrokenImages) -> Vec<EntityCard> {
    view.results
        .iter()
        .map(|entity| entity_card(entity, images))
        .collect()
}

pub fn selected_card(view: &SessionView, images: &mut BrokenImages) -> Option<EntityCard> {
    view.selected
        .as_ref()
        .map(|entity| entity_card(entity, images))
}
