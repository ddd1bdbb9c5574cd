use serde::{Deserialize, Serialize};

use super::{new_id, Change, Entity, EntityKind};

/// Lokal användare, en per enhet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub name: String,
    /// Bokmärkes-id i ordning
    pub bookmarks: Vec<String>,
    pub copy_source: bool,
    pub wrap_usfm: bool,
    pub stop_at_boundaries: bool,
    pub allow_edit_blank_sp: bool,
    pub show_translation_checks: bool,
    pub ui_lang: String,
}

impl Default for User {
    fn default() -> Self {
        Self {
            user_id: new_id(),
            username: String::new(),
            name: String::new(),
            bookmarks: Vec::new(),
            copy_source: true,
            wrap_usfm: true,
            stop_at_boundaries: true,
            allow_edit_blank_sp: false,
            show_translation_checks: true,
            ui_lang: String::new(),
        }
    }
}

impl User {
    pub fn has_bookmark(&self, bookmark_id: &str) -> bool {
        self.bookmarks.iter().any(|b| b == bookmark_id)
    }

    pub fn add_bookmark(&mut self, bookmark_id: &str) -> Change<User> {
        if !self.has_bookmark(bookmark_id) {
            self.bookmarks.push(bookmark_id.to_string());
        }
        Change::new(self.clone())
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const KEY_COLUMN: &'static str = "userid";

    fn key(&self) -> &str {
        &self.user_id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
