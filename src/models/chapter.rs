use serde::{Deserialize, Serialize};

use super::{new_id, Change, Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_id: String,
    pub book_id: String,
    pub project_id: String,
    pub name: String,
    /// Position för senaste anpassning i kapitlet
    pub last_adapted: i64,
    pub verse_count: i64,
}

impl Chapter {
    pub fn new(book_id: &str, project_id: &str, name: &str) -> Self {
        Self {
            chapter_id: new_id(),
            book_id: book_id.to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            last_adapted: 0,
            verse_count: 0,
        }
    }

    pub fn mark_adapted(&mut self, offset: i64) -> Change<Chapter> {
        self.last_adapted = offset;
        Change::new(self.clone())
    }
}

impl Entity for Chapter {
    const KIND: EntityKind = EntityKind::Chapter;
    const KEY_COLUMN: &'static str = "chapterid";
    const PROJECT_COLUMN: Option<&'static str> = Some("projectid");
    const PARENT_COLUMN: Option<&'static str> = Some("bookid");

    fn key(&self) -> &str {
        &self.chapter_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.book_id)
    }
}
