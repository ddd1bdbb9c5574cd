use serde::{Deserialize, Serialize};

use super::{new_id, Change, Entity, EntityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: String,
    pub project_id: String,
    /// Skriftreferens, t.ex. "MRK"
    pub scr_id: String,
    pub name: String,
    pub filename: String,
    /// Kapitel-id i ordning (lagras serialiserat)
    pub chapters: Vec<String>,
}

impl Book {
    pub fn new(project_id: &str, scr_id: &str, name: &str, filename: &str) -> Self {
        Self {
            book_id: new_id(),
            project_id: project_id.to_string(),
            scr_id: scr_id.to_string(),
            name: name.to_string(),
            filename: filename.to_string(),
            chapters: Vec::new(),
        }
    }

    pub fn add_chapter(&mut self, chapter_id: &str) -> Change<Book> {
        if !self.chapters.iter().any(|c| c == chapter_id) {
            self.chapters.push(chapter_id.to_string());
        }
        Change::new(self.clone())
    }

    pub fn rename(&mut self, name: &str) -> Change<Book> {
        self.name = name.to_string();
        Change::new(self.clone())
    }
}

impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;
    const KEY_COLUMN: &'static str = "bookid";
    const PROJECT_COLUMN: Option<&'static str> = Some("projectid");
    const PARENT_COLUMN: Option<&'static str> = Some("projectid");

    fn key(&self) -> &str {
        &self.book_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}
