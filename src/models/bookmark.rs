use serde::{Deserialize, Serialize};

use super::{new_id, Chapter, Change, Entity, EntityKind, Project};

/// Återupptagningspunkt för ett projekt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub bookmark_id: String,
    pub project_id: String,
    pub name: String,
    pub book_id: String,
    pub chapter_id: String,
    pub sp_id: String,
}

impl Bookmark {
    /// Bygg ett bokmärke från projektets äldre positionsfält (tomma om de saknas)
    pub fn from_legacy(project: &Project) -> Self {
        Self {
            bookmark_id: new_id(),
            project_id: project.project_id.clone(),
            name: project.last_adapted_name.clone(),
            book_id: project.last_adapted_book_id.clone(),
            chapter_id: project.last_adapted_chapter_id.clone(),
            sp_id: project.last_adapted_sp_id.clone(),
        }
    }

    /// Nytt bokmärke i början av ett kapitel
    pub fn starting_at(project: &Project, chapter: &Chapter) -> Self {
        Self {
            bookmark_id: new_id(),
            project_id: project.project_id.clone(),
            name: chapter.name.clone(),
            book_id: chapter.book_id.clone(),
            chapter_id: chapter.chapter_id.clone(),
            sp_id: String::new(),
        }
    }

    /// Flytta bokmärket till ett kapitel. Bokmärket uppdateras på plats.
    pub fn move_to(&mut self, chapter: &Chapter, sp_id: Option<&str>) -> Change<Bookmark> {
        self.name = chapter.name.clone();
        self.book_id = chapter.book_id.clone();
        self.chapter_id = chapter.chapter_id.clone();
        self.sp_id = sp_id.unwrap_or_default().to_string();
        Change::new(self.clone())
    }

    pub fn is_blank(&self) -> bool {
        self.chapter_id.is_empty()
    }
}

impl Entity for Bookmark {
    const KIND: EntityKind = EntityKind::Bookmark;
    const KEY_COLUMN: &'static str = "bookmarkid";
    const PROJECT_COLUMN: Option<&'static str> = Some("projectid");
    const PARENT_COLUMN: Option<&'static str> = Some("projectid");

    fn key(&self) -> &str {
        &self.bookmark_id
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_legacy_blank_project() {
        let project = Project::new("A", "B");
        let bookmark = Bookmark::from_legacy(&project);
        assert_eq!(bookmark.project_id, project.project_id);
        assert!(bookmark.is_blank());
        assert!(bookmark.name.is_empty());
    }

    #[test]
    fn test_move_to_keeps_id() {
        let project = Project::new("A", "B");
        let mut bookmark = Bookmark::from_legacy(&project);
        let id = bookmark.bookmark_id.clone();

        let chapter = Chapter::new("b1", &project.project_id, "Mark 2");
        let change = bookmark.move_to(&chapter, Some("sp9"));

        assert_eq!(change.entity().bookmark_id, id);
        assert_eq!(bookmark.name, "Mark 2");
        assert_eq!(bookmark.book_id, "b1");
        assert_eq!(bookmark.sp_id, "sp9");
    }

    #[test]
    fn test_starting_at_chapter() {
        let project = Project::new("A", "B");
        let chapter = Chapter::new("b1", &project.project_id, "Mark 1");
        let bookmark = Bookmark::starting_at(&project, &chapter);
        assert_eq!(bookmark.chapter_id, chapter.chapter_id);
        assert!(bookmark.sp_id.is_empty());
        assert!(!bookmark.is_blank());
    }
}
