use rusqlite::{params, Row};

use super::{lock, Repository, SharedConnection};
use crate::models::Chapter;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ChapterRepository {
    conn: SharedConnection,
}

impl ChapterRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<Chapter> for ChapterRepository {
    const SELECT: &'static str =
        "SELECT chapterid, bookid, projectid, name, lastadapted, versecount FROM chapter";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, chapter: &Chapter) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO chapter (chapterid, bookid, projectid, name, lastadapted, versecount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                chapter.chapter_id,
                chapter.book_id,
                chapter.project_id,
                chapter.name,
                chapter.last_adapted,
                chapter.verse_count,
            ],
        )?;

        Ok(())
    }

    fn update(&self, chapter: &Chapter) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE chapter SET bookid = ?1, projectid = ?2, name = ?3, lastadapted = ?4, versecount = ?5
             WHERE chapterid = ?6",
            params![
                chapter.book_id,
                chapter.project_id,
                chapter.name,
                chapter.last_adapted,
                chapter.verse_count,
                chapter.chapter_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("chapter {}", chapter.chapter_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Chapter> {
        Ok(Chapter {
            chapter_id: row.get(0)?,
            book_id: row.get(1)?,
            project_id: row.get(2)?,
            name: row.get(3)?,
            last_adapted: row.get(4)?,
            verse_count: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Predicate};

    #[test]
    fn test_insert_update_select() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.chapters();

        let mut chapter = Chapter::new("b1", "p1", "Mark 1");
        repo.insert(&chapter).unwrap();

        let change = chapter.mark_adapted(42);
        repo.update(change.entity()).unwrap();

        let found = repo
            .select_where(&Predicate::eq("bookid", "b1".to_string()))
            .unwrap();
        assert_eq!(found, vec![chapter]);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let chapter = Chapter::new("b1", "p1", "Mark 1");
        db.chapters().insert(&chapter).unwrap();
        assert!(db.chapters().insert(&chapter).is_err());
    }

    #[test]
    fn test_delete_by_id() {
        let db = Database::open_in_memory().unwrap();
        let chapter = Chapter::new("b1", "p1", "Mark 1");
        db.chapters().insert(&chapter).unwrap();

        db.chapters().delete_by_id(&chapter.chapter_id).unwrap();
        assert_eq!(db.chapters().count().unwrap(), 0);
        assert!(db.chapters().delete_by_id(&chapter.chapter_id).unwrap_err().is_not_found());
    }
}
