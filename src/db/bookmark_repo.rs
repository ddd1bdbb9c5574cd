use rusqlite::{params, Row};

use super::{lock, Repository, SharedConnection};
use crate::models::Bookmark;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct BookmarkRepository {
    conn: SharedConnection,
}

impl BookmarkRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<Bookmark> for BookmarkRepository {
    const SELECT: &'static str =
        "SELECT bookmarkid, projectid, name, bookid, chapterid, spid FROM bookmark";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, bookmark: &Bookmark) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO bookmark (bookmarkid, projectid, name, bookid, chapterid, spid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                bookmark.bookmark_id,
                bookmark.project_id,
                bookmark.name,
                bookmark.book_id,
                bookmark.chapter_id,
                bookmark.sp_id,
            ],
        )?;

        Ok(())
    }

    fn update(&self, bookmark: &Bookmark) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE bookmark SET projectid = ?1, name = ?2, bookid = ?3, chapterid = ?4, spid = ?5
             WHERE bookmarkid = ?6",
            params![
                bookmark.project_id,
                bookmark.name,
                bookmark.book_id,
                bookmark.chapter_id,
                bookmark.sp_id,
                bookmark.bookmark_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("bookmark {}", bookmark.bookmark_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            bookmark_id: row.get(0)?,
            project_id: row.get(1)?,
            name: row.get(2)?,
            book_id: row.get(3)?,
            chapter_id: row.get(4)?,
            sp_id: row.get(5)?,
        })
    }
}
