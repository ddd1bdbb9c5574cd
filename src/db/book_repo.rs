use rusqlite::{params, Row};

use super::{json_column, lock, Repository, SharedConnection};
use crate::models::Book;
use crate::utils::{AppError, AppResult};

/// Vad en kaskadborttagning tog bort
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub phrases: usize,
    pub chapters: usize,
    /// Kapitlen som fanns i boken när transaktionen kördes
    pub chapter_ids: Vec<String>,
}

#[derive(Clone)]
pub struct BookRepository {
    conn: SharedConnection,
}

impl BookRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Ta bort en bok med alla kapitel och fraser.
    ///
    /// Ordningen är fraser, kapitel, bokrad; allt i en transaktion.
    pub fn delete_cascade(&self, book_id: &str) -> AppResult<CascadeReport> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let chapter_ids = {
            let mut stmt = tx.prepare("SELECT chapterid FROM chapter WHERE bookid = ?1 ORDER BY id")?;
            let ids = stmt
                .query_map([book_id], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            ids
        };

        let phrases = tx.execute(
            "DELETE FROM sourcephrase
             WHERE chapterid IN (SELECT chapterid FROM chapter WHERE bookid = ?1)",
            [book_id],
        )?;
        let chapters = tx.execute("DELETE FROM chapter WHERE bookid = ?1", [book_id])?;
        let books = tx.execute("DELETE FROM book WHERE bookid = ?1", [book_id])?;

        if books == 0 {
            // tx släpps utan commit, inget ändras
            return Err(AppError::not_found(format!("book {}", book_id)));
        }

        tx.commit()?;

        tracing::info!(
            "Tog bort bok {} med {} kapitel och {} fraser",
            book_id, chapters, phrases
        );

        Ok(CascadeReport {
            phrases,
            chapters,
            chapter_ids,
        })
    }
}

impl Repository<Book> for BookRepository {
    const SELECT: &'static str =
        "SELECT bookid, projectid, scrid, name, filename, chapters FROM book";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, book: &Book) -> AppResult<()> {
        let chapters = serde_json::to_string(&book.chapters)?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO book (bookid, projectid, scrid, name, filename, chapters)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                book.book_id,
                book.project_id,
                book.scr_id,
                book.name,
                book.filename,
                chapters,
            ],
        )?;

        Ok(())
    }

    fn update(&self, book: &Book) -> AppResult<()> {
        let chapters = serde_json::to_string(&book.chapters)?;

        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE book SET projectid = ?1, scrid = ?2, name = ?3, filename = ?4, chapters = ?5
             WHERE bookid = ?6",
            params![
                book.project_id,
                book.scr_id,
                book.name,
                book.filename,
                chapters,
                book.book_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("book {}", book.book_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Book> {
        Ok(Book {
            book_id: row.get(0)?,
            project_id: row.get(1)?,
            scr_id: row.get(2)?,
            name: row.get(3)?,
            filename: row.get(4)?,
            chapters: json_column(row, 5)?,
        })
    }
}
