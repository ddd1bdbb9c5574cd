//! SQL-schema, en tabell per entitetstyp.
//!
//! Nästlade fält (kapitellistor, skiljeteckenpar, referenslistor) lagras
//! som JSON-text; lagret har ingen egen arraytyp.

use rusqlite::Connection;

use crate::models::EntityKind;
use crate::utils::{AppError, AppResult};

pub const SCHEMA_VERSION: i32 = 1;

pub const CREATE_PROJECT: &str = r#"
CREATE TABLE IF NOT EXISTS project (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    projectid TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    srclangname TEXT NOT NULL DEFAULT '',
    srclangcode TEXT NOT NULL DEFAULT '',
    tgtlangname TEXT NOT NULL DEFAULT '',
    tgtlangcode TEXT NOT NULL DEFAULT '',
    srcdir TEXT NOT NULL DEFAULT 'ltr',
    tgtdir TEXT NOT NULL DEFAULT 'ltr',
    srcfont TEXT NOT NULL DEFAULT '',
    tgtfont TEXT NOT NULL DEFAULT '',
    punctpairs TEXT NOT NULL DEFAULT '[]',
    casepairs TEXT NOT NULL DEFAULT '[]',
    autocapitalization INTEGER NOT NULL DEFAULT 0,
    sourcehasuppercase INTEGER NOT NULL DEFAULT 0,
    filtermarkers TEXT NOT NULL DEFAULT '',
    lastadaptedbookid TEXT NOT NULL DEFAULT '',
    lastadaptedchapterid TEXT NOT NULL DEFAULT '',
    lastadaptedspid TEXT NOT NULL DEFAULT '',
    lastadaptedname TEXT NOT NULL DEFAULT ''
);
"#;

pub const CREATE_BOOK: &str = r#"
CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bookid TEXT NOT NULL UNIQUE,
    projectid TEXT NOT NULL,
    scrid TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    filename TEXT NOT NULL DEFAULT '',
    chapters TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_book_project ON book(projectid);
"#;

pub const CREATE_CHAPTER: &str = r#"
CREATE TABLE IF NOT EXISTS chapter (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapterid TEXT NOT NULL UNIQUE,
    bookid TEXT NOT NULL,
    projectid TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    lastadapted INTEGER NOT NULL DEFAULT 0,
    versecount INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_chapter_book ON chapter(bookid);
CREATE INDEX IF NOT EXISTS idx_chapter_project ON chapter(projectid);
"#;

pub const CREATE_SOURCEPHRASE: &str = r#"
CREATE TABLE IF NOT EXISTS sourcephrase (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    norder REAL NOT NULL,
    spid TEXT NOT NULL UNIQUE,
    chapterid TEXT NOT NULL,
    vid TEXT NOT NULL DEFAULT '',
    markers TEXT NOT NULL DEFAULT '',
    orig TEXT NOT NULL DEFAULT '',
    prepuncts TEXT NOT NULL DEFAULT '',
    midpuncts TEXT NOT NULL DEFAULT '',
    follpuncts TEXT NOT NULL DEFAULT '',
    flags TEXT NOT NULL DEFAULT '0000000000000000000000',
    texttype INTEGER NOT NULL DEFAULT 0,
    gloss TEXT NOT NULL DEFAULT '',
    freetrans TEXT NOT NULL DEFAULT '',
    note TEXT NOT NULL DEFAULT '',
    srcwordbreak TEXT NOT NULL DEFAULT '',
    tgtwordbreak TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL DEFAULT '',
    target TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_sourcephrase_chapter ON sourcephrase(chapterid, norder);
CREATE INDEX IF NOT EXISTS idx_sourcephrase_vid ON sourcephrase(vid);
"#;

pub const CREATE_TARGETUNIT: &str = r#"
CREATE TABLE IF NOT EXISTS targetunit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tuid TEXT NOT NULL UNIQUE,
    projectid TEXT NOT NULL,
    source TEXT NOT NULL,
    mn INTEGER NOT NULL DEFAULT 1,
    isgloss INTEGER NOT NULL DEFAULT 0,
    refstring TEXT NOT NULL DEFAULT '[]',
    timestamp TEXT NOT NULL DEFAULT '',
    user TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_targetunit_lookup ON targetunit(projectid, source, isgloss);
"#;

pub const CREATE_BOOKMARK: &str = r#"
CREATE TABLE IF NOT EXISTS bookmark (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bookmarkid TEXT NOT NULL UNIQUE,
    projectid TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    bookid TEXT NOT NULL DEFAULT '',
    chapterid TEXT NOT NULL DEFAULT '',
    spid TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_bookmark_project ON bookmark(projectid);
"#;

pub const CREATE_USER: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    userid TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL DEFAULT '',
    name TEXT NOT NULL DEFAULT '',
    bookmarks TEXT NOT NULL DEFAULT '[]',
    copysource INTEGER NOT NULL DEFAULT 1,
    wrapusfm INTEGER NOT NULL DEFAULT 1,
    stopatboundaries INTEGER NOT NULL DEFAULT 1,
    allowblanksp INTEGER NOT NULL DEFAULT 0,
    showtranschecks INTEGER NOT NULL DEFAULT 1,
    uilang TEXT NOT NULL DEFAULT ''
);
"#;

pub const CREATE_MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

pub fn ddl(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Project => CREATE_PROJECT,
        EntityKind::Book => CREATE_BOOK,
        EntityKind::Chapter => CREATE_CHAPTER,
        EntityKind::SourcePhrase => CREATE_SOURCEPHRASE,
        EntityKind::TargetUnit => CREATE_TARGETUNIT,
        EntityKind::Bookmark => CREATE_BOOKMARK,
        EntityKind::User => CREATE_USER,
    }
}

/// Skapa tabellen för en entitetstyp om den saknas
pub fn create_schema(conn: &Connection, kind: EntityKind) -> AppResult<()> {
    conn.execute_batch(ddl(kind))
        .map_err(|e| AppError::schema(kind.table(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::OpenFlags;

    #[test]
    fn test_create_schema_on_readonly_store_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readonly.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE placeholder (x INTEGER);")
            .unwrap();

        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
        let err = create_schema(&conn, EntityKind::Chapter).unwrap_err();

        match err {
            AppError::Schema { entity, .. } => assert_eq!(entity, "chapter"),
            other => panic!("fel sort: {:?}", other),
        }
    }
}
