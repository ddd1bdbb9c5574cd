pub mod schema;
pub mod migrations;
pub mod predicate;
pub mod project_repo;
pub mod book_repo;
pub mod chapter_repo;
pub mod source_phrase_repo;
pub mod target_unit_repo;
pub mod bookmark_repo;
pub mod user_repo;

use rusqlite::{Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::Entity;
use crate::utils::{AppError, AppResult};

pub use book_repo::{BookRepository, CascadeReport};
pub use bookmark_repo::BookmarkRepository;
pub use chapter_repo::ChapterRepository;
pub use predicate::Predicate;
pub use project_repo::ProjectRepository;
pub use source_phrase_repo::SourcePhraseRepository;
pub use target_unit_repo::TargetUnitRepository;
pub use user_repo::UserRepository;

pub type SharedConnection = Arc<Mutex<Connection>>;

/// Lås anslutningen; förgiftat lås blir ett lagringsfel
pub(crate) fn lock(conn: &SharedConnection) -> AppResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| AppError::persistence("databaslåset är förgiftat"))
}

/// Rå CRUD mot en tabell.
///
/// Varje repository skriver sin egen INSERT/UPDATE och radmappning;
/// resten följer av entitetens tabell- och nyckelkolumn.
pub trait Repository<T: Entity>: Clone + Send + Sync + 'static {
    /// SELECT utan WHERE
    const SELECT: &'static str;
    const ORDER_BY: &'static str = "id";

    fn conn(&self) -> &SharedConnection;

    fn insert(&self, entity: &T) -> AppResult<()>;

    fn update(&self, entity: &T) -> AppResult<()>;

    fn from_row(row: &Row) -> rusqlite::Result<T>;

    fn create_schema(&self) -> AppResult<()> {
        let conn = lock(self.conn())?;
        schema::create_schema(&conn, T::KIND)
    }

    fn delete_by_id(&self, id: &str) -> AppResult<()> {
        let conn = lock(self.conn())?;
        let sql = format!("DELETE FROM {} WHERE {} = ?", T::KIND.table(), T::KEY_COLUMN);
        let rows = conn.execute(&sql, [id])?;

        if rows == 0 {
            return Err(AppError::not_found(format!("{} {}", T::KIND, id)));
        }

        Ok(())
    }

    fn select_where(&self, predicate: &Predicate) -> AppResult<Vec<T>> {
        let conn = lock(self.conn())?;
        let (clause, params) = predicate.render();
        let sql = format!("{} WHERE {} ORDER BY {}", Self::SELECT, clause, Self::ORDER_BY);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| Self::from_row(row))?
            .collect::<rusqlite::Result<Vec<T>>>()?;

        Ok(rows)
    }

    /// Töm tabellen. Destruktiv återställning, skild från cachens `clear`.
    fn clear_all(&self) -> AppResult<usize> {
        let conn = lock(self.conn())?;
        let rows = conn.execute(&format!("DELETE FROM {}", T::KIND.table()), [])?;
        tracing::info!("Tömde {} ({} rader)", T::KIND, rows);
        Ok(rows)
    }

    fn count(&self) -> AppResult<i64> {
        let conn = lock(self.conn())?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", T::KIND.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Läs en JSON-kolumn; trasig text blir ett konverteringsfel för raden
pub(crate) fn json_column<V: serde::de::DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<V> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Huvuddatabas-wrapper med thread-safe access
pub struct Database {
    conn: SharedConnection,
}

impl Database {
    /// Öppna eller skapa databas
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Öppna in-memory databas (för tester)
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Kör databasmigrationer
    pub fn migrate(&self) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        migrations::run_migrations(&conn)
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(Arc::clone(&self.conn))
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(Arc::clone(&self.conn))
    }

    pub fn chapters(&self) -> ChapterRepository {
        ChapterRepository::new(Arc::clone(&self.conn))
    }

    pub fn source_phrases(&self) -> SourcePhraseRepository {
        SourcePhraseRepository::new(Arc::clone(&self.conn))
    }

    pub fn target_units(&self) -> TargetUnitRepository {
        TargetUnitRepository::new(Arc::clone(&self.conn))
    }

    pub fn bookmarks(&self) -> BookmarkRepository {
        BookmarkRepository::new(Arc::clone(&self.conn))
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(Arc::clone(&self.conn))
    }

    /// Direkt tillgång till connection (för avancerade operationer)
    pub fn with_connection<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Connection) -> AppResult<T>,
    {
        let conn = lock(&self.conn)?;
        f(&conn)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
