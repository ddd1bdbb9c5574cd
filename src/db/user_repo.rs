use rusqlite::{params, Row};

use super::{json_column, lock, Predicate, Repository, SharedConnection};
use crate::models::User;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct UserRepository {
    conn: SharedConnection,
}

impl UserRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Hämta enhetens användare (skapas vid första anropet)
    pub fn get_or_create(&self) -> AppResult<User> {
        if let Some(user) = self.select_where(&Predicate::All)?.into_iter().next() {
            return Ok(user);
        }

        let user = User::default();
        self.insert(&user)?;
        tracing::info!("Skapade lokal användare {}", user.user_id);
        Ok(user)
    }
}

impl Repository<User> for UserRepository {
    const SELECT: &'static str = "SELECT userid, username, name, bookmarks, copysource, wrapusfm,
                stopatboundaries, allowblanksp, showtranschecks, uilang
         FROM user";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, user: &User) -> AppResult<()> {
        let bookmarks = serde_json::to_string(&user.bookmarks)?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO user (userid, username, name, bookmarks, copysource, wrapusfm,
                               stopatboundaries, allowblanksp, showtranschecks, uilang)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                user.user_id,
                user.username,
                user.name,
                bookmarks,
                user.copy_source,
                user.wrap_usfm,
                user.stop_at_boundaries,
                user.allow_edit_blank_sp,
                user.show_translation_checks,
                user.ui_lang,
            ],
        )?;

        Ok(())
    }

    fn update(&self, user: &User) -> AppResult<()> {
        let bookmarks = serde_json::to_string(&user.bookmarks)?;

        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE user SET username = ?1, name = ?2, bookmarks = ?3, copysource = ?4,
                             wrapusfm = ?5, stopatboundaries = ?6, allowblanksp = ?7,
                             showtranschecks = ?8, uilang = ?9
             WHERE userid = ?10",
            params![
                user.username,
                user.name,
                bookmarks,
                user.copy_source,
                user.wrap_usfm,
                user.stop_at_boundaries,
                user.allow_edit_blank_sp,
                user.show_translation_checks,
                user.ui_lang,
                user.user_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("user {}", user.user_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            user_id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            bookmarks: json_column(row, 3)?,
            copy_source: row.get(4)?,
            wrap_usfm: row.get(5)?,
            stop_at_boundaries: row.get(6)?,
            allow_edit_blank_sp: row.get(7)?,
            show_translation_checks: row.get(8)?,
            ui_lang: row.get(9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_get_or_create_is_lazy_and_single() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.users();

        assert_eq!(repo.count().unwrap(), 0);
        let first = repo.get_or_create().unwrap();
        let second = repo.get_or_create().unwrap();

        assert_eq!(first.user_id, second.user_id);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_bookmark_list_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.users();

        let mut user = repo.get_or_create().unwrap();
        let _ = user.add_bookmark("b1");
        repo.update(user.add_bookmark("b2").entity()).unwrap();

        let loaded = repo.get_or_create().unwrap();
        assert_eq!(loaded.bookmarks, vec!["b1".to_string(), "b2".to_string()]);
        assert!(loaded.copy_source);
    }
}
