use rusqlite::{params, Row};

use super::{json_column, lock, Repository, SharedConnection};
use crate::models::TargetUnit;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct TargetUnitRepository {
    conn: SharedConnection,
}

impl TargetUnitRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<TargetUnit> for TargetUnitRepository {
    const SELECT: &'static str =
        "SELECT tuid, projectid, source, mn, isgloss, refstring, timestamp, user FROM targetunit";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, tu: &TargetUnit) -> AppResult<()> {
        let refstring = serde_json::to_string(&tu.refstring)?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO targetunit (tuid, projectid, source, mn, isgloss, refstring, timestamp, user)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                tu.tu_id,
                tu.project_id,
                tu.source,
                tu.mn,
                tu.is_gloss,
                refstring,
                tu.timestamp,
                tu.user,
            ],
        )?;

        Ok(())
    }

    fn update(&self, tu: &TargetUnit) -> AppResult<()> {
        let refstring = serde_json::to_string(&tu.refstring)?;

        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE targetunit SET projectid = ?1, source = ?2, mn = ?3, isgloss = ?4,
                                   refstring = ?5, timestamp = ?6, user = ?7
             WHERE tuid = ?8",
            params![
                tu.project_id,
                tu.source,
                tu.mn,
                tu.is_gloss,
                refstring,
                tu.timestamp,
                tu.user,
                tu.tu_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("targetunit {}", tu.tu_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<TargetUnit> {
        Ok(TargetUnit {
            tu_id: row.get(0)?,
            project_id: row.get(1)?,
            source: row.get(2)?,
            mn: row.get(3)?,
            is_gloss: row.get(4)?,
            refstring: json_column(row, 5)?,
            timestamp: row.get(6)?,
            user: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Predicate};

    #[test]
    fn test_lookup_by_source_and_gloss_flag() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.target_units();

        let mut adaptation = TargetUnit::new("p1", "casa", false);
        let _ = adaptation.confirm("house", "anna");
        let mut gloss = TargetUnit::new("p1", "casa", true);
        let _ = gloss.confirm("dwelling", "anna");
        repo.insert(&adaptation).unwrap();
        repo.insert(&gloss).unwrap();

        let found = repo
            .select_where(&Predicate::And(vec![
                Predicate::eq("projectid", "p1".to_string()),
                Predicate::eq("source", "casa".to_string()),
                Predicate::eq("isgloss", false),
            ]))
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].best_target(), Some("house"));
    }

    #[test]
    fn test_corrupt_refstring_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.target_units();
        repo.insert(&TargetUnit::new("p1", "casa", false)).unwrap();

        db.with_connection(|conn| {
            conn.execute("UPDATE targetunit SET refstring = 'not json'", [])?;
            Ok(())
        })
        .unwrap();

        let err = repo.select_where(&Predicate::All).unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }
}
