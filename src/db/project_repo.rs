use rusqlite::{params, Row};

use super::{json_column, lock, Repository, SharedConnection};
use crate::models::Project;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ProjectRepository {
    conn: SharedConnection,
}

impl ProjectRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl Repository<Project> for ProjectRepository {
    const SELECT: &'static str = "SELECT projectid, name, srclangname, srclangcode, tgtlangname, tgtlangcode,
                srcdir, tgtdir, srcfont, tgtfont, punctpairs, casepairs,
                autocapitalization, sourcehasuppercase, filtermarkers,
                lastadaptedbookid, lastadaptedchapterid, lastadaptedspid, lastadaptedname
         FROM project";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, project: &Project) -> AppResult<()> {
        let punct = serde_json::to_string(&project.punct_pairs)?;
        let cases = serde_json::to_string(&project.case_pairs)?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO project (projectid, name, srclangname, srclangcode, tgtlangname, tgtlangcode,
                                  srcdir, tgtdir, srcfont, tgtfont, punctpairs, casepairs,
                                  autocapitalization, sourcehasuppercase, filtermarkers,
                                  lastadaptedbookid, lastadaptedchapterid, lastadaptedspid, lastadaptedname)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                project.project_id,
                project.name,
                project.source_lang_name,
                project.source_lang_code,
                project.target_lang_name,
                project.target_lang_code,
                project.source_dir,
                project.target_dir,
                project.source_font,
                project.target_font,
                punct,
                cases,
                project.auto_capitalization,
                project.source_has_upper_case,
                project.filter_markers,
                project.last_adapted_book_id,
                project.last_adapted_chapter_id,
                project.last_adapted_sp_id,
                project.last_adapted_name,
            ],
        )?;

        Ok(())
    }

    fn update(&self, project: &Project) -> AppResult<()> {
        let punct = serde_json::to_string(&project.punct_pairs)?;
        let cases = serde_json::to_string(&project.case_pairs)?;

        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE project SET
                name = ?1, srclangname = ?2, srclangcode = ?3, tgtlangname = ?4, tgtlangcode = ?5,
                srcdir = ?6, tgtdir = ?7, srcfont = ?8, tgtfont = ?9, punctpairs = ?10, casepairs = ?11,
                autocapitalization = ?12, sourcehasuppercase = ?13, filtermarkers = ?14,
                lastadaptedbookid = ?15, lastadaptedchapterid = ?16, lastadaptedspid = ?17,
                lastadaptedname = ?18
             WHERE projectid = ?19",
            params![
                project.name,
                project.source_lang_name,
                project.source_lang_code,
                project.target_lang_name,
                project.target_lang_code,
                project.source_dir,
                project.target_dir,
                project.source_font,
                project.target_font,
                punct,
                cases,
                project.auto_capitalization,
                project.source_has_upper_case,
                project.filter_markers,
                project.last_adapted_book_id,
                project.last_adapted_chapter_id,
                project.last_adapted_sp_id,
                project.last_adapted_name,
                project.project_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("project {}", project.project_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Project> {
        Ok(Project {
            project_id: row.get(0)?,
            name: row.get(1)?,
            source_lang_name: row.get(2)?,
            source_lang_code: row.get(3)?,
            target_lang_name: row.get(4)?,
            target_lang_code: row.get(5)?,
            source_dir: row.get(6)?,
            target_dir: row.get(7)?,
            source_font: row.get(8)?,
            target_font: row.get(9)?,
            punct_pairs: json_column(row, 10)?,
            case_pairs: json_column(row, 11)?,
            auto_capitalization: row.get(12)?,
            source_has_upper_case: row.get(13)?,
            filter_markers: row.get(14)?,
            last_adapted_book_id: row.get(15)?,
            last_adapted_chapter_id: row.get(16)?,
            last_adapted_sp_id: row.get(17)?,
            last_adapted_name: row.get(18)?,
        })
    }
}
