//! Fraser, inklusive batchvägarna för import.
//!
//! Batchoperationerna rör aldrig cachen. Den som anropar dem ansvarar
//! för att invalidera fras-cachen efteråt.

use rusqlite::{params, Row, Transaction};
use std::collections::BTreeSet;

use super::{lock, Repository, SharedConnection};
use crate::models::SourcePhrase;
use crate::utils::{AppError, AppResult};

const INSERT_SQL: &str = "INSERT INTO sourcephrase (norder, spid, chapterid, vid, markers, orig,
        prepuncts, midpuncts, follpuncts, flags, texttype, gloss, freetrans, note,
        srcwordbreak, tgtwordbreak, source, target)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)";

#[derive(Clone)]
pub struct SourcePhraseRepository {
    conn: SharedConnection,
}

impl SourcePhraseRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Lägg in alla fraser i en transaktion. Ett fel rullar tillbaka allt.
    pub fn insert_batch(&self, phrases: &[SourcePhrase]) -> AppResult<usize> {
        if phrases.is_empty() {
            tracing::debug!("insert_batch: tom batch, inget att göra");
            return Ok(0);
        }

        let mut conn = lock(&self.conn)?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::batch(phrases.len(), e))?;

        Self::insert_all(&tx, phrases).map_err(|e| AppError::batch(phrases.len(), e))?;
        tx.commit().map_err(|e| AppError::batch(phrases.len(), e))?;

        tracing::info!("Batch: lade in {} fraser", phrases.len());
        Ok(phrases.len())
    }

    fn insert_all(tx: &Transaction, phrases: &[SourcePhrase]) -> rusqlite::Result<()> {
        let mut stmt = tx.prepare_cached(INSERT_SQL)?;
        for phrase in phrases {
            stmt.execute(params![
                phrase.norder,
                phrase.sp_id,
                phrase.chapter_id,
                phrase.vid,
                phrase.markers,
                phrase.orig,
                phrase.prepuncts,
                phrase.midpuncts,
                phrase.follpuncts,
                phrase.flags.to_string(),
                phrase.texttype,
                phrase.gloss,
                phrase.freetrans,
                phrase.note,
                phrase.srcwordbreak,
                phrase.tgtwordbreak,
                phrase.source,
                phrase.target,
            ])?;
        }
        Ok(())
    }

    /// Ta bort hela versintervall, nycklat på `vid`.
    ///
    /// Fraser utan vid tas bort på sitt eget id, annars skulle en tom
    /// vid träffa alla andra fraser utan vid.
    pub fn delete_batch(&self, phrases: &[SourcePhrase]) -> AppResult<usize> {
        if phrases.is_empty() {
            tracing::debug!("delete_batch: tom batch, inget att göra");
            return Ok(0);
        }

        let vids: BTreeSet<&str> = phrases
            .iter()
            .filter(|p| !p.vid.is_empty())
            .map(|p| p.vid.as_str())
            .collect();
        let loose: Vec<&str> = phrases
            .iter()
            .filter(|p| p.vid.is_empty())
            .map(|p| p.sp_id.as_str())
            .collect();

        let mut conn = lock(&self.conn)?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::batch(phrases.len(), e))?;

        let deleted = Self::delete_all(&tx, &vids, &loose)
            .map_err(|e| AppError::batch(phrases.len(), e))?;
        tx.commit().map_err(|e| AppError::batch(phrases.len(), e))?;

        tracing::info!(
            "Batch: tog bort {} fraser ({} versintervall)",
            deleted,
            vids.len()
        );
        Ok(deleted)
    }

    fn delete_all(tx: &Transaction, vids: &BTreeSet<&str>, loose: &[&str]) -> rusqlite::Result<usize> {
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare_cached("DELETE FROM sourcephrase WHERE vid = ?1")?;
            for vid in vids {
                deleted += stmt.execute([vid])?;
            }
        }
        let mut stmt = tx.prepare_cached("DELETE FROM sourcephrase WHERE spid = ?1")?;
        for sp_id in loose {
            deleted += stmt.execute([sp_id])?;
        }
        Ok(deleted)
    }
}

impl Repository<SourcePhrase> for SourcePhraseRepository {
    const SELECT: &'static str = "SELECT spid, chapterid, vid, norder, markers, orig, prepuncts, midpuncts,
                follpuncts, flags, texttype, gloss, freetrans, note,
                srcwordbreak, tgtwordbreak, source, target
         FROM sourcephrase";
    const ORDER_BY: &'static str = "norder";

    fn conn(&self) -> &SharedConnection {
        &self.conn
    }

    fn insert(&self, phrase: &SourcePhrase) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let tx = conn.unchecked_transaction()?;
        Self::insert_all(&tx, std::slice::from_ref(phrase))?;
        tx.commit()?;
        Ok(())
    }

    fn update(&self, phrase: &SourcePhrase) -> AppResult<()> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute(
            "UPDATE sourcephrase SET
                norder = ?1, chapterid = ?2, vid = ?3, markers = ?4, orig = ?5,
                prepuncts = ?6, midpuncts = ?7, follpuncts = ?8, flags = ?9, texttype = ?10,
                gloss = ?11, freetrans = ?12, note = ?13, srcwordbreak = ?14, tgtwordbreak = ?15,
                source = ?16, target = ?17
             WHERE spid = ?18",
            params![
                phrase.norder,
                phrase.chapter_id,
                phrase.vid,
                phrase.markers,
                phrase.orig,
                phrase.prepuncts,
                phrase.midpuncts,
                phrase.follpuncts,
                phrase.flags.to_string(),
                phrase.texttype,
                phrase.gloss,
                phrase.freetrans,
                phrase.note,
                phrase.srcwordbreak,
                phrase.tgtwordbreak,
                phrase.source,
                phrase.target,
                phrase.sp_id,
            ],
        )?;

        if rows == 0 {
            return Err(AppError::not_found(format!("sourcephrase {}", phrase.sp_id)));
        }

        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<SourcePhrase> {
        let flags: String = row.get(9)?;
        Ok(SourcePhrase {
            sp_id: row.get(0)?,
            chapter_id: row.get(1)?,
            vid: row.get(2)?,
            norder: row.get(3)?,
            markers: row.get(4)?,
            orig: row.get(5)?,
            prepuncts: row.get(6)?,
            midpuncts: row.get(7)?,
            follpuncts: row.get(8)?,
            flags: flags.parse().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
            })?,
            texttype: row.get(10)?,
            gloss: row.get(11)?,
            freetrans: row.get(12)?,
            note: row.get(13)?,
            srcwordbreak: row.get(14)?,
            tgtwordbreak: row.get(15)?,
            source: row.get(16)?,
            target: row.get(17)?,
        })
    }
}
