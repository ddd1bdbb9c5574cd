use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::{new_id, Change, Entity, EntityKind};
use crate::utils::AppError;

/// Antal flaggor i flaggsträngen
pub const FLAG_COUNT: usize = 22;

/// 22 booleska flaggor, lagrade som en sträng av '0'/'1'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhraseFlags([bool; FLAG_COUNT]);

impl PhraseFlags {
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn set(&mut self, index: usize, value: bool) {
        if let Some(flag) = self.0.get_mut(index) {
            *flag = value;
        }
    }
}

impl FromStr for PhraseFlags {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != FLAG_COUNT {
            return Err(AppError::validation(format!(
                "flaggsträngen måste ha {} tecken, fick {}",
                FLAG_COUNT,
                s.chars().count()
            )));
        }

        let mut flags = [false; FLAG_COUNT];
        for (i, c) in s.chars().enumerate() {
            flags[i] = match c {
                '0' => false,
                '1' => true,
                other => {
                    return Err(AppError::validation(format!(
                        "ogiltigt flaggtecken '{}' på position {}",
                        other, i
                    )))
                }
            };
        }
        Ok(Self(flags))
    }
}

impl TryFrom<String> for PhraseFlags {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PhraseFlags> for String {
    fn from(flags: PhraseFlags) -> Self {
        flags.to_string()
    }
}

impl fmt::Display for PhraseFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in self.0 {
            write!(f, "{}", if flag { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourcePhrase {
    pub sp_id: String,
    pub chapter_id: String,
    /// Versintervall-id; batchborttagning nycklar på detta
    pub vid: String,
    /// Ordningsvärde. Bara sorteringen är garanterad, inte att värdena är täta.
    pub norder: f64,
    pub markers: String,
    pub orig: String,
    pub prepuncts: String,
    pub midpuncts: String,
    pub follpuncts: String,
    pub flags: PhraseFlags,
    pub texttype: i64,
    pub gloss: String,
    pub freetrans: String,
    pub note: String,
    pub srcwordbreak: String,
    pub tgtwordbreak: String,
    pub source: String,
    pub target: String,
}

impl SourcePhrase {
    pub fn new(chapter_id: &str, vid: &str, norder: f64, source: &str) -> Self {
        Self {
            sp_id: new_id(),
            chapter_id: chapter_id.to_string(),
            vid: vid.to_string(),
            norder,
            source: source.to_string(),
            ..Default::default()
        }
    }

    /// Ordningsvärde mellan två befintliga fraser, utan omnumrering
    pub fn order_between(before: f64, after: f64) -> f64 {
        before + (after - before) / 2.0
    }

    pub fn set_target(&mut self, target: &str) -> Change<SourcePhrase> {
        self.target = target.to_string();
        Change::new(self.clone())
    }
}

impl Entity for SourcePhrase {
    const KIND: EntityKind = EntityKind::SourcePhrase;
    const KEY_COLUMN: &'static str = "spid";
    const PARENT_COLUMN: Option<&'static str> = Some("chapterid");

    fn key(&self) -> &str {
        &self.sp_id
    }

    fn name(&self) -> &str {
        &self.source
    }

    fn parent_id(&self) -> Option<&str> {
        Some(&self.chapter_id)
    }

    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.norder.total_cmp(&other.norder)
    }
}
