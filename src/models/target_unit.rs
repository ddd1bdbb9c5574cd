use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{new_id, Change, Entity, EntityKind};

/// En förekomst av en översättning i KB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefString {
    pub target: String,
    /// Antal gånger översättningen bekräftats
    pub n: i64,
    #[serde(rename = "cDT")]
    pub created_at: String,
    #[serde(rename = "df", default)]
    pub deleted: bool,
    #[serde(rename = "wC", default)]
    pub created_by: String,
}

/// KB-post: normaliserad källnyckel med dess översättningar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetUnit {
    pub tu_id: String,
    pub project_id: String,
    pub source: String,
    /// Antal ord i källnyckeln
    pub mn: i64,
    pub is_gloss: bool,
    pub refstring: Vec<RefString>,
    pub timestamp: String,
    pub user: String,
}

impl TargetUnit {
    pub fn new(project_id: &str, source: &str, is_gloss: bool) -> Self {
        Self {
            tu_id: new_id(),
            project_id: project_id.to_string(),
            source: source.to_string(),
            mn: source.split_whitespace().count() as i64,
            is_gloss,
            refstring: Vec::new(),
            timestamp: Utc::now().to_rfc3339(),
            user: String::new(),
        }
    }

    /// Registrera en bekräftad översättning
    pub fn confirm(&mut self, target: &str, user: &str) -> Change<TargetUnit> {
        let now = Utc::now().to_rfc3339();
        match self
            .refstring
            .iter_mut()
            .find(|r| r.target == target && !r.deleted)
        {
            Some(existing) => existing.n += 1,
            None => self.refstring.push(RefString {
                target: target.to_string(),
                n: 1,
                created_at: now.clone(),
                deleted: false,
                created_by: user.to_string(),
            }),
        }
        self.timestamp = now;
        self.user = user.to_string();
        Change::new(self.clone())
    }

    /// Vanligaste icke-borttagna översättningen; vid lika vinner den först tillagda
    pub fn best_target(&self) -> Option<&str> {
        self.refstring
            .iter()
            .filter(|r| !r.deleted)
            .fold(None::<&RefString>, |best, r| match best {
                Some(b) if b.n >= r.n => Some(b),
                _ => Some(r),
            })
            .map(|r| r.target.as_str())
    }

    /// Sammanlagd frekvens över alla förekomster
    pub fn frequency(&self) -> i64 {
        self.refstring.iter().filter(|r| !r.deleted).map(|r| r.n).sum()
    }
}

impl Entity for TargetUnit {
    const KIND: EntityKind = EntityKind::TargetUnit;
    const KEY_COLUMN: &'static str = "tuid";
    const PROJECT_COLUMN: Option<&'static str> = Some("projectid");

    fn key(&self) -> &str {
        &self.tu_id
    }

    fn name(&self) -> &str {
        &self.source
    }

    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }

    fn kb_key(&self) -> Option<(&str, bool)> {
        Some((&self.source, self.is_gloss))
    }
}
