use serde::{Deserialize, Serialize};

use super::{new_id, Entity, EntityKind};

/// Skiljeteckenpar, källa -> mål
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunctPair {
    pub s: String,
    pub t: String,
}

/// Versalpar. Varje sida är två tecken: gemen följd av versal ("aA").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasePair {
    pub s: String,
    pub t: String,
}

impl CasePair {
    pub fn new(s: &str, t: &str) -> Self {
        Self {
            s: s.to_string(),
            t: t.to_string(),
        }
    }

    /// (gemen, versal) för källsidan
    pub fn source_chars(&self) -> Option<(char, char)> {
        split_pair(&self.s)
    }

    /// (gemen, versal) för målsidan
    pub fn target_chars(&self) -> Option<(char, char)> {
        split_pair(&self.t)
    }
}

fn split_pair(pair: &str) -> Option<(char, char)> {
    let mut chars = pair.chars();
    let lower = chars.next()?;
    let upper = chars.next()?;
    Some((lower, upper))
}

/// Standardskiljetecken för nya projekt
pub const DEFAULT_PUNCTUATION: &[&str] = &[
    "?", ".", ",", ";", ":", "\"", "!", "(", ")", "<", ">", "{", "}", "[", "]", "“", "”", "‘", "’",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub source_lang_name: String,
    pub source_lang_code: String,
    pub target_lang_name: String,
    pub target_lang_code: String,
    pub source_dir: String,
    pub target_dir: String,
    pub source_font: String,
    pub target_font: String,
    pub punct_pairs: Vec<PunctPair>,
    pub case_pairs: Vec<CasePair>,
    pub auto_capitalization: bool,
    pub source_has_upper_case: bool,
    pub filter_markers: String,
    // Äldre positionsfält, ersatta av Bookmark
    pub last_adapted_book_id: String,
    pub last_adapted_chapter_id: String,
    pub last_adapted_sp_id: String,
    pub last_adapted_name: String,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            name: String::new(),
            source_lang_name: String::new(),
            source_lang_code: String::new(),
            target_lang_name: String::new(),
            target_lang_code: String::new(),
            source_dir: "ltr".to_string(),
            target_dir: "ltr".to_string(),
            source_font: String::new(),
            target_font: String::new(),
            punct_pairs: DEFAULT_PUNCTUATION
                .iter()
                .map(|p| PunctPair {
                    s: p.to_string(),
                    t: p.to_string(),
                })
                .collect(),
            case_pairs: Vec::new(),
            auto_capitalization: false,
            source_has_upper_case: false,
            filter_markers: String::new(),
            last_adapted_book_id: String::new(),
            last_adapted_chapter_id: String::new(),
            last_adapted_sp_id: String::new(),
            last_adapted_name: String::new(),
        }
    }
}

impl Project {
    pub fn new(source_lang_name: &str, target_lang_name: &str) -> Self {
        Self {
            project_id: new_id(),
            name: format!("{} to {} adaptations", source_lang_name, target_lang_name),
            source_lang_name: source_lang_name.to_string(),
            target_lang_name: target_lang_name.to_string(),
            ..Default::default()
        }
    }

    /// Alla skiljetecken på källsidan, i tabellordning
    pub fn source_punctuation(&self) -> Vec<char> {
        let mut chars: Vec<char> = Vec::new();
        for c in self.punct_pairs.iter().flat_map(|p| p.s.chars()) {
            if !chars.contains(&c) {
                chars.push(c);
            }
        }
        chars
    }

    /// Fyll versalparen från strängar som "aA" (samma på båda sidor)
    pub fn with_case_pairs(mut self, pairs: &[&str]) -> Self {
        self.case_pairs = pairs.iter().map(|p| CasePair::new(p, p)).collect();
        self
    }

    pub fn has_legacy_position(&self) -> bool {
        !self.last_adapted_chapter_id.is_empty()
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;
    const KEY_COLUMN: &'static str = "projectid";
    const PROJECT_COLUMN: Option<&'static str> = Some("projectid");

    fn key(&self) -> &str {
        &self.project_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn project_id(&self) -> Option<&str> {
        Some(&self.project_id)
    }
}
