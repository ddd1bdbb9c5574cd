pub mod project;
pub mod book;
pub mod chapter;
pub mod source_phrase;
pub mod target_unit;
pub mod bookmark;
pub mod user;
pub mod config;

pub use project::*;
pub use book::*;
pub use chapter::*;
pub use source_phrase::*;
pub use target_unit::*;
pub use bookmark::*;
pub use user::*;
pub use config::*;

use std::cmp::Ordering;
use std::fmt;

/// Entitetstyper som lagret känner till
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Project,
    Book,
    Chapter,
    SourcePhrase,
    TargetUnit,
    Bookmark,
    User,
}

impl EntityKind {
    pub const ALL: &'static [Self] = &[
        Self::Project,
        Self::Book,
        Self::Chapter,
        Self::SourcePhrase,
        Self::TargetUnit,
        Self::Bookmark,
        Self::User,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Book => "book",
            Self::Chapter => "chapter",
            Self::SourcePhrase => "sourcephrase",
            Self::TargetUnit => "targetunit",
            Self::Bookmark => "bookmark",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.table())
    }
}

/// Gemensamt gränssnitt för allt som cachas och lagras.
///
/// Kolumnkonstanterna beskriver hur frågetyperna översätts till SQL;
/// accessorerna används när samma fråga ska matchas mot cachen.
pub trait Entity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;
    /// Kolumnen som bär entitetens UUID
    const KEY_COLUMN: &'static str;
    const PROJECT_COLUMN: Option<&'static str> = None;
    /// Föräldern (bok för kapitel, kapitel för fras)
    const PARENT_COLUMN: Option<&'static str> = None;

    fn key(&self) -> &str;

    /// Text som namnfilter matchas mot
    fn name(&self) -> &str;

    fn project_id(&self) -> Option<&str> {
        None
    }

    fn parent_id(&self) -> Option<&str> {
        None
    }

    /// (källnyckel, isGloss) för KB-poster
    fn kb_key(&self) -> Option<(&str, bool)> {
        None
    }

    /// Sorteringsordning inom en resultatlista
    fn sort_cmp(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

/// En ändring som ännu inte skrivits till lagret.
///
/// Returneras av mutatorer på modellerna; skickas till `commit` i
/// synktjänsten för att sparas.
#[must_use = "ändringen sparas först när den skickas till commit"]
#[derive(Debug, Clone)]
pub struct Change<T>(T);

impl<T> Change<T> {
    pub fn new(entity: T) -> Self {
        Self(entity)
    }

    pub fn entity(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
