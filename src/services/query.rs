//! Frågetyper och förfrågningar mot synktjänsten.

use crate::db::Predicate;
use crate::models::{Entity, EntityKind};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// En post via sitt UUID
    ById(String),
    /// Namnfilter, skiftlägesokänslig delsträng. Tomt namn tvingar omladdning.
    ByProjectAndName {
        project_id: Option<String>,
        name: String,
    },
    ByProject(String),
    /// Barn till en förälder (kapitel i en bok, fraser i ett kapitel)
    ByParentId(String),
    /// Barn till flera föräldrar, blir ett enda `IN (...)`
    ByParentIdList(Vec<String>),
    /// KB-uppslag på normaliserad nyckel
    BySource {
        project_id: String,
        source: String,
        is_gloss: bool,
    },
    All,
}

impl Query {
    /// Namnfråga utan projektavgränsning
    pub fn by_name(name: &str) -> Self {
        Self::ByProjectAndName {
            project_id: None,
            name: name.to_string(),
        }
    }

    /// Tomt namn betyder: töm cachen och läs om allt
    pub fn is_invalidation(&self) -> bool {
        matches!(self, Self::ByProjectAndName { name, .. } if name.is_empty())
    }

    /// WHERE-villkor för frågan mot entitetens tabell
    pub fn to_predicate<T: Entity>(&self) -> AppResult<Predicate> {
        match self {
            Self::ById(id) => Ok(Predicate::eq(T::KEY_COLUMN, id.clone())),
            Self::ByProjectAndName { project_id: None, .. } | Self::All => Ok(Predicate::All),
            Self::ByProjectAndName {
                project_id: Some(pid),
                ..
            }
            | Self::ByProject(pid) => {
                let column = T::PROJECT_COLUMN.ok_or_else(|| unsupported::<T>(self))?;
                Ok(Predicate::eq(column, pid.clone()))
            }
            Self::ByParentId(pid) => {
                let column = T::PARENT_COLUMN.ok_or_else(|| unsupported::<T>(self))?;
                Ok(Predicate::eq(column, pid.clone()))
            }
            Self::ByParentIdList(ids) => {
                let column = T::PARENT_COLUMN.ok_or_else(|| unsupported::<T>(self))?;
                Ok(Predicate::In(column, ids.clone()))
            }
            Self::BySource {
                project_id,
                source,
                is_gloss,
            } => {
                if T::KIND != EntityKind::TargetUnit {
                    return Err(unsupported::<T>(self));
                }
                Ok(Predicate::And(vec![
                    Predicate::eq("projectid", project_id.clone()),
                    Predicate::eq("source", source.clone()),
                    Predicate::eq("isgloss", *is_gloss),
                ]))
            }
        }
    }

    /// Samma fråga tillämpad på en cachad post
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        match self {
            Self::ById(id) => entity.key() == id,
            Self::ByProjectAndName { project_id, name } => {
                let in_project = match project_id {
                    Some(pid) => entity.project_id() == Some(pid.as_str()),
                    None => true,
                };
                in_project && entity.name().to_lowercase().contains(&name.to_lowercase())
            }
            Self::ByProject(pid) => entity.project_id() == Some(pid.as_str()),
            Self::ByParentId(pid) => entity.parent_id() == Some(pid.as_str()),
            Self::ByParentIdList(ids) => entity
                .parent_id()
                .map(|p| ids.iter().any(|id| id == p))
                .unwrap_or(false),
            Self::BySource {
                project_id,
                source,
                is_gloss,
            } => {
                entity.project_id() == Some(project_id.as_str())
                    && entity.kb_key() == Some((source.as_str(), *is_gloss))
            }
            Self::All => true,
        }
    }
}

fn unsupported<T: Entity>(query: &Query) -> AppError {
    AppError::validation(format!("{:?} stöds inte för {}", query, T::KIND))
}

/// En förfrågan från vylagret: metod plus fråga eller post
#[derive(Debug, Clone)]
pub enum Request<T> {
    Create(T),
    Read(Query),
    Update(T),
    Delete(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, Chapter, SourcePhrase, TargetUnit};

    #[test]
    fn test_parent_list_is_single_in() {
        let query = Query::ByParentIdList(vec!["c1".into(), "c2".into()]);
        let (sql, params) = query.to_predicate::<SourcePhrase>().unwrap().render();
        assert_eq!(sql, "chapterid IN (?1, ?2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_unsupported_shapes_are_rejected() {
        let err = Query::ByProject("p1".into())
            .to_predicate::<SourcePhrase>()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let kb = Query::BySource {
            project_id: "p1".into(),
            source: "casa".into(),
            is_gloss: false,
        };
        assert!(kb.to_predicate::<Chapter>().is_err());
        assert!(kb.to_predicate::<TargetUnit>().is_ok());
    }

    #[test]
    fn test_name_match_is_case_insensitive_substring() {
        let book = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        assert!(Query::by_name("ar").matches(&book));
        assert!(Query::by_name("MAR").matches(&book));
        assert!(!Query::by_name("luke").matches(&book));

        let scoped = Query::ByProjectAndName {
            project_id: Some("p2".into()),
            name: "mark".into(),
        };
        assert!(!scoped.matches(&book));
    }

    #[test]
    fn test_invalidation_shape() {
        assert!(Query::by_name("").is_invalidation());
        assert!(!Query::by_name("x").is_invalidation());
        assert!(!Query::All.is_invalidation());
    }

    #[test]
    fn test_kb_match() {
        let tu = TargetUnit::new("p1", "casa", false);
        let hit = Query::BySource {
            project_id: "p1".into(),
            source: "casa".into(),
            is_gloss: false,
        };
        let gloss = Query::BySource {
            project_id: "p1".into(),
            source: "casa".into(),
            is_gloss: true,
        };
        assert!(hit.matches(&tu));
        assert!(!gloss.matches(&tu));
    }
}
