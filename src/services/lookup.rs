//! Uppslagsnycklar för kunskapsbasen.
//!
//! Normaliseringen är ren: skiljetecken trimmas i båda ändar och, om
//! projektet har automatisk versalisering, sänks den inledande versalen
//! via projektets versalpar.

use super::query::Query;
use super::sync::SyncService;
use crate::models::{Project, SourcePhrase, TargetUnit};
use crate::utils::AppResult;

/// Trimma källsidans skiljetecken. Bara skiljetecken ger tom sträng.
pub fn strip_punctuation<'s>(phrase: &'s str, punctuation: &[char]) -> &'s str {
    phrase.trim_matches(|c: char| punctuation.contains(&c))
}

/// Byt en inledande versal mot sin gemen. Första matchande par vinner.
pub fn lower_leading(phrase: &str, project: &Project) -> String {
    let Some(first) = phrase.chars().next() else {
        return String::new();
    };

    let lower = project
        .case_pairs
        .iter()
        .filter_map(|p| p.source_chars())
        .find(|&(_, upper)| upper == first)
        .map(|(lower, _)| lower);

    match lower {
        Some(lower) => {
            let mut key = String::with_capacity(phrase.len());
            key.push(lower);
            key.push_str(&phrase[first.len_utf8()..]);
            key
        }
        None => phrase.to_string(),
    }
}

/// Kanonisk KB-nyckel för en källfras
pub fn normalize_key(phrase: &str, project: &Project) -> String {
    let trimmed = strip_punctuation(phrase, &project.source_punctuation());
    if trimmed.is_empty() {
        return String::new();
    }

    if project.auto_capitalization {
        lower_leading(trimmed, project)
    } else {
        trimmed.to_string()
    }
}

/// Versalisera en målöversättning om källfrasen började med versal.
///
/// Använder målsidans versalpar; utan matchande par returneras texten oförändrad.
pub fn restore_case(source: &str, target: &str, project: &Project) -> String {
    if !project.auto_capitalization {
        return target.to_string();
    }

    let trimmed = strip_punctuation(source, &project.source_punctuation());
    let starts_upper = trimmed.chars().next().is_some_and(|first| {
        project
            .case_pairs
            .iter()
            .filter_map(|p| p.source_chars())
            .any(|(_, upper)| upper == first)
    });
    if !starts_upper {
        return target.to_string();
    }

    let Some(first) = target.chars().next() else {
        return String::new();
    };
    let upper = project
        .case_pairs
        .iter()
        .filter_map(|p| p.target_chars())
        .find(|&(lower, _)| lower == first)
        .map(|(_, upper)| upper);

    match upper {
        Some(upper) => {
            let mut out = String::with_capacity(target.len());
            out.push(upper);
            out.push_str(&target[first.len_utf8()..]);
            out
        }
        None => target.to_string(),
    }
}

/// KB-uppslag ovanpå synktjänsten
pub struct LookupService<'a> {
    sync: &'a SyncService,
}

impl<'a> LookupService<'a> {
    pub fn new(sync: &'a SyncService) -> Self {
        Self { sync }
    }

    /// Hitta KB-posten för en rå källfras
    pub async fn find_translation(
        &self,
        project: &Project,
        phrase: &str,
    ) -> AppResult<Option<TargetUnit>> {
        let key = normalize_key(phrase, project);
        if key.is_empty() {
            tracing::debug!("Tom uppslagsnyckel för {:?}", phrase);
            return Ok(None);
        }

        let query = Query::BySource {
            project_id: project.project_id.clone(),
            source: key,
            is_gloss: false,
        };
        Ok(self.sync.target_units().read(&query).await?.into_iter().next())
    }

    /// Vanligaste översättningen för en fras, med återställd versal
    pub async fn current_translation(
        &self,
        project: &Project,
        phrase: &SourcePhrase,
    ) -> AppResult<Option<String>> {
        let unit = self.find_translation(project, &phrase.source).await?;
        Ok(unit
            .as_ref()
            .and_then(|tu| tu.best_target())
            .map(|target| restore_case(&phrase.source, target, project)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::PunctPair;

    fn project_with_punct(chars: &[&str]) -> Project {
        let mut project = Project::new("Español", "English");
        project.punct_pairs = chars
            .iter()
            .map(|c| PunctPair {
                s: c.to_string(),
                t: c.to_string(),
            })
            .collect();
        project
    }

    #[test]
    fn test_trailing_trim_only_when_leading_not_in_set() {
        let project = project_with_punct(&["?", ".", "\"", "!"]);
        assert_eq!(normalize_key("¿Hola!", &project), "¿Hola");
    }

    #[test]
    fn test_only_punctuation_is_empty() {
        let project = project_with_punct(&["?", ".", "\"", "!"]);
        assert_eq!(normalize_key("?!.\"", &project), "");
        assert_eq!(normalize_key("", &project), "");
    }

    #[test]
    fn test_case_adjustment() {
        let mut project = project_with_punct(&["."]).with_case_pairs(&["aA", "cC"]);
        project.auto_capitalization = true;
        assert_eq!(normalize_key("Casa.", &project), "casa");

        project.auto_capitalization = false;
        assert_eq!(normalize_key("Casa", &project), "Casa");
    }

    #[test]
    fn test_first_case_pair_wins() {
        let mut project = Project::new("A", "B").with_case_pairs(&["xC", "cC"]);
        project.auto_capitalization = true;
        assert_eq!(normalize_key("Casa", &project), "xasa");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut project = Project::new("A", "B").with_case_pairs(&["aA", "cC", "éÉ"]);
        project.auto_capitalization = true;

        for input in ["\"Casa!\"", "Él.", "(agua)", "...", "casa"] {
            let once = normalize_key(input, &project);
            assert_eq!(normalize_key(&once, &project), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_multibyte_leading_char() {
        let mut project = Project::new("A", "B").with_case_pairs(&["éÉ"]);
        project.auto_capitalization = true;
        assert_eq!(normalize_key("Él", &project), "él");
    }

    #[test]
    fn test_restore_case() {
        let mut project = Project::new("A", "B").with_case_pairs(&["cC", "hH"]);
        project.auto_capitalization = true;
        assert_eq!(restore_case("Casa", "house", &project), "House");
        assert_eq!(restore_case("casa", "house", &project), "house");

        project.auto_capitalization = false;
        assert_eq!(restore_case("Casa", "house", &project), "house");
    }

    #[tokio::test]
    async fn test_find_translation() {
        let sync = SyncService::new(Database::open_in_memory().unwrap());
        let mut project = Project::new("Español", "English").with_case_pairs(&["cC", "hH"]);
        project.auto_capitalization = true;

        let mut unit = TargetUnit::new(&project.project_id, "casa", false);
        let _ = unit.confirm("house", "u1");
        let _ = unit.confirm("home", "u1");
        sync.target_units().create(unit.confirm("house", "u1").into_inner()).await.unwrap();

        let lookup = LookupService::new(&sync);
        let found = lookup.find_translation(&project, "Casa,").await.unwrap();
        assert_eq!(found.map(|tu| tu.tu_id), Some(unit.tu_id.clone()));

        assert!(lookup.find_translation(&project, "...").await.unwrap().is_none());
        assert!(lookup.find_translation(&project, "perro").await.unwrap().is_none());

        let phrase = SourcePhrase::new("c1", "v1", 1.0, "Casa");
        let target = lookup.current_translation(&project, &phrase).await.unwrap();
        assert_eq!(target.as_deref(), Some("House"));
    }
}
