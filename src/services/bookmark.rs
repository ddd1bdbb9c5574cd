//! Aktuell position per projekt.
//!
//! Varje projekt har exakt ett bokmärke som flyttas över tid. Användarens
//! lista med bokmärkes-id avgör vilket som är aktuellt.

use super::query::Query;
use super::sync::SyncService;
use crate::models::{Bookmark, Chapter, Project, User};
use crate::utils::{AppError, AppResult};

pub struct BookmarkReconciler<'a> {
    sync: &'a SyncService,
    current: Option<Bookmark>,
}

impl<'a> BookmarkReconciler<'a> {
    pub fn new(sync: &'a SyncService) -> Self {
        Self { sync, current: None }
    }

    pub fn current(&self) -> Option<&Bookmark> {
        self.current.as_ref()
    }

    /// Välj aktuellt bokmärke för ett projekt som aktiveras
    pub async fn reconcile(&mut self, active: &Project) -> AppResult<Bookmark> {
        let mut user = self.sync.local_user().await?;

        let current = if user.bookmarks.is_empty() {
            self.synthesize_all(active, &mut user).await?
        } else {
            self.select_existing(active, &mut user).await?
        };

        tracing::info!(
            "Aktuellt bokmärke för {}: {} ({})",
            active.name,
            current.bookmark_id,
            current.name
        );
        self.current = Some(current.clone());
        Ok(current)
    }

    /// Första aktiveringen: ett bokmärke per projekt
    async fn synthesize_all(&self, active: &Project, user: &mut User) -> AppResult<Bookmark> {
        let mut projects = self.sync.projects().read(&Query::All).await?;
        if !projects.iter().any(|p| p.project_id == active.project_id) {
            projects.push(active.clone());
        }

        let mut current = None;
        for project in &projects {
            let bookmark = self.synthesize(project).await?;
            let _ = user.add_bookmark(&bookmark.bookmark_id);
            if project.project_id == active.project_id {
                current = Some(bookmark);
            }
        }
        self.sync.users().update(user.clone()).await?;
        tracing::debug!("Skapade {} bokmärken", projects.len());

        current.ok_or_else(|| AppError::not_found(format!("bokmärke för {}", active.project_id)))
    }

    async fn select_existing(&self, active: &Project, user: &mut User) -> AppResult<Bookmark> {
        let found = self
            .sync
            .bookmarks()
            .read(&Query::ByProject(active.project_id.clone()))
            .await?;

        if found.is_empty() {
            tracing::warn!(
                "Användaren har bokmärken men inget för {}, skapar nytt",
                active.project_id
            );
            let bookmark = self.synthesize(active).await?;
            self.sync.users().commit(user.add_bookmark(&bookmark.bookmark_id)).await?;
            return Ok(bookmark);
        }

        if let Some(hit) = found.iter().find(|b| user.has_bookmark(&b.bookmark_id)) {
            return Ok(hit.clone());
        }

        // Användarens lista uppdateras inte här
        tracing::warn!(
            "Inget bokmärke för {} finns i användarens lista, väljer det första",
            active.project_id
        );
        Ok(found.into_iter().next().unwrap_or_default())
    }

    /// Bokmärke från äldre positionsfält, annars projektets första kapitel
    async fn synthesize(&self, project: &Project) -> AppResult<Bookmark> {
        let mut bookmark = Bookmark::from_legacy(project);
        if bookmark.is_blank() {
            let chapters = self
                .sync
                .chapters()
                .read(&Query::ByProject(project.project_id.clone()))
                .await?;
            if let Some(first) = chapters.first() {
                bookmark = Bookmark::starting_at(project, first);
            }
        }
        self.sync.bookmarks().create(bookmark).await
    }

    /// Flytta aktuellt bokmärke till ett kapitel, på plats
    pub async fn move_to(&mut self, chapter: &Chapter, sp_id: Option<&str>) -> AppResult<Bookmark> {
        let bookmark = self
            .current
            .as_mut()
            .ok_or_else(|| AppError::not_found("aktuellt bokmärke"))?;
        let change = bookmark.move_to(chapter, sp_id);
        self.sync.bookmarks().commit(change).await
    }
}
