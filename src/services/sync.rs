//! Synkronisering mellan minnescachar och lagret.
//!
//! Varje entitetstyp har en `Collection` som äger sin cache och sitt
//! repository. Läsvägen:
//!
//! 1. `ById`: cachen först, annars en avgränsad läsning som fyller cachen.
//! 2. `ByProjectAndName`: tomt namn tömmer cachen och läser om hela tabellen.
//!    Ett icke-tomt namn söker i cachen; vid noll träffar samma omladdning.
//! 3. `ByProject`/`ByParentId`/`BySource`: cachen först, läsning vid miss.
//! 4. `ByParentIdList`: läser bara saknade föräldrar, i ett enda `IN (...)`.
//!
//! Lagringsanrop körs med `spawn_blocking`; cachelåsen hålls aldrig över
//! en `.await`.

use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use super::cache::CollectionCache;
use super::query::{Query, Request};
use crate::db::{
    BookRepository, BookmarkRepository, CascadeReport, ChapterRepository, Database,
    ProjectRepository, Repository, SourcePhraseRepository, TargetUnitRepository, UserRepository,
};
use crate::models::{
    Book, Bookmark, Change, Chapter, Entity, EntityKind, Project, SourcePhrase, TargetUnit, User,
};
use crate::utils::{AppError, AppResult};

const EVENT_CAPACITY: usize = 256;

/// Cacheändringar som vylagret kan prenumerera på
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Added { kind: EntityKind, key: String },
    Updated { kind: EntityKind, key: String },
    Removed { kind: EntityKind, key: String },
    Populated { kind: EntityKind, count: usize },
    Cleared { kind: EntityKind },
}

/// Kör ett lagringsanrop utanför exekveraren
async fn blocking<R, V, F>(repo: &R, f: F) -> AppResult<V>
where
    R: Clone + Send + 'static,
    V: Send + 'static,
    F: FnOnce(R) -> AppResult<V> + Send + 'static,
{
    let repo = repo.clone();
    tokio::task::spawn_blocking(move || f(repo))
        .await
        .map_err(|e| AppError::persistence(format!("bakgrundsjobb avbröts: {}", e)))?
}

fn logged<V>(kind: EntityKind, op: &str, result: AppResult<V>) -> AppResult<V> {
    if let Err(e) = &result {
        tracing::warn!("{} {} misslyckades: {}", kind, op, e);
    }
    result
}

pub struct Collection<T: Entity, R: Repository<T>> {
    repo: R,
    cache: Arc<RwLock<CollectionCache<T>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<T: Entity, R: Repository<T>> Collection<T, R> {
    fn new(repo: R, events: broadcast::Sender<CacheEvent>) -> Self {
        Self {
            repo,
            cache: Arc::new(RwLock::new(CollectionCache::new())),
            events,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn emit(&self, event: CacheEvent) {
        // Inga prenumeranter är inget fel
        let _ = self.events.send(event);
    }

    fn with_cache<V>(&self, f: impl FnOnce(&CollectionCache<T>) -> V) -> AppResult<V> {
        let cache = self
            .cache
            .read()
            .map_err(|_| AppError::persistence(format!("cachelåset för {} är förgiftat", T::KIND)))?;
        Ok(f(&cache))
    }

    fn with_cache_mut<V>(&self, f: impl FnOnce(&mut CollectionCache<T>) -> V) -> AppResult<V> {
        let mut cache = self
            .cache
            .write()
            .map_err(|_| AppError::persistence(format!("cachelåset för {} är förgiftat", T::KIND)))?;
        Ok(f(&mut cache))
    }

    fn cached_matching(&self, query: &Query) -> AppResult<Vec<T>> {
        let mut hits = self.with_cache(|c| c.filter(|e| query.matches(e)))?;
        hits.sort_by(|a, b| a.sort_cmp(b));
        Ok(hits)
    }

    /// Antal poster i minnet
    pub fn cached_len(&self) -> AppResult<usize> {
        self.with_cache(|c| c.len())
    }

    pub fn is_cached(&self, key: &str) -> AppResult<bool> {
        self.with_cache(|c| c.has(key))
    }

    /// Läs enligt frågans typ; se modulkommentaren för ordningen
    pub async fn read(&self, query: &Query) -> AppResult<Vec<T>> {
        query.to_predicate::<T>()?;

        match query {
            Query::ById(id) => {
                if let Some(hit) = self.with_cache(|c| c.get(id).cloned())? {
                    tracing::debug!("{}: cacheträff för {}", T::KIND, id);
                    return Ok(vec![hit]);
                }
                self.load(query).await
            }
            Query::ByProjectAndName { .. } => {
                if !query.is_invalidation() {
                    let hits = self.cached_matching(query)?;
                    if !hits.is_empty() {
                        tracing::debug!("{}: {} namnträffar i cachen", T::KIND, hits.len());
                        return Ok(hits);
                    }
                }
                self.reload_all().await?;
                self.cached_matching(query)
            }
            Query::ByParentIdList(ids) => {
                let missing: Vec<String> = self.with_cache(|c| {
                    ids.iter()
                        .filter(|id| c.filter(|e| e.parent_id() == Some(id.as_str())).is_empty())
                        .cloned()
                        .collect()
                })?;
                if !missing.is_empty() {
                    tracing::debug!("{}: {} föräldrar saknas i cachen", T::KIND, missing.len());
                    self.load(&Query::ByParentIdList(missing)).await?;
                }
                self.cached_matching(query)
            }
            Query::All => self.load(query).await,
            Query::ByProject(_) | Query::ByParentId(_) | Query::BySource { .. } => {
                let hits = self.cached_matching(query)?;
                if !hits.is_empty() {
                    tracing::debug!("{}: {} träffar i cachen", T::KIND, hits.len());
                    return Ok(hits);
                }
                self.load(query).await
            }
        }
    }

    /// Läs från lagret och fyll cachen med resultatet
    async fn load(&self, query: &Query) -> AppResult<Vec<T>> {
        let predicate = query.to_predicate::<T>()?;
        let rows = logged(
            T::KIND,
            "läsning",
            blocking(&self.repo, move |repo| repo.select_where(&predicate)).await,
        )?;

        let added = self.with_cache_mut(|c| c.add_all(rows.iter().cloned()))?;
        tracing::debug!("{}: cachemiss, {} rader lästa, {} nya", T::KIND, rows.len(), added);
        self.emit(CacheEvent::Populated {
            kind: T::KIND,
            count: rows.len(),
        });

        Ok(rows)
    }

    /// Töm cachen och läs om hela tabellen
    async fn reload_all(&self) -> AppResult<()> {
        self.invalidate()?;
        self.load(&Query::All).await?;
        Ok(())
    }

    /// Hämta en post; tomt resultat blir `NotFound`
    pub async fn get(&self, id: &str) -> AppResult<T> {
        self.read(&Query::ById(id.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("{} {}", T::KIND, id)))
    }

    pub async fn create(&self, entity: T) -> AppResult<T> {
        let row = entity.clone();
        logged(
            T::KIND,
            "skapa",
            blocking(&self.repo, move |repo| repo.insert(&row)).await,
        )?;

        let key = entity.key().to_string();
        self.with_cache_mut(|c| c.add(entity.clone()))?;
        self.emit(CacheEvent::Added { kind: T::KIND, key });
        Ok(entity)
    }

    pub async fn update(&self, entity: T) -> AppResult<T> {
        let row = entity.clone();
        logged(
            T::KIND,
            "uppdatera",
            blocking(&self.repo, move |repo| repo.update(&row)).await,
        )?;

        let key = entity.key().to_string();
        self.with_cache_mut(|c| c.add(entity.clone()))?;
        self.emit(CacheEvent::Updated { kind: T::KIND, key });
        Ok(entity)
    }

    /// Spara en ändring från en mutator
    pub async fn commit(&self, change: Change<T>) -> AppResult<T> {
        self.update(change.into_inner()).await
    }

    /// Ta bort en post. Saknas raden i lagret släpps även den cachade kopian.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let key = id.to_string();
        let result = logged(
            T::KIND,
            "ta bort",
            blocking(&self.repo, move |repo| repo.delete_by_id(&key)).await,
        );

        let gone = match &result {
            Ok(()) => true,
            Err(e) => e.is_not_found(),
        };
        if gone {
            let cached = self.with_cache_mut(|c| c.remove(id))?;
            if result.is_ok() || cached.is_some() {
                self.emit(CacheEvent::Removed {
                    kind: T::KIND,
                    key: id.to_string(),
                });
            }
        }
        result
    }

    /// Släpp minnesindexet. Lagret påverkas inte.
    pub fn invalidate(&self) -> AppResult<()> {
        self.with_cache_mut(|c| c.clear())?;
        tracing::debug!("{}: cachen tömd", T::KIND);
        self.emit(CacheEvent::Cleared { kind: T::KIND });
        Ok(())
    }

    /// Töm både lagret och cachen
    pub async fn clear_all(&self) -> AppResult<usize> {
        let rows = logged(
            T::KIND,
            "tömning",
            blocking(&self.repo, |repo| repo.clear_all()).await,
        )?;
        self.invalidate()?;
        Ok(rows)
    }

    /// Hantera en förfrågan från vylagret
    pub async fn dispatch(&self, request: Request<T>) -> AppResult<Vec<T>> {
        match request {
            Request::Create(entity) => Ok(vec![self.create(entity).await?]),
            Request::Read(query) => self.read(&query).await,
            Request::Update(entity) => Ok(vec![self.update(entity).await?]),
            Request::Delete(id) => {
                self.delete(&id).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Släpp cachade poster som inte uppfyller villkoret
    fn evict(&self, keep: impl Fn(&T) -> bool) -> AppResult<usize> {
        let removed = self.with_cache_mut(|c| c.retain(keep))?;
        for entity in &removed {
            self.emit(CacheEvent::Removed {
                kind: T::KIND,
                key: entity.key().to_string(),
            });
        }
        Ok(removed.len())
    }

    /// Poster som redan är borta ur lagret
    fn forget(&self, keys: &[String]) -> AppResult<()> {
        for key in keys {
            self.with_cache_mut(|c| c.remove(key))?;
            self.emit(CacheEvent::Removed {
                kind: T::KIND,
                key: key.clone(),
            });
        }
        Ok(())
    }
}

/// Äger lagringshandtaget och en cache per entitetstyp
pub struct SyncService {
    db: Database,
    projects: Collection<Project, ProjectRepository>,
    books: Collection<Book, BookRepository>,
    chapters: Collection<Chapter, ChapterRepository>,
    source_phrases: Collection<SourcePhrase, SourcePhraseRepository>,
    target_units: Collection<TargetUnit, TargetUnitRepository>,
    bookmarks: Collection<Bookmark, BookmarkRepository>,
    users: Collection<User, UserRepository>,
    events: broadcast::Sender<CacheEvent>,
}

impl SyncService {
    /// Skapa tjänsten över en redan migrerad databas
    pub fn new(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            projects: Collection::new(db.projects(), events.clone()),
            books: Collection::new(db.books(), events.clone()),
            chapters: Collection::new(db.chapters(), events.clone()),
            source_phrases: Collection::new(db.source_phrases(), events.clone()),
            target_units: Collection::new(db.target_units(), events.clone()),
            bookmarks: Collection::new(db.bookmarks(), events.clone()),
            users: Collection::new(db.users(), events.clone()),
            events,
            db,
        }
    }

    /// Kör schemaskapandet och skapa tjänsten
    pub async fn open(db: Database) -> AppResult<Self> {
        let handle = db.clone();
        tokio::task::spawn_blocking(move || handle.migrate())
            .await
            .map_err(|e| AppError::schema("schema_migrations", e))??;
        Ok(Self::new(db))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn projects(&self) -> &Collection<Project, ProjectRepository> {
        &self.projects
    }

    pub fn books(&self) -> &Collection<Book, BookRepository> {
        &self.books
    }

    pub fn chapters(&self) -> &Collection<Chapter, ChapterRepository> {
        &self.chapters
    }

    pub fn source_phrases(&self) -> &Collection<SourcePhrase, SourcePhraseRepository> {
        &self.source_phrases
    }

    pub fn target_units(&self) -> &Collection<TargetUnit, TargetUnitRepository> {
        &self.target_units
    }

    pub fn bookmarks(&self) -> &Collection<Bookmark, BookmarkRepository> {
        &self.bookmarks
    }

    pub fn users(&self) -> &Collection<User, UserRepository> {
        &self.users
    }

    /// Enhetens användare, skapas vid första anropet
    pub async fn local_user(&self) -> AppResult<User> {
        if let Some(user) = self.users.with_cache(|c| c.first().cloned())? {
            return Ok(user);
        }

        let user = logged(
            EntityKind::User,
            "hämtning",
            blocking(self.users.repository(), |repo| repo.get_or_create()).await,
        )?;
        self.users.with_cache_mut(|c| c.add(user.clone()))?;
        self.users.emit(CacheEvent::Populated {
            kind: EntityKind::User,
            count: 1,
        });
        Ok(user)
    }

    /// Massinläsning av fraser i en transaktion.
    ///
    /// Cachen rörs inte; anroparen ska köra `invalidate_source_phrases`.
    pub async fn insert_phrases(&self, phrases: Vec<SourcePhrase>) -> AppResult<usize> {
        logged(
            EntityKind::SourcePhrase,
            "batchinläsning",
            blocking(self.source_phrases.repository(), move |repo| repo.insert_batch(&phrases)).await,
        )
    }

    /// Massborttagning per versintervall. Cachen rörs inte.
    pub async fn delete_phrases(&self, phrases: Vec<SourcePhrase>) -> AppResult<usize> {
        logged(
            EntityKind::SourcePhrase,
            "batchborttagning",
            blocking(self.source_phrases.repository(), move |repo| repo.delete_batch(&phrases)).await,
        )
    }

    pub fn invalidate_source_phrases(&self) -> AppResult<()> {
        self.source_phrases.invalidate()
    }

    /// Ta bort en bok med kapitel och fraser, både i lagret och i cacharna
    ///
    /// Kapitlen som rensas ur cacharna är de som transaktionen själv tog bort.
    pub async fn delete_book(&self, book_id: &str) -> AppResult<CascadeReport> {
        let id = book_id.to_string();
        let report = logged(
            EntityKind::Book,
            "kaskadborttagning",
            blocking(self.books.repository(), move |repo| repo.delete_cascade(&id)).await,
        )?;

        let phrases = self
            .source_phrases
            .evict(|p| !report.chapter_ids.contains(&p.chapter_id))?;
        self.chapters.forget(&report.chapter_ids)?;
        self.books.forget(&[book_id.to_string()])?;
        tracing::debug!("Släppte {} cachade fraser för bok {}", phrases, book_id);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SyncService {
        SyncService::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_read_after_create_cold_and_warm() {
        let sync = service();
        let book = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        sync.books().create(book.clone()).await.unwrap();

        // Varm cache
        let warm = sync.books().read(&Query::ById(book.book_id.clone())).await.unwrap();
        assert_eq!(warm, vec![book.clone()]);

        // Kall cache
        sync.books().invalidate().unwrap();
        let cold = sync.books().read(&Query::ById(book.book_id.clone())).await.unwrap();
        assert_eq!(cold, vec![book.clone()]);
        assert!(sync.books().is_cached(&book.book_id).unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let sync = service();
        let err = sync.chapters().get("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_name_reloads_from_storage() {
        let sync = service();
        let mark = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        sync.books().create(mark.clone()).await.unwrap();

        // Skrivet direkt i lagret, förbi cachen
        let john = Book::new("p1", "JHN", "John", "jhn.sfm");
        sync.database().books().insert(&john).unwrap();

        let all = sync.books().read(&Query::by_name("")).await.unwrap();
        assert_eq!(all.len(), 2);

        let found = sync.books().read(&Query::by_name("john")).await.unwrap();
        assert_eq!(found, vec![john]);
    }

    #[tokio::test]
    async fn test_name_miss_falls_through_to_storage() {
        let sync = service();
        sync.books().create(Book::new("p1", "MRK", "Mark", "mrk.sfm")).await.unwrap();

        let luke = Book::new("p1", "LUK", "Luke", "luk.sfm");
        sync.database().books().insert(&luke).unwrap();

        // Cachen har bara Mark; noll träffar ger omladdning
        let found = sync.books().read(&Query::by_name("LUK")).await.unwrap();
        assert_eq!(found, vec![luke]);
        assert_eq!(sync.books().cached_len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_drops_deleted_rows() {
        let sync = service();
        let mark = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        sync.books().create(mark.clone()).await.unwrap();

        sync.database().books().delete_by_id(&mark.book_id).unwrap();

        assert!(sync.books().read(&Query::by_name("")).await.unwrap().is_empty());
        assert!(sync.books().read(&Query::by_name("mark")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_project_scope_uses_cache_when_populated() {
        let sync = service();
        sync.books().create(Book::new("p1", "MRK", "Mark", "mrk.sfm")).await.unwrap();
        sync.database()
            .books()
            .insert(&Book::new("p1", "LUK", "Luke", "luk.sfm"))
            .unwrap();

        // Ingen omladdning när cachen redan har projektets böcker
        let cached = sync.books().read(&Query::ByProject("p1".into())).await.unwrap();
        assert_eq!(cached.len(), 1);

        let other = sync.books().read(&Query::ByProject("p2".into())).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_parent_list_loads_only_missing() {
        let sync = service();
        let phrases: Vec<SourcePhrase> = ["c1", "c2", "c3"]
            .iter()
            .enumerate()
            .map(|(i, c)| SourcePhrase::new(c, &format!("v{}", i), i as f64, "palabra"))
            .collect();
        sync.insert_phrases(phrases).await.unwrap();

        let first = sync
            .source_phrases()
            .read(&Query::ByParentId("c1".into()))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let merged = sync
            .source_phrases()
            .read(&Query::ByParentIdList(vec!["c1".into(), "c3".into()]))
            .await
            .unwrap();
        assert_eq!(merged.len(), 2);
        assert!(merged[0].norder < merged[1].norder);
        assert_eq!(sync.source_phrases().cached_len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_query_is_validation_error() {
        let sync = service();
        let err = sync
            .source_phrases()
            .read(&Query::ByProject("p1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_concurrent_misses_do_not_duplicate() {
        let sync = service();
        let chapter = Chapter::new("b1", "p1", "Mark 1");
        sync.database().chapters().insert(&chapter).unwrap();

        let query = Query::ById(chapter.chapter_id.clone());
        let (a, b) = tokio::join!(sync.chapters().read(&query), sync.chapters().read(&query));

        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(sync.chapters().cached_len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_leaves_cache_alone() {
        let sync = service();
        let phrase = SourcePhrase::new("c1", "v1", 1.0, "uno");
        sync.source_phrases().create(phrase.clone()).await.unwrap();

        sync.delete_phrases(vec![phrase.clone()]).await.unwrap();
        assert!(sync.source_phrases().is_cached(&phrase.sp_id).unwrap());

        sync.invalidate_source_phrases().unwrap();
        let found = sync
            .source_phrases()
            .read(&Query::ByParentId("c1".into()))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let sync = service();
        let mut phrases: Vec<SourcePhrase> = (0..5)
            .map(|i| SourcePhrase::new("c1", "v1", i as f64, "x"))
            .collect();
        phrases[4].sp_id = phrases[0].sp_id.clone();

        let err = sync.insert_phrases(phrases).await.unwrap_err();
        assert!(matches!(err, AppError::Batch { .. }));

        sync.invalidate_source_phrases().unwrap();
        assert!(sync.source_phrases().read(&Query::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_and_events() {
        let sync = service();
        let mut events = sync.subscribe();

        let mut chapter = Chapter::new("b1", "p1", "Mark 1");
        sync.chapters().create(chapter.clone()).await.unwrap();
        sync.chapters().commit(chapter.mark_adapted(7)).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            CacheEvent::Added {
                kind: EntityKind::Chapter,
                key: chapter.chapter_id.clone()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CacheEvent::Updated {
                kind: EntityKind::Chapter,
                key: chapter.chapter_id.clone()
            }
        );

        sync.chapters().invalidate().unwrap();
        let stored = sync.chapters().get(&chapter.chapter_id).await.unwrap();
        assert_eq!(stored.last_adapted, 7);
    }

    #[tokio::test]
    async fn test_dispatch_request_shapes() {
        let sync = service();
        let bookmark = Bookmark::from_legacy(&Project::new("A", "B"));
        let id = bookmark.bookmark_id.clone();

        let created = sync.bookmarks().dispatch(Request::Create(bookmark)).await.unwrap();
        assert_eq!(created.len(), 1);

        let read = sync
            .bookmarks()
            .dispatch(Request::Read(Query::ById(id.clone())))
            .await
            .unwrap();
        assert_eq!(read[0].bookmark_id, id);

        let deleted = sync.bookmarks().dispatch(Request::Delete(id.clone())).await.unwrap();
        assert!(deleted.is_empty());
        assert!(!sync.bookmarks().is_cached(&id).unwrap());

        let err = sync.bookmarks().dispatch(Request::Delete(id)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_clear_all_is_destructive_invalidate_is_not() {
        let sync = service();
        sync.chapters().create(Chapter::new("b1", "p1", "a")).await.unwrap();

        sync.chapters().invalidate().unwrap();
        assert_eq!(sync.database().chapters().count().unwrap(), 1);

        assert_eq!(sync.chapters().clear_all().await.unwrap(), 1);
        assert_eq!(sync.database().chapters().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_book_cascades_and_evicts() {
        let sync = service();
        let mut book = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        let chapter = Chapter::new(&book.book_id, "p1", "Mark 1");
        let _ = book.add_chapter(&chapter.chapter_id);
        sync.books().create(book.clone()).await.unwrap();
        sync.chapters().create(chapter.clone()).await.unwrap();
        sync.insert_phrases(vec![
            SourcePhrase::new(&chapter.chapter_id, "v1", 1.0, "a"),
            SourcePhrase::new(&chapter.chapter_id, "v1", 2.0, "b"),
        ])
        .await
        .unwrap();
        sync.source_phrases()
            .read(&Query::ByParentId(chapter.chapter_id.clone()))
            .await
            .unwrap();

        let report = sync.delete_book(&book.book_id).await.unwrap();
        assert_eq!(report.phrases, 2);
        assert_eq!(report.chapters, 1);
        assert_eq!(report.chapter_ids, vec![chapter.chapter_id.clone()]);

        assert_eq!(sync.source_phrases().cached_len().unwrap(), 0);
        assert!(!sync.chapters().is_cached(&chapter.chapter_id).unwrap());
        assert!(sync.books().get(&book.book_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_book_publishes_removals() {
        let sync = service();
        let book = Book::new("p1", "MRK", "Mark", "mrk.sfm");
        let chapter = Chapter::new(&book.book_id, "p1", "Mark 1");
        let phrase = SourcePhrase::new(&chapter.chapter_id, "v1", 1.0, "a");
        sync.books().create(book.clone()).await.unwrap();
        sync.chapters().create(chapter.clone()).await.unwrap();
        sync.source_phrases().create(phrase.clone()).await.unwrap();

        let mut events = sync.subscribe();
        sync.delete_book(&book.book_id).await.unwrap();

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }

        for expected in [
            CacheEvent::Removed {
                kind: EntityKind::SourcePhrase,
                key: phrase.sp_id.clone(),
            },
            CacheEvent::Removed {
                kind: EntityKind::Chapter,
                key: chapter.chapter_id.clone(),
            },
            CacheEvent::Removed {
                kind: EntityKind::Book,
                key: book.book_id.clone(),
            },
        ] {
            assert!(received.contains(&expected), "saknar {:?} i {:?}", expected, received);
        }
    }

    #[tokio::test]
    async fn test_delete_of_missing_row_drops_cached_copy() {
        let sync = service();
        let chapter = Chapter::new("b1", "p1", "Mark 1");
        sync.chapters().create(chapter.clone()).await.unwrap();

        sync.database().chapters().delete_by_id(&chapter.chapter_id).unwrap();

        let err = sync.chapters().delete(&chapter.chapter_id).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!sync.chapters().is_cached(&chapter.chapter_id).unwrap());
        assert!(sync.chapters().get(&chapter.chapter_id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_create_is_persistence_error() {
        let sync = service();
        let chapter = Chapter::new("b1", "p1", "Mark 1");
        sync.chapters().create(chapter.clone()).await.unwrap();

        let mut duplicate = chapter.clone();
        duplicate.name = "Mark 1 (kopia)".into();
        let err = sync.chapters().create(duplicate).await.unwrap_err();
        match err {
            AppError::Persistence(msg) => assert!(msg.contains("UNIQUE"), "{}", msg),
            other => panic!("fel sort: {:?}", other),
        }

        assert_eq!(sync.chapters().cached_len().unwrap(), 1);
        let cached = sync.chapters().get(&chapter.chapter_id).await.unwrap();
        assert_eq!(cached.name, "Mark 1");
    }

    #[tokio::test]
    async fn test_failed_update_leaves_cache_alone() {
        let sync = service();
        let chapter = Chapter::new("b1", "p1", "Mark 1");

        let err = sync.chapters().update(chapter.clone()).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sync.chapters().cached_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_local_user_created_once() {
        let sync = service();
        let first = sync.local_user().await.unwrap();
        sync.users().invalidate().unwrap();
        let second = sync.local_user().await.unwrap();
        assert_eq!(first.user_id, second.user_id);
    }

    #[tokio::test]
    async fn test_open_runs_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("store.db")).unwrap();
        let sync = SyncService::open(db).await.unwrap();
        assert!(sync.projects().read(&Query::All).await.unwrap().is_empty());
    }
}
