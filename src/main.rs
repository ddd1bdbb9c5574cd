//! Adapt Sync - Entry Point
//!
//! Öppnar lagret, kör schemat och skriver ut antal poster per entitetstyp.

use std::path::PathBuf;

use adapt_sync::db::Repository;
use adapt_sync::models::{AppSettings, EntityKind};
use adapt_sync::{Database, SyncService};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let settings = AppSettings::load();

    // Initiera logging
    tracing_subscriber::fmt()
        .with_max_level(settings.tracing_level())
        .with_target(false)
        .init();

    tracing::info!("Startar Adapt Sync v{}", env!("CARGO_PKG_VERSION"));

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => settings.database_path(),
    };

    let runtime = tokio::runtime::Runtime::new().context("Kunde inte starta tokio-runtime")?;
    runtime.block_on(run(path))
}

async fn run(path: PathBuf) -> anyhow::Result<()> {
    let db = Database::open(&path)
        .with_context(|| format!("Kunde inte öppna databasen {}", path.display()))?;
    let sync = SyncService::open(db)
        .await
        .context("Schemat kunde inte skapas")?;

    let db = sync.database();
    let counts = [
        (EntityKind::Project, db.projects().count()?),
        (EntityKind::Book, db.books().count()?),
        (EntityKind::Chapter, db.chapters().count()?),
        (EntityKind::SourcePhrase, db.source_phrases().count()?),
        (EntityKind::TargetUnit, db.target_units().count()?),
        (EntityKind::Bookmark, db.bookmarks().count()?),
        (EntityKind::User, db.users().count()?),
    ];

    println!("{}", path.display());
    for (kind, count) in counts {
        println!("  {:<14} {}", kind, count);
    }

    let user = sync.local_user().await?;
    tracing::info!("Lokal användare {}", user.user_id);

    Ok(())
}
