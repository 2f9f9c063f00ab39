use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bookclub_dal::{book::BookRepository, genre::ensure_genre_link, ChosenDB, Pool};

use crate::{error::Result, frontmatter::parse_metadata};

/// Result of one seeding attempt. Failures are reported here instead of
/// raised, so a broken seed never takes the process down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

impl SeedOutcome {
    fn success(message: String) -> Self {
        Self {
            success: true,
            message,
            skipped: false,
        }
    }

    fn skipped() -> Self {
        Self {
            success: true,
            message: "Database already initialized".to_string(),
            skipped: true,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            skipped: false,
        }
    }
}

pub struct SeedLoader {
    pool: Pool,
    books_dir: PathBuf,
}

impl SeedLoader {
    pub fn new(pool: Pool, books_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            books_dir: books_dir.into(),
        }
    }

    /// Imports books from the seed directory. Without `force` a populated
    /// store is left untouched; with `force` all catalogue rows are replaced.
    pub async fn initialize(&self, force: bool) -> SeedOutcome {
        if !self.books_dir.is_dir() {
            warn!("Books directory {:?} not found", self.books_dir);
            return SeedOutcome::failure("Books directory not found");
        }

        if !force {
            let books = BookRepository::new(self.pool.clone());
            match books.is_empty().await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("Database already initialized, skipping");
                    return SeedOutcome::skipped();
                }
                Err(e) => return SeedOutcome::failure(e.to_string()),
            }
        }

        match self.import(force).await {
            Ok(count) => {
                info!("Database initialized with {count} books");
                SeedOutcome::success(format!("Database initialized with {count} books"))
            }
            Err(e) => {
                warn!("Seed import failed: {e}");
                SeedOutcome::failure(e.to_string())
            }
        }
    }

    // Whole batch in one transaction, including the force cleanup; a failing
    // folder rolls everything back.
    async fn import(&self, force: bool) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        if force {
            info!("Force initialization, clearing existing data");
            sqlx::query("DELETE FROM book_genres").execute(&mut *tx).await?;
            sqlx::query("DELETE FROM genres").execute(&mut *tx).await?;
            sqlx::query("DELETE FROM books").execute(&mut *tx).await?;
            reset_sequences(&mut tx).await?;
        }

        let mut folders = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.books_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                folders.push(entry.path());
            }
        }
        folders.sort();

        for folder in folders {
            import_folder(&mut tx, &folder).await?;
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(count)
    }
}

// The sequence table only exists once an AUTOINCREMENT table got a row.
async fn reset_sequences(tx: &mut sqlx::Transaction<'_, ChosenDB>) -> Result<()> {
    let has_sequence: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
    )
    .fetch_optional(&mut **tx)
    .await?;
    if has_sequence.is_some() {
        sqlx::query("DELETE FROM sqlite_sequence WHERE name IN ('genres', 'comments')")
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn import_folder(tx: &mut sqlx::Transaction<'_, ChosenDB>, folder: &Path) -> Result<()> {
    let description_path = folder.join("description.md");
    if !tokio::fs::try_exists(&description_path).await? {
        debug!("Skipping {:?}, no description.md", folder);
        return Ok(());
    }

    // folder name is the book's stable id
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let text = tokio::fs::read_to_string(&description_path).await?;
    let (meta, _body) = parse_metadata(&text);

    let cover_path = folder.join("cover.png");
    let cover = if tokio::fs::try_exists(&cover_path).await? {
        Some(tokio::fs::read(&cover_path).await?)
    } else {
        None
    };

    let title = meta.title.unwrap_or_else(|| folder_name.clone());

    // last seed wins on id conflict
    sqlx::query(
        "INSERT INTO books (id, title, description, cover, is_bookclub, writer, author, rating) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
           title = excluded.title, description = excluded.description, \
           cover = excluded.cover, is_bookclub = excluded.is_bookclub, \
           writer = excluded.writer, author = excluded.author, rating = excluded.rating",
    )
    .bind(&folder_name)
    .bind(&title)
    .bind(meta.description.as_deref().unwrap_or(""))
    .bind(&cover)
    .bind(meta.is_bookclub)
    .bind(&meta.writer)
    .bind(&meta.author)
    .bind(meta.rating)
    .execute(&mut **tx)
    .await?;

    for genre in &meta.genres {
        let name = genre.trim();
        if name.is_empty() {
            continue;
        }
        ensure_genre_link(tx, &folder_name, name).await?;
    }

    debug!("Imported book {folder_name}");
    Ok(())
}
