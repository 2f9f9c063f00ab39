use crate::{error::Result, ChosenDB, Pool};

pub struct GenreRepository {
    pool: Pool,
}

impl GenreRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        let genres = sqlx::query_scalar("SELECT DISTINCT name FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }
}

/// Creates the genre if it does not exist yet and links it to the book,
/// both with ignore-on-conflict semantics so repeated names are harmless.
/// Runs inside the caller's transaction.
pub async fn ensure_genre_link(
    tx: &mut sqlx::Transaction<'_, ChosenDB>,
    book_id: &str,
    name: &str,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO genres (name) VALUES (?)")
        .bind(name)
        .execute(&mut **tx)
        .await?;
    let genre_id: i64 = sqlx::query_scalar("SELECT id FROM genres WHERE name = ?")
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;
    sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
        .bind(book_id)
        .bind(genre_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
