use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::Result, genre::ensure_genre_link, trimmed_or_none, Error, Pool};

pub const MAX_COVER_BYTES: usize = 5 * 1024 * 1024;

/// Derives the stable book id from its title: lowercased, runs of
/// non-alphanumeric characters collapsed to a single `_`, leading and
/// trailing `_` stripped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Denormalized book as served to clients. `cover` is a base64 data-URI,
/// `genres` are sorted by name. `description` is left out of the
/// list-optimized variant.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cover: Option<String>,
    pub is_bookclub: bool,
    pub writer: Option<String>,
    pub author: Option<String>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: String,
    title: String,
    description: Option<String>,
    cover: Option<Vec<u8>>,
    is_bookclub: bool,
    writer: Option<String>,
    author: Option<String>,
    rating: Option<f64>,
}

impl BookRow {
    fn into_book(self, genres: Vec<String>) -> Book {
        Book {
            id: self.id,
            title: self.title,
            description: self.description,
            cover: self
                .cover
                .map(|bytes| format!("data:image/png;base64,{}", BASE64.encode(bytes))),
            is_bookclub: self.is_bookclub,
            writer: self.writer,
            author: self.author,
            rating: self.rating,
            genres,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CreateBook {
    pub title: String,
    pub description: Option<String>,
    pub cover: Option<Vec<u8>>,
    pub genres: Vec<String>,
    pub is_bookclub: bool,
    pub writer: Option<String>,
    pub author: Option<String>,
    pub rating: Option<f64>,
}

const LIST_SQL: &str = "SELECT id, title, description, cover, is_bookclub, writer, author, rating \
     FROM books ORDER BY title";

const LIST_OPTIMIZED_SQL: &str =
    "SELECT id, title, NULL AS description, cover, is_bookclub, writer, author, rating \
     FROM books ORDER BY title";

const LIST_BOOKCLUB_SQL: &str =
    "SELECT id, title, NULL AS description, cover, is_bookclub, writer, author, rating \
     FROM books WHERE is_bookclub = 1 ORDER BY title";

const SEARCH_SQL: &str = "SELECT id, title, description, cover, is_bookclub, writer, author, rating \
     FROM books WHERE title LIKE ? ORDER BY title";

const GET_SQL: &str = "SELECT id, title, description, cover, is_bookclub, writer, author, rating \
     FROM books WHERE id = ?";

pub struct BookRepository {
    pool: Pool,
}

impl BookRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(LIST_SQL)
            .fetch_all(&self.pool)
            .await?;
        self.attach_genres(rows).await
    }

    pub async fn list_optimized(&self, bookclub_only: bool) -> Result<Vec<Book>> {
        let sql = if bookclub_only {
            LIST_BOOKCLUB_SQL
        } else {
            LIST_OPTIMIZED_SQL
        };
        let rows = sqlx::query_as::<_, BookRow>(sql)
            .fetch_all(&self.pool)
            .await?;
        self.attach_genres(rows).await
    }

    /// Case-insensitive substring match on title. Blank queries are the
    /// caller's responsibility.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, BookRow>(SEARCH_SQL)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        self.attach_genres(rows).await
    }

    pub async fn get(&self, id: &str) -> Result<Book> {
        let row = sqlx::query_as::<_, BookRow>(GET_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))?;
        let genres = self.genres_of(id).await?;
        Ok(row.into_book(genres))
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let title = payload.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title is required".into()));
        }
        let id = slugify(title);
        if id.is_empty() {
            return Err(Error::Validation(
                "Title must contain at least one letter or digit".into(),
            ));
        }
        if let Some(rating) = payload.rating {
            if !(0.0..=5.0).contains(&rating) || (rating * 2.0).fract() != 0.0 {
                return Err(Error::Validation(
                    "Rating must be between 0 and 5 in half-point steps".into(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO books (id, title, description, cover, is_bookclub, writer, author, rating) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(title)
        .bind(payload.description.as_deref().map(str::trim).unwrap_or(""))
        .bind(&payload.cover)
        .bind(payload.is_bookclub)
        .bind(trimmed_or_none(payload.writer.as_deref()))
        .bind(trimmed_or_none(payload.author.as_deref()))
        .bind(payload.rating)
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(Error::DuplicateRecord(
                    "A book with this title already exists".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        for genre in &payload.genres {
            let name = genre.trim();
            if name.is_empty() {
                continue;
            }
            ensure_genre_link(&mut tx, &id, name).await?;
        }

        tx.commit().await?;
        debug!("Created book {id}");

        self.get(&id).await
    }

    /// Removes the book and, via cascades, its genre links and comments.
    /// Returns false when no such book existed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    async fn genres_of(&self, book_id: &str) -> Result<Vec<String>> {
        let genres = sqlx::query_scalar(
            "SELECT g.name FROM genres g \
             INNER JOIN book_genres bg ON g.id = bg.genre_id \
             WHERE bg.book_id = ? ORDER BY g.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    // One link query for the whole listing instead of a per-book lookup.
    async fn attach_genres(&self, rows: Vec<BookRow>) -> Result<Vec<Book>> {
        let links: Vec<(String, String)> = sqlx::query_as(
            "SELECT bg.book_id, g.name FROM book_genres bg \
             INNER JOIN genres g ON g.id = bg.genre_id ORDER BY g.name",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut genres: HashMap<String, Vec<String>> = HashMap::new();
        for (book_id, name) in links {
            genres.entry(book_id).or_default().push(name);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let book_genres = genres.remove(&row.id).unwrap_or_default();
                row.into_book(book_genres)
            })
            .collect())
    }
}
