use sqlx::Acquire;
use tracing::debug;

use crate::{error::Result, ChosenDB};

const TABLES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    cover BLOB,
    is_bookclub INTEGER NOT NULL DEFAULT 0,
    writer TEXT,
    author TEXT,
    rating REAL
);

CREATE TABLE IF NOT EXISTS genres (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS book_genres (
    book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, genre_id)
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_id TEXT NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    author TEXT,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

const INDEXES_DDL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_books_title ON books(title);
CREATE INDEX IF NOT EXISTS idx_book_genres_book_id ON book_genres(book_id);
CREATE INDEX IF NOT EXISTS idx_book_genres_genre_id ON book_genres(genre_id);
CREATE INDEX IF NOT EXISTS idx_comments_book_id ON comments(book_id);
CREATE INDEX IF NOT EXISTS idx_comments_book_created ON comments(book_id, created_at DESC);
"#;

// Columns added after the first release; databases created before them get
// them via additive ALTERs, never destructively.
const BOOK_COLUMNS: &[(&str, &str)] = &[
    (
        "is_bookclub",
        "ALTER TABLE books ADD COLUMN is_bookclub INTEGER NOT NULL DEFAULT 0",
    ),
    ("writer", "ALTER TABLE books ADD COLUMN writer TEXT"),
    ("author", "ALTER TABLE books ADD COLUMN author TEXT"),
    ("rating", "ALTER TABLE books ADD COLUMN rating REAL"),
];

/// Idempotently creates or upgrades the catalogue schema. Accepts the pool
/// or an open transaction.
pub async fn ensure_schema<'a, A>(conn: A) -> Result<()>
where
    A: Acquire<'a, Database = ChosenDB>,
{
    let mut conn = conn.acquire().await?;

    sqlx::raw_sql(TABLES_DDL).execute(&mut *conn).await?;

    let existing: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('books')")
        .fetch_all(&mut *conn)
        .await?;
    for (column, ddl) in BOOK_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            debug!("Adding missing books column {column}");
            sqlx::query(ddl).execute(&mut *conn).await?;
        }
    }

    sqlx::raw_sql(INDEXES_DDL).execute(&mut *conn).await?;

    Ok(())
}
