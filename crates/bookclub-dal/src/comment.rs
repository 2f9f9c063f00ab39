use serde::{Deserialize, Serialize};

use crate::{error::Result, trimmed_or_none, Error, Pool};

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub book_id: String,
    pub author: Option<String>,
    pub text: String,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreateComment {
    pub author: Option<String>,
    pub text: String,
}

pub struct CommentRepository {
    pool: Pool,
}

impl CommentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Comments for one book, newest first.
    pub async fn list(&self, book_id: &str) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as(
            "SELECT id, book_id, author, text, created_at FROM comments \
             WHERE book_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        sqlx::query_as("SELECT id, book_id, author, text, created_at FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Comment {id}")))
    }

    /// Stores a trimmed comment; blank author becomes null. Does not check
    /// the book exists - a bad id surfaces as the foreign key constraint.
    pub async fn create(&self, book_id: &str, payload: CreateComment) -> Result<Comment> {
        let text = payload.text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Comment text is required".into()));
        }
        let author = trimmed_or_none(payload.author.as_deref());

        let result = sqlx::query("INSERT INTO comments (book_id, author, text) VALUES (?, ?, ?)")
            .bind(book_id)
            .bind(&author)
            .bind(text)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }
}
