use sqlx::Executor;

async fn raw_pool() -> bookclub_dal::Pool {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_idempotent() {
    let conn = raw_pool().await;
    bookclub_dal::schema::ensure_schema(&conn).await.unwrap();
    bookclub_dal::schema::ensure_schema(&conn).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&conn)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_additive_migration() {
    let conn = raw_pool().await;

    // books table from before the bookclub fields existed
    conn.execute(
        "CREATE TABLE books (id TEXT PRIMARY KEY, title TEXT NOT NULL, \
         description TEXT NOT NULL DEFAULT '', cover BLOB)",
    )
    .await
    .unwrap();
    conn.execute("INSERT INTO books (id, title) VALUES ('old', 'Old Book')")
        .await
        .unwrap();

    bookclub_dal::schema::ensure_schema(&conn).await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('books')")
        .fetch_all(&conn)
        .await
        .unwrap();
    for column in ["is_bookclub", "writer", "author", "rating"] {
        assert!(columns.iter().any(|c| c == column), "missing {column}");
    }

    // existing row survives with defaults
    let repo = bookclub_dal::book::BookRepository::new(conn);
    let book = repo.get("old").await.unwrap();
    assert_eq!(book.title, "Old Book");
    assert!(!book.is_bookclub);
    assert!(book.rating.is_none());
}

#[tokio::test]
async fn test_runs_in_transaction() {
    let conn = raw_pool().await;
    let mut tx = conn.begin().await.unwrap();
    bookclub_dal::schema::ensure_schema(&mut tx).await.unwrap();
    tx.commit().await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
        .fetch_one(&conn)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
