use bookclub_dal::book::{BookRepository, CreateBook};
use bookclub_dal::comment::{CommentRepository, CreateComment};
use bookclub_dal::Error;
use sqlx::Executor;

async fn init_db() -> bookclub_dal::Pool {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    bookclub_dal::schema::ensure_schema(&conn).await.unwrap();
    conn
}

async fn with_book(conn: &bookclub_dal::Pool) -> String {
    let repo = BookRepository::new(conn.clone());
    repo.create(CreateBook {
        title: "Dune".to_string(),
        ..Default::default()
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_comment_trimming() {
    let conn = init_db().await;
    let book_id = with_book(&conn).await;
    let repo = CommentRepository::new(conn);

    let comment = repo
        .create(
            &book_id,
            CreateComment {
                author: Some(" Al ".to_string()),
                text: " Great book ".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.author.as_deref(), Some("Al"));
    assert_eq!(comment.text, "Great book");
    assert_eq!(comment.book_id, book_id);

    // blank author stored as null
    let anonymous = repo
        .create(
            &book_id,
            CreateComment {
                author: Some("   ".to_string()),
                text: "Anonymous opinion".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(anonymous.author.is_none());
}

#[tokio::test]
async fn test_blank_text_rejected() {
    let conn = init_db().await;
    let book_id = with_book(&conn).await;
    let repo = CommentRepository::new(conn);

    let err = repo
        .create(
            &book_id,
            CreateComment {
                author: None,
                text: "   ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_newest_first() {
    let conn = init_db().await;
    let book_id = with_book(&conn).await;
    let repo = CommentRepository::new(conn);

    for text in ["first", "second", "third"] {
        repo.create(
            &book_id,
            CreateComment {
                author: None,
                text: text.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let comments = repo.list(&book_id).await.unwrap();
    assert_eq!(comments.len(), 3);
    // same timestamp granularity, so id breaks the tie
    assert_eq!(comments[0].text, "third");
    assert_eq!(comments[2].text, "first");
}

#[tokio::test]
async fn test_unknown_book_is_constraint_error() {
    let conn = init_db().await;
    let repo = CommentRepository::new(conn);

    let err = repo
        .create(
            "no_such_book",
            CreateComment {
                author: None,
                text: "Lost".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DatabaseError(_)), "got {err:?}");
}
