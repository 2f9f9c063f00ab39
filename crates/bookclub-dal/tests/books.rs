use bookclub_dal::book::{BookRepository, CreateBook};
use bookclub_dal::comment::{CommentRepository, CreateComment};
use bookclub_dal::genre::GenreRepository;
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

fn dune() -> CreateBook {
    CreateBook {
        title: "Dune".to_string(),
        description: Some("Spice and sand".to_string()),
        genres: vec!["Sci-Fi".to_string(), "Classic".to_string()],
        rating: Some(4.5),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_and_get() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    let book = repo.create(dune()).await.unwrap();
    assert_eq!(book.id, "dune");
    assert_eq!(book.title, "Dune");
    assert_eq!(book.description.as_deref(), Some("Spice and sand"));
    // sorted regardless of input order
    assert_eq!(book.genres, vec!["Classic", "Sci-Fi"]);
    assert_eq!(book.rating, Some(4.5));
    assert!(book.cover.is_none());

    let fetched = repo.get("dune").await.unwrap();
    assert_eq!(fetched.id, book.id);
    assert_eq!(fetched.title, book.title);
    assert_eq!(fetched.genres, book.genres);
}

#[tokio::test]
async fn test_cover_data_uri() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    let payload = CreateBook {
        title: "Covered".to_string(),
        cover: Some(vec![1, 2, 3, 4]),
        ..Default::default()
    };
    let book = repo.create(payload).await.unwrap();
    assert_eq!(book.cover.as_deref(), Some("data:image/png;base64,AQIDBA=="));
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    repo.create(dune()).await.unwrap();

    // "Dune!" slugifies to the same id
    let second = CreateBook {
        title: "Dune!".to_string(),
        ..Default::default()
    };
    let err = repo.create(second).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateRecord(_)), "got {err:?}");

    // first book intact
    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.get("dune").await.unwrap().title, "Dune");
}

#[tokio::test]
async fn test_validation() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    let blank = CreateBook {
        title: "   ".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        repo.create(blank).await.unwrap_err(),
        Error::Validation(_)
    ));

    let unsluggable = CreateBook {
        title: "??!".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        repo.create(unsluggable).await.unwrap_err(),
        Error::Validation(_)
    ));

    let bad_rating = CreateBook {
        title: "Rated".to_string(),
        rating: Some(4.3),
        ..Default::default()
    };
    assert!(matches!(
        repo.create(bad_rating).await.unwrap_err(),
        Error::Validation(_)
    ));

    let out_of_range = CreateBook {
        title: "Rated".to_string(),
        rating: Some(5.5),
        ..Default::default()
    };
    assert!(matches!(
        repo.create(out_of_range).await.unwrap_err(),
        Error::Validation(_)
    ));
}

#[tokio::test]
async fn test_delete_cascades() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn.clone());
    let comments = CommentRepository::new(conn.clone());

    repo.create(dune()).await.unwrap();
    comments
        .create(
            "dune",
            CreateComment {
                author: Some("Al".to_string()),
                text: "Great book".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(repo.delete("dune").await.unwrap());
    assert!(matches!(
        repo.get("dune").await.unwrap_err(),
        Error::RecordNotFound(_)
    ));
    assert!(comments.list("dune").await.unwrap().is_empty());

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_genres")
        .fetch_one(&conn)
        .await
        .unwrap();
    assert_eq!(links, 0);

    // genres are deliberately left orphaned
    let genres = GenreRepository::new(conn.clone()).list().await.unwrap();
    assert_eq!(genres, vec!["Classic", "Sci-Fi"]);

    // deleting again is not an error, just false
    assert!(!repo.delete("dune").await.unwrap());
}

#[tokio::test]
async fn test_search_case_insensitive() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    repo.create(dune()).await.unwrap();
    repo.create(CreateBook {
        title: "Hyperion".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    let found = repo.search("DUN").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "dune");

    assert!(repo.search("missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_optimized() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    repo.create(dune()).await.unwrap();
    repo.create(CreateBook {
        title: "Club Pick".to_string(),
        is_bookclub: true,
        genres: vec!["Drama".to_string()],
        ..Default::default()
    })
    .await
    .unwrap();

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 2);
    // ordered by title
    assert_eq!(all[0].id, "club_pick");
    assert!(all.iter().all(|b| b.description.is_some()));

    let optimized = repo.list_optimized(false).await.unwrap();
    assert_eq!(optimized.len(), 2);
    assert!(optimized.iter().all(|b| b.description.is_none()));
    assert_eq!(optimized[0].genres, vec!["Drama"]);

    let bookclub = repo.list_optimized(true).await.unwrap();
    assert_eq!(bookclub.len(), 1);
    assert_eq!(bookclub[0].id, "club_pick");
    assert!(bookclub[0].is_bookclub);
}

#[tokio::test]
async fn test_genre_dedup_and_trim() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn.clone());

    let payload = CreateBook {
        title: "Messy".to_string(),
        genres: vec![
            " Sci-Fi ".to_string(),
            "Sci-Fi".to_string(),
            "".to_string(),
            "  ".to_string(),
        ],
        ..Default::default()
    };
    let book = repo.create(payload).await.unwrap();
    assert_eq!(book.genres, vec!["Sci-Fi"]);

    let genres = GenreRepository::new(conn).list().await.unwrap();
    assert_eq!(genres, vec!["Sci-Fi"]);
}
