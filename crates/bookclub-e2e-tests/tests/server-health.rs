use bookclub_e2e_tests::{base_url, prepare_env, spawn_server};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_health() {
    let (args, _config_guard) = prepare_env("test_health").unwrap();
    let base_url = base_url(&args);

    let client = spawn_server(args).await.unwrap();

    let url = base_url.join("api/health").unwrap();
    let response = client.get(url).send().await.unwrap();
    info!("Response: {:#?}", response);
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["books"], 0);
    assert_eq!(body["isEmpty"], true);
}

#[tokio::test]
#[traced_test]
async fn test_seed_on_startup() {
    let (args, config_guard) = prepare_env("test_seed_on_startup").unwrap();
    let base_url = base_url(&args);

    // default books dir is data_dir/books; populate before the server starts
    let books_dir = config_guard.data_dir().join("books");
    let dune = books_dir.join("dune");
    std::fs::create_dir_all(&dune).unwrap();
    std::fs::write(
        dune.join("description.md"),
        "---\ntitle: Dune\ngenres:\n  - Sci-Fi\n---\n",
    )
    .unwrap();

    let client = spawn_server(args).await.unwrap();

    let response = client
        .get(base_url.join("api/health").unwrap())
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["books"], 1);
    assert_eq!(body["isEmpty"], false);

    let genres: Vec<String> = client
        .get(base_url.join("api/genres").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(genres, vec!["Sci-Fi"]);
}

#[tokio::test]
#[traced_test]
async fn test_reinitialize_without_seed_dir() {
    let (args, _config_guard) = prepare_env("test_reinitialize").unwrap();
    let base_url = base_url(&args);

    let client = spawn_server(args).await.unwrap();

    let response = client
        .post(base_url.join("api/reinitialize").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let outcome: bookclub_seed::SeedOutcome = response.json().await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Books directory not found");
}
