use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use bookclub_dal::book::BookRepository;
use bookclub_seed::SeedLoader;

use crate::commands::Executor;

/// Seeds the catalogue database from the books directory, mirroring what
/// the server does on first start.
#[derive(Parser, Debug)]
pub struct InitCmd {
    #[arg(
        long,
        env = "BOOKCLUB_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/bookclub.db"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "BOOKCLUB_DATA_DIR",
        help = "Data directory, default is system default like ~/.local/share/bookclub"
    )]
    data_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "BOOKCLUB_BOOKS_DIR",
        help = "Directory with seed book folders, default data_dir/books"
    )]
    books_dir: Option<PathBuf>,

    #[arg(short, long, help = "Reinitialize even if the database has books, replacing all data")]
    force: bool,
}

impl InitCmd {
    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|p| p.join("bookclub"))
                .unwrap_or_else(|| PathBuf::from("bookclub"))
        })
    }
}

impl Executor for InitCmd {
    async fn run(self) -> Result<()> {
        let data_dir = self.data_dir();
        let database_url = self
            .database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/bookclub.db", data_dir.display()));
        let books_dir = self
            .books_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("books"));

        if !data_dir.is_dir() {
            tokio::fs::create_dir_all(&data_dir).await?;
        }

        let pool = bookclub_dal::new_pool(&database_url).await?;
        bookclub_dal::schema::ensure_schema(&pool).await?;

        let books = BookRepository::new(pool.clone());
        let count = books.count().await?;
        println!(
            "Database status: {}",
            if count == 0 { "EMPTY" } else { "POPULATED" }
        );
        if count > 0 && !self.force {
            println!("Database already contains {count} books.");
            println!("To reinitialize and replace all data, run with --force.");
            return Ok(());
        }

        if self.force {
            println!("Force mode: this will replace all existing data.");
        }

        let outcome = SeedLoader::new(pool, books_dir).initialize(self.force).await;
        if !outcome.success {
            bail!("Initialization failed: {}", outcome.message);
        }
        println!("{}", outcome.message);

        println!("Loaded books:");
        for (index, book) in books.list_all().await?.iter().enumerate() {
            println!(
                "  {}. {} [{}]",
                index + 1,
                book.title,
                book.genres.join(", ")
            );
        }

        Ok(())
    }
}
