use core::panic;
use std::{fs, path::PathBuf};

use crate::error::Result;
pub use clap::Parser;

#[derive(Debug, Clone, clap::Parser)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 6310,
        env = "BOOKCLUB_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "BOOKCLUB_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "BOOKCLUB_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/bookclub.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "BOOKCLUB_DATA_DIR",
        help = "Data directory (database, seed books etc.), default is system default like ~/.local/share/bookclub",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "BOOKCLUB_BOOKS_DIR",
        help = "Directory with seed book folders, default data_dir/books"
    )]
    books_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "BOOKCLUB_UPLOAD_LIMIT_MB",
        default_value = "8",
        help = "Maximum request body size in MB (cover images themselves are capped at 5MB)"
    )]
    pub upload_limit_mb: usize,

    #[arg(long, env = "BOOKCLUB_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    let dir = dirs::data_dir()
        .map(|p| p.join("bookclub"))
        .unwrap_or_else(|| PathBuf::from("bookclub"));

    if !fs::exists(&dir).expect("Failed to check if data directory exists") {
        fs::create_dir_all(&dir).expect("Failed to create data directory");
    } else if !dir.is_dir() {
        panic!("Data directory is not a directory")
    }

    dir.to_string_lossy().to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn books_dir(&self) -> PathBuf {
        self.books_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("books"))
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/bookclub.db", self.data_dir))
    }
}
