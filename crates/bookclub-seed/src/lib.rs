pub mod error;
pub mod frontmatter;
pub mod loader;

pub use error::Error;
pub use loader::{SeedLoader, SeedOutcome};
