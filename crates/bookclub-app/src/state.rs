use std::path::PathBuf;
use std::sync::Arc;

use bookclub_dal::Pool;
use bookclub_seed::SeedLoader;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Self {
        AppState {
            state: Arc::new(AppStateInner { app_config, pool }),
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn seed_loader(&self) -> SeedLoader {
        SeedLoader::new(self.pool().clone(), self.config().books_dir.clone())
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
}

pub struct AppConfig {
    pub books_dir: PathBuf,
    pub upload_limit_mb: usize,
}
