#![allow(dead_code)]

use std::{
    fmt,
    fs::File,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use anyhow::Context;
use async_trait::async_trait;
use packwise::{
    config::{parse_base_url, AppConfig, GeminiConfig},
    db::{init_pool, run_migrations},
    error::AppError,
    services::generator::{GenerationRequest, TextGenerator},
    state::AppState,
};
use tempfile::TempDir;

/// A model that answers every prompt with a canned reply.
pub struct StubModel {
    reply: Mutex<Result<String, String>>,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Err("no reply configured".into())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn reply_with(&self, text: impl Into<String>) {
        *self.reply.lock().unwrap() = Ok(text.into());
    }

    pub fn fail_with(&self, message: impl Into<String>) {
        *self.reply.lock().unwrap() = Err(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for StubModel {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(AppError::Generation)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub model: Arc<StubModel>,
    _root: TempDir,
}

impl fmt::Debug for TestApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestApp").finish()
    }
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        let root = TempDir::new().context("create temp dir for test app")?;
        let db_path = root.path().join("packwise.sqlite");
        File::create(&db_path)?;
        let database_url = format!("sqlite://{}", db_path.to_string_lossy());

        let config = AppConfig {
            database_url,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            secret_key: "test-secret".into(),
            token_ttl_hours: 24,
            gemini: GeminiConfig {
                api_key: "unused".into(),
                model: GeminiConfig::DEFAULT_MODEL.into(),
                base_url: parse_base_url(GeminiConfig::DEFAULT_BASE_URL)?,
                timeout_secs: 1,
            },
        };

        let db = init_pool(&config.database_url).await?;
        run_migrations(&db).await?;

        let model = StubModel::new();
        let state = AppState::new(&config, db, model.clone());
        Ok(Self {
            state,
            model,
            _root: root,
        })
    }
}
