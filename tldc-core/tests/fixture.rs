use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tldc_core::{
    ai::{
        mock::{MockBehavior, MockProvider},
        Message,
    },
    chat::ChatError,
    persistence::{SqliteStore, Store},
    session::Session,
    settings::Settings,
};

#[derive(Default)]
pub struct FixtureOptions {
    pub behaviors: Vec<MockBehavior>,
    /// Emulate a cursor based backend
    pub stateful: bool,
    pub max_tool_rounds: Option<usize>,
}

pub struct Fixture {
    pub workspace_dir: TempDir,
    pub session: Session,
    pub mock: MockProvider,
    _data_dir: TempDir,
}

impl Fixture {
    pub async fn new(options: FixtureOptions) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let workspace_dir = TempDir::new().unwrap();
        std::fs::write(workspace_dir.path().join("example.txt"), "test content\n").unwrap();
        std::fs::create_dir_all(workspace_dir.path().join("src")).unwrap();
        std::fs::write(
            workspace_dir.path().join("src/main.py"),
            "print(\"hello\")\n",
        )
        .unwrap();

        // Keep the database out of the workspace so it is never tracked
        let data_dir = TempDir::new().unwrap();
        let mut settings = Settings {
            database_path: Some(data_dir.path().join("tldc.db")),
            ..Settings::default()
        };
        if let Some(max) = options.max_tool_rounds {
            settings.max_tool_rounds = max;
        }

        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(settings.database_path.as_ref().unwrap())
                .await
                .unwrap(),
        );
        let session = Session::with_store(settings, store, workspace_dir.path()).unwrap();

        let mock = if options.stateful {
            MockProvider::stateful(options.behaviors)
        } else {
            MockProvider::new(options.behaviors)
        };

        Fixture {
            workspace_dir,
            session,
            mock,
            _data_dir: data_dir,
        }
    }

    /// Canonical workspace root
    pub fn root(&self) -> &Path {
        self.session.workdir()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    #[allow(dead_code)]
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap()
    }

    /// One invocation of `tldc prompt`: enumerate, then run the prompt.
    pub async fn step(&self, prompt: &str) -> Result<String, ChatError> {
        let orchestrator = self
            .session
            .orchestrator_with_provider(Arc::new(self.mock.clone()))
            .await
            .unwrap();
        orchestrator.prompt(prompt).await
    }

    /// One invocation of `tldc reset`.
    #[allow(dead_code)]
    pub async fn reset(&self) {
        let orchestrator = self
            .session
            .orchestrator_with_provider(Arc::new(self.mock.clone()))
            .await
            .unwrap();
        orchestrator.reset().await.unwrap();
    }

    #[allow(dead_code)]
    pub async fn history(&self) -> Vec<Message> {
        self.session.context().messages().await.unwrap()
    }

    #[allow(dead_code)]
    pub async fn cursor(&self) -> Option<String> {
        self.session.context().response_cursor().await.unwrap()
    }

    /// Stored synced flag of a path, without refreshing it
    #[allow(dead_code)]
    pub async fn synced(&self, relative: &str) -> Option<bool> {
        let key = if relative == "." {
            self.root().to_string_lossy().into_owned()
        } else {
            self.path(relative).to_string_lossy().into_owned()
        };
        self.session
            .store()
            .sync_record(&key)
            .await
            .unwrap()
            .map(|record| record.synced)
    }
}

#[allow(dead_code)]
pub fn run<F, Fut>(behaviors: Vec<MockBehavior>, test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    run_with(
        FixtureOptions {
            behaviors,
            ..FixtureOptions::default()
        },
        test_fn,
    )
}

pub fn run_with<F, Fut>(options: FixtureOptions, test_fn: F)
where
    F: FnOnce(Fixture) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    use tokio::time::{timeout, Duration};

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    runtime.block_on(async {
        let fixture = Fixture::new(options).await;
        let test_future = test_fn(fixture);
        timeout(Duration::from_secs(30), test_future)
            .await
            .expect("Test timed out after 30 seconds");
    });
}
