//! Shared fixtures for unit tests

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pp_core::error::{RemoteError, RemoteOperation};
use pp_core::traits::{ClientFactory, RemoteSessionClient};
use pp_core::ResolvedTarget;
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::archive::BuildArtifact;

/// Canned answers for a [`ScriptedClient`]
#[derive(Debug, Clone)]
pub struct Script {
    /// Answers to successive existence checks; the last one repeats
    pub exists: Vec<bool>,
    pub address: Option<String>,
    pub challenge: bool,
    pub create: bool,
    pub connect: bool,
    pub disconnect: bool,
    pub delete: bool,
    pub existing_host: bool,
    /// Operation that fails with a transport error instead of answering
    pub error_on: Option<RemoteOperation>,
}

impl Script {
    /// Every operation succeeds and the playpen does not exist yet
    pub fn happy() -> Self {
        Self {
            exists: vec![false],
            address: Some("playpen.example.com:443".to_string()),
            challenge: true,
            create: true,
            connect: true,
            disconnect: true,
            delete: true,
            existing_host: false,
            error_on: None,
        }
    }
}

/// In-memory client that answers from a [`Script`] and records every call
pub struct ScriptedClient {
    script: Script,
    exists_cursor: AtomicUsize,
    calls: Mutex<Vec<RemoteOperation>>,
    create_args: Mutex<Vec<(PathBuf, bool)>>,
    connect_args: Mutex<Vec<bool>>,
    download_args: Mutex<Vec<PathBuf>>,
}

impl ScriptedClient {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            exists_cursor: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            create_args: Mutex::new(Vec::new()),
            connect_args: Mutex::new(Vec::new()),
            download_args: Mutex::new(Vec::new()),
        }
    }

    pub fn happy() -> Self {
        Self::new(Script::happy())
    }

    pub fn count(&self, operation: RemoteOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == operation)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RemoteOperation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_args(&self) -> Vec<(PathBuf, bool)> {
        self.create_args.lock().unwrap().clone()
    }

    pub fn connect_args(&self) -> Vec<bool> {
        self.connect_args.lock().unwrap().clone()
    }

    pub fn download_args(&self) -> Vec<PathBuf> {
        self.download_args.lock().unwrap().clone()
    }

    fn record(&self, operation: RemoteOperation) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(operation);
        if self.script.error_on == Some(operation) {
            return Err(RemoteError::transport(operation, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSessionClient for ScriptedClient {
    async fn exists(&self) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Exists)?;
        let index = self.exists_cursor.fetch_add(1, Ordering::SeqCst);
        let answers = &self.script.exists;
        Ok(answers
            .get(index)
            .or_else(|| answers.last())
            .copied()
            .unwrap_or(false))
    }

    async fn fetch_address(&self) -> Result<Option<String>, RemoteError> {
        self.record(RemoteOperation::FetchAddress)?;
        Ok(self.script.address.clone())
    }

    async fn create(&self, archive: &Path, manual: bool) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Create)?;
        self.create_args
            .lock()
            .unwrap()
            .push((archive.to_path_buf(), manual));
        Ok(self.script.create)
    }

    async fn delete(&self) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Delete)?;
        Ok(self.script.delete)
    }

    async fn challenge(&self) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Challenge)?;
        Ok(self.script.challenge)
    }

    fn is_existing_host_target(&self) -> bool {
        self.script.existing_host
    }

    async fn connect(&self, cleanup_on_exit: bool) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Connect)?;
        self.connect_args.lock().unwrap().push(cleanup_on_exit);
        Ok(self.script.connect)
    }

    async fn disconnect(&self) -> Result<bool, RemoteError> {
        self.record(RemoteOperation::Disconnect)?;
        Ok(self.script.disconnect)
    }

    async fn download(&self, destination: &Path) -> Result<(), RemoteError> {
        self.record(RemoteOperation::Download)?;
        self.download_args
            .lock()
            .unwrap()
            .push(destination.to_path_buf());
        Ok(())
    }
}

/// Factory that always hands out the same scripted client
pub struct RecordingFactory {
    client: Arc<ScriptedClient>,
    targets: Mutex<Vec<ResolvedTarget>>,
}

impl RecordingFactory {
    pub fn new(client: Arc<ScriptedClient>) -> Self {
        Self {
            client,
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn targets(&self) -> Vec<ResolvedTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl ClientFactory for RecordingFactory {
    fn create_client(&self, target: &ResolvedTarget) -> Arc<dyn RemoteSessionClient> {
        self.targets.lock().unwrap().push(target.clone());
        self.client.clone()
    }
}

/// Build output directory with a runner artifact inside a temp dir
pub fn artifact_fixture() -> (TempDir, BuildArtifact) {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("target").join("app");
    std::fs::create_dir_all(output.join("lib")).unwrap();
    std::fs::write(output.join("runner.jar"), b"runner").unwrap();
    std::fs::write(output.join("lib").join("dep.jar"), b"dep").unwrap();
    let artifact = BuildArtifact::new(output.join("runner.jar"));
    (dir, artifact)
}

/// Tracing layer that records events for assertions
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl LogCapture {
    /// Install as the thread-local default subscriber
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn count(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    pub fn occurrences(&self, needle: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .count()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
