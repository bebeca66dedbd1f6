//! In-memory task server for integration tests
//!
//! `FakeTaskServer` implements `TaskServer` without any networking. It can be
//! switched offline and told to fail specific calls, and it records how many
//! creates it served so tests can check for duplicates.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use taskboard_sync::client::error::ServerError;
use taskboard_sync::client::local_db::{LocalReplica, MemoryStore};
use taskboard_sync::client::{Config, SyncService, TaskServer};
use taskboard_sync::shared::{AppConfig, AppConfigBuilder, Task, TaskFields, TaskId};

/// First identity the fake hands out
pub const FIRST_SERVER_ID: i64 = 1000;

/// Scriptable in-memory [`TaskServer`]
#[derive(Debug)]
pub struct FakeTaskServer {
    tasks: Mutex<BTreeMap<String, Task>>,
    next_id: AtomicI64,
    online: AtomicBool,
    fail_list: AtomicBool,
    fail_deletes: AtomicBool,
    failing_creates: AtomicUsize,
    creates: AtomicUsize,
}

impl Default for FakeTaskServer {
    fn default() -> Self {
        Self {
            tasks: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(FIRST_SERVER_ID),
            online: AtomicBool::new(true),
            fail_list: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            failing_creates: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
        }
    }
}

impl FakeTaskServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Make `GET /tasks` answer 500 while still accepting other calls
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Fail the next `count` creates with a timeout
    pub fn fail_next_creates(&self, count: usize) {
        self.failing_creates.store(count, Ordering::SeqCst);
    }

    /// Store a task under its own identity
    pub fn seed(&self, task: Task) {
        self.tasks
            .lock()
            .unwrap()
            .insert(task.id.to_string(), task);
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().values().cloned().collect()
    }

    pub fn get(&self, id: impl Into<TaskId>) -> Option<Task> {
        let id = id.into();
        self.tasks.lock().unwrap().get(id.as_key().as_ref()).cloned()
    }

    /// Number of creates the server accepted
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), ServerError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServerError::transport("connection refused"))
        }
    }
}

#[async_trait]
impl TaskServer for FakeTaskServer {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServerError> {
        self.check_online()?;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServerError::Status { status: 500 });
        }
        Ok(self.tasks())
    }

    async fn fetch_task(&self, id: &TaskId) -> Result<Task, ServerError> {
        self.check_online()?;
        self.get(id.clone())
            .ok_or_else(|| ServerError::NotFound { id: id.clone() })
    }

    async fn create_task(&self, fields: &TaskFields) -> Result<Task, ServerError> {
        self.check_online()?;
        let should_fail = self
            .failing_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(ServerError::Timeout);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = Task::new(id, fields.clone());
        self.seed(task.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<Task, ServerError> {
        self.check_online()?;
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.get_mut(id.as_key().as_ref()) {
            Some(task) => {
                task.fields = fields.clone();
                Ok(task.clone())
            }
            None => Err(ServerError::NotFound { id: id.clone() }),
        }
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ServerError> {
        self.check_online()?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ServerError::Status { status: 503 });
        }
        self.tasks.lock().unwrap().remove(id.as_key().as_ref());
        Ok(())
    }

    // Reachability follows the online switch only, so a failing list can
    // be scripted separately from an outage
    async fn ping(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// A sync service wired to a fake server and an in-memory store
pub struct Harness {
    pub server: Arc<FakeTaskServer>,
    pub store: Arc<MemoryStore>,
    pub service: SyncService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(AppConfig::builder())
    }

    pub fn with_config(builder: AppConfigBuilder) -> Self {
        let config = Config::with_builder(builder).unwrap();
        let server = Arc::new(FakeTaskServer::new());
        let store = Arc::new(MemoryStore::new());
        let service = SyncService::new(config, server.clone(), store.clone());
        Self {
            server,
            store,
            service,
        }
    }

    /// Direct view of the replica; only read it while no operation runs
    pub fn replica(&self) -> LocalReplica {
        LocalReplica::new(self.store.clone())
    }
}

/// Fields with a title and nothing else of note
pub fn fields(title: &str) -> TaskFields {
    TaskFields::new(title)
}
