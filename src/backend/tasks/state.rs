use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// In-memory task table of the reference server
///
/// Records are kept as raw JSON objects so fields the server does not model
/// survive untouched. Identities are increasing integers assigned on create.
#[derive(Clone, Debug)]
pub struct TaskStore {
    tasks: BTreeMap<i64, Map<String, Value>>,
    next_id: i64,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Every record, ordered by identity
    pub fn list(&self) -> Vec<Value> {
        self.tasks.values().cloned().map(Value::Object).collect()
    }

    pub fn get(&self, id: i64) -> Option<Value> {
        self.tasks.get(&id).cloned().map(Value::Object)
    }

    /// Store a new record under a fresh identity, ignoring any `id` it carries
    pub fn create(&mut self, mut record: Map<String, Value>) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        record.insert("id".to_string(), Value::from(id));
        self.tasks.insert(id, record.clone());
        Value::Object(record)
    }

    /// Shallow-merge `changes` into a stored record; `id` cannot change
    pub fn patch(&mut self, id: i64, changes: Map<String, Value>) -> Option<Value> {
        let record = self.tasks.get_mut(&id)?;
        for (key, value) in changes {
            if key != "id" {
                record.insert(key, value);
            }
        }
        Some(Value::Object(record.clone()))
    }

    pub fn delete(&mut self, id: i64) -> bool {
        self.tasks.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
