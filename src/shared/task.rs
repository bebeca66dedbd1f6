/**
 * Task Data Structures
 *
 * This module defines the task record exchanged between the local replica
 * and the task server, together with its identity type and the partial
 * update payload.
 *
 * The sync engine treats a task as an opaque value: it transports the whole
 * record and never diffs individual fields. Unknown fields received from a
 * server or found in local storage are kept in `TaskFields::extra` so that
 * a round trip through the engine never drops data.
 */
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Prefix carried by every locally-minted temporary identity
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Identity of a task
///
/// Servers may hand out numeric or textual identities, and the local store
/// may hold either form for the same logical task. Two identities are equal
/// when their textual forms are equal, so `TaskId::Number(5)` and
/// `TaskId::Text("5")` refer to the same task and hash identically.
///
/// # Example
/// ```rust
/// use taskboard_sync::shared::TaskId;
///
/// assert_eq!(TaskId::from(5), TaskId::from("5"));
/// assert!(TaskId::from("temp-1700000000000-abc").is_temporary());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    /// Numeric identity (e.g. assigned by an auto-increment server)
    Number(i64),
    /// Textual identity (temporary ids and string-keyed servers)
    Text(String),
}

/// Columns share the identity representation of tasks
pub type ColumnId = TaskId;

impl TaskId {
    /// String form used for every comparison
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            TaskId::Number(n) => Cow::Owned(n.to_string()),
            TaskId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Whether this identity was minted locally and has not reached the server
    pub fn is_temporary(&self) -> bool {
        match self {
            TaskId::Number(_) => false,
            TaskId::Text(s) => s.starts_with(TEMP_ID_PREFIX),
        }
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        TaskId::Number(value)
    }
}

impl From<i32> for TaskId {
    fn from(value: i32) -> Self {
        TaskId::Number(i64::from(value))
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        TaskId::Text(value)
    }
}

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Not started
    #[default]
    Todo,
    /// Being worked on
    InProgress,
    /// Finished
    Done,
}

impl Status {
    /// Board column that displays tasks with this status
    pub fn column_id(self) -> ColumnId {
        match self {
            Status::Todo => TaskId::Number(1),
            Status::InProgress => TaskId::Number(2),
            Status::Done => TaskId::Number(3),
        }
    }

    /// Status implied by a board column, if the column is a known one
    pub fn from_column(column: &ColumnId) -> Option<Self> {
        match column.as_key().as_ref() {
            "1" => Some(Status::Todo),
            "2" => Some(Status::InProgress),
            "3" => Some(Status::Done),
            _ => None,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Every field of a task except its identity
///
/// This is also the payload of `POST /tasks`: the server assigns the
/// identity and echoes the fields back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    /// Board column holding the task
    #[serde(default = "default_column")]
    pub column_id: ColumnId,
    /// Short title
    #[serde(default)]
    pub title: String,
    /// Optional long description
    ///
    /// Always serialized, as `null` when absent, so a full-record PATCH
    /// clears a description the server still holds.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status
    #[serde(default)]
    pub status: Status,
    /// Priority
    #[serde(default)]
    pub priority: Priority,
    /// Human-facing sequence number
    #[serde(default)]
    pub number: i64,
    /// Deadline as entered by the user (ISO 8601 date or date-time)
    #[serde(default)]
    pub deadline: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC3339 creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// RFC3339 timestamp of the last local mutation
    #[serde(default)]
    pub updated_at: String,
    /// Fields this crate does not model, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_column() -> ColumnId {
    Status::Todo.column_id()
}

impl Default for TaskFields {
    fn default() -> Self {
        Self {
            column_id: default_column(),
            title: String::new(),
            description: None,
            status: Status::default(),
            priority: Priority::default(),
            number: 0,
            deadline: String::new(),
            tags: Vec::new(),
            created_at: String::new(),
            updated_at: String::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl TaskFields {
    /// Create fields for a new task with the given title
    ///
    /// Both timestamps are set to the current UTC time.
    pub fn new(title: impl Into<String>) -> Self {
        let now = get_timestamp();
        Self {
            title: title.into(),
            created_at: now.clone(),
            updated_at: now,
            ..Self::default()
        }
    }

    /// Refresh `updated_at`, stamping `created_at` too if it was never set
    pub fn touch(&mut self) {
        let now = get_timestamp();
        if self.created_at.is_empty() {
            self.created_at = now.clone();
        }
        self.updated_at = now;
    }
}

/// A task record as held by the local replica and the server
///
/// Serialized as a flat JSON object: `{"id": .., "title": .., ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Identity (temporary or server-assigned)
    pub id: TaskId,
    /// All other fields
    #[serde(flatten)]
    pub fields: TaskFields,
}

impl Task {
    /// Assemble a task from an identity and its fields
    pub fn new(id: impl Into<TaskId>, fields: TaskFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Same fields under a different identity
    pub fn rekeyed(&self, id: TaskId) -> Self {
        Self {
            id,
            fields: self.fields.clone(),
        }
    }
}

/// Partial field update applied over an existing task
///
/// Only the fields that are `Some` are written. The patch never carries an
/// identity: updates do not change which task they target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Patch that only changes the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch that moves the task to `status` and its matching column
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            column_id: Some(status.column_id()),
            ..Self::default()
        }
    }

    /// Whether applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every present field into `fields`
    ///
    /// Timestamps are left alone; the synchronizer refreshes `updated_at`.
    pub fn apply_to(&self, fields: &mut TaskFields) {
        if let Some(column_id) = &self.column_id {
            fields.column_id = column_id.clone();
        }
        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(description) = &self.description {
            fields.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if let Some(number) = self.number {
            fields.number = number;
        }
        if let Some(deadline) = &self.deadline {
            fields.deadline = deadline.clone();
        }
        if let Some(tags) = &self.tags {
            fields.tags = tags.clone();
        }
    }
}

/// Get the current timestamp as an RFC3339 string
pub fn get_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
