//! Conversions between domain entities and remote documents.
//!
//! Documents are schemaless JSON field maps; these functions define the
//! field layout tasks and projects use on the wire. Timestamps cross the
//! boundary as [`RemoteTimestamp`] objects and come back as
//! `DateTime<Utc>`; a `null` (or absent) field decodes to `None`.
//!
//! Decoding is strict about the fields the domain types require and
//! lenient about everything else: unknown fields are ignored so the
//! client keeps working when the backend schema grows.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use tack_protocol::{Project, ProjectPatch, SubTask, Task, TaskPatch, TaskStatus};

use crate::document::{Document, DocumentFields};
use crate::error::{RemoteError, Result};
use crate::timestamp::RemoteTimestamp;

/// Encodes a full task into document fields.
#[must_use]
pub fn task_to_fields(task: &Task) -> DocumentFields {
    let mut fields = DocumentFields::new();
    fields.insert("title".to_string(), Value::String(task.title.clone()));
    fields.insert("category".to_string(), json_value(&task.category));
    fields.insert("priority".to_string(), json_value(&task.priority));
    fields.insert("completed".to_string(), Value::Bool(task.completed));
    fields.insert("status".to_string(), json_value(&task.status));
    fields.insert("created_at".to_string(), timestamp_value(task.created_at));
    fields.insert("started_at".to_string(), opt_timestamp_value(task.started_at));
    fields.insert(
        "completed_at".to_string(),
        opt_timestamp_value(task.completed_at),
    );
    fields.insert("due_date".to_string(), opt_timestamp_value(task.due_date));
    fields.insert(
        "project_id".to_string(),
        match task.project_id {
            Some(id) => Value::String(id.to_string()),
            None => Value::Null,
        },
    );
    fields.insert("sub_tasks".to_string(), json_value(&task.sub_tasks));
    fields.insert(
        "assigned_to".to_string(),
        match &task.assigned_to {
            Some(user) => Value::String(user.clone()),
            None => Value::Null,
        },
    );
    fields.insert(
        "created_by".to_string(),
        Value::String(task.created_by.clone()),
    );
    fields.insert(
        "ai_priority_score".to_string(),
        match task.ai_priority_score {
            Some(score) => Value::from(score),
            None => Value::Null,
        },
    );
    fields.insert(
        "time_spent".to_string(),
        match task.time_spent {
            Some(secs) => Value::from(secs),
            None => Value::Null,
        },
    );
    fields
}

/// Decodes a task from a document.
///
/// # Errors
///
/// Returns [`RemoteError::Malformed`] if the document id is not a UUID or
/// a required field is missing or has the wrong shape.
pub fn task_from_document(doc: &Document) -> Result<Task> {
    let id = parse_id(doc)?;
    let fields = &doc.fields;

    let status: TaskStatus = required(doc, "status")?;
    let completed = match fields.get("completed") {
        Some(Value::Bool(completed)) => *completed,
        _ => status.is_completed(),
    };

    Ok(Task {
        id,
        title: required(doc, "title")?,
        category: required(doc, "category")?,
        priority: required(doc, "priority")?,
        completed,
        status,
        created_at: required_timestamp(doc, "created_at")?,
        started_at: optional_timestamp(doc, "started_at")?,
        completed_at: optional_timestamp(doc, "completed_at")?,
        due_date: optional_timestamp(doc, "due_date")?,
        project_id: optional::<String>(doc, "project_id")?
            .map(|raw| parse_uuid(doc, "project_id", &raw))
            .transpose()?,
        sub_tasks: optional::<Vec<SubTask>>(doc, "sub_tasks")?.unwrap_or_default(),
        assigned_to: optional(doc, "assigned_to")?,
        created_by: required(doc, "created_by")?,
        ai_priority_score: optional(doc, "ai_priority_score")?,
        time_spent: optional(doc, "time_spent")?,
    })
}

/// Encodes a task patch into the changed fields only.
#[must_use]
pub fn task_patch_to_fields(patch: &TaskPatch) -> DocumentFields {
    let mut fields = DocumentFields::new();
    if let Some(title) = &patch.title {
        fields.insert("title".to_string(), Value::String(title.clone()));
    }
    if let Some(category) = patch.category {
        fields.insert("category".to_string(), json_value(&category));
    }
    if let Some(priority) = patch.priority {
        fields.insert("priority".to_string(), json_value(&priority));
    }
    if let Some(completed) = patch.completed {
        fields.insert("completed".to_string(), Value::Bool(completed));
    }
    if let Some(status) = patch.status {
        fields.insert("status".to_string(), json_value(&status));
    }
    if let Some(started_at) = patch.started_at {
        fields.insert("started_at".to_string(), opt_timestamp_value(started_at));
    }
    if let Some(completed_at) = patch.completed_at {
        fields.insert("completed_at".to_string(), opt_timestamp_value(completed_at));
    }
    if let Some(due_date) = patch.due_date {
        fields.insert("due_date".to_string(), opt_timestamp_value(due_date));
    }
    if let Some(project_id) = patch.project_id {
        fields.insert(
            "project_id".to_string(),
            match project_id {
                Some(id) => Value::String(id.to_string()),
                None => Value::Null,
            },
        );
    }
    if let Some(sub_tasks) = &patch.sub_tasks {
        fields.insert("sub_tasks".to_string(), json_value(sub_tasks));
    }
    if let Some(assigned_to) = &patch.assigned_to {
        fields.insert(
            "assigned_to".to_string(),
            match assigned_to {
                Some(user) => Value::String(user.clone()),
                None => Value::Null,
            },
        );
    }
    if let Some(score) = patch.ai_priority_score {
        fields.insert(
            "ai_priority_score".to_string(),
            match score {
                Some(score) => Value::from(score),
                None => Value::Null,
            },
        );
    }
    if let Some(time_spent) = patch.time_spent {
        fields.insert("time_spent".to_string(), Value::from(time_spent));
    }
    fields
}

/// Encodes a full project into document fields.
#[must_use]
pub fn project_to_fields(project: &Project) -> DocumentFields {
    let mut fields = DocumentFields::new();
    fields.insert("name".to_string(), Value::String(project.name.clone()));
    fields.insert("color".to_string(), Value::String(project.color.clone()));
    fields.insert(
        "description".to_string(),
        match &project.description {
            Some(description) => Value::String(description.clone()),
            None => Value::Null,
        },
    );
    fields.insert(
        "created_by".to_string(),
        Value::String(project.created_by.clone()),
    );
    fields
}

/// Decodes a project from a document.
///
/// # Errors
///
/// Returns [`RemoteError::Malformed`] if the document id is not a UUID or
/// a required field is missing.
pub fn project_from_document(doc: &Document) -> Result<Project> {
    Ok(Project {
        id: parse_id(doc)?,
        name: required(doc, "name")?,
        color: required(doc, "color")?,
        description: optional(doc, "description")?,
        created_by: required(doc, "created_by")?,
    })
}

/// Encodes a project patch into the changed fields only.
#[must_use]
pub fn project_patch_to_fields(patch: &ProjectPatch) -> DocumentFields {
    let mut fields = DocumentFields::new();
    if let Some(name) = &patch.name {
        fields.insert("name".to_string(), Value::String(name.clone()));
    }
    if let Some(color) = &patch.color {
        fields.insert("color".to_string(), Value::String(color.clone()));
    }
    if let Some(description) = &patch.description {
        fields.insert(
            "description".to_string(),
            match description {
                Some(description) => Value::String(description.clone()),
                None => Value::Null,
            },
        );
    }
    fields
}

fn json_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn timestamp_value(value: DateTime<Utc>) -> Value {
    json_value(&RemoteTimestamp::from_datetime(value))
}

fn opt_timestamp_value(value: Option<DateTime<Utc>>) -> Value {
    match value {
        Some(value) => timestamp_value(value),
        None => Value::Null,
    }
}

fn parse_id(doc: &Document) -> Result<Uuid> {
    Uuid::parse_str(&doc.id).map_err(|e| RemoteError::Malformed {
        id: doc.id.clone(),
        reason: format!("document id is not a UUID: {e}"),
    })
}

fn parse_uuid(doc: &Document, field: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| RemoteError::Malformed {
        id: doc.id.clone(),
        reason: format!("field {field} is not a UUID: {e}"),
    })
}

/// Reads a required field, failing when it is missing or null.
fn required<T: DeserializeOwned>(doc: &Document, field: &str) -> Result<T> {
    match doc.fields.get(field) {
        None | Some(Value::Null) => Err(RemoteError::Malformed {
            id: doc.id.clone(),
            reason: format!("missing required field {field}"),
        }),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| RemoteError::Malformed {
                id: doc.id.clone(),
                reason: format!("field {field}: {e}"),
            })
        }
    }
}

/// Reads an optional field; absent and null both decode to `None`.
fn optional<T: DeserializeOwned>(doc: &Document, field: &str) -> Result<Option<T>> {
    match doc.fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| RemoteError::Malformed {
                id: doc.id.clone(),
                reason: format!("field {field}: {e}"),
            }),
    }
}

fn required_timestamp(doc: &Document, field: &str) -> Result<DateTime<Utc>> {
    let ts: RemoteTimestamp = required(doc, field)?;
    ts.to_datetime().ok_or_else(|| RemoteError::Malformed {
        id: doc.id.clone(),
        reason: format!("field {field}: timestamp out of range"),
    })
}

fn optional_timestamp(doc: &Document, field: &str) -> Result<Option<DateTime<Utc>>> {
    match optional::<RemoteTimestamp>(doc, field)? {
        None => Ok(None),
        Some(ts) => ts
            .to_datetime()
            .map(Some)
            .ok_or_else(|| RemoteError::Malformed {
                id: doc.id.clone(),
                reason: format!("field {field}: timestamp out of range"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tack_protocol::{Category, NewProject, NewTask, Priority};

    fn make_task() -> Task {
        let mut draft = NewTask::new("Codec roundtrip", Category::Development, Priority::High);
        draft.due_date = Some(Utc::now() + Duration::days(1));
        let mut task = Task::from_new(draft, "alice".to_string()).unwrap();
        task.sub_tasks.push(SubTask::new("first step"));
        task.transition_status(TaskStatus::InProgress, Utc::now());
        task
    }

    #[test]
    fn task_roundtrip_preserves_all_fields() {
        let task = make_task();
        let doc = Document::new(task.id.to_string(), task_to_fields(&task));

        let decoded = task_from_document(&doc).expect("decode");
        assert_eq!(decoded, task);
    }

    #[test]
    fn project_roundtrip_preserves_all_fields() {
        let mut draft = NewProject::new("Relaunch", "#4f46e5");
        draft.description = Some("big one".to_string());
        let project = Project::from_new(draft, "alice".to_string()).unwrap();

        let doc = Document::new(project.id.to_string(), project_to_fields(&project));
        let decoded = project_from_document(&doc).expect("decode");
        assert_eq!(decoded, project);
    }

    #[test]
    fn decode_rejects_missing_title() {
        let task = make_task();
        let mut fields = task_to_fields(&task);
        fields.remove("title");
        let doc = Document::new(task.id.to_string(), fields);

        let err = task_from_document(&doc).unwrap_err();
        assert!(matches!(err, RemoteError::Malformed { .. }));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn decode_rejects_non_uuid_id() {
        let task = make_task();
        let doc = Document::new("not-a-uuid", task_to_fields(&task));
        assert!(task_from_document(&doc).is_err());
    }

    #[test]
    fn decode_tolerates_unknown_fields() {
        let task = make_task();
        let mut fields = task_to_fields(&task);
        fields.insert("server_only_field".to_string(), Value::from(123));
        let doc = Document::new(task.id.to_string(), fields);

        assert!(task_from_document(&doc).is_ok());
    }

    #[test]
    fn decode_derives_completed_from_status_when_absent() {
        let mut task = make_task();
        task.transition_status(TaskStatus::Finalized, Utc::now());
        let mut fields = task_to_fields(&task);
        fields.remove("completed");
        let doc = Document::new(task.id.to_string(), fields);

        let decoded = task_from_document(&doc).expect("decode");
        assert!(decoded.completed);
    }

    #[test]
    fn patch_encodes_only_set_fields() {
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            due_date: Some(None),
            ..Default::default()
        };
        let fields = task_patch_to_fields(&patch);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("status"), Some(&Value::from("in_progress")));
        assert_eq!(fields.get("due_date"), Some(&Value::Null));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn project_patch_encodes_clearing_description() {
        let patch = ProjectPatch {
            description: Some(None),
            ..Default::default()
        };
        let fields = project_patch_to_fields(&patch);
        assert_eq!(fields.get("description"), Some(&Value::Null));
    }
}
