//! Project types for grouping tasks.
//!
//! Projects are lightweight grouping entities: tasks reference them by id,
//! and deleting a project cascades to its tasks (the cascade itself is the
//! store's job, see `tack-store`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProtocolError, Result};
use crate::task::UserId;

/// Unique identifier for a project.
pub type ProjectId = Uuid;

/// A group of related tasks.
///
/// # Examples
///
/// ```
/// use tack_protocol::{NewProject, Project};
///
/// let draft = NewProject::new("Website relaunch", "#4f46e5");
/// let project = Project::from_new(draft, "alice".to_string()).unwrap();
/// assert_eq!(project.name, "Website relaunch");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier, assigned at creation.
    pub id: ProjectId,
    /// Display name. Never empty.
    pub name: String,
    /// Display color (any CSS-style color string).
    pub color: String,
    /// Optional free-form description, also used as context for the
    /// assistant features layered above the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User that created the project. Immutable.
    pub created_by: UserId,
}

impl Project {
    /// Creates a project from a draft, validating the name.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidProjectName`] if the name is empty
    /// or whitespace-only.
    pub fn from_new(new: NewProject, created_by: UserId) -> Result<Self> {
        if new.name.trim().is_empty() {
            return Err(ProtocolError::InvalidProjectName);
        }

        Ok(Self {
            id: ProjectId::new_v4(),
            name: new.name,
            color: new.color,
            description: new.description,
            created_by,
        })
    }
}

/// A draft for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: String,
    /// Optional description.
    pub description: Option<String>,
}

impl NewProject {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }
}

/// A partial update to a project.
///
/// Same conventions as `TaskPatch`: unset fields are untouched, and the
/// nullable `description` uses a nested `Option` to express clearing.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New color, if changing.
    pub color: Option<String>,
    /// Set or clear the description.
    pub description: Option<Option<String>>,
}

impl ProjectPatch {
    /// Returns `true` if no fields are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.description.is_none()
    }

    /// Applies the set fields onto a project.
    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(color) = &self.color {
            project.color = color.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
    }
}
