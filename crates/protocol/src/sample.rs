//! Sample data generation for testing and demonstration.
//!
//! This module provides a small deterministic board of projects and tasks
//! used by the demo binary and by tests that want realistic data without
//! hand-building every record.
//!
//! # Examples
//!
//! ```
//! use tack_protocol::sample::sample_board;
//!
//! let board = sample_board("demo-admin");
//! assert_eq!(board.projects.len(), 2);
//! assert_eq!(board.tasks.len(), 5);
//! ```

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::project::Project;
use crate::task::{Category, Priority, SubTask, Task, TaskStatus};

/// UUID namespace for the deterministic sample ids.
///
/// Using v5 ids derived from a fixed namespace keeps the sample board
/// stable across runs, which makes demo output and doc examples
/// reproducible.
const SAMPLE_NAMESPACE: Uuid = Uuid::from_u128(0x8a3e0f6c2b174d62a54ff0d3c9e81b07);

/// A generated set of projects and tasks.
#[derive(Debug, Clone)]
pub struct SampleBoard {
    /// Sample projects, creation order.
    pub projects: Vec<Project>,
    /// Sample tasks, creation order.
    pub tasks: Vec<Task>,
}

/// Generates the sample board for the given owner.
///
/// The board contains two projects and five tasks spread across the
/// workflow: pending work, an in-progress task with sub-tasks, a task in
/// `Done` awaiting sign-off, and a finalized one.
#[must_use]
pub fn sample_board(owner: &str) -> SampleBoard {
    let now = Utc::now();

    let mut relaunch = project(owner, "Website relaunch", "#4f46e5");
    relaunch.description = Some("Q3 marketing site refresh".to_string());
    let onboarding = project(owner, "Customer onboarding", "#22c55e");

    let mut draft_copy = task(owner, "Draft landing page copy", Category::Marketing, Priority::High);
    draft_copy.project_id = Some(relaunch.id);
    draft_copy.due_date = Some(now + Duration::days(2));

    let mut build_hero = task(owner, "Build hero section", Category::Development, Priority::Medium);
    build_hero.project_id = Some(relaunch.id);
    build_hero.sub_tasks = vec![
        sub_task("Desktop layout", true),
        sub_task("Mobile layout", false),
    ];
    build_hero.transition_status(TaskStatus::InProgress, now - Duration::hours(4));

    let mut welcome_flow = task(owner, "Design welcome email flow", Category::Design, Priority::Medium);
    welcome_flow.project_id = Some(onboarding.id);

    let mut import_tool = task(owner, "Review data import tool", Category::Development, Priority::Low);
    import_tool.transition_status(TaskStatus::InProgress, now - Duration::days(1));
    import_tool.transition_status(TaskStatus::Done, now - Duration::hours(2));

    let mut kickoff = task(owner, "Schedule kickoff call", Category::Sales, Priority::High);
    kickoff.transition_status(TaskStatus::Finalized, now - Duration::days(2));

    SampleBoard {
        projects: vec![relaunch, onboarding],
        tasks: vec![draft_copy, build_hero, welcome_flow, import_tool, kickoff],
    }
}

fn project(owner: &str, name: &str, color: &str) -> Project {
    Project {
        id: sample_id("project", name),
        name: name.to_string(),
        color: color.to_string(),
        description: None,
        created_by: owner.to_string(),
    }
}

fn task(owner: &str, title: &str, category: Category, priority: Priority) -> Task {
    Task {
        id: sample_id("task", title),
        title: title.to_string(),
        category,
        priority,
        completed: false,
        status: TaskStatus::Pending,
        created_at: Utc::now(),
        started_at: None,
        completed_at: None,
        due_date: None,
        project_id: None,
        sub_tasks: Vec::new(),
        assigned_to: Some(owner.to_string()),
        created_by: owner.to_string(),
        ai_priority_score: None,
        time_spent: None,
    }
}

fn sub_task(title: &str, completed: bool) -> SubTask {
    SubTask {
        id: sample_id("sub_task", title),
        title: title.to_string(),
        completed,
    }
}

fn sample_id(kind: &str, name: &str) -> Uuid {
    Uuid::new_v5(&SAMPLE_NAMESPACE, format!("{kind}/{name}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_ids_are_deterministic() {
        let a = sample_board("demo-admin");
        let b = sample_board("demo-admin");

        let ids_a: Vec<_> = a.tasks.iter().map(|t| t.id).collect();
        let ids_b: Vec<_> = b.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn sample_board_covers_workflow() {
        let board = sample_board("demo-admin");

        assert!(board.tasks.iter().any(|t| t.status == TaskStatus::Pending));
        assert!(board.tasks.iter().any(|t| t.status == TaskStatus::InProgress));
        assert!(board.tasks.iter().any(|t| t.status == TaskStatus::Done));
        assert!(board.tasks.iter().any(|t| t.status == TaskStatus::Finalized));
    }

    #[test]
    fn sample_board_invariants_hold() {
        let board = sample_board("demo-admin");

        for task in &board.tasks {
            assert_eq!(task.completed, task.status.is_completed());
            assert_eq!(task.completed_at.is_some(), task.completed);
            assert_eq!(task.created_by, "demo-admin");
        }
    }

    #[test]
    fn sample_tasks_reference_sample_projects() {
        let board = sample_board("demo-admin");
        let project_ids: Vec<_> = board.projects.iter().map(|p| p.id).collect();

        for task in &board.tasks {
            if let Some(project_id) = task.project_id {
                assert!(project_ids.contains(&project_id));
            }
        }
    }
}
