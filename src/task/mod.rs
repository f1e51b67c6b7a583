pub mod analysis;
pub mod dependency;
pub mod strategy;

pub use analysis::{
    ModelSummary, TaskSummary, describe_relationships, render_tree, show_task_relationships,
    summarize,
};
pub use dependency::{DependencyGraph, PendingEdge};
pub use strategy::{EditableTaskStrategy, TaskGroupStrategy, TaskParseStrategy};

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

/// Position of a task inside its model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskIndex(pub(crate) usize);

impl TaskIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Skipped,
}

impl TaskState {
    /// Whether a task in this state no longer blocks its successors.
    pub fn is_finished(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Skipped)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::NotStarted => write!(f, "not started"),
            TaskState::InProgress => write!(f, "in progress"),
            TaskState::Completed => write!(f, "completed"),
            TaskState::Skipped => write!(f, "skipped"),
        }
    }
}

/// Element tags that introduce a task node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Task,
    TaskGroup,
}

impl TaskType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "task" => Some(TaskType::Task),
            "taskGroup" => Some(TaskType::TaskGroup),
            _ => None,
        }
    }
}

/// A command attached to an editable task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheatSheetCommand {
    pub serialization: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableTask {
    pub command: Option<CheatSheetCommand>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGroup {
    pub children: Vec<TaskIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskVariant {
    Task(EditableTask),
    Group(TaskGroup),
}

/// One task or task group of a composite cheat sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub state: TaskState,
    pub skippable: bool,
    pub description: String,
    pub completion_message: String,
    pub parameters: BTreeMap<String, String>,
    pub(crate) index: TaskIndex,
    pub(crate) parent: Option<TaskIndex>,
    /// Tasks that must be finished first, in `dependsOn` order.
    pub(crate) required: Vec<TaskIndex>,
    pub(crate) successors: Vec<TaskIndex>,
    pub(crate) variant: TaskVariant,
}

impl TaskNode {
    pub(crate) fn new(
        index: TaskIndex,
        task_type: TaskType,
        id: String,
        name: String,
        kind: String,
    ) -> Self {
        let variant = match task_type {
            TaskType::Task => TaskVariant::Task(EditableTask::default()),
            TaskType::TaskGroup => TaskVariant::Group(TaskGroup::default()),
        };

        Self {
            id,
            name,
            kind,
            state: TaskState::NotStarted,
            skippable: false,
            description: String::new(),
            completion_message: String::new(),
            parameters: BTreeMap::new(),
            index,
            parent: None,
            required: Vec::new(),
            successors: Vec::new(),
            variant,
        }
    }

    pub fn index(&self) -> TaskIndex {
        self.index
    }

    pub fn parent(&self) -> Option<TaskIndex> {
        self.parent
    }

    pub fn variant(&self) -> &TaskVariant {
        &self.variant
    }

    pub fn is_group(&self) -> bool {
        matches!(self.variant, TaskVariant::Group(_))
    }

    pub fn children(&self) -> &[TaskIndex] {
        match &self.variant {
            TaskVariant::Group(group) => &group.children,
            TaskVariant::Task(_) => &[],
        }
    }

    pub fn required(&self) -> &[TaskIndex] {
        &self.required
    }

    pub fn successors(&self) -> &[TaskIndex] {
        &self.successors
    }

    pub fn command(&self) -> Option<&CheatSheetCommand> {
        match &self.variant {
            TaskVariant::Task(task) => task.command.as_ref(),
            TaskVariant::Group(_) => None,
        }
    }

    /// Stable label for messages: the name, or the id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(task_type: TaskType) -> TaskNode {
        TaskNode::new(
            TaskIndex(0),
            task_type,
            "t".to_string(),
            String::new(),
            "set".to_string(),
        )
    }

    #[test]
    fn task_type_matches_exact_tags() {
        assert_eq!(TaskType::from_tag("task"), Some(TaskType::Task));
        assert_eq!(TaskType::from_tag("taskGroup"), Some(TaskType::TaskGroup));
        assert_eq!(TaskType::from_tag("TaskGroup"), None);
        assert_eq!(TaskType::from_tag("intro"), None);
    }

    #[test]
    fn new_nodes_start_untouched() {
        let task = node(TaskType::Task);
        assert_eq!(task.state, TaskState::NotStarted);
        assert!(!task.skippable);
        assert!(!task.is_group());
        assert!(task.children().is_empty());
        assert!(task.parameters.is_empty());
        assert_eq!(task.label(), "t");
    }

    #[test]
    fn groups_expose_children() {
        let mut group = node(TaskType::TaskGroup);
        if let TaskVariant::Group(inner) = &mut group.variant {
            inner.children.push(TaskIndex(3));
        }
        assert!(group.is_group());
        assert_eq!(group.children(), &[TaskIndex(3)]);
        assert!(group.command().is_none());
    }

    #[test]
    fn finished_states() {
        assert!(TaskState::Completed.is_finished());
        assert!(TaskState::Skipped.is_finished());
        assert!(!TaskState::InProgress.is_finished());
        assert!(!TaskState::NotStarted.is_finished());
    }
}
