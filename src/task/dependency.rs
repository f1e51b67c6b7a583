use std::collections::{HashMap, hash_map::Entry};

use super::{TaskIndex, TaskNode};
use crate::status::Diagnostics;

/// A `dependsOn` reference recorded before its target is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdge {
    pub dependent: TaskIndex,
    pub required_id: String,
}

/// Maps task ids to tasks and links `dependsOn` references once the whole
/// tree has been read.
///
/// The graph never owns tasks. It stores arena positions, and resolved
/// edges are written back onto the [`TaskNode`]s of the arena passed to
/// [`resolve_all`](DependencyGraph::resolve_all). Cycles are not rejected
/// here; only the existence of every referenced id is checked.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    id_index: HashMap<String, TaskIndex>,
    pending: Vec<PendingEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, id: &str) -> Option<TaskIndex> {
        self.id_index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    /// Registers a task id. Returns `false` and leaves the index untouched
    /// when the id is already taken.
    pub fn save_id(&mut self, id: &str, index: TaskIndex) -> bool {
        match self.id_index.entry(id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(index);
                true
            }
        }
    }

    pub fn add_dependency(&mut self, dependent: TaskIndex, required_id: impl Into<String>) {
        self.pending.push(PendingEdge {
            dependent,
            required_id: required_id.into(),
        });
    }

    pub fn pending(&self) -> &[PendingEdge] {
        &self.pending
    }

    /// Links every pending edge in recording order and returns how many
    /// resolved. Unknown ids are reported and skipped.
    pub fn resolve_all(&mut self, tasks: &mut [TaskNode], diagnostics: &mut Diagnostics) -> usize {
        let mut resolved = 0;

        for edge in std::mem::take(&mut self.pending) {
            let dependent = edge.dependent.get();

            let Some(required) = self.task(&edge.required_id) else {
                let label = tasks
                    .get(dependent)
                    .map(|task| task.label().to_string())
                    .unwrap_or_default();
                diagnostics.error(format!(
                    "task '{}' depends on unknown task id '{}'",
                    label, edge.required_id
                ));
                continue;
            };

            if dependent >= tasks.len() || required.get() >= tasks.len() {
                diagnostics.error(format!(
                    "dependency on '{}' refers to a task outside the model",
                    edge.required_id
                ));
                continue;
            }

            tasks[dependent].required.push(required);
            tasks[required.get()].successors.push(edge.dependent);
            resolved += 1;

            tracing::debug!(
                "resolved dependency {} -> {}",
                tasks[dependent].id,
                edge.required_id
            );
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{status::Severity, task::TaskType};

    fn arena(ids: &[&str]) -> (Vec<TaskNode>, DependencyGraph) {
        let mut graph = DependencyGraph::new();
        let tasks = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let index = TaskIndex(i);
                assert!(graph.save_id(id, index));
                TaskNode::new(
                    index,
                    TaskType::Task,
                    id.to_string(),
                    id.to_uppercase(),
                    String::new(),
                )
            })
            .collect();
        (tasks, graph)
    }

    #[test]
    fn duplicate_ids_keep_first_registration() {
        let mut graph = DependencyGraph::new();
        assert!(graph.save_id("a", TaskIndex(0)));
        assert!(!graph.save_id("a", TaskIndex(1)));
        assert_eq!(graph.task("a"), Some(TaskIndex(0)));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn forward_references_resolve() {
        let (mut tasks, mut graph) = arena(&["a", "b"]);
        graph.add_dependency(TaskIndex(0), "b");
        let mut diagnostics = Diagnostics::new();

        assert_eq!(graph.resolve_all(&mut tasks, &mut diagnostics), 1);
        assert!(diagnostics.is_ok());
        assert_eq!(tasks[0].required(), &[TaskIndex(1)]);
        assert_eq!(tasks[1].successors(), &[TaskIndex(0)]);
        assert!(graph.pending().is_empty());
    }

    #[test]
    fn unknown_ids_are_reported_without_stopping() {
        let (mut tasks, mut graph) = arena(&["a", "b", "c"]);
        graph.add_dependency(TaskIndex(2), "missing");
        graph.add_dependency(TaskIndex(2), "a");
        graph.add_dependency(TaskIndex(1), "ghost");
        graph.add_dependency(TaskIndex(2), "b");
        let mut diagnostics = Diagnostics::new();

        assert_eq!(graph.resolve_all(&mut tasks, &mut diagnostics), 2);
        assert_eq!(diagnostics.count(Severity::Error), 2);
        assert_eq!(tasks[2].required(), &[TaskIndex(0), TaskIndex(1)]);
        assert!(tasks[1].required().is_empty());

        let first = diagnostics.iter().next().unwrap();
        assert_eq!(first.message, "task 'C' depends on unknown task id 'missing'");
    }

    #[test]
    fn repeated_edges_are_kept() {
        let (mut tasks, mut graph) = arena(&["a", "b"]);
        graph.add_dependency(TaskIndex(1), "a");
        graph.add_dependency(TaskIndex(1), "a");
        let mut diagnostics = Diagnostics::new();

        graph.resolve_all(&mut tasks, &mut diagnostics);
        assert_eq!(tasks[1].required(), &[TaskIndex(0), TaskIndex(0)]);
    }

    #[test]
    fn cycles_are_not_rejected() {
        let (mut tasks, mut graph) = arena(&["a", "b"]);
        graph.add_dependency(TaskIndex(0), "b");
        graph.add_dependency(TaskIndex(1), "a");
        let mut diagnostics = Diagnostics::new();

        assert_eq!(graph.resolve_all(&mut tasks, &mut diagnostics), 2);
        assert!(diagnostics.is_ok());
    }
}
