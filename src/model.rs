use crate::{
    error::{CheatSheetError, Result},
    task::{DependencyGraph, TaskIndex, TaskNode, TaskState},
};

/// A fully parsed composite cheat sheet.
///
/// Tasks live in one arena in document order. Groups refer to their
/// children, and tasks to their requirements, by [`TaskIndex`].
#[derive(Debug, Clone)]
pub struct CompositeModel {
    name: String,
    explorer: String,
    location: Option<String>,
    tasks: Vec<TaskNode>,
    root: TaskIndex,
    dependencies: DependencyGraph,
}

impl CompositeModel {
    pub(crate) fn new(
        name: String,
        explorer: String,
        location: Option<String>,
        tasks: Vec<TaskNode>,
        root: TaskIndex,
        dependencies: DependencyGraph,
    ) -> Self {
        Self {
            name,
            explorer,
            location,
            tasks,
            root,
            dependencies,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn explorer(&self) -> &str {
        &self.explorer
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn root(&self) -> &TaskNode {
        &self.tasks[self.root.get()]
    }

    pub fn task(&self, index: TaskIndex) -> Option<&TaskNode> {
        self.tasks.get(index.get())
    }

    pub fn find(&self, id: &str) -> Option<&TaskNode> {
        self.dependencies
            .task(id)
            .and_then(|index| self.task(index))
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Every task in document order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskNode> {
        self.tasks.iter()
    }

    pub fn children(&self, index: TaskIndex) -> impl Iterator<Item = &TaskNode> {
        self.task(index)
            .map(TaskNode::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.task(*child))
    }

    pub fn required_tasks(&self, index: TaskIndex) -> impl Iterator<Item = &TaskNode> {
        self.task(index)
            .map(TaskNode::required)
            .unwrap_or_default()
            .iter()
            .filter_map(|required| self.task(*required))
    }

    pub fn successor_tasks(&self, index: TaskIndex) -> impl Iterator<Item = &TaskNode> {
        self.task(index)
            .map(TaskNode::successors)
            .unwrap_or_default()
            .iter()
            .filter_map(|successor| self.task(*successor))
    }

    /// True when every required task is completed or skipped.
    pub fn requirements_met(&self, index: TaskIndex) -> bool {
        self.required_tasks(index)
            .all(|required| required.state.is_finished())
    }

    /// Moves a leaf task from not started to in progress.
    ///
    /// Groups and tasks already underway are left as they are.
    pub fn start(&mut self, index: TaskIndex) -> Result<()> {
        let task = self.task_mut(index)?;
        if !task.is_group() && task.state == TaskState::NotStarted {
            task.state = TaskState::InProgress;
        }
        Ok(())
    }

    pub fn complete(&mut self, index: TaskIndex) -> Result<()> {
        self.task_mut(index)?.state = TaskState::Completed;
        Ok(())
    }

    pub fn skip(&mut self, index: TaskIndex) -> Result<()> {
        let task = self.task_mut(index)?;
        if !task.skippable {
            return Err(CheatSheetError::Task(format!(
                "Task '{}' cannot be skipped",
                task.id
            )));
        }
        task.state = TaskState::Skipped;
        Ok(())
    }

    /// Returns a task, and every task below it, to not started.
    pub fn reset(&mut self, index: TaskIndex) -> Result<()> {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let task = self.task_mut(current)?;
            task.state = TaskState::NotStarted;
            stack.extend_from_slice(task.children());
        }
        Ok(())
    }

    fn task_mut(&mut self, index: TaskIndex) -> Result<&mut TaskNode> {
        self.tasks.get_mut(index.get()).ok_or_else(|| {
            CheatSheetError::Task(format!("No task at index {}", index.get()))
        })
    }
}
