use std::{collections::BTreeMap, fmt::Write};

use serde::Serialize;

use super::{CheatSheetCommand, TaskIndex, TaskNode, TaskState};
use crate::model::CompositeModel;

/// Nested, serializable view of a task and everything below it.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub group: bool,
    pub state: TaskState,
    pub skippable: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub completion_message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<CheatSheetCommand>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub explorer: String,
    pub root: TaskSummary,
}

pub fn summarize(model: &CompositeModel) -> ModelSummary {
    ModelSummary {
        name: model.name().to_string(),
        explorer: model.explorer().to_string(),
        root: summarize_task(model, model.root()),
    }
}

fn summarize_task(model: &CompositeModel, task: &TaskNode) -> TaskSummary {
    TaskSummary {
        id: task.id.clone(),
        name: task.name.clone(),
        kind: task.kind.clone(),
        group: task.is_group(),
        state: task.state,
        skippable: task.skippable,
        description: task.description.clone(),
        completion_message: task.completion_message.clone(),
        parameters: task.parameters.clone(),
        command: task.command().cloned(),
        requires: model
            .required_tasks(task.index())
            .map(|required| required.id.clone())
            .collect(),
        children: model
            .children(task.index())
            .map(|child| summarize_task(model, child))
            .collect(),
    }
}

/// One line per dependency edge, in document order.
pub fn describe_relationships(model: &CompositeModel) -> Vec<String> {
    let mut lines = Vec::new();

    for task in model.iter() {
        for required in model.required_tasks(task.index()) {
            lines.push(format!(
                "Info: Task '{}' requires '{}'",
                task.id, required.id
            ));
        }

        if task.required().is_empty() && !task.is_group() && task.parent().is_some() {
            let has_successors = model.successor_tasks(task.index()).next().is_some();
            if !has_successors {
                lines.push(format!(
                    "Info: Task '{}' is independent of every other task",
                    task.id
                ));
            }
        }
    }

    lines
}

pub fn show_task_relationships(model: &CompositeModel, verbose: bool) {
    if !verbose {
        return;
    }

    for line in describe_relationships(model) {
        println!("{}", line);
    }
}

/// Indented outline of the task tree.
pub fn render_tree(model: &CompositeModel) -> String {
    let mut out = String::new();
    render_node(model, model.root().index(), 0, &mut out);
    out
}

fn render_node(model: &CompositeModel, index: TaskIndex, depth: usize, out: &mut String) {
    let Some(task) = model.task(index) else {
        return;
    };

    let marker = if task.is_group() { "+" } else { "-" };
    let _ = write!(out, "{}{} {} ({})", "  ".repeat(depth), marker, task.label(), task.id);

    let requires: Vec<&str> = model
        .required_tasks(index)
        .map(|required| required.id.as_str())
        .collect();
    if !requires.is_empty() {
        let _ = write!(out, " requires {}", requires.join(", "));
    }
    if task.skippable {
        out.push_str(" [skippable]");
    }
    out.push('\n');

    for child in task.children() {
        render_node(model, *child, depth + 1, out);
    }
}
