use roxmltree::Node;

use super::{CheatSheetCommand, TaskNode, TaskVariant};
use crate::status::Diagnostics;

const COMMAND: &str = "command";
const SERIALIZATION: &str = "serialization";

/// Hook for child elements the composite parser does not know.
///
/// Returns `true` when the element was handled. A `false` return makes the
/// parser report the element as unknown.
pub trait TaskParseStrategy: Send + Sync {
    fn parse_element(
        &self,
        element: Node<'_, '_>,
        parent_tag: &str,
        task: &mut TaskNode,
        diagnostics: &mut Diagnostics,
    ) -> bool;
}

/// Default strategy of leaf tasks: understands `<command serialization="..."/>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditableTaskStrategy;

impl TaskParseStrategy for EditableTaskStrategy {
    fn parse_element(
        &self,
        element: Node<'_, '_>,
        _parent_tag: &str,
        task: &mut TaskNode,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        if element.tag_name().name() != COMMAND {
            return false;
        }

        let Some(serialization) = element.attribute(SERIALIZATION) else {
            diagnostics.error(format!(
                "missing serialization attribute on '{}' in task '{}'",
                COMMAND,
                task.label()
            ));
            return true;
        };

        let label = task.label().to_string();
        if let TaskVariant::Task(editable) = &mut task.variant {
            if editable.command.is_some() {
                diagnostics.warning(format!(
                    "task '{}' has more than one command, extra commands are ignored",
                    label
                ));
            } else {
                editable.command = Some(CheatSheetCommand {
                    serialization: serialization.to_string(),
                });
            }
        }

        true
    }
}

/// Task groups carry no specialized elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskGroupStrategy;

impl TaskParseStrategy for TaskGroupStrategy {
    fn parse_element(
        &self,
        _element: Node<'_, '_>,
        _parent_tag: &str,
        _task: &mut TaskNode,
        _diagnostics: &mut Diagnostics,
    ) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        status::Severity,
        task::{TaskIndex, TaskType},
    };

    fn run(
        strategy: &dyn TaskParseStrategy,
        task_type: TaskType,
        xml: &str,
    ) -> (TaskNode, Diagnostics, Vec<bool>) {
        let document = roxmltree::Document::parse(xml).unwrap();
        let mut task = TaskNode::new(
            TaskIndex(0),
            task_type,
            "t1".to_string(),
            "Build".to_string(),
            String::new(),
        );
        let mut diagnostics = Diagnostics::new();
        let handled = document
            .root_element()
            .children()
            .filter(|n| n.is_element())
            .map(|n| strategy.parse_element(n, "task", &mut task, &mut diagnostics))
            .collect();
        (task, diagnostics, handled)
    }

    #[test]
    fn editable_task_reads_command() {
        let (task, diagnostics, handled) = run(
            &EditableTaskStrategy,
            TaskType::Task,
            r#"<task><command serialization="org.example.open"/></task>"#,
        );
        assert_eq!(handled, vec![true]);
        assert!(diagnostics.is_ok());
        assert_eq!(
            task.command().map(|c| c.serialization.as_str()),
            Some("org.example.open")
        );
    }

    #[test]
    fn command_without_serialization_is_an_error() {
        let (task, diagnostics, handled) =
            run(&EditableTaskStrategy, TaskType::Task, "<task><command/></task>");
        assert_eq!(handled, vec![true]);
        assert_eq!(diagnostics.count(Severity::Error), 1);
        assert!(task.command().is_none());
    }

    #[test]
    fn second_command_is_ignored() {
        let (task, diagnostics, _) = run(
            &EditableTaskStrategy,
            TaskType::Task,
            r#"<task><command serialization="a"/><command serialization="b"/></task>"#,
        );
        assert_eq!(diagnostics.count(Severity::Warning), 1);
        assert_eq!(task.command().map(|c| c.serialization.as_str()), Some("a"));
    }

    #[test]
    fn other_elements_are_declined() {
        let (_, diagnostics, handled) =
            run(&EditableTaskStrategy, TaskType::Task, "<task><extra/></task>");
        assert_eq!(handled, vec![false]);
        assert!(diagnostics.is_ok());
    }

    #[test]
    fn groups_decline_everything() {
        let (_, _, handled) = run(
            &TaskGroupStrategy,
            TaskType::TaskGroup,
            r#"<taskGroup><command serialization="a"/></taskGroup>"#,
        );
        assert_eq!(handled, vec![false]);
    }
}
