use std::{collections::HashMap, io::Read, sync::Arc};

use roxmltree::{Document, Node, ParsingOptions};

use crate::{
    config::ParserConfig,
    error::CheatSheetError,
    markup::extract_markup,
    model::CompositeModel,
    status::{Diagnostics, Severity},
    task::{
        DependencyGraph, EditableTaskStrategy, TaskGroupStrategy, TaskIndex, TaskNode,
        TaskParseStrategy, TaskType, TaskVariant,
    },
};

pub const COMPOSITE_CHEATSHEET: &str = "compositeCheatsheet";

const NAME: &str = "name";
const EXPLORER: &str = "explorer";
const KIND: &str = "kind";
const ID: &str = "id";
const SKIP: &str = "skip";
const VALUE: &str = "value";
const TASK: &str = "task";
const PARAM: &str = "param";
const INTRO: &str = "intro";
const ON_COMPLETION: &str = "onCompletion";
const DEPENDS_ON: &str = "dependsOn";

const AUTO_ID_PREFIX: &str = "TaskId_";

/// Result of one parse: a model when no error was reported, and every
/// diagnostic raised along the way.
#[derive(Debug)]
pub struct ParseOutcome {
    pub model: Option<CompositeModel>,
    pub diagnostics: Diagnostics,
}

impl ParseOutcome {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            model: None,
            diagnostics,
        }
    }

    pub fn is_success(&self) -> bool {
        self.model.is_some()
    }

    /// Splits the outcome into the model with its warnings, or the
    /// diagnostics that prevented one.
    pub fn into_result(self) -> std::result::Result<(CompositeModel, Diagnostics), Diagnostics> {
        match self.model {
            Some(model) => Ok((model, self.diagnostics)),
            None => Err(self.diagnostics),
        }
    }
}

/// Reads composite cheat sheet documents.
///
/// Every call runs in its own session, so auto-generated ids restart at
/// `TaskId_0` and diagnostics never leak between documents. A parser can be
/// shared between threads.
#[derive(Default)]
pub struct CompositeParser {
    config: ParserConfig,
    strategies: HashMap<String, Arc<dyn TaskParseStrategy>>,
}

impl CompositeParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            strategies: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Uses `strategy` for the specialized elements of leaf tasks whose
    /// `kind` attribute equals `kind`.
    pub fn register_strategy(
        &mut self,
        kind: impl Into<String>,
        strategy: Arc<dyn TaskParseStrategy>,
    ) {
        self.strategies.insert(kind.into(), strategy);
    }

    pub fn parse_reader<R: Read>(&self, mut reader: R, location: &str) -> ParseOutcome {
        let mut text = String::new();
        if let Err(err) = reader.read_to_string(&mut text) {
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_with_cause(
                Severity::Error,
                format!("cannot open '{}'", location),
                CheatSheetError::Io(err),
            );
            return ParseOutcome::failed(diagnostics);
        }

        self.parse_str(&text, Some(location))
    }

    pub fn parse_str(&self, text: &str, location: Option<&str>) -> ParseOutcome {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        match Document::parse_with_options(text, options) {
            Ok(document) => self.parse_document(&document, location),
            Err(err) => {
                let pos = err.pos();
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_with_cause(
                    Severity::Error,
                    format!(
                        "cannot parse '{}' at line {}, column {}",
                        location.unwrap_or_default(),
                        pos.row,
                        pos.col
                    ),
                    CheatSheetError::Xml(err),
                );
                ParseOutcome::failed(diagnostics)
            }
        }
    }

    pub fn parse_document(&self, document: &Document<'_>, location: Option<&str>) -> ParseOutcome {
        ParseSession::new(self).run(document.root_element(), location)
    }

    fn strategy_for(&self, task: &TaskNode) -> &dyn TaskParseStrategy {
        if task.is_group() {
            return &TaskGroupStrategy;
        }

        match self.strategies.get(&task.kind) {
            Some(strategy) => strategy.as_ref(),
            None => &EditableTaskStrategy,
        }
    }
}

/// Mutable state of a single parse.
struct ParseSession<'p> {
    parser: &'p CompositeParser,
    diagnostics: Diagnostics,
    next_task_id: usize,
    tasks: Vec<TaskNode>,
    dependencies: DependencyGraph,
}

impl<'p> ParseSession<'p> {
    fn new(parser: &'p CompositeParser) -> Self {
        Self {
            parser,
            diagnostics: Diagnostics::new(),
            next_task_id: 0,
            tasks: Vec::new(),
            dependencies: DependencyGraph::new(),
        }
    }

    fn run(mut self, root: Node<'_, '_>, location: Option<&str>) -> ParseOutcome {
        let name = root.attribute(NAME).unwrap_or_default().to_string();
        let model = self.build_model(root, name.clone(), location);

        tracing::info!(
            "parsed '{}': {} tasks, severity {:?}",
            location.unwrap_or(&name),
            model.as_ref().map_or(self.tasks.len(), CompositeModel::len),
            self.diagnostics.severity()
        );

        match model {
            Some(model) => ParseOutcome {
                model: Some(model),
                diagnostics: self.diagnostics,
            },
            None => ParseOutcome::failed(self.diagnostics),
        }
    }

    fn build_model(
        &mut self,
        root: Node<'_, '_>,
        name: String,
        location: Option<&str>,
    ) -> Option<CompositeModel> {
        let root_tag = root.tag_name().name();
        if root_tag != COMPOSITE_CHEATSHEET {
            self.diagnostics.error(format!(
                "root element must be '{}', found '{}'",
                COMPOSITE_CHEATSHEET, root_tag
            ));
            return None;
        }

        let explorer = root
            .attribute(EXPLORER)
            .unwrap_or(&self.parser.config.default_explorer)
            .to_string();

        let root_task = self.parse_root_children(root);

        let resolved = self
            .dependencies
            .resolve_all(&mut self.tasks, &mut self.diagnostics);
        tracing::debug!("resolved {} dependencies", resolved);

        let Some(root_task) = root_task else {
            self.diagnostics.error("no root task found");
            return None;
        };

        if self.diagnostics.has_errors() {
            return None;
        }

        Some(CompositeModel::new(
            name,
            explorer,
            location.map(str::to_string),
            std::mem::take(&mut self.tasks),
            root_task,
            std::mem::take(&mut self.dependencies),
        ))
    }

    fn parse_root_children(&mut self, root: Node<'_, '_>) -> Option<TaskIndex> {
        let mut root_task = None;

        for child in root.children().filter(Node::is_element) {
            if TaskType::from_tag(child.tag_name().name()).is_none() {
                continue;
            }

            if root_task.is_some() {
                self.diagnostics.error(format!(
                    "multiple root tasks, '{}' at the top level is ignored",
                    child.attribute(NAME).or(child.attribute(ID)).unwrap_or_default()
                ));
                continue;
            }

            let index = self.parse_task(child, None);
            root_task = Some(index);
            self.parse_task_children(child, index);
        }

        root_task
    }

    fn parse_task(&mut self, node: Node<'_, '_>, parent: Option<TaskIndex>) -> TaskIndex {
        let task_type = TaskType::from_tag(node.tag_name().name()).unwrap_or(TaskType::Task);

        let kind = node.attribute(KIND).unwrap_or_default().to_string();
        let name = node.attribute(NAME).unwrap_or_default().to_string();
        let id = match node.attribute(ID) {
            Some(id) => id.to_string(),
            None => self.auto_generate_id(),
        };
        let skippable = node
            .attribute(SKIP)
            .is_some_and(|skip| skip.eq_ignore_ascii_case("true"));

        let index = TaskIndex(self.tasks.len());
        let completion_message = self
            .parser
            .config
            .completion_message_for(&id, &name, &kind);

        let mut task = TaskNode::new(index, task_type, id, name, kind);
        task.skippable = skippable;
        task.parent = parent;
        task.completion_message = completion_message;

        if !self.dependencies.save_id(&task.id, index) {
            self.diagnostics
                .error(format!("duplicate task id '{}'", task.id));
        }

        tracing::debug!("created task '{}' ({:?})", task.id, task_type);
        self.tasks.push(task);
        index
    }

    fn parse_task_children(&mut self, node: Node<'_, '_>, index: TaskIndex) {
        let parser = self.parser;
        let strategy = parser.strategy_for(&self.tasks[index.get()]);
        let parent_tag = node.tag_name().name();

        for child in node.children().filter(Node::is_element) {
            let tag = child.tag_name().name();
            match tag {
                PARAM => self.add_parameter(child, index),
                INTRO => {
                    let description = self.extract_text(child, index);
                    self.tasks[index.get()].description = description;
                }
                ON_COMPLETION => {
                    let message = self.extract_text(child, index);
                    self.tasks[index.get()].completion_message = message;
                }
                DEPENDS_ON => self.parse_dependency(child, index),
                _ if TaskType::from_tag(tag).is_some() => {
                    if !self.tasks[index.get()].is_group() {
                        continue;
                    }
                    let subtask = self.parse_task(child, Some(index));
                    if let TaskVariant::Group(group) = &mut self.tasks[index.get()].variant {
                        group.children.push(subtask);
                    }
                    self.parse_task_children(child, subtask);
                }
                _ => {
                    let handled = strategy.parse_element(
                        child,
                        parent_tag,
                        &mut self.tasks[index.get()],
                        &mut self.diagnostics,
                    );
                    if !handled {
                        self.diagnostics.warning(format!(
                            "unknown element '{}' under '{}'",
                            tag, parent_tag
                        ));
                    }
                }
            }
        }
    }

    fn extract_text(&mut self, node: Node<'_, '_>, index: TaskIndex) -> String {
        let label = self.tasks[index.get()].label().to_string();
        extract_markup(
            node,
            &label,
            &self.parser.config.markup,
            &mut self.diagnostics,
        )
    }

    fn add_parameter(&mut self, node: Node<'_, '_>, index: TaskIndex) {
        let task = &mut self.tasks[index.get()];

        let Some(name) = node.attribute(NAME) else {
            self.diagnostics.warning(format!(
                "parameter without a name in task '{}'",
                task.label()
            ));
            return;
        };

        let Some(value) = node.attribute(VALUE) else {
            self.diagnostics.warning(format!(
                "parameter '{}' without a value in task '{}'",
                name,
                task.label()
            ));
            return;
        };

        task.parameters.insert(name.to_string(), value.to_string());
    }

    fn parse_dependency(&mut self, node: Node<'_, '_>, index: TaskIndex) {
        match node.attribute(TASK) {
            Some(required_id) => self.dependencies.add_dependency(index, required_id),
            None => {
                let label = self.tasks[index.get()].label().to_string();
                self.diagnostics.error(format!(
                    "'{}' in task '{}' has no task attribute",
                    DEPENDS_ON, label
                ));
            }
        }
    }

    fn auto_generate_id(&mut self) -> String {
        let id = format!("{}{}", AUTO_ID_PREFIX, self.next_task_id);
        self.next_task_id += 1;
        id
    }
}
