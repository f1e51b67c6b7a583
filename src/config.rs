use std::{collections::HashMap, fs, path::Path, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::{
    error::{CheatSheetError, Result},
    output::OutputMode,
};

pub const DEFAULT_EXPLORER: &str = "tree";
pub const DEFAULT_COMPLETION_MESSAGE: &str = "Completed: ${name}";
pub const BOLD_START: &str = "<b>";
pub const BOLD_END: &str = "</b>";
pub const LINE_BREAK: &str = "<br/>";

static BRACED_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("braced variable pattern is valid")
});
static SIMPLE_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("simple variable pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserSection,
    #[serde(default)]
    markup: MarkupSection,
    #[serde(default)]
    check: CheckSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParserSection {
    explorer: Option<String>,
    completion_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkupSection {
    bold_start: Option<String>,
    bold_end: Option<String>,
    line_break: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckSection {
    workers: Option<usize>,
    output: Option<OutputMode>,
}

/// Markers written by the markup extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupConfig {
    pub bold_start: String,
    pub bold_end: String,
    pub line_break: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            bold_start: BOLD_START.to_string(),
            bold_end: BOLD_END.to_string(),
            line_break: LINE_BREAK.to_string(),
        }
    }
}

/// Settings a [`CompositeParser`](crate::parser::CompositeParser) reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub default_explorer: String,
    pub completion_message: String,
    pub markup: MarkupConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_explorer: DEFAULT_EXPLORER.to_string(),
            completion_message: DEFAULT_COMPLETION_MESSAGE.to_string(),
            markup: MarkupConfig::default(),
        }
    }
}

impl ParserConfig {
    /// Renders the default completion message for a task.
    pub fn completion_message_for(&self, id: &str, name: &str, kind: &str) -> String {
        let variables = HashMap::from([("id", id), ("name", name), ("kind", kind)]);
        substitute_variables(&self.completion_message, &variables)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckerConfiguration {
    pub parser: ParserConfig,
    pub workers: Option<usize>,
    pub output: Option<OutputMode>,
}

pub fn load_config(config_path: &Path) -> Result<CheckerConfiguration> {
    let contents = fs::read_to_string(config_path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<CheckerConfiguration> {
    let file: ConfigFile = toml::from_str(contents)?;
    process_config(file)
}

fn process_config(file: ConfigFile) -> Result<CheckerConfiguration> {
    let defaults = ParserConfig::default();

    let default_explorer = file.parser.explorer.unwrap_or(defaults.default_explorer);
    if default_explorer.trim().is_empty() {
        return Err(CheatSheetError::Config(
            "parser.explorer must not be empty".to_string(),
        ));
    }

    if file.check.workers == Some(0) {
        return Err(CheatSheetError::Config(
            "check.workers must be at least 1".to_string(),
        ));
    }

    let markup = MarkupConfig {
        bold_start: file.markup.bold_start.unwrap_or(defaults.markup.bold_start),
        bold_end: file.markup.bold_end.unwrap_or(defaults.markup.bold_end),
        line_break: file.markup.line_break.unwrap_or(defaults.markup.line_break),
    };

    Ok(CheckerConfiguration {
        parser: ParserConfig {
            default_explorer,
            completion_message: file
                .parser
                .completion_message
                .unwrap_or(defaults.completion_message),
            markup,
        },
        workers: file.check.workers,
        output: file.check.output,
    })
}

fn substitute_variables(text: &str, variables: &HashMap<&str, &str>) -> String {
    let result = BRACED_VARIABLE.replace_all(text, |caps: &regex::Captures| {
        variables
            .get(&caps[1])
            .map(|value| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });

    SIMPLE_VARIABLE
        .replace_all(&result, |caps: &regex::Captures| {
            variables
                .get(&caps[1])
                .map(|value| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
