//! Parser and task model for composite cheat sheets.
//!
//! A composite cheat sheet is an XML document describing a tree of tasks and
//! task groups, where tasks may depend on other tasks by id. Parsing never
//! fails with an `Err`: every entry point of [`CompositeParser`] returns a
//! [`ParseOutcome`] carrying the model (when no error was found) and all the
//! [`Diagnostics`] raised while reading the document.
//!
//! ```
//! use cheatsheet::CompositeParser;
//!
//! let xml = r#"<compositeCheatsheet name="Intro">
//!     <taskGroup name="Getting started">
//!         <task id="install" name="Install"/>
//!         <task id="run" name="Run"><dependsOn task="install"/></task>
//!     </taskGroup>
//! </compositeCheatsheet>"#;
//!
//! let outcome = CompositeParser::new().parse_str(xml, None);
//! let model = outcome.model.unwrap();
//! let run = model.find("run").unwrap();
//! assert_eq!(model.required_tasks(run.index()).next().unwrap().id, "install");
//! ```

pub mod config;
pub mod error;
pub mod markup;
pub mod model;
pub mod output;
pub mod parser;
pub mod status;
pub mod task;

pub use config::{CheckerConfiguration, MarkupConfig, ParserConfig, load_config};
pub use error::{CheatSheetError, Result};
pub use model::CompositeModel;
pub use parser::{CompositeParser, ParseOutcome};
pub use status::{Diagnostic, Diagnostics, Severity};
pub use task::{TaskIndex, TaskNode, TaskParseStrategy, TaskState, TaskVariant};
