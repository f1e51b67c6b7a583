use std::{fmt, sync::Arc};

use serde::{Serialize, Serializer};

use crate::error::CheatSheetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One problem found while reading a document.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_cause"
    )]
    pub cause: Option<Arc<CheatSheetError>>,
}

fn serialize_cause<S: Serializer>(
    cause: &Option<Arc<CheatSheetError>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match cause {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

impl PartialEq for Diagnostic {
    fn eq(&self, other: &Self) -> bool {
        self.severity == other.severity
            && self.message == other.message
            && self.cause.as_ref().map(|c| c.to_string())
                == other.cause.as_ref().map(|c| c.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        Ok(())
    }
}

/// Ordered collection of every diagnostic raised during one parse.
///
/// The aggregate severity is the highest severity among the entries, or
/// `None` when nothing was reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            message: message.into(),
            cause: None,
        });
    }

    pub fn add_with_cause(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        cause: CheatSheetError,
    ) {
        self.entries.push(Diagnostic {
            severity,
            message: message.into(),
            cause: Some(Arc::new(cause)),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.add(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Severity::Error, message);
    }

    pub fn severity(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }

    pub fn is_ok(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.severity() == Some(Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_diagnostics_have_no_severity() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_ok());
        assert_eq!(diagnostics.severity(), None);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn severity_is_maximum_of_entries() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info("first");
        assert_eq!(diagnostics.severity(), Some(Severity::Info));
        diagnostics.error("second");
        diagnostics.warning("third");
        assert_eq!(diagnostics.severity(), Some(Severity::Error));
        assert_eq!(diagnostics.count(Severity::Warning), 1);
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning("a");
        diagnostics.error("b");
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }

    #[test]
    fn display_includes_cause() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_with_cause(
            Severity::Error,
            "cannot open",
            CheatSheetError::Document("gone".to_string()),
        );
        assert_eq!(
            diagnostics.to_string(),
            "ERROR: cannot open (Document error: gone)\n"
        );
    }
}
