use roxmltree::Node;

use crate::{config::MarkupConfig, status::Diagnostics};

const BOLD: &str = "b";
const BREAK: &str = "br";

/// Flattens an `intro` or `onCompletion` element into marked-up text.
///
/// Text children are copied verbatim. `<b>` and `<br/>` become the
/// configured markers; any other element is reported and dropped. The
/// result is trimmed of leading and trailing control characters and spaces.
pub fn extract_markup(
    node: Node<'_, '_>,
    task_label: &str,
    markup: &MarkupConfig,
    diagnostics: &mut Diagnostics,
) -> String {
    let mut text = String::new();

    for child in node.children() {
        if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        } else if child.is_element() {
            match child.tag_name().name() {
                BOLD => push_bold(&mut text, child, task_label, markup, diagnostics),
                BREAK => text.push_str(&markup.line_break),
                other => diagnostics.warning(format!(
                    "unknown element '{}' in description of task '{}'",
                    other, task_label
                )),
            }
        }
    }

    text.trim_matches(|c: char| c <= ' ').to_string()
}

fn push_bold(
    text: &mut String,
    bold: Node<'_, '_>,
    task_label: &str,
    markup: &MarkupConfig,
    diagnostics: &mut Diagnostics,
) {
    match bold.children().find(Node::is_text) {
        Some(content) => {
            text.push_str(&markup.bold_start);
            text.push_str(content.text().unwrap_or_default());
            text.push_str(&markup.bold_end);
        }
        None => diagnostics.warning(format!(
            "bold element without text in description of task '{}'",
            task_label
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Severity;

    fn extract(xml: &str) -> (String, Diagnostics) {
        let document = roxmltree::Document::parse(xml).unwrap();
        let mut diagnostics = Diagnostics::new();
        let text = extract_markup(
            document.root_element(),
            "Setup",
            &MarkupConfig::default(),
            &mut diagnostics,
        );
        (text, diagnostics)
    }

    #[test]
    fn plain_text_is_copied() {
        let (text, diagnostics) = extract("<intro>Install the tools.</intro>");
        assert_eq!(text, "Install the tools.");
        assert!(diagnostics.is_ok());
    }

    #[test]
    fn line_break_becomes_marker() {
        let (text, _) = extract("<intro>a<br/>b</intro>");
        assert_eq!(text, "a<br/>b");
    }

    #[test]
    fn bold_is_wrapped() {
        let (text, _) = extract("<intro><b>x</b></intro>");
        assert_eq!(text, "<b>x</b>");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let (text, _) = extract("<intro>\r\n\t  keep  inner  \n</intro>");
        assert_eq!(text, "keep  inner");
    }

    #[test]
    fn unknown_elements_warn_and_add_nothing() {
        let (text, diagnostics) = extract("<intro>a<i>skipped</i>b</intro>");
        assert_eq!(text, "ab");
        assert_eq!(diagnostics.count(Severity::Warning), 1);
        assert_eq!(
            diagnostics.iter().next().unwrap().message,
            "unknown element 'i' in description of task 'Setup'"
        );
    }

    #[test]
    fn empty_bold_is_reported() {
        let (text, diagnostics) = extract("<intro>a<b/>b</intro>");
        assert_eq!(text, "ab");
        assert_eq!(diagnostics.count(Severity::Warning), 1);
    }

    #[test]
    fn comment_before_bold_text_is_skipped() {
        let (text, diagnostics) = extract("<intro><b><!-- note -->x</b></intro>");
        assert_eq!(text, "<b>x</b>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn custom_markers_are_used() {
        let document = roxmltree::Document::parse("<intro><b>x</b><br/>y</intro>").unwrap();
        let markup = MarkupConfig {
            bold_start: "**".to_string(),
            bold_end: "**".to_string(),
            line_break: "\\n".to_string(),
        };
        let mut diagnostics = Diagnostics::new();
        let text = extract_markup(document.root_element(), "t", &markup, &mut diagnostics);
        assert_eq!(text, "**x**\\ny");
    }
}
