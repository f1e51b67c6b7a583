use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::sync::Semaphore;

use cheatsheet::{
    CheatSheetError, CompositeParser, Diagnostics, ParseOutcome, Result, Severity,
    task::{ModelSummary, render_tree, show_task_relationships, summarize},
};

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub elapsed: Duration,
    pub outcome: ParseOutcome,
}

impl FileReport {
    pub fn has_errors(&self) -> bool {
        self.outcome.diagnostics.has_errors()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    ok: bool,
    severity: Option<Severity>,
    diagnostics: &'a Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<ModelSummary>,
}

/// Checks many documents at once, one parse per blocking worker.
pub struct CheckRunner {
    parser: Arc<CompositeParser>,
    workers: usize,
    verbose: bool,
}

impl CheckRunner {
    pub fn new(parser: CompositeParser, workers: Option<usize>, verbose: bool) -> Self {
        let workers = workers.unwrap_or_else(default_workers).max(1);
        Self {
            parser: Arc::new(parser),
            workers,
            verbose,
        }
    }

    /// Returns one report per path, in input order.
    pub async fn check_files(&self, paths: Vec<PathBuf>) -> Vec<FileReport> {
        if self.verbose {
            println!(
                "Checking {} files with up to {} workers",
                paths.len(),
                self.workers
            );
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::new();

        for path in paths {
            let parser = Arc::clone(&self.parser);
            let semaphore_clone = Arc::clone(&semaphore);
            let task_path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore_clone.acquire_owned().await.ok();

                tokio::task::spawn_blocking(move || {
                    let started = Instant::now();
                    let outcome = check_file(&parser, &task_path);
                    FileReport {
                        path: task_path,
                        elapsed: started.elapsed(),
                        outcome,
                    }
                })
                .await
            });

            handles.push((path, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (path, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) | Err(e) => {
                    eprintln!("Error: checking '{}' panicked: {}", path.display(), e);
                    let mut diagnostics = Diagnostics::new();
                    diagnostics.error(format!("check of '{}' did not finish", path.display()));
                    reports.push(FileReport {
                        path,
                        elapsed: Duration::ZERO,
                        outcome: ParseOutcome {
                            model: None,
                            diagnostics,
                        },
                    });
                }
            }
        }

        reports
    }
}

/// Opens `path` and parses it. The file is closed when this returns.
pub fn check_file(parser: &CompositeParser, path: &Path) -> ParseOutcome {
    let location = path.display().to_string();

    match File::open(path) {
        Ok(file) => parser.parse_reader(BufReader::new(file), &location),
        Err(err) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.add_with_cause(
                Severity::Error,
                format!("cannot open '{}'", location),
                CheatSheetError::Io(err),
            );
            ParseOutcome {
                model: None,
                diagnostics,
            }
        }
    }
}

pub fn print_text_report(reports: &[FileReport], verbose: bool, tree: bool) {
    for report in reports {
        let diagnostics = &report.outcome.diagnostics;
        let verdict = if report.outcome.is_success() { "OK" } else { "FAILED" };

        print!(
            "{}: {} ({} errors, {} warnings)",
            report.path.display(),
            verdict,
            diagnostics.count(Severity::Error),
            diagnostics.count(Severity::Warning)
        );
        if verbose {
            print!(" in {}", humantime::format_duration(report.elapsed));
        }
        println!();

        for diagnostic in diagnostics {
            println!("  {}", diagnostic);
        }

        if let Some(model) = &report.outcome.model {
            show_task_relationships(model, verbose);
            if tree {
                print!("{}", render_tree(model));
            }
        }
    }
}

pub fn print_json_report(reports: &[FileReport]) -> Result<()> {
    let json: Vec<JsonReport<'_>> = reports
        .iter()
        .map(|report| JsonReport {
            path: report.path.display().to_string(),
            ok: report.outcome.is_success(),
            severity: report.outcome.diagnostics.severity(),
            diagnostics: &report.outcome.diagnostics,
            model: report.outcome.model.as_ref().map(summarize),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const VALID: &str = r#"<compositeCheatsheet name="Guide">
        <taskGroup id="g">
            <task id="a"/>
            <task id="b"><dependsOn task="a"/></task>
        </taskGroup>
    </compositeCheatsheet>"#;

    const BROKEN: &str = r#"<compositeCheatsheet>
        <task id="a"><dependsOn task="nowhere"/></task>
    </compositeCheatsheet>"#;

    #[test]
    fn missing_file_cannot_be_opened() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = check_file(&CompositeParser::new(), &dir.path().join("absent.xml"));
        assert!(outcome.model.is_none());
        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert!(diagnostic.message.starts_with("cannot open"));
        assert!(diagnostic.cause.is_some());
    }

    #[tokio::test]
    async fn reports_follow_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.xml");
        let bad = dir.path().join("bad.xml");
        fs::write(&good, VALID).unwrap();
        fs::write(&bad, BROKEN).unwrap();

        let runner = CheckRunner::new(CompositeParser::new(), Some(2), false);
        let reports = runner.check_files(vec![bad.clone(), good.clone()]).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].path, bad);
        assert!(reports[0].has_errors());
        assert_eq!(reports[1].path, good);
        assert!(!reports[1].has_errors());
        assert_eq!(reports[1].outcome.model.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn single_worker_still_checks_everything() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("{}.xml", i));
                fs::write(&path, VALID).unwrap();
                path
            })
            .collect();

        let runner = CheckRunner::new(CompositeParser::new(), Some(1), false);
        let reports = runner.check_files(paths).await;
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.outcome.is_success()));
    }
}
