use std::collections::BTreeSet;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

use crate::error::AcquireError;
use crate::provisioner::TOOL_NAME;
use crate::sink::{emit, OutputSink};

/// Registry prefix selecting DefinitelyTyped sources.
const REGISTRY_PREFIX: &str = "dt~";

/// Outcome of one tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessInvocationResult {
    pub started: bool,
    pub exit_code: Option<i32>,
}

impl ProcessInvocationResult {
    pub fn succeeded(&self) -> bool {
        self.started && self.exit_code == Some(0)
    }
}

/// Build `install dt~<pkg>... [--save] --global`.
pub fn build_args(packages: &BTreeSet<String>, save: bool) -> Vec<String> {
    let mut args = Vec::with_capacity(packages.len() + 3);
    args.push("install".to_string());
    args.extend(
        packages
            .iter()
            .map(|name| format!("{REGISTRY_PREFIX}{name}")),
    );
    if save {
        args.push("--save".to_string());
    }
    args.push("--global".to_string());
    args
}

/// Runs the acquisition tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    save: bool,
}

impl ProcessRunner {
    pub fn new(save: bool) -> Self {
        Self { save }
    }

    /// Install `packages` with the tool at `tool_path`, returning whether it succeeded.
    ///
    /// `packages` must not be empty.
    pub async fn run(
        &self,
        tool_path: &Path,
        packages: &BTreeSet<String>,
        working_dir: &Path,
        sink: Option<&dyn OutputSink>,
    ) -> bool {
        self.invoke(tool_path, packages, working_dir, sink)
            .await
            .succeeded()
    }

    /// Like [`run`](Self::run) but reports whether the process started and its exit code.
    pub async fn invoke(
        &self,
        tool_path: &Path,
        packages: &BTreeSet<String>,
        working_dir: &Path,
        sink: Option<&dyn OutputSink>,
    ) -> ProcessInvocationResult {
        debug_assert!(!packages.is_empty());

        let args = build_args(packages, self.save);
        debug!(tool = ?tool_path, args = ?args, cwd = ?working_dir, "spawning acquisition tool");
        emit(sink, format!("Running {TOOL_NAME} {}", args.join(" ")));

        // Each argument is a separate argv entry; the platform layer quotes them.
        let mut child = match Command::new(tool_path)
            .args(&args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                let err = AcquireError::ProcessStartFailed {
                    path: tool_path.to_path_buf(),
                    source,
                };
                warn!(error = %err, "acquisition tool did not start");
                emit(sink, format!("Error: {err}"));
                return ProcessInvocationResult::default();
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (status, (), ()) = tokio::join!(
            child.wait(),
            forward_lines(stdout, sink),
            forward_lines(stderr, sink)
        );

        let exit_code = match status {
            Ok(status) => status.code(),
            Err(err) => {
                warn!(error = %err, "failed waiting for acquisition tool");
                None
            }
        };
        let result = ProcessInvocationResult {
            started: true,
            exit_code,
        };

        if result.succeeded() {
            let names: Vec<&str> = packages.iter().map(String::as_str).collect();
            info!(packages = ?names, "acquired declaration packages");
            emit(sink, format!("Acquired {}", names.join(", ")));
        } else {
            // The process has normally exited already; this only matters if it has not.
            if let Err(err) = child.kill().await {
                debug!(error = %err, "acquisition tool already stopped");
            }
            let err = AcquireError::ProcessNonZeroExit {
                tool: TOOL_NAME.to_string(),
                code: exit_code,
            };
            warn!(error = %err, "acquisition tool failed");
            emit(sink, format!("Error: {err}"));
        }

        result
    }
}

async fn forward_lines<R>(reader: Option<R>, sink: Option<&dyn OutputSink>)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                trace!(line = %line, "tool output");
                emit(sink, line);
            }
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "stopped reading tool output");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use rstest::rstest;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[rstest]
    #[case(&["lodash"], false, &["install", "dt~lodash", "--global"])]
    #[case(&["lodash"], true, &["install", "dt~lodash", "--save", "--global"])]
    #[case(&["react", "jquery"], false, &["install", "dt~jquery", "dt~react", "--global"])]
    fn test_build_args(#[case] packages: &[&str], #[case] save: bool, #[case] expected: &[&str]) {
        assert_eq!(build_args(&set(packages), save), expected);
    }

    #[test]
    fn invocation_success_requires_zero_exit() {
        let ok = ProcessInvocationResult {
            started: true,
            exit_code: Some(0),
        };
        let failed = ProcessInvocationResult {
            started: true,
            exit_code: Some(1),
        };
        assert!(ok.succeeded());
        assert!(!failed.succeeded());
        assert!(!ProcessInvocationResult::default().succeeded());
    }

    #[tokio::test]
    async fn start_failure_returns_false_with_error_line() {
        let temp = tempfile::TempDir::new().unwrap();
        let sink = MemorySink::new();
        let runner = ProcessRunner::default();

        let result = runner
            .invoke(
                &temp.path().join("missing-tool"),
                &set(&["lodash"]),
                temp.path(),
                Some(&sink),
            )
            .await;

        assert!(!result.started);
        assert!(!result.succeeded());
        assert!(sink.contains("Error: Failed to start"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use crate::provisioner::tests::write_tool;
        use std::fs;
        use tempfile::TempDir;

        #[tokio::test]
        async fn forwards_output_and_passes_arguments() {
            let temp = TempDir::new().unwrap();
            let tool = write_tool(
                temp.path(),
                "#!/bin/sh\necho \"args: $*\"\necho \"cwd: $(pwd)\"\necho oops >&2\nexit 0\n",
            );
            let project = temp.path().join("project");
            fs::create_dir_all(&project).unwrap();
            let sink = MemorySink::new();

            let ok = ProcessRunner::new(true)
                .run(&tool, &set(&["lodash", "react"]), &project, Some(&sink))
                .await;

            assert!(ok);
            assert!(sink.contains("args: install dt~lodash dt~react --save --global"));
            assert!(sink.contains(&format!("cwd: {}", project.canonicalize().unwrap().display())));
            assert!(sink.contains("oops"));
            assert!(sink.contains("Acquired lodash, react"));
        }

        #[tokio::test]
        async fn non_zero_exit_reports_code() {
            let temp = TempDir::new().unwrap();
            let tool = write_tool(temp.path(), "#!/bin/sh\necho not found >&2\nexit 3\n");
            let sink = MemorySink::new();

            let result = ProcessRunner::default()
                .invoke(&tool, &set(&["nope"]), temp.path(), Some(&sink))
                .await;

            assert!(result.started);
            assert_eq!(result.exit_code, Some(3));
            assert!(sink.contains("Error: typings exited with exit code 3"));
        }

        #[tokio::test]
        async fn runs_without_a_sink() {
            let temp = TempDir::new().unwrap();
            let tool = write_tool(temp.path(), "#!/bin/sh\necho quiet\n");

            assert!(
                ProcessRunner::default()
                    .run(&tool, &set(&["lodash"]), temp.path(), None)
                    .await
            );
        }
    }
}
