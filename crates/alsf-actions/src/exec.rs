//! Action execution.
//!
//! Built-in actions call the browser bridge. Script actions run as a
//! single child process that is waited on synchronously: directly when the
//! file is executable, otherwise through the interpreter for its type.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::action::{Action, ActionKind, Capability, ScriptAction, ScriptType};
use crate::discovery::is_executable;
use crate::error::{ActionError, ActionResult};
use crate::safari::{Browser, OSASCRIPT};
use crate::Target;

// =============================================================================
// Invocation plan
// =============================================================================

/// How to start a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Execute the file itself.
    Direct { program: PathBuf, args: Vec<String> },

    /// Pass the file to an interpreter.
    Interpreted {
        interpreter: PathBuf,
        flags: Vec<String>,
        script: PathBuf,
        args: Vec<String>,
    },
}

impl Invocation {
    /// Program that will be spawned.
    pub fn program(&self) -> &Path {
        match self {
            Invocation::Direct { program, .. } => program,
            Invocation::Interpreted { interpreter, .. } => interpreter,
        }
    }

    /// Arguments passed to `program()`.
    pub fn argv(&self) -> Vec<String> {
        match self {
            Invocation::Direct { args, .. } => args.clone(),
            Invocation::Interpreted {
                flags,
                script,
                args,
                ..
            } => flags
                .iter()
                .cloned()
                .chain(std::iter::once(script.to_string_lossy().into_owned()))
                .chain(args.iter().cloned())
                .collect(),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.argv());
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program().display())?;
        for arg in self.argv() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Decide how to run `script` with `args`.
///
/// Pure: the caller says whether the file is executable.
pub fn invocation_plan(
    script: &Path,
    executable: bool,
    args: Vec<String>,
) -> ActionResult<Invocation> {
    if executable {
        return Ok(Invocation::Direct {
            program: script.to_path_buf(),
            args,
        });
    }

    let (interpreter, flags) = match ScriptType::from_path(script) {
        Some(ScriptType::JavaScript) => (OSASCRIPT, vec!["-l".to_string(), "JavaScript".to_string()]),
        Some(ScriptType::AppleScript) => (OSASCRIPT, Vec::new()),
        Some(ScriptType::Shell(shell)) => (shell.program(), Vec::new()),
        None => return Err(ActionError::UnrunnableScript(script.to_path_buf())),
    };

    Ok(Invocation::Interpreted {
        interpreter: PathBuf::from(interpreter),
        flags,
        script: script.to_path_buf(),
        args,
    })
}

// =============================================================================
// Executor
// =============================================================================

/// Runs actions against targets.
pub struct Executor<'a> {
    browser: &'a dyn Browser,
    timeout: Option<Duration>,
}

impl<'a> Executor<'a> {
    pub fn new(browser: &'a dyn Browser) -> Self {
        Self {
            browser,
            timeout: None,
        }
    }

    /// Kill scripts that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `action` on `target`.
    pub fn run(&self, action: &Action, target: &Target) -> ActionResult<()> {
        tracing::info!("Running {} action {:?}", action.capability(), action.title());

        match action.kind() {
            ActionKind::Builtin(builtin) => match builtin.close_scope() {
                Some(scope) => {
                    let Target::Tab(tab) = target else {
                        return Err(ActionError::TargetMismatch {
                            title: action.title().to_string(),
                            expected: Capability::Tab,
                        });
                    };
                    self.browser.close(scope, tab.window_index, tab.index)
                }
                None => self.browser.open_url(&target.url()?),
            },
            ActionKind::Script(script) => {
                let args = target.script_args(action.title(), action.capability())?;
                let result = self.run_script(script, args);
                // Scripts may open, close or move tabs
                self.browser.invalidate_windows();
                result
            }
        }
    }

    fn run_script(&self, script: &ScriptAction, args: Vec<String>) -> ActionResult<()> {
        let plan = invocation_plan(&script.path, is_executable(&script.path), args)?;
        tracing::debug!("{}", plan);

        let (status, stdout, stderr) = match self.timeout {
            None => {
                let output = plan
                    .command()
                    .output()
                    .map_err(|source| launch_error(&plan, source))?;
                (
                    output.status,
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
            Some(timeout) => self.wait_with_timeout(&plan, &script.path, timeout)?,
        };

        if !stdout.trim().is_empty() {
            tracing::debug!("[{}] stdout: {}", script.title(), stdout.trim());
        }
        if !stderr.trim().is_empty() {
            tracing::debug!("[{}] stderr: {}", script.title(), stderr.trim());
        }

        if !status.success() {
            return Err(ActionError::ScriptFailed {
                path: script.path.clone(),
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    fn wait_with_timeout(
        &self,
        plan: &Invocation,
        path: &Path,
        timeout: Duration,
    ) -> ActionResult<(ExitStatus, String, String)> {
        let mut child = plan
            .command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| launch_error(plan, source))?;

        // Drain both pipes while waiting so a chatty script can't block on a
        // full pipe buffer
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = match child.wait_timeout(timeout)? {
            Some(status) => status,
            None => {
                // Timeout expired - kill and reap
                let _ = child.kill();
                let _ = child.wait();
                // Readers are left to finish on their own: a grandchild of
                // the script may still hold the pipes open
                return Err(ActionError::Timeout {
                    path: path.to_path_buf(),
                    duration: timeout,
                });
            }
        };

        Ok((status, join_reader(stdout), join_reader(stderr)))
    }
}

/// Read `pipe` to the end on a separate thread.
fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::debug!("Error reading script output: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn launch_error(plan: &Invocation, source: std::io::Error) -> ActionError {
    ActionError::Launch {
        program: plan.program().display().to_string(),
        source,
    }
}
