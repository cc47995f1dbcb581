//! Spawning external programs.
//!
//! Arguments are always passed as a structured list, never through a shell,
//! so commit titles containing quotes or `$` reach the program untouched.

#[cfg(any(test, feature = "test-support"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "test-support"))]
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ExecError;

/// How a child process is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// stdout/stderr captured; stdout returned on success.
    Captured,
    /// stdin/stdout/stderr inherited from this process, for programs that run
    /// their own prompts. Returns an empty string on success.
    Interactive,
}

/// Runs one external command to completion.
pub trait CommandRunner {
    /// Run with `dir` as the working directory. A relative `dir` is resolved
    /// against the runner's own directory; `None` means that directory.
    fn run_in(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[String],
        mode: RunMode,
    ) -> Result<String, ExecError>;

    fn run(&self, program: &str, args: &[String], mode: RunMode) -> Result<String, ExecError> {
        self.run_in(None, program, args, mode)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run_in(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[String],
        mode: RunMode,
    ) -> Result<String, ExecError> {
        (**self).run_in(dir, program, args, mode)
    }
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Runs real processes with `workdir` as their current directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run_in(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[String],
        mode: RunMode,
    ) -> Result<String, ExecError> {
        let rendered = render_command(program, args);
        let cwd = match dir {
            Some(dir) => self.workdir.join(dir),
            None => self.workdir.clone(),
        };
        tracing::debug!(command = %rendered, cwd = %cwd.display(), ?mode, "spawning");

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&cwd);

        let spawn_err = |source| ExecError::Spawn {
            program: program.to_string(),
            source,
        };

        match mode {
            RunMode::Captured => {
                let output = cmd.stdin(Stdio::null()).output().map_err(spawn_err)?;
                if !output.status.success() {
                    return Err(ExecError::Shell {
                        command: rendered,
                        exit_code: output.status.code(),
                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                    });
                }
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                Ok(chomp(stdout))
            }
            RunMode::Interactive => {
                let status = cmd.status().map_err(spawn_err)?;
                if !status.success() {
                    return Err(ExecError::Shell {
                        command: rendered,
                        exit_code: status.code(),
                        stderr: String::new(),
                    });
                }
                Ok(String::new())
            }
        }
    }
}

/// Human-readable rendering of a command line, for logs and error messages only.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        let plain = !arg.is_empty()
            && arg
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
        if plain {
            rendered.push_str(arg);
        } else {
            rendered.push('\'');
            rendered.push_str(&arg.replace('\'', r"'\''"));
            rendered.push('\'');
        }
    }
    rendered
}

fn chomp(mut text: String) -> String {
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    text
}

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// One invocation seen by a [`ScriptedRunner`].
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Working directory requested by the caller, if any.
    pub dir: Option<PathBuf>,
    pub program: String,
    pub args: Vec<String>,
    pub mode: RunMode,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Exit { code: i32, stderr: String },
}

/// Replays canned replies in order and records every invocation.
///
/// Once the script runs out every command succeeds with empty output. Used to
/// pin down the exact argument vectors the adapters produce.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    replies: RefCell<VecDeque<Reply>>,
    seen: RefCell<Vec<Invocation>>,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(&self, stdout: impl Into<String>) -> &Self {
        self.replies
            .borrow_mut()
            .push_back(Reply::Stdout(stdout.into()));
        self
    }

    /// Queue a non-zero exit.
    pub fn fail(&self, code: i32, stderr: impl Into<String>) -> &Self {
        self.replies.borrow_mut().push_back(Reply::Exit {
            code,
            stderr: stderr.into(),
        });
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Invocations as `program arg arg ...` argument vectors.
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.seen
            .borrow()
            .iter()
            .map(|inv| {
                std::iter::once(inv.program.clone())
                    .chain(inv.args.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl CommandRunner for ScriptedRunner {
    fn run_in(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[String],
        mode: RunMode,
    ) -> Result<String, ExecError> {
        self.seen.borrow_mut().push(Invocation {
            dir: dir.map(Path::to_path_buf),
            program: program.to_string(),
            args: args.to_vec(),
            mode,
        });
        match self.replies.borrow_mut().pop_front() {
            None => Ok(String::new()),
            Some(Reply::Stdout(stdout)) => Ok(stdout),
            Some(Reply::Exit { code, stderr }) => Err(ExecError::Shell {
                command: render_command(program, args),
                exit_code: Some(code),
                stderr,
            }),
        }
    }
}
