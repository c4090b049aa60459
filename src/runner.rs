//! External process execution.
//!
//! Every privileged wireless operation in this crate shells out to an external
//! tool; this module is the single place a child process is spawned. Output is
//! captured on reader threads so a deadline can be enforced with `try_wait`
//! polling and a forced kill, rather than blocking on the child indefinitely.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::{Result, WifiError};

/// What to do when a command outlives its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Kill the child and report `TimedOut`.
    #[default]
    Error,
    /// Kill the child and return whatever output was captured so far.
    /// Used for capture tools whose run is bounded by the caller, not
    /// by the tool itself.
    Harvest,
}

/// A single external command invocation.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    stdin: Option<String>,
    timeout: Option<Duration>,
    timeout_policy: TimeoutPolicy,
    privileged: bool,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout: None,
            timeout_policy: TimeoutPolicy::default(),
            privileged: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Text piped to the child's standard input after spawn.
    pub fn stdin_text(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Switch the deadline behavior from `TimedOut` to returning partial output.
    pub fn harvest_on_timeout(mut self) -> Self {
        self.timeout_policy = TimeoutPolicy::Harvest;
        self
    }

    /// Mark the command as requiring privilege escalation. The runner prefixes
    /// the configured escalation program; it never escalates silently.
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Rendered command line for logs and error messages.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Uniform result of every external command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// True only under `TimeoutPolicy::Harvest` when the deadline elapsed and
    /// the child was killed; `exit_code` is -1 in that case.
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Map a non-zero exit to `NonZeroExit`. Callers that tolerate specific
    /// exit codes inspect `exit_code` directly instead.
    pub fn ensure_success(self, command: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(WifiError::NonZeroExit {
                command: command.to_string(),
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Seam between workflows and the operating system. Workflows take a runner
/// by reference so tests can script tool output without spawning anything.
pub trait CommandRunner {
    fn run(&self, cmd: &Cmd) -> Result<ProcessOutcome>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    escalation: String,
}

impl ShellRunner {
    pub fn new(escalation: impl Into<String>) -> Self {
        Self {
            escalation: escalation.into(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &Cmd) -> Result<ProcessOutcome> {
        let mut command = if cmd.privileged {
            let mut c = Command::new(&self.escalation);
            c.arg(&cmd.program);
            c
        } else {
            Command::new(&cmd.program)
        };
        command
            .args(&cmd.args)
            .stdin(if cmd.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!("Running {}", cmd.display());
        let mut child = command
            .spawn()
            .map_err(|e| WifiError::LaunchFailed(format!("{}: {}", cmd.display(), e)))?;

        if let Some(text) = &cmd.stdin {
            if let Some(mut pipe) = child.stdin.take() {
                // The tool may exit before reading; a broken pipe is not an error.
                let _ = pipe.write_all(text.as_bytes());
            }
        }

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_thread = thread::spawn(move || read_pipe(stdout_pipe));
        let stderr_thread = thread::spawn(move || read_pipe(stderr_pipe));

        let deadline = cmd.timeout.map(|t| Instant::now() + t);
        let mut status = None;
        loop {
            if let Some(exit) = child.try_wait()? {
                status = Some(exit);
                break;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
            thread::sleep(Duration::from_millis(25));
        }

        if status.is_none() {
            let _ = child.kill();
            let _ = child.wait();
        }

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        match status {
            Some(exit) => Ok(ProcessOutcome {
                stdout,
                stderr,
                exit_code: exit.code().unwrap_or(-1),
                timed_out: false,
            }),
            None => match cmd.timeout_policy {
                TimeoutPolicy::Harvest => {
                    tracing::debug!(
                        "Deadline reached for {}; returning {} captured bytes",
                        cmd.display(),
                        stdout.len()
                    );
                    Ok(ProcessOutcome {
                        stdout,
                        stderr,
                        exit_code: -1,
                        timed_out: true,
                    })
                }
                TimeoutPolicy::Error => Err(WifiError::TimedOut(cmd.display())),
            },
        }
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buf);
    }
    buf
}
