//! Compiling and running the edited program
//!
//! A job is one child process. The event loop polls it between key presses
//! and collects a [`JobOutcome`] once it exits; C-g or quitting kills it.
//! Two reader threads drain the child's pipes so it never blocks on a full
//! pipe, keeping at most [`MAX_CAPTURE_BYTES`] of each stream.

use std::ffi::OsString;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{EditorError, Result};

/// Bytes kept from each of stdout and stderr
pub const MAX_CAPTURE_BYTES: usize = 256 * 1024;

const READ_CHUNK: usize = 4096;

/// How long to wait for the pipes to close after the child is gone.
/// A background grandchild can keep them open indefinitely.
const READ_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Compile,
    Run,
}

/// A program to execute and the arguments to pass it
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub kind: JobKind,
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

/// Exit status and combined stdout/stderr of a finished job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub kind: JobKind,
    /// None when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub output: String,
    /// Set when the job was cancelled from the editor
    pub stopped: bool,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        !self.stopped && self.exit_code == Some(0)
    }

    /// First line reported on the console
    pub fn headline(&self) -> String {
        match (self.kind, self.stopped, self.exit_code) {
            (JobKind::Compile, true, _) => "Compilation stopped.".to_string(),
            (JobKind::Compile, false, Some(0)) => "Compilation succeeded.".to_string(),
            (JobKind::Compile, false, _) => "Compilation failed:".to_string(),
            (JobKind::Run, true, _) => "Program stopped".to_string(),
            (JobKind::Run, false, Some(code)) => format!("Program exited with code {}", code),
            (JobKind::Run, false, None) => "Program did not exit normally".to_string(),
        }
    }
}

/// Compiler used for a source file: `g++` for C++ sources, `gcc` otherwise
pub fn compiler_for(source: &Path) -> &'static str {
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "cpp" | "cc" | "cxx" | "hpp" => "g++",
        _ => "gcc",
    }
}

/// Where the compiled program for a source file is written
pub fn executable_path(source: &Path) -> PathBuf {
    if cfg!(windows) {
        source.with_extension("exe")
    } else {
        source.with_extension("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Bytes read from one pipe
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Read `reader` to the end, keeping the first `limit` bytes
fn read_capped<R: Read>(mut reader: R, limit: usize) -> Captured {
    let mut captured = Captured::default();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "job pipe read failed");
                break;
            }
        };
        let room = limit.saturating_sub(captured.bytes.len());
        if n > room {
            captured.truncated = true;
        }
        captured.bytes.extend_from_slice(&chunk[..n.min(room)]);
    }
    captured
}

fn spawn_reader<R>(stream: Stream, reader: R, tx: Sender<(Stream, Captured)>) -> Result<()>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{:?}-reader", stream).to_lowercase())
        .spawn(move || {
            let captured = read_capped(reader, MAX_CAPTURE_BYTES);
            // The receiver is gone once the job was collected
            let _ = tx.send((stream, captured));
        })?;
    Ok(())
}

/// Start one reader per piped stream, returning how many were started
fn start_readers(child: &mut Child, tx: Sender<(Stream, Captured)>) -> Result<usize> {
    let mut streams = 0;
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(Stream::Stdout, stdout, tx.clone())?;
        streams += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(Stream::Stderr, stderr, tx)?;
        streams += 1;
    }
    Ok(streams)
}

/// The child process of the job in progress
struct ActiveJob {
    kind: JobKind,
    child: Child,
    output: Receiver<(Stream, Captured)>,
    streams: usize,
}

impl ActiveJob {
    /// Gather what the readers captured and build the outcome
    fn finish(self, status: Option<ExitStatus>, stopped: bool) -> JobOutcome {
        let deadline = Instant::now() + READ_GRACE;
        let mut stdout = Captured::default();
        let mut stderr = Captured::default();
        for _ in 0..self.streams {
            let timeout = deadline.saturating_duration_since(Instant::now());
            match self.output.recv_timeout(timeout) {
                Ok((Stream::Stdout, captured)) => stdout = captured,
                Ok((Stream::Stderr, captured)) => stderr = captured,
                Err(_) => {
                    debug!(kind = ?self.kind, "job output still open; not waiting");
                    break;
                }
            }
        }

        let mut output = String::from_utf8_lossy(&stdout.bytes).into_owned();
        if !stderr.bytes.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&String::from_utf8_lossy(&stderr.bytes));
        }
        if stdout.truncated || stderr.truncated {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("[output truncated]\n");
        }

        let exit_code = status.and_then(|s| s.code());
        debug!(kind = ?self.kind, exit_code = ?exit_code, stopped, "job finished");
        JobOutcome {
            kind: self.kind,
            exit_code,
            output,
            stopped,
        }
    }
}

/// Runs at most one job at a time and reports how it ended
#[derive(Default)]
pub struct Toolchain {
    active: Option<ActiveJob>,
}

impl Toolchain {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Number of jobs whose outcome has not been collected yet
    pub fn running(&self) -> usize {
        usize::from(self.active.is_some())
    }

    /// Compile `source` next to itself with the compiler found on PATH
    pub fn compile(&mut self, source: &Path) -> Result<()> {
        let compiler = compiler_for(source);
        let program = which::which(compiler)
            .map_err(|_| EditorError::CompilerNotFound(compiler.to_string()))?;
        let exe = executable_path(source);
        self.submit(JobRequest {
            kind: JobKind::Compile,
            program,
            args: vec![source.into(), "-o".into(), exe.into()],
        })
    }

    /// Run the program previously compiled from `source`
    pub fn run(&mut self, source: &Path) -> Result<()> {
        let exe = executable_path(source);
        if !exe.is_file() {
            return Err(EditorError::ExecutableNotFound(exe.display().to_string()));
        }
        // A bare relative name would be looked up on PATH
        let program = exe.canonicalize()?;
        self.submit(JobRequest {
            kind: JobKind::Run,
            program,
            args: Vec::new(),
        })
    }

    /// Start the process for `request`
    pub fn submit(&mut self, request: JobRequest) -> Result<()> {
        if self.active.is_some() {
            return Err(EditorError::JobRunning);
        }
        info!(kind = ?request.kind, program = %request.program.display(), "starting job");

        let mut child = Command::new(&request.program)
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EditorError::Message(format!(
                    "Failed to start {}: {}",
                    request.program.display(),
                    e
                ))
            })?;

        let (tx, rx) = mpsc::channel();
        let streams = match start_readers(&mut child, tx) {
            Ok(streams) => streams,
            Err(e) => {
                // Nobody would drain the pipes
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        self.active = Some(ActiveJob {
            kind: request.kind,
            child,
            output: rx,
            streams,
        });
        Ok(())
    }

    /// The outcome of the job if its process has exited; never blocks on
    /// a running process
    pub fn try_recv(&mut self) -> Option<JobOutcome> {
        let job = self.active.as_mut()?;
        let status = match job.child.try_wait() {
            Ok(Some(status)) => Some(status),
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "lost track of job; killing it");
                let _ = job.child.kill();
                job.child.wait().ok()
            }
        };
        self.active.take().map(|job| job.finish(status, false))
    }

    /// Kill the job in progress, returning its outcome
    pub fn cancel(&mut self) -> Option<JobOutcome> {
        let mut job = self.active.take()?;
        info!(kind = ?job.kind, "stopping job");
        if let Err(e) = job.child.kill() {
            // Already exited
            debug!(error = %e, "kill failed");
        }
        let status = job.child.wait().ok();
        Some(job.finish(status, true))
    }
}

impl Drop for Toolchain {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for(toolchain: &mut Toolchain) -> JobOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = toolchain.try_recv() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "job did not finish");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn shell(script: &str) -> JobRequest {
        JobRequest {
            kind: JobKind::Run,
            program: PathBuf::from("sh"),
            args: vec!["-c".into(), script.into()],
        }
    }

    #[test]
    fn test_compiler_choice() {
        assert_eq!(compiler_for(Path::new("main.cpp")), "g++");
        assert_eq!(compiler_for(Path::new("lib.CC")), "g++");
        assert_eq!(compiler_for(Path::new("x.hpp")), "g++");
        assert_eq!(compiler_for(Path::new("main.c")), "gcc");
        assert_eq!(compiler_for(Path::new("Makefile")), "gcc");
    }

    #[test]
    fn test_executable_path() {
        let exe = executable_path(Path::new("/tmp/prog/main.cpp"));
        if cfg!(windows) {
            assert_eq!(exe, PathBuf::from("/tmp/prog/main.exe"));
        } else {
            assert_eq!(exe, PathBuf::from("/tmp/prog/main"));
        }
    }

    #[test]
    fn test_headlines() {
        let mut outcome = JobOutcome {
            kind: JobKind::Compile,
            exit_code: Some(0),
            output: String::new(),
            stopped: false,
        };
        assert_eq!(outcome.headline(), "Compilation succeeded.");
        outcome.exit_code = Some(1);
        assert_eq!(outcome.headline(), "Compilation failed:");
        outcome.kind = JobKind::Run;
        assert_eq!(outcome.headline(), "Program exited with code 1");

        outcome.exit_code = None;
        outcome.stopped = true;
        assert_eq!(outcome.headline(), "Program stopped");
        outcome.kind = JobKind::Compile;
        assert_eq!(outcome.headline(), "Compilation stopped.");
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_read_capped_keeps_prefix() {
        let data = vec![b'a'; READ_CHUNK * 3 + 10];
        let captured = read_capped(&data[..], READ_CHUNK + 5);
        assert_eq!(captured.bytes.len(), READ_CHUNK + 5);
        assert!(captured.truncated);

        let captured = read_capped(&b"short"[..], READ_CHUNK);
        assert_eq!(captured.bytes, b"short");
        assert!(!captured.truncated);
    }

    #[test]
    fn test_run_requires_executable() {
        let dir = tempfile::tempdir().unwrap();
        let mut toolchain = Toolchain::new();
        let result = toolchain.run(&dir.path().join("never_built.c"));
        assert!(matches!(result, Err(EditorError::ExecutableNotFound(_))));
        assert_eq!(toolchain.running(), 0);
    }

    #[test]
    fn test_missing_program_reports_failure() {
        let mut toolchain = Toolchain::new();
        let result = toolchain.submit(JobRequest {
            kind: JobKind::Run,
            program: PathBuf::from("/definitely/not/a/program"),
            args: Vec::new(),
        });
        match result {
            Err(EditorError::Message(msg)) => assert!(msg.starts_with("Failed to start")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(toolchain.running(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_worker_combines_output() {
        let mut toolchain = Toolchain::new();
        toolchain
            .submit(shell("echo out; echo err >&2; exit 3"))
            .unwrap();
        assert_eq!(toolchain.running(), 1);

        let outcome = wait_for(&mut toolchain);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.output, "out\nerr\n");
        assert!(!outcome.stopped);
        assert_eq!(toolchain.running(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_one_job_at_a_time() {
        let mut toolchain = Toolchain::new();
        toolchain.submit(shell("sleep 30")).unwrap();
        let second = toolchain.submit(shell("echo second"));
        assert!(matches!(second, Err(EditorError::JobRunning)));
        assert_eq!(toolchain.running(), 1);
        toolchain.cancel();
    }

    #[cfg(unix)]
    #[test]
    fn test_cancel_stops_hung_job() {
        let mut toolchain = Toolchain::new();
        toolchain
            .submit(JobRequest {
                kind: JobKind::Run,
                program: PathBuf::from("sleep"),
                args: vec!["30".into()],
            })
            .unwrap();
        assert!(toolchain.try_recv().is_none());

        let started = Instant::now();
        let outcome = toolchain.cancel().expect("a job was running");
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(outcome.stopped);
        assert_eq!(outcome.headline(), "Program stopped");
        assert_eq!(toolchain.running(), 0);
        assert!(toolchain.cancel().is_none());

        // The next job is accepted and runs to completion
        toolchain.submit(shell("echo again")).unwrap();
        let outcome = wait_for(&mut toolchain);
        assert_eq!(outcome.output, "again\n");
        assert!(outcome.succeeded());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_bounded() {
        let mut toolchain = Toolchain::new();
        let bytes = MAX_CAPTURE_BYTES * 2;
        toolchain
            .submit(shell(&format!("head -c {} /dev/zero | tr '\\0' x", bytes)))
            .unwrap();
        let outcome = wait_for(&mut toolchain);
        assert!(outcome.succeeded());
        assert!(outcome.output.ends_with("[output truncated]\n"));
        assert!(outcome.output.len() < MAX_CAPTURE_BYTES + 64);
    }
}
