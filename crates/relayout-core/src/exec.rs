// Relayout External Commands
// Runs hook commands in their own process group with optional timeout and identity

use std::ffi::CString;
use std::io::{self, Read, Write};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Bytes of stdout and stderr kept when `MaxReply` is not set
pub const DEFAULT_MAX_REPLY: usize = 64 * 1024;

/// Time between SIGTERM and SIGKILL on timeout
pub const KILL_GRACE: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const SHELL: &str = "/bin/bash";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A command to run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSpec {
    pub id: String,
    /// Program, or the whole script when `use_shell` is set
    pub command: String,
    pub args: Vec<String>,
    pub use_shell: bool,
    pub stdin: Vec<u8>,
    pub directory: Option<PathBuf>,
    pub clean_env: bool,
    /// `NAME=value` entries
    pub environment: Vec<String>,
    pub uid: Option<String>,
    pub gid: Option<String>,
    pub timeout: Option<Duration>,
    pub max_reply: usize,
}

impl CommandSpec {
    /// Split a command line on whitespace: first word is the program, the
    /// rest are arguments. With `use_shell` the whole line is the script.
    pub fn from_command_line(line: &str, use_shell: bool) -> Self {
        let (command, args) = if use_shell {
            (line.to_string(), Vec::new())
        } else {
            let mut words = line.split_whitespace().map(str::to_string);
            (words.next().unwrap_or_default(), words.collect())
        };
        Self {
            id: format!("cmd-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            command,
            args,
            use_shell,
            max_reply: DEFAULT_MAX_REPLY,
            ..Self::default()
        }
    }

    fn build(&self) -> Result<Command, String> {
        let mut cmd = if self.use_shell {
            let mut cmd = Command::new(SHELL);
            cmd.arg("-c").arg(&self.command);
            cmd
        } else {
            Command::new(&self.command)
        };
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        if self.clean_env {
            cmd.env_clear();
        }
        for entry in &self.environment {
            match entry.split_once('=') {
                Some((name, value)) => cmd.env(name, value),
                None => cmd.env(entry, ""),
            };
        }
        if let Some(dir) = &self.directory {
            cmd.current_dir(dir);
        }

        let (uid, passwd_gid) = match &self.uid {
            Some(user) => {
                let (uid, gid) = resolve_user(user)?;
                (Some(uid), gid)
            }
            None => (None, None),
        };
        let gid = match &self.gid {
            Some(group) => Some(resolve_group(group)?),
            None => passwd_gid,
        };
        if let Some(gid) = gid {
            cmd.gid(gid);
        }
        if let Some(uid) = uid {
            cmd.uid(uid);
        }
        Ok(cmd)
    }
}

/// Outcome of a command. Always populated, even when nothing could run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub id: String,
    /// An attempt to start the command was made
    pub processed: bool,
    pub command: String,
    pub args: Vec<String>,
    /// Exit code, `128 + signal` when killed, `-1` when it could not start
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl CommandResult {
    fn new(spec: &CommandSpec) -> Self {
        Self {
            id: spec.id.clone(),
            command: spec.command.clone(),
            args: spec.args.clone(),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.processed && self.status == 0
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs external commands for hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Run to completion, bounded by the command's timeout
    pub fn run(spec: &CommandSpec) -> CommandResult {
        let mut result = CommandResult::new(spec);
        result.processed = true;

        let child = spec.build().and_then(|mut cmd| cmd.spawn().map_err(|e| e.to_string()));
        let mut child = match child {
            Ok(child) => child,
            Err(message) => {
                result.status = -1;
                result.stderr = message.into_bytes();
                return result;
            }
        };

        let stdin = child.stdin.take();
        let input = spec.stdin.clone();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The command may exit without reading its input
                let _ = stdin.write_all(&input);
            }
        });
        let stdout = child.stdout.take().map(|out| capture(out, spec.max_reply));
        let stderr = child.stderr.take().map(|err| capture(err, spec.max_reply));

        let (status, timed_out) = match wait(&mut child, spec.timeout) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("[{}] wait failed: {}", spec.id, e);
                kill_group(&mut child);
                result.status = -1;
                result.stderr = e.to_string().into_bytes();
                return result;
            }
        };

        let _ = writer.join();
        result.stdout = stdout.and_then(|h| h.join().ok()).unwrap_or_default();
        result.stderr = stderr.and_then(|h| h.join().ok()).unwrap_or_default();
        result.status = exit_code(status);
        result.timed_out = timed_out;
        result
    }

    /// Start in the background; the result is only logged
    pub fn spawn(spec: CommandSpec) -> io::Result<thread::JoinHandle<CommandResult>> {
        thread::Builder::new()
            .name(format!("exec-{}", spec.id))
            .spawn(move || {
                let result = Self::run(&spec);
                log::debug!(
                    "[{}] {} exited with {}",
                    result.id,
                    result.command,
                    result.status
                );
                result
            })
    }
}

/// Read up to `limit` bytes, then drain the rest so the child never blocks
fn capture<R: Read + Send + 'static>(reader: R, limit: usize) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut kept = Vec::new();
        let mut limited = reader.take(limit as u64);
        let _ = limited.read_to_end(&mut kept);
        let _ = io::copy(&mut limited.into_inner(), &mut io::sink());
        kept
    })
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> io::Result<(ExitStatus, bool)> {
    let Some(timeout) = timeout else {
        return Ok((child.wait()?, false));
    };

    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        thread::sleep(POLL_INTERVAL);
    }

    let pgid = child.id() as libc::pid_t;
    log::warn!("Command {} timed out, terminating its process group", pgid);
    signal_group(pgid, libc::SIGTERM);

    let grace = Instant::now() + KILL_GRACE;
    while Instant::now() < grace {
        if let Some(status) = child.try_wait()? {
            return Ok((status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }

    signal_group(pgid, libc::SIGKILL);
    Ok((child.wait()?, true))
}

/// SIGKILL the child's process group and reap the leader
fn kill_group(child: &mut Child) -> Option<ExitStatus> {
    signal_group(child.id() as libc::pid_t, libc::SIGKILL);
    child.wait().ok()
}

fn signal_group(pgid: libc::pid_t, signal: libc::c_int) {
    // SAFETY: kill(2) with a negative pid only signals that process group
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc != 0 {
        log::debug!(
            "kill(-{}, {}): {}",
            pgid,
            signal,
            io::Error::last_os_error()
        );
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    }
}

/// Numeric uid or user name; returns the user's primary group as well
fn resolve_user(user: &str) -> Result<(u32, Option<u32>), String> {
    if let Ok(uid) = user.parse::<u32>() {
        return Ok((uid, None));
    }
    let name = CString::new(user).map_err(|e| e.to_string())?;
    // SAFETY: getpwnam returns a pointer into static storage or null; the
    // fields are copied out before any other passwd call
    let entry = unsafe { libc::getpwnam(name.as_ptr()) };
    if entry.is_null() {
        return Err(format!("unknown user \"{}\"", user));
    }
    let (uid, gid) = unsafe { ((*entry).pw_uid, (*entry).pw_gid) };
    Ok((uid, Some(gid)))
}

/// Numeric gid or group name
fn resolve_group(group: &str) -> Result<u32, String> {
    if let Ok(gid) = group.parse::<u32>() {
        return Ok(gid);
    }
    let name = CString::new(group).map_err(|e| e.to_string())?;
    // SAFETY: as for getpwnam
    let entry = unsafe { libc::getgrnam(name.as_ptr()) };
    if entry.is_null() {
        return Err(format!("unknown group \"{}\"", group));
    }
    Ok(unsafe { (*entry).gr_gid })
}
