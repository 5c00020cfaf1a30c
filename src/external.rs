//! External-command launcher: PATH resolution, permission checks, and the
//! fork/exec of a single child process, with an optional stdout-capture mode.

use std::ffi::CString;
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::wait::waitpid;
use nix::unistd::{AccessFlags, ForkResult, access, dup2, execve, fork, setpgid, Pid};

use crate::env::Environment;
use crate::error::LaunchError;

/// Resolve a command name to the path that would be executed.
///
/// A name containing a path separator is taken as-is and resolves only if it
/// names an existing regular file. A bare name is searched for in each
/// directory of the `PATH`-style list, in order, first match wins.
/// Execute permission is deliberately not checked here; the launcher reports
/// "permission denied" separately from "command not found".
pub fn resolve(name: &str, env: &Environment) -> Option<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return path.is_file().then_some(path);
    }
    for dir in env.search_path().split(':') {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Resolve `name` the way `which` reports it: the file must both exist and
/// be executable.
pub fn which(name: &str, env: &Environment) -> Option<PathBuf> {
    for dir in env.search_path().split(':') {
        let candidate = Path::new(dir).join(name);
        if candidate.is_file() && access(&candidate, AccessFlags::X_OK).is_ok() {
            return Some(candidate);
        }
    }
    None
}

/// Everything `execve` needs, assembled and validated before any process is
/// created so resolution errors never require a fork.
struct ExecImage {
    path: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
    /// The command name as the user typed it, for diagnostics.
    name: String,
}

impl ExecImage {
    /// Home-expand the arguments, resolve `args[0]`, check execute
    /// permission and render the C-string vectors.
    fn prepare(args: &[String], env: &Environment) -> Result<Self, LaunchError> {
        let args: Vec<String> = args.iter().map(|a| env.expand_tilde(a)).collect();

        let path = resolve(&args[0], env).ok_or_else(|| LaunchError::NotFound(args[0].clone()))?;
        access(&path, AccessFlags::X_OK)
            .map_err(|_| LaunchError::PermissionDenied(args[0].clone()))?;

        let path = CString::new(path.as_os_str().as_encoded_bytes())
            .map_err(|_| io_invalid("path contains NUL"))?;
        let argv: Vec<CString> = args
            .iter()
            .map(|a| CString::new(a.as_str()).map_err(|_| io_invalid("argument contains NUL")))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            path,
            argv,
            envp: env.to_exec_env(),
            name: args[0].clone(),
        })
    }

    /// Replace the current process image. Returns only on failure.
    fn exec(&self) -> nix::errno::Errno {
        match execve(&self.path, &self.argv, &self.envp) {
            Err(e) => e,
            Ok(infallible) => match infallible {},
        }
    }
}

/// Replace the current process with `args`, for callers that have already
/// forked (the pipeline orchestrator's stage children). Returns only on
/// failure.
pub fn exec(args: &[String], env: &Environment) -> LaunchError {
    let image = match ExecImage::prepare(args, env) {
        Ok(image) => image,
        Err(e) => return e,
    };
    LaunchError::Io(io::Error::from(image.exec()))
}

/// Launch one external command and wait for it.
///
/// Every argument beginning with `~` is home-expanded first, then `args[0]`
/// is resolved and permission-checked before any process exists. The child
/// joins its own process group (failures tolerated, so a future job-control
/// layer can address the pipeline as a unit), optionally rebinds stdout onto
/// a private pipe when `capture` is set, and replaces its image with the
/// resolved executable; that branch never returns. The parent drops its copy
/// of the pipe write end immediately, drains the read end to completion, and
/// waits for the child exactly once before returning.
///
/// Returns the captured stdout bytes (lossily UTF-8 decoded) when `capture`
/// is set, `None` otherwise.
pub fn run(args: &[String], env: &Environment, capture: bool) -> Result<Option<String>, LaunchError> {
    let image = ExecImage::prepare(args, env)?;

    let capture_pipe = if capture {
        Some(nix::unistd::pipe().map_err(io::Error::from)?)
    } else {
        None
    };

    // SAFETY: single-threaded interpreter; the child only calls exec-safe
    // routines before replacing its image.
    match unsafe { fork() }.map_err(io::Error::from)? {
        ForkResult::Child => {
            // A new process group per command; EPERM here is not fatal.
            let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
            // The interpreter ignores SIGINT and that disposition survives
            // exec; the command itself must stay interruptible.
            // SAFETY: still single-threaded, before exec.
            unsafe {
                let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
            }
            if let Some((read_end, write_end)) = capture_pipe {
                drop(read_end);
                if dup2(write_end.as_raw_fd(), libc::STDOUT_FILENO).is_err() {
                    std::process::exit(1);
                }
                drop(write_end);
            }
            // Divergent on success: the image is replaced and this call never
            // returns to the interpreter code in the child.
            let err = image.exec();
            eprintln!("mysh: failed to execute {}: {}", image.name, err);
            std::process::exit(127);
        }
        ForkResult::Parent { child } => {
            let output = match capture_pipe {
                Some((read_end, write_end)) => {
                    // Close our write end first or the read below never sees EOF.
                    drop(write_end);
                    let mut buf = Vec::new();
                    File::from(read_end).read_to_end(&mut buf)?;
                    Some(String::from_utf8_lossy(&buf).into_owned())
                }
                None => None,
            };
            waitpid(child, None).map_err(io::Error::from)?;
            Ok(output)
        }
    }
}

fn io_invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg.to_string())
}
