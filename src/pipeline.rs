//! Pipeline orchestration: N stages connected by N-1 kernel pipes.
//!
//! The parent creates every pipe up front, forks one child per stage and
//! hands each child the adjacent pipe ends on fd 0 and fd 1. Bookkeeping
//! uses owned descriptors so an end is closed exactly once: the parent
//! relinquishes an end as soon as the stage on its far side has forked, and
//! each child closes every inherited end it did not splice. Every forked
//! child is reaped exactly once, even when a later fork fails or a stage
//! cannot resolve its executable.

use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd};

use nix::sys::signal::{SigHandler, Signal, signal};
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, dup2, fork, pipe, setpgid};

use crate::builtin::Builtin;
use crate::env::Environment;
use crate::error::LaunchError;
use crate::external;

/// Run the stages of a pipeline concurrently and wait for all of them.
///
/// `commands` holds the tokenized argument vector of each stage, at least
/// one word per stage. Stage failures are reported by the child on standard
/// error and do not abort its siblings; the returned error covers only
/// parent-side resource failures, which leave nothing to clean up beyond
/// what has already been reaped here.
pub fn run(commands: &[Vec<String>], env: &mut Environment) -> Result<(), LaunchError> {
    let stage_count = commands.len();
    let mut pipes: Vec<(Option<OwnedFd>, Option<OwnedFd>)> = Vec::with_capacity(stage_count - 1);
    for _ in 0..stage_count - 1 {
        let (read_end, write_end) = pipe().map_err(io::Error::from)?;
        pipes.push((Some(read_end), Some(write_end)));
    }

    let mut children: Vec<Pid> = Vec::with_capacity(stage_count);
    for (i, words) in commands.iter().enumerate() {
        // SAFETY: single-threaded interpreter; the child only splices fds
        // and execs (or runs a built-in) before exiting.
        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
                // Undo the interpreter's ignored SIGINT so the stage stays
                // interruptible after exec.
                // SAFETY: still single-threaded, before exec.
                unsafe {
                    let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
                }
                if i > 0 {
                    let read_end = pipes[i - 1].0.as_ref();
                    if read_end.is_none_or(|fd| dup2(fd.as_raw_fd(), libc::STDIN_FILENO).is_err())
                    {
                        std::process::exit(1);
                    }
                }
                if i < stage_count - 1 {
                    let write_end = pipes[i].1.as_ref();
                    if write_end.is_none_or(|fd| dup2(fd.as_raw_fd(), libc::STDOUT_FILENO).is_err())
                    {
                        std::process::exit(1);
                    }
                }
                // Closes every inherited pipe end in one go; only the
                // spliced fd 0/1 duplicates survive.
                drop(pipes);
                std::process::exit(run_stage(words, env));
            }
            Ok(ForkResult::Parent { child }) => {
                children.push(child);
                // Both stages adjacent to these ends have now forked; keeping
                // them open in the parent would hold off EOF downstream.
                if i > 0 {
                    pipes[i - 1].0.take();
                }
                if i < stage_count - 1 {
                    pipes[i].1.take();
                }
            }
            Err(_) => {
                eprintln!("mysh: failed to fork process");
                break;
            }
        }
    }

    // Remaining ends belong to stages that never forked.
    drop(pipes);

    for pid in children {
        let _ = waitpid(pid, None);
    }
    Ok(())
}

/// Child-side stage body: dispatch a built-in against the spliced streams,
/// or replace the image with the external command.
fn run_stage(words: &[String], env: &mut Environment) -> i32 {
    if let Some(builtin) = Builtin::lookup(&words[0]) {
        let mut out = io::stdout();
        let status = if builtin.run(words, env, &mut out).is_ok() {
            0
        } else {
            1
        };
        let _ = out.flush();
        return status;
    }
    let err = external::exec(words, env);
    eprintln!("mysh: {err}");
    match err {
        LaunchError::NotFound(_) => 127,
        _ => 126,
    }
}
