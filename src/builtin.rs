//! Built-in commands: `var`, `cd`, `pwd`, `which` and `exit`.
//!
//! Built-ins run inside the interpreter process so they can mutate the
//! [`Environment`]. Dispatch is by exact command-name match on the first
//! word; a path spelling such as `./var` never matches and falls through to
//! the external launcher. Diagnostics go to standard error prefixed with the
//! built-in's own name, regular output goes through the `out` writer so tests
//! can assert on it.

use std::io::Write;

use anyhow::{Context, Result};

use crate::env::Environment;
use crate::expand::is_valid_name;
use crate::external;
use crate::lexer;

/// Names reserved for built-ins, in `which`'s reporting order of precedence.
pub const BUILTIN_NAMES: [&str; 5] = ["var", "cd", "pwd", "which", "exit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Var,
    Cd,
    Pwd,
    Which,
    Exit,
}

impl Builtin {
    /// Match a command word against the built-in table.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "var" => Some(Self::Var),
            "cd" => Some(Self::Cd),
            "pwd" => Some(Self::Pwd),
            "which" => Some(Self::Which),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }

    /// Run the built-in with the full argument vector (`args[0]` is the
    /// command name itself).
    ///
    /// Usage errors are reported on standard error and the cycle is
    /// abandoned; the returned error is reserved for output-stream failures.
    pub fn run(self, args: &[String], env: &mut Environment, out: &mut dyn Write) -> Result<()> {
        match self {
            Self::Var => var(args, env),
            Self::Cd => cd(args, env, out),
            Self::Pwd => pwd(args, env, out),
            Self::Which => which(args, env, out),
            Self::Exit => exit(args, env),
        }
    }
}

/// `var NAME VALUE...` assigns the space-joined values; `var -s NAME CMD`
/// runs `CMD` through the launcher's capture mode and assigns its full
/// standard output verbatim.
fn var(args: &[String], env: &mut Environment) -> Result<()> {
    if args.len() <= 1 {
        eprintln!("var: expected 2 arguments, got 0");
        return Ok(());
    }
    let mut capture = false;
    if args[1].starts_with('-') {
        if args[1] != "-s" {
            let option = args[1].chars().nth(1).unwrap_or_default();
            eprintln!("var: invalid option: -{option}");
            return Ok(());
        }
        capture = true;
    }
    let provided = args.len() - 1 - usize::from(capture);
    if provided > 2 || (capture && provided < 2) {
        eprintln!("var: expected 2 arguments, got {provided}");
        return Ok(());
    }

    let name = if capture { &args[2] } else { &args[1] };
    if !is_valid_name(name) {
        eprintln!("var: invalid characters for variable {name}");
        return Ok(());
    }

    if capture {
        // The captured command is a single command line, not a pipeline:
        // it re-enters the launcher directly, so `|` inside it is just an
        // ordinary argument character.
        let words = match lexer::split_words(&args[3]) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("mysh: {e}");
                return Ok(());
            }
        };
        if words.is_empty() {
            return Ok(());
        }
        match external::run(&words, env, true) {
            Ok(Some(output)) => env.set_var(name.clone(), output),
            Ok(None) => {}
            Err(e) => eprintln!("var: failed to execute command: {e}"),
        }
    } else {
        env.set_var(name.clone(), args[2..].join(" "));
    }
    Ok(())
}

/// `cd [DIR]` moves both the OS current directory and the logical one.
///
/// The logical directory resolves the target lexically, so `cd ..` under a
/// symlinked directory goes where the prompt says it will. `OLDPWD` and
/// `PWD` are rewritten only on success; `cd -` announces its destination on
/// standard output the way interactive shells do.
fn cd(args: &[String], env: &mut Environment, out: &mut dyn Write) -> Result<()> {
    if args.len() > 2 {
        eprintln!("cd: too many arguments");
        return Ok(());
    }
    let mut target = match args.get(1) {
        Some(arg) => env.expand_tilde(arg),
        None => match env.get_var("HOME") {
            Some(home) => home,
            None => return Ok(()),
        },
    };
    if target == "-" {
        target = env
            .get_var("OLDPWD")
            .unwrap_or_else(|| env.logical_dir.display().to_string());
        writeln!(out, "{target}")?;
    }

    let new_dir = env.resolve_logical(&target);
    if let Err(e) = std::env::set_current_dir(&new_dir) {
        match e.kind() {
            std::io::ErrorKind::NotFound => {
                eprintln!("cd: no such file or directory: {target}");
            }
            std::io::ErrorKind::NotADirectory => {
                eprintln!("cd: not a directory: {target}");
            }
            std::io::ErrorKind::PermissionDenied => {
                eprintln!("cd: permission denied: {target}");
            }
            _ => eprintln!("cd: {e}"),
        }
        return Ok(());
    }

    let old = env.logical_dir.display().to_string();
    env.set_var("OLDPWD", old);
    env.set_var("PWD", new_dir.display().to_string());
    env.logical_dir = new_dir;
    Ok(())
}

/// `pwd [-P]` prints the logical directory, or the physical (symlink-free)
/// one under `-P`.
fn pwd(args: &[String], env: &Environment, out: &mut dyn Write) -> Result<()> {
    for arg in &args[1..] {
        if !arg.starts_with('-') {
            eprintln!("pwd: not expecting any arguments");
            return Ok(());
        }
        for option in arg.chars().skip(1) {
            if option != 'P' {
                eprintln!("pwd: invalid option: -{option}");
                return Ok(());
            }
        }
    }

    if args.iter().any(|a| a == "-P") {
        let physical =
            std::env::current_dir().context("cannot determine the current directory")?;
        let physical = std::fs::canonicalize(&physical).unwrap_or(physical);
        writeln!(out, "{}", physical.display())?;
    } else {
        writeln!(out, "{}", env.logical_dir.display())?;
    }
    Ok(())
}

/// `which NAME...` reports, per name, the built-in table first and the
/// search path second.
fn which(args: &[String], env: &Environment, out: &mut dyn Write) -> Result<()> {
    if args.len() == 1 {
        eprintln!("usage: which command ...");
        return Ok(());
    }
    for name in &args[1..] {
        if BUILTIN_NAMES.contains(&name.as_str()) {
            writeln!(out, "{name}: shell built-in command")?;
        } else if let Some(path) = external::which(name, env) {
            writeln!(out, "{}", path.display())?;
        } else {
            writeln!(out, "{name} not found")?;
        }
    }
    Ok(())
}

/// `exit [CODE]` records the requested code; the read loop observes it and
/// terminates the process, which keeps this handler an ordinary state
/// mutation.
fn exit(args: &[String], env: &mut Environment) -> Result<()> {
    if args.len() > 2 {
        eprintln!("exit: too many arguments");
        return Ok(());
    }
    let code = match args.get(1) {
        Some(arg) => match arg.parse::<i32>() {
            Ok(code) => code,
            Err(_) => {
                eprintln!("exit: non-integer exit code provided: {arg}");
                return Ok(());
            }
        },
        None => 0,
    };
    env.exit_request = Some(code);
    Ok(())
}
