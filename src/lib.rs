//! A line-oriented command interpreter with real OS pipelines.
//!
//! The crate provides the building blocks of a small interactive shell:
//! `${NAME}` variable interpolation, POSIX-like word tokenization, a handful
//! of built-in commands (`var`, `cd`, `pwd`, `which`, `exit`), an external
//! launcher built on fork/exec, and a pipeline orchestrator that connects
//! stages with kernel pipes.
//!
//! The main entry point is [`Interpreter`], which owns the mutable
//! [`env::Environment`] and runs one command cycle per input line. The
//! `mysh` binary wraps it in a line editor and loads `.myshrc` at startup.

pub mod builtin;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
pub mod lexer;
pub mod pipeline;
pub mod rc;

mod interpreter;

pub use interpreter::Interpreter;
