//! The command cycle and the interactive read loop.
//!
//! A raw line is first segmented at top-level `|`. Multi-stage lines go to
//! the pipeline orchestrator with each stage tokenized as-is; single
//! commands are interpolated, tokenized and dispatched to a built-in or the
//! external launcher. Every recoverable failure is reported on standard
//! error with the `mysh: ` prefix and ends only the current cycle.

use std::io::{self, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::builtin::Builtin;
use crate::env::Environment;
use crate::error::SyntaxError;
use crate::expand;
use crate::external;
use crate::lexer;
use crate::pipeline;

pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Exit code requested by the `exit` built-in, once it has run.
    pub fn exit_request(&self) -> Option<i32> {
        self.env.exit_request
    }

    /// Run one command cycle. Never panics and never terminates the process;
    /// `exit` only records its request.
    pub fn run_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        let stages = lexer::split_pipeline(line);
        if stages.len() > 1 {
            self.run_pipeline(&stages);
            return;
        }

        let line = match expand::interpolate(line, &self.env) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("mysh: {e}");
                return;
            }
        };
        let words = match lexer::split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("mysh: {e}");
                return;
            }
        };
        if words.is_empty() {
            return;
        }

        if let Some(builtin) = Builtin::lookup(&words[0]) {
            let mut out = io::stdout();
            match builtin.run(&words, &mut self.env, &mut out) {
                Ok(()) => {
                    let _ = out.flush();
                }
                Err(e) => eprintln!("mysh: {e}"),
            }
        } else if let Err(e) = external::run(&words, &self.env, false) {
            eprintln!("mysh: {e}");
        }
    }

    /// Tokenize each stage and hand the whole set to the orchestrator.
    ///
    /// Stage text is passed to the tokenizer verbatim, without variable
    /// interpolation. All stages are validated before any process or pipe
    /// exists, so a bad stage costs nothing to abandon.
    fn run_pipeline(&mut self, stages: &[String]) {
        let mut commands = Vec::with_capacity(stages.len());
        for stage in stages {
            if stage.trim().is_empty() {
                eprintln!("mysh: {}", SyntaxError::EmptyPipelineStage);
                return;
            }
            match lexer::split_words(stage) {
                Ok(words) if !words.is_empty() => commands.push(words),
                Ok(_) => {
                    eprintln!("mysh: {}", SyntaxError::EmptyPipelineStage);
                    return;
                }
                Err(e) => {
                    eprintln!("mysh: {e}");
                    return;
                }
            }
        }
        if let Err(e) = pipeline::run(&commands, &mut self.env) {
            eprintln!("mysh: {e}");
        }
    }

    /// The interactive read loop.
    ///
    /// The prompt re-reads `PROMPT` each iteration so `var PROMPT ...` takes
    /// effect immediately. Ctrl-C abandons the current line; Ctrl-D on an
    /// empty line ends the session with code 0. Returns the process exit
    /// code.
    pub fn repl(&mut self) -> i32 {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("mysh: {e}");
                return 1;
            }
        };

        loop {
            let prompt = self.env.get_var("PROMPT").unwrap_or_else(|| ">> ".to_string());
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    self.run_line(&line);
                    if let Some(code) = self.exit_request() {
                        return code;
                    }
                }
                Err(ReadlineError::Interrupted) => println!(),
                Err(ReadlineError::Eof) => {
                    println!();
                    return 0;
                }
                Err(e) => {
                    eprintln!("mysh: {e}");
                    return 1;
                }
            }
        }
    }
}
