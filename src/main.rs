use argh::FromArgs;
use nix::sys::signal::{SigHandler, Signal, signal};

use mysh::env::Environment;
use mysh::{Interpreter, rc};

/// A line-oriented command interpreter with real OS pipelines.
#[derive(FromArgs, Debug)]
struct Options {
    /// run a single command line and exit
    #[argh(option, short = 'c', long = "command")]
    command: Option<String>,

    /// skip loading .myshrc at startup
    #[argh(switch)]
    no_rc: bool,
}

fn main() {
    let options: Options = argh::from_env();

    // Pipeline children get their own process groups; without SIGTTOU
    // ignored, writing to the terminal from one of them would stop the whole
    // shell. SIGINT is ignored too: a Ctrl-C arriving while a foreground
    // command runs must end that command's cycle, not the session. The line
    // editor sees Ctrl-C as a plain character, and children restore the
    // default disposition before exec.
    // SAFETY: installed before any command runs, never changed afterwards.
    unsafe {
        let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
        let _ = signal(Signal::SIGINT, SigHandler::SigIgn);
    }

    let mut env = Environment::new();
    rc::apply_defaults(&mut env);
    if !options.no_rc {
        rc::load_myshrc(&mut env);
    }

    let mut interpreter = Interpreter::new(env);
    let code = match options.command {
        Some(line) => {
            interpreter.run_line(&line);
            interpreter.exit_request().unwrap_or(0)
        }
        None => interpreter.repl(),
    };
    std::process::exit(code);
}
