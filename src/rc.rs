//! Startup configuration: built-in defaults and the `.myshrc` file.
//!
//! `.myshrc` is a flat JSON object mapping variable names to string values,
//! looked up under `$MYSHDOTDIR` (falling back to `$HOME`). Bad entries are
//! reported and skipped individually; a malformed file is reported once and
//! ignored as a whole. A missing file is not an error.

use std::fs;
use std::path::Path;

use crate::env::Environment;
use crate::expand;

/// Variables the interpreter guarantees are present at startup. User and
/// `.myshrc` settings win over these.
pub fn apply_defaults(env: &mut Environment) {
    if env.get_var("PROMPT").is_none() {
        env.set_var("PROMPT", ">> ");
    }
    if env.get_var("MYSH_VERSION").is_none() {
        env.set_var("MYSH_VERSION", "1.0");
    }
}

/// Load `.myshrc` into the environment, if the file exists.
///
/// Values are interpolated against the variables loaded so far, so later
/// entries may reference earlier ones (JSON object order is preserved by
/// `serde_json`'s default map).
pub fn load_myshrc(env: &mut Environment) {
    let Some(base) = env.get_var("MYSHDOTDIR").or_else(|| env.get_var("HOME")) else {
        return;
    };
    let path = Path::new(&base).join(".myshrc");
    let Ok(contents) = fs::read_to_string(&path) else {
        return;
    };

    let parsed: serde_json::Value = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("mysh: invalid JSON format for .myshrc");
            return;
        }
    };
    let Some(entries) = parsed.as_object() else {
        eprintln!("mysh: invalid JSON format for .myshrc");
        return;
    };

    for (name, value) in entries {
        let Some(value) = value.as_str() else {
            eprintln!("mysh: .myshrc: {name}: not a string");
            continue;
        };
        if !expand::is_valid_name(name) {
            eprintln!("mysh: .myshrc: {name}: invalid characters for variable name");
            continue;
        }
        match expand::interpolate(value, env) {
            Ok(value) => env.set_var(name.clone(), value),
            Err(e) => eprintln!("mysh: .myshrc: {e}"),
        }
    }
}
