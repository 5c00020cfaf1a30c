use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::CString;
use std::path::{Component, Path, PathBuf};

/// Fallback search path used when `PATH` is unset, mirroring `os.defpath`.
pub const DEFAULT_PATH: &str = "/bin:/usr/bin";

/// Mutable, interpreter-level view of the process environment.
///
/// The environment contains:
/// - `vars`: the variable map inherited by every spawned command.
/// - `logical_dir`: the logical working directory, tracked independently of
///   the OS current directory so that `cd -` and relative `cd` targets stay
///   consistent; only the `cd` built-in mutates it.
/// - `exit_request`: set by the `exit` built-in and observed by the read loop,
///   so that `exit` stays a plain state mutation and remains testable.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// Logical working directory; lexically normalized, never symlink-resolved.
    pub logical_dir: PathBuf,
    /// Exit code requested by the `exit` built-in, if any.
    pub exit_request: Option<i32>,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// Copies `std::env::vars()` and initializes `logical_dir` from
    /// `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let logical_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self {
            vars,
            logical_dir,
            exit_request: None,
        }
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The colon-separated executable search path, defaulting when unset.
    pub fn search_path(&self) -> String {
        self.get_var("PATH")
            .unwrap_or_else(|| DEFAULT_PATH.to_string())
    }

    /// Expand a leading `~` to the invoking user's home directory.
    ///
    /// Only `~` and `~/...` are rewritten; `~user` forms are left untouched,
    /// as is everything when `HOME` is unset.
    pub fn expand_tilde(&self, arg: &str) -> String {
        let Some(home) = self.get_var("HOME") else {
            return arg.to_string();
        };
        if arg == "~" {
            home
        } else if let Some(rest) = arg.strip_prefix("~/") {
            format!("{}/{}", home.trim_end_matches('/'), rest)
        } else {
            arg.to_string()
        }
    }

    /// Resolve a `cd` target against the logical working directory.
    ///
    /// Absolute targets replace the logical directory; relative ones are
    /// joined onto it. The result is normalized lexically (`.` dropped, `..`
    /// popped) without consulting the filesystem, which is what keeps the
    /// logical directory distinct from the physical one.
    pub fn resolve_logical(&self, target: &str) -> PathBuf {
        normalize(&self.logical_dir.join(target))
    }

    /// Render the variable map as `KEY=VALUE` strings for `execve`.
    ///
    /// Entries that cannot be expressed as C strings (embedded NUL) are
    /// silently dropped.
    pub fn to_exec_env(&self) -> Vec<CString> {
        self.vars
            .iter()
            .filter_map(|(k, v)| CString::new(format!("{k}={v}")).ok())
            .collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexically normalize a path: drop `.`, pop a component for each `..`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::RootDir);
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::RootDir);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_var() {
        let mut env = Environment::new();
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);
        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));
    }

    #[test]
    fn captures_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }

    #[test]
    fn tilde_expansion() {
        let mut env = Environment::new();
        env.set_var("HOME", "/home/alice");
        assert_eq!(env.expand_tilde("~"), "/home/alice");
        assert_eq!(env.expand_tilde("~/docs"), "/home/alice/docs");
        assert_eq!(env.expand_tilde("~bob/docs"), "~bob/docs");
        assert_eq!(env.expand_tilde("plain"), "plain");
    }

    #[test]
    fn tilde_without_home_is_untouched() {
        let mut env = Environment::new();
        env.vars.remove("HOME");
        assert_eq!(env.expand_tilde("~/x"), "~/x");
    }

    #[test]
    fn logical_resolution_is_lexical() {
        let mut env = Environment::new();
        env.logical_dir = PathBuf::from("/a/b");
        assert_eq!(env.resolve_logical("c"), PathBuf::from("/a/b/c"));
        assert_eq!(env.resolve_logical(".."), PathBuf::from("/a"));
        assert_eq!(env.resolve_logical("../../.."), PathBuf::from("/"));
        assert_eq!(env.resolve_logical("/tmp/./x"), PathBuf::from("/tmp/x"));
    }
}
