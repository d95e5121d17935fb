//! Interpreter Types
//!
//! Shell-wide state and the result record every builtin handler returns.

use crate::interpreter::params::environment::EnvMirror;
use crate::interpreter::params::flags::ParamFlags;
use crate::interpreter::params::namespace::Namespace;
use crate::interpreter::params::param::Param;
use crate::interpreter::params::special::{RandomAccessor, SecondsAccessor};
use crate::interpreter::params::value::ParamValue;
use crate::interpreter::signals::SignalQueue;

/// Shell options relevant to builtin argument and parameter handling.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// POSIX-compatibility mode: stricter readonly/export rules.
    pub posix_builtins: bool,
    /// Restricted shell: flagged parameters cannot be created or altered.
    pub restricted: bool,
    /// Suppress the implicit display from `typeset NAME` on an existing
    /// parameter.
    pub typeset_silent: bool,
    /// `typeset -x` implies global rather than local scope.
    pub global_export: bool,
    /// Trace builtin invocations on stderr.
    pub xtrace: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            posix_builtins: false,
            restricted: false,
            typeset_silent: false,
            global_export: false,
            xtrace: false,
        }
    }
}

/// Result record for a builtin invocation.
#[derive(Debug, Clone)]
pub struct BuiltinResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl BuiltinResult {
    pub fn ok() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn with_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failure(stderr: impl Into<String>, exit_code: i32) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}

/// The whole shell state a builtin can touch: options, the parameter
/// namespace, the exported-environment mirror, the deferred-signal queue
/// and the logical directory bookkeeping used by cd/pushd/popd.
#[derive(Debug)]
pub struct ShellState {
    pub options: ShellOptions,
    pub params: Namespace,
    pub env: EnvMirror,
    pub signals: SignalQueue,
    pub dirstack: Vec<String>,
    pub last_exit_code: i32,
}

impl ShellState {
    /// Fresh state with the standard specials and nothing imported.
    pub fn new() -> Self {
        Self::with_env(std::iter::empty())
    }

    /// Fresh state importing an environment snapshot: each entry becomes an
    /// exported scalar parameter, mirrored back out verbatim.
    pub fn with_env(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Namespace::new();
        let mut env = EnvMirror::new();

        for (name, value) in vars {
            let mut pm = Param::new(&name, ParamFlags::EXPORTED, 0);
            pm.value = ParamValue::Scalar(value.clone());
            params.insert(pm);
            env.export_scalar(&name, &value);
        }

        let mut seconds = Param::new("SECONDS", ParamFlags::SPECIAL | ParamFlags::INTEGER, 0);
        seconds.special = Some(Box::new(SecondsAccessor::new()));
        params.insert(seconds);

        let mut random = Param::new("RANDOM", ParamFlags::SPECIAL | ParamFlags::INTEGER, 0);
        random.special = Some(Box::new(RandomAccessor::new()));
        params.insert(random);

        if params.lookup("PWD").is_none() {
            let mut pwd = Param::new("PWD", ParamFlags::EXPORTED, 0);
            pwd.value = ParamValue::Scalar("/".to_string());
            params.insert(pwd);
            env.export_scalar("PWD", "/");
        }

        ShellState {
            options: ShellOptions::default(),
            params,
            env,
            signals: SignalQueue::new(),
            dirstack: Vec::new(),
            last_exit_code: 0,
        }
    }

    /// The logical working directory (the PWD parameter).
    pub fn pwd(&mut self) -> String {
        match self.params.get_value("PWD") {
            Some(ParamValue::Scalar(s)) if !s.is_empty() => s,
            _ => "/".to_string(),
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}
