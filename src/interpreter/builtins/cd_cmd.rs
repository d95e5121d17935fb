//! cd/chdir/pushd/popd
//!
//! Logical directory tracking over the PWD/OLDPWD parameters and a
//! directory stack. There is no filesystem access here: the shell proper
//! resolves paths against the real filesystem before these semantics
//! matter, and everything the dispatcher contract needs (option senses,
//! `--`, a leading `-` as a positional argument) is exercised without it.

use crate::interpreter::dispatch::{BuiltinKind, BuiltinTable, Invocation};
use crate::interpreter::params::value::ParamValue;
use crate::interpreter::types::{BuiltinResult, ShellState};

pub fn handle_cd(
    state: &mut ShellState,
    _table: &mut BuiltinTable,
    inv: &Invocation,
) -> BuiltinResult {
    let quiet = inv.opts.is_minus('q');
    match inv.kind {
        BuiltinKind::Popd => {
            let target = match state.dirstack.pop() {
                Some(d) => d,
                None => {
                    return BuiltinResult::failure(
                        format!("{}: directory stack empty\n", inv.name),
                        1,
                    )
                }
            };
            change_dir(state, &target);
            if quiet {
                BuiltinResult::ok()
            } else {
                BuiltinResult::with_stdout(format!("{}\n", target))
            }
        }
        BuiltinKind::Pushd => {
            let old = state.pwd();
            let (target, print) = match resolve_target(state, &inv.args) {
                Ok(t) => t,
                Err(r) => return r,
            };
            state.dirstack.push(old);
            change_dir(state, &target);
            if quiet && !print {
                BuiltinResult::ok()
            } else {
                BuiltinResult::with_stdout(format!("{}\n", target))
            }
        }
        _ => {
            let (target, print) = match resolve_target(state, &inv.args) {
                Ok(t) => t,
                Err(r) => return r,
            };
            change_dir(state, &target);
            if print && !quiet {
                BuiltinResult::with_stdout(format!("{}\n", target))
            } else {
                BuiltinResult::ok()
            }
        }
    }
}

/// Work out the destination. The second return value says whether the new
/// directory should be echoed (`cd -`, the two-argument form).
fn resolve_target(
    state: &mut ShellState,
    args: &[String],
) -> Result<(String, bool), BuiltinResult> {
    let pwd = state.pwd();
    match args.len() {
        0 => {
            let home = match state.params.get_value("HOME") {
                Some(ParamValue::Scalar(h)) if !h.is_empty() => h,
                _ => "/".to_string(),
            };
            Ok((home, false))
        }
        1 => {
            let arg = &args[0];
            if arg == "-" {
                let old = match state.params.get_value("OLDPWD") {
                    Some(ParamValue::Scalar(o)) if !o.is_empty() => o,
                    _ => {
                        return Err(BuiltinResult::failure("cd: no previous directory\n", 1))
                    }
                };
                Ok((old, true))
            } else {
                Ok((normalize(&pwd, arg), false))
            }
        }
        _ => {
            // cd old new: substitute in the current directory name.
            let old = &args[0];
            let new = &args[1];
            match pwd.find(old.as_str()) {
                Some(i) => {
                    let replaced = format!("{}{}{}", &pwd[..i], new, &pwd[i + old.len()..]);
                    Ok((replaced, true))
                }
                None => Err(BuiltinResult::failure(
                    format!("cd: string not in pwd: {}\n", old),
                    1,
                )),
            }
        }
    }
}

fn change_dir(state: &mut ShellState, target: &str) {
    let old = state.pwd();
    set_dir_param(state, "OLDPWD", &old);
    set_dir_param(state, "PWD", target);
}

fn set_dir_param(state: &mut ShellState, name: &str, value: &str) {
    use crate::interpreter::params::environment::sync_param;
    use crate::interpreter::params::flags::ParamFlags;
    use crate::interpreter::params::param::Param;

    if !state.params.contains(name) {
        state.params.insert(Param::new(name, ParamFlags::EXPORTED, 0));
    }
    let _ = state
        .params
        .set_value(name, ParamValue::Scalar(value.to_string()));
    sync_param(&mut state.params, &mut state.env, name);
}

/// Resolve a path against a base, collapsing `.` and `..` lexically.
fn normalize(base: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path)
    };
    let mut parts: Vec<&str> = Vec::new();
    for comp in joined.split('/') {
        match comp {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            c => parts.push(c),
        }
    }
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}
