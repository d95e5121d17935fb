//! enable/disable
//!
//! Hide builtins from lookup without removing them, and bring them back.
//! With no arguments, enable lists the enabled names and disable the
//! disabled ones; `-m` treats arguments as patterns.

use crate::interpreter::dispatch::{BuiltinKind, BuiltinTable, Invocation};
use crate::interpreter::errors::TypesetError;
use crate::interpreter::pattern;
use crate::interpreter::types::{BuiltinResult, ShellState};

pub fn handle_enable(
    _state: &mut ShellState,
    table: &mut BuiltinTable,
    inv: &Invocation,
) -> BuiltinResult {
    let enabling = inv.kind == BuiltinKind::Enable;

    if inv.args.is_empty() {
        let mut out = String::new();
        for name in table.names_with_state(enabling) {
            out.push_str(&name);
            out.push('\n');
        }
        return BuiltinResult::with_stdout(out);
    }

    if inv.opts.is_minus('m') {
        let mut matched = 0;
        let mut stderr = String::new();
        let mut exit_code = 0;
        for pat in &inv.args {
            let re = match pattern::compile(pat) {
                Some(re) => re,
                None => {
                    let e = TypesetError::BadPattern { pat: pat.clone() };
                    stderr.push_str(&format!("{}: {}\n", inv.name, e));
                    exit_code = 1;
                    continue;
                }
            };
            for name in table.all_names() {
                if re.is_match(&name) {
                    table.set_enabled(&name, enabling);
                    matched += 1;
                }
            }
        }
        if matched == 0 {
            exit_code = 1;
        }
        return BuiltinResult { stdout: String::new(), stderr, exit_code };
    }

    let mut stderr = String::new();
    let mut exit_code = 0;
    for name in &inv.args {
        if !table.set_enabled(name, enabling) {
            stderr.push_str(&format!("{}: no such hash table element: {}\n", inv.name, name));
            exit_code = 1;
        }
    }
    BuiltinResult { stdout: String::new(), stderr, exit_code }
}
