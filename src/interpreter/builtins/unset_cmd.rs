//! unset
//!
//! Remove parameters. A global is dropped from the namespace outright; a
//! local or special is flagged Unset in place so scope restoration still
//! works. Tied pairs go together. `-v` restricts to variables (already the
//! default here), `-m` takes patterns.

use crate::interpreter::dispatch::{BuiltinTable, Invocation};
use crate::interpreter::errors::TypesetError;
use crate::interpreter::params::flags::ParamFlags;
use crate::interpreter::params::param::TieSide;
use crate::interpreter::params::value::ParamValue;
use crate::interpreter::pattern;
use crate::interpreter::types::{BuiltinResult, ShellState};

pub fn handle_unset(
    state: &mut ShellState,
    _table: &mut BuiltinTable,
    inv: &Invocation,
) -> BuiltinResult {
    let mut stderr = String::new();
    let mut exit_code = 0;

    state.signals.queue();
    if inv.opts.is_minus('m') {
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
            let names: Vec<String> = state
                .params
                .visible_names()
                .into_iter()
                .filter(|n| re.is_match(n))
                .collect();
            for name in names {
                if let Err(e) = unset_one(state, &name) {
                    stderr.push_str(&format!("{}: {}\n", inv.name, e));
                    exit_code = 1;
                }
            }
        }
    } else {
        for name in &inv.args {
            if !state.params.contains(name) {
                // Unsetting an absent name is not an error.
                continue;
            }
            if let Err(e) = unset_one(state, name) {
                stderr.push_str(&format!("{}: {}\n", inv.name, e));
                exit_code = 1;
            }
        }
    }
    state.signals.unqueue();

    BuiltinResult { stdout: String::new(), stderr, exit_code }
}

fn unset_one(state: &mut ShellState, name: &str) -> Result<(), TypesetError> {
    let (flags, level, tie) = match state.params.lookup(name) {
        Some(pm) => (pm.flags, pm.level, pm.tie.clone()),
        None => return Ok(()),
    };
    if flags.contains(ParamFlags::READONLY) {
        return Err(TypesetError::ReadOnly { name: name.to_string() });
    }
    if flags.contains(ParamFlags::RESTRICTED) && state.options.restricted {
        return Err(TypesetError::Restricted { name: name.to_string() });
    }

    // The peer of a tied parameter goes with it.
    let peer = match &tie {
        Some(TieSide::Scalar { peer, .. }) | Some(TieSide::Array { peer }) => Some(peer.clone()),
        None => None,
    };

    drop_param(state, name, flags, level);
    if let Some(peer) = peer {
        if let Some(ppm) = state.params.lookup(&peer) {
            let (pflags, plevel) = (ppm.flags, ppm.level);
            drop_param(state, &peer, pflags, plevel);
            state.env.unexport(&peer);
        }
    }
    state.env.unexport(name);
    Ok(())
}

fn drop_param(state: &mut ShellState, name: &str, flags: ParamFlags, level: usize) {
    let keep_record = flags.contains(ParamFlags::SPECIAL) || level > 0;
    if keep_record {
        if let Some(pm) = state.params.lookup_mut(name) {
            pm.flags.insert(ParamFlags::UNSET);
            pm.flags.remove(ParamFlags::EXPORTED);
            pm.tie = None;
            pm.value = ParamValue::Scalar(String::new());
        }
    } else {
        state.params.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::dispatch::{run_builtin, BuiltinTable};
    use crate::interpreter::words::split_command_words;

    fn run(state: &mut ShellState, table: &mut BuiltinTable, line: &str) -> BuiltinResult {
        let words = split_command_words(line);
        run_builtin(state, table, &words[0], &words[1..]).expect("builtin exists")
    }

    fn setup() -> (ShellState, BuiltinTable) {
        (ShellState::new(), BuiltinTable::new())
    }

    #[test]
    fn test_unset_removes_global() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset x=1");
        let r = run(&mut state, &mut table, "unset x");
        assert_eq!(r.exit_code, 0);
        assert!(!state.params.contains("x"));
    }

    #[test]
    fn test_unset_readonly_fails() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset -r x=1");
        let r = run(&mut state, &mut table, "unset x");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("read-only variable: x"));
        assert!(state.params.contains("x"));
    }

    #[test]
    fn test_unset_exported_clears_mirror() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "export X=v");
        assert!(state.env.is_exported("X"));
        run(&mut state, &mut table, "unset X");
        assert!(!state.env.is_exported("X"));
    }

    #[test]
    fn test_unset_special_keeps_record() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "unset RANDOM");
        assert_eq!(r.exit_code, 0);
        let pm = state.params.lookup("RANDOM").unwrap();
        assert!(pm.is_unset());
        assert_eq!(state.params.get_value("RANDOM"), None);
    }

    #[test]
    fn test_unset_local_keeps_shadow() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset x=outer");
        state.params.push_scope();
        run(&mut state, &mut table, "local x=inner");
        run(&mut state, &mut table, "unset x");
        // Still shadowed: the outer value must not show through.
        assert_eq!(state.params.get_value("x"), None);
        state.params.pop_scope();
        assert_eq!(
            state.params.get_value("x"),
            Some(ParamValue::Scalar("outer".to_string()))
        );
    }

    #[test]
    fn test_unset_tied_pair_goes_together() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset -T PV pv");
        run(&mut state, &mut table, "unset PV");
        assert!(!state.params.contains("PV"));
        assert!(!state.params.contains("pv"));
    }

    #[test]
    fn test_unset_pattern() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset AA_ONE=1");
        run(&mut state, &mut table, "typeset AA_TWO=2");
        run(&mut state, &mut table, "typeset BB=3");
        run(&mut state, &mut table, "unset -m AA_*");
        assert!(!state.params.contains("AA_ONE"));
        assert!(!state.params.contains("AA_TWO"));
        assert!(state.params.contains("BB"));
    }

    #[test]
    fn test_unset_requires_name() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "unset");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("not enough arguments"));
    }
}
