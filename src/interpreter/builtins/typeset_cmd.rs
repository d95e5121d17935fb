//! typeset/declare/local/export/readonly/integer/float
//!
//! The declaration family. One handler serves all seven names; the option
//! table rows differ in recognized letters and pre-set defaults (export
//! forces -x, readonly -r, integer -i, float -E). Translates option
//! letters into attribute bit sets, resolves conflicts, then walks the
//! assignment words through the reconciler. Tied pairs (-T), pattern mode
//! (-m) and the print modes (-p) are handled here as well.

use indexmap::IndexMap;

use crate::interpreter::builtins::assign_parsing::{
    parse_assignment, parse_keyed_elements, AssignValue, Assignment,
};
use crate::interpreter::builtins::typeset_print::{
    format_param, list_params, ATTR_LETTERS, ListMode,
};
use crate::interpreter::dispatch::{BuiltinKind, BuiltinTable, Invocation};
use crate::interpreter::errors::TypesetError;
use crate::interpreter::options::ParsedOptions;
use crate::interpreter::params::flags::{resolve_conflicts, ParamFlags, ParamType};
use crate::interpreter::params::reconcile::{
    typeset_single, AttrRequest, TiePlan, TypesetOutcome,
};
use crate::interpreter::params::value::ParamValue;
use crate::interpreter::pattern;
use crate::interpreter::types::{BuiltinResult, ShellState};

pub fn handle_typeset(
    state: &mut ShellState,
    _table: &mut BuiltinTable,
    inv: &Invocation,
) -> BuiltinResult {
    let mut ops = inv.opts.clone();
    let posix = state.options.posix_builtins;
    let export_cmd = inv.kind == BuiltinKind::Export;
    let readonly_cmd = inv.kind == BuiltinKind::Readonly;
    let hasargs = !inv.args.is_empty();

    // POSIX ignores -p when export/readonly are given names to act on.
    if (export_cmd || readonly_cmd) && posix && hasargs {
        ops.unset('p');
    }
    // POSIX readonly acts globally unless +g asks otherwise.
    if readonly_cmd && posix && !ops.is_plus('g') {
        ops.set('g', true);
    }

    // Translate the letters into attribute bit sets.
    let mut on = ParamFlags::NONE;
    let mut off = ParamFlags::NONE;
    for &(letter, bit) in ATTR_LETTERS {
        if ops.is_minus(letter) {
            on.insert(bit);
        } else if ops.is_plus(letter) {
            off.insert(bit);
        }
    }
    let roff = off;
    let (on, off) = resolve_conflicts(on, off);
    let mut on = on;

    // Numeric and width option arguments.
    let (base, width) = match numeric_args(&ops, on, &inv.name) {
        Ok(pair) => pair,
        Err(r) => return r,
    };

    // Print-mode decoding (-p / -p1).
    let mut print_mode = false;
    let mut line_mode = false;
    if ops.is_set('p') {
        print_mode = true;
        if let Some(arg) = ops.arg('p') {
            match arg.parse::<i64>() {
                Ok(0) => {}
                Ok(1) => line_mode = true,
                _ => {
                    let e = TypesetError::BadPrintArg { arg: arg.to_string() };
                    return BuiltinResult::failure(format!("{}: {}\n", inv.name, e), 1);
                }
            }
        }
    }

    let list_mode = if print_mode {
        if posix && export_cmd {
            ListMode::PosixExport
        } else if posix && readonly_cmd {
            ListMode::PosixReadonly
        } else {
            ListMode::Typeset { line: line_mode }
        }
    } else if !roff.is_empty() || ops.is_set('+') {
        ListMode::NameOnly
    } else if (on | roff).is_empty() {
        ListMode::Type
    } else {
        ListMode::Value
    };

    // Given no arguments, list whatever the options specify.
    if !hasargs {
        let exclude = if matches!(list_mode, ListMode::PosixExport | ListMode::PosixReadonly) {
            (ParamFlags::ARRAY | ParamFlags::HASHED) & !(on | roff)
        } else {
            ParamFlags::NONE
        };
        let out = list_params(&mut state.params, on | roff, exclude, list_mode);
        return BuiltinResult::with_stdout(out);
    }

    // The family localizes by default; -g/-x/-m reach for the global scope
    // unless countermanded.
    if !(ops.is_set('g') || ops.is_set('x') || ops.is_set('m'))
        || ops.is_plus('g')
        || inv.kind == BuiltinKind::Local
        || (!state.options.global_export && !ops.is_set('g'))
    {
        on.insert(ParamFlags::LOCAL);
    }

    state.signals.queue();
    let req_template = AttrRequest { on, off, roff, base, width };
    let result = if on.contains(ParamFlags::TIED) && !print_mode {
        tie_pair(state, inv, &ops, req_template)
    } else if off.contains(ParamFlags::TIED) {
        BuiltinResult::failure(format!("{}: {}\n", inv.name, TypesetError::UntieNotAllowed), 1)
    } else if ops.is_set('m') {
        pattern_mode(state, inv, &ops, req_template, list_mode)
    } else {
        plain_args(state, inv, &ops, req_template, print_mode, line_mode)
    };
    state.signals.unqueue();
    result
}

/// Pull the base/precision and width arguments off the parsed options.
fn numeric_args(
    ops: &ParsedOptions,
    on: ParamFlags,
    cmd: &str,
) -> Result<(Option<i64>, Option<usize>), BuiltinResult> {
    let mut base = None;
    let mut width = None;

    let base_arg = if on.contains(ParamFlags::INTEGER) {
        ops.arg('i')
    } else if on.contains(ParamFlags::EFLOAT) {
        ops.arg('E')
    } else if on.contains(ParamFlags::FFLOAT) {
        ops.arg('F')
    } else {
        None
    };
    if let Some(arg) = base_arg {
        let integer = on.contains(ParamFlags::INTEGER);
        let parsed: Result<i64, _> = arg.parse();
        match parsed {
            Ok(b) => {
                if integer && !(2..=36).contains(&b) {
                    let e = TypesetError::BadBaseRange { base: b };
                    return Err(BuiltinResult::failure(format!("{}: {}\n", cmd, e), 1));
                }
                base = Some(b);
            }
            Err(_) => {
                let e = if integer {
                    TypesetError::BadBase { arg: arg.to_string() }
                } else {
                    TypesetError::BadPrecision { arg: arg.to_string() }
                };
                return Err(BuiltinResult::failure(format!("{}: {}\n", cmd, e), 1));
            }
        }
    }

    let width_arg = if on.contains(ParamFlags::LEFT) {
        ops.arg('L')
    } else if on.contains(ParamFlags::RIGHT_B) {
        ops.arg('R')
    } else if on.contains(ParamFlags::RIGHT_Z) {
        ops.arg('Z')
    } else {
        None
    };
    if let Some(arg) = width_arg {
        match arg.parse::<usize>() {
            Ok(w) => width = Some(w),
            Err(_) => {
                let e = TypesetError::BadWidth { arg: arg.to_string() };
                return Err(BuiltinResult::failure(format!("{}: {}\n", cmd, e), 1));
            }
        }
    }
    Ok((base, width))
}

/// Convert a parsed assignment value into the tagged value the reconciler
/// takes, turning keyed or alternating elements into an association when
/// one is being declared.
fn convert_value(
    state: &ShellState,
    asg: &Assignment,
    on: ParamFlags,
) -> Option<ParamValue> {
    let hashed = on.contains(ParamFlags::HASHED)
        || state
            .params
            .lookup(&asg.name)
            .map_or(false, |p| p.type_tag() == ParamType::Hashed);
    match &asg.value {
        None => None,
        Some(AssignValue::Scalar(s)) => Some(ParamValue::Scalar(s.clone())),
        Some(AssignValue::Array(elems)) => {
            if hashed {
                if let Some(pairs) = parse_keyed_elements(elems) {
                    let mut h = IndexMap::new();
                    for (k, v) in pairs {
                        h.insert(k, v);
                    }
                    return Some(ParamValue::Hash(h));
                }
            }
            Some(ParamValue::Array(elems.clone()))
        }
    }
}

fn fail(inv: &Invocation, e: &TypesetError) -> BuiltinResult {
    BuiltinResult::failure(format!("{}: {}\n", inv.name, e), 1)
}

/// The straight path: each argument is a name or assignment.
fn plain_args(
    state: &mut ShellState,
    inv: &Invocation,
    ops: &ParsedOptions,
    req: AttrRequest,
    print_mode: bool,
    line_mode: bool,
) -> BuiltinResult {
    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut exit_code = 0;

    for word in &inv.args {
        let asg = match parse_assignment(word) {
            Some(a) => a,
            None => {
                stderr.push_str("bad assignment\n");
                exit_code = 1;
                continue;
            }
        };

        if print_mode {
            match format_param(&mut state.params, &asg.name, ListMode::Typeset { line: line_mode }) {
                Some(line) => {
                    stdout.push_str(&line);
                    stdout.push('\n');
                }
                None => {
                    let e = TypesetError::NoSuchVariable { name: asg.name.clone() };
                    stderr.push_str(&format!("{}: {}\n", inv.name, e));
                    exit_code = 1;
                }
            }
            continue;
        }

        let value = convert_value(state, &asg, req.on);
        match typeset_single(
            &mut state.params,
            &mut state.env,
            &state.options,
            inv.kind == BuiltinKind::Export,
            &asg.name,
            &req,
            value,
            None,
        ) {
            Ok(TypesetOutcome::Changed) => {}
            Ok(TypesetOutcome::Display) => {
                if !ops.is_set('g') && !state.options.typeset_silent {
                    if let Some(line) =
                        format_param(&mut state.params, &asg.name, ListMode::Value)
                    {
                        stdout.push_str(&line);
                        stdout.push('\n');
                    }
                }
            }
            Err(e) => {
                stderr.push_str(&format!("{}: {}\n", inv.name, e));
                exit_code = 1;
            }
        }
    }

    BuiltinResult { stdout, stderr, exit_code }
}

/// `-m`: arguments are patterns over existing parameter names.
fn pattern_mode(
    state: &mut ShellState,
    inv: &Invocation,
    ops: &ParsedOptions,
    req: AttrRequest,
    list_mode: ListMode,
) -> BuiltinResult {
    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut exit_code = 0;

    for word in &inv.args {
        let asg = match parse_assignment(word) {
            Some(a) => a,
            None => {
                stderr.push_str("bad assignment\n");
                exit_code = 1;
                continue;
            }
        };
        let re = match pattern::compile(&asg.name) {
            Some(re) => re,
            None => {
                let e = TypesetError::BadPattern { pat: asg.name.clone() };
                stderr.push_str(&format!("{}: {}\n", inv.name, e));
                exit_code = 1;
                continue;
            }
        };

        let mut names: Vec<String> = state
            .params
            .visible_names()
            .into_iter()
            .filter(|n| re.is_match(n))
            .collect();
        names.sort();
        // Unset parameters are never matched; restricted ones are skipped
        // silently in restricted mode.
        names.retain(|n| match state.params.lookup(n) {
            Some(pm) => {
                !pm.is_unset()
                    && !(pm.flags.contains(ParamFlags::RESTRICTED) && state.options.restricted)
            }
            None => false,
        });

        if ops.is_plus('m') && asg.value.is_none() {
            for n in &names {
                if let Some(line) = format_param(&mut state.params, n, list_mode) {
                    stdout.push_str(&line);
                    stdout.push('\n');
                }
            }
            continue;
        }

        for n in &names {
            let value = convert_value(state, &Assignment { name: n.clone(), value: asg.value.clone() }, req.on);
            match typeset_single(
                &mut state.params,
                &mut state.env,
                &state.options,
                inv.kind == BuiltinKind::Export,
                n,
                &req,
                value,
                None,
            ) {
                Ok(_) => {}
                Err(e) => {
                    stderr.push_str(&format!("{}: {}\n", inv.name, e));
                    exit_code = 1;
                }
            }
        }
    }

    BuiltinResult { stdout, stderr, exit_code }
}

/// `-T scalar array [joinchar]`: create or refresh a tied pair. The array
/// side is created first; failure on the scalar side unwinds it.
fn tie_pair(
    state: &mut ShellState,
    inv: &Invocation,
    ops: &ParsedOptions,
    req: AttrRequest,
) -> BuiltinResult {
    if ops.is_set('m') {
        return fail(inv, &TypesetError::IncompatibleTieOptions);
    }
    let nargs = inv.args.len();
    if nargs < 2 {
        return fail(inv, &TypesetError::TieRequiresPair);
    }
    if nargs > 3 {
        return fail(inv, &TypesetError::TooManyTieArguments);
    }

    let asg0 = match parse_assignment(&inv.args[0]) {
        Some(a) => a,
        None => return BuiltinResult::failure("bad assignment\n", 1),
    };
    let asg1 = match parse_assignment(&inv.args[1]) {
        Some(a) => a,
        None => return BuiltinResult::failure("bad assignment\n", 1),
    };

    if asg0.has_array_value() {
        return fail(inv, &TypesetError::TieFirstScalar { name: asg0.name.clone() });
    }
    if !asg1.has_array_value() && asg1.value.is_some() {
        return fail(inv, &TypesetError::TieSecondArray { name: asg1.name.clone() });
    }
    if asg0.name == asg1.name {
        return fail(inv, &TypesetError::SelfTie { name: asg0.name.clone() });
    }
    if asg0.name.contains('[') || asg1.name.contains('[') {
        return fail(inv, &TypesetError::TieArrayElement { name: asg0.name.clone() });
    }
    if asg0.value.is_some() && asg1.value.is_some() {
        return fail(inv, &TypesetError::OneTieValue { name: asg0.name.clone() });
    }

    // The optional third argument is the join character: absent means `:`,
    // an empty word means no separator at all.
    let join: Option<char> = match inv.args.get(2) {
        None => Some(':'),
        Some(w) if w.is_empty() => None,
        Some(w) => w.chars().next(),
    };

    // Existing-parameter compatibility checks on the scalar side.
    let mut already_tied = false;
    let mut oldval: Option<ParamValue> = None;
    let mut on = req.on;
    let pm_info = state.params.lookup(&asg0.name).map(|pm| {
        (
            pm.flags,
            pm.level,
            pm.type_tag(),
            pm.tied_scalar().map(|(peer, _)| peer.to_string()),
        )
    });
    if let Some((pflags, plevel, ptag, ppeer)) = pm_info {
        let usable = !pflags.contains(ParamFlags::UNSET)
            && (state.params.current_level() == plevel || !on.contains(ParamFlags::LOCAL));
        if usable {
            if pflags.contains(ParamFlags::TIED) {
                if ptag != ParamType::Scalar {
                    return fail(inv, &TypesetError::AlreadyTiedNonScalar { name: asg0.name.clone() });
                } else if ppeer.as_deref() == Some(asg1.name.as_str()) {
                    already_tied = true;
                } else {
                    return fail(inv, &TypesetError::AlreadyTiedScalar { name: asg0.name.clone() });
                }
            } else {
                // Converting an untied scalar: its value and export status
                // survive, other attributes reset.
                if asg0.value.is_none()
                    && asg1.value.is_none()
                    && !matches!(ptag, ParamType::Array | ParamType::Hashed)
                {
                    oldval = state.params.get_value(&asg0.name);
                }
                on.insert(pflags & !req.roff & ParamFlags::EXPORTED);
            }
        }
    }

    let req0 = AttrRequest { on, ..req.clone() };
    let array_on = (on | ParamFlags::ARRAY) & !ParamFlags::EXPORTED;

    if already_tied {
        // Refresh attributes and any supplied value on both sides.
        let scalar_value = asg0.value.as_ref().map(|v| match v {
            AssignValue::Scalar(s) => ParamValue::Scalar(s.clone()),
            AssignValue::Array(a) => ParamValue::Array(a.clone()),
        });
        if let Err(e) = typeset_single(
            &mut state.params,
            &mut state.env,
            &state.options,
            false,
            &asg0.name,
            &req0,
            scalar_value,
            Some(TiePlan::Scalar { peer: asg1.name.clone(), join }),
        ) {
            return fail(inv, &e);
        }
        let array_req = AttrRequest {
            on: array_on,
            off: req.off & !ParamFlags::ARRAY,
            ..req.clone()
        };
        let array_value = asg1.value.as_ref().map(|v| match v {
            AssignValue::Array(a) => ParamValue::Array(a.clone()),
            AssignValue::Scalar(s) => ParamValue::Scalar(s.clone()),
        });
        if let Err(e) = typeset_single(
            &mut state.params,
            &mut state.env,
            &state.options,
            false,
            &asg1.name,
            &array_req,
            array_value,
            None,
        ) {
            return fail(inv, &e);
        }
        return BuiltinResult::ok();
    }

    // Create the array side first; the scalar side needs it to exist.
    let array_req = AttrRequest { on: array_on, ..req.clone() };
    if let Err(e) = typeset_single(
        &mut state.params,
        &mut state.env,
        &state.options,
        false,
        &asg1.name,
        &array_req,
        None,
        Some(TiePlan::Array { peer: asg0.name.clone() }),
    ) {
        return fail(inv, &e);
    }

    if let Err(e) = typeset_single(
        &mut state.params,
        &mut state.env,
        &state.options,
        false,
        &asg0.name,
        &req0,
        None,
        Some(TiePlan::Scalar { peer: asg1.name.clone(), join }),
    ) {
        // Unwind the half-built pair.
        state.params.remove(&asg1.name);
        return fail(inv, &e);
    }

    // Initial contents: at most one side carries a value; an untied
    // scalar's previous value re-splits through the new join character.
    let initial = if let Some(AssignValue::Array(elems)) = &asg1.value {
        Some((asg1.name.clone(), ParamValue::Array(elems.clone())))
    } else if let Some(AssignValue::Scalar(s)) = &asg0.value {
        Some((asg0.name.clone(), ParamValue::Scalar(s.clone())))
    } else {
        oldval.map(|v| (asg0.name.clone(), v))
    };
    if let Some((name, v)) = initial {
        if let Err(e) = state.params.set_value(&name, v) {
            return fail(inv, &e);
        }
        crate::interpreter::params::environment::sync_param(
            &mut state.params,
            &mut state.env,
            &asg0.name,
        );
    }

    BuiltinResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::dispatch::run_builtin;

    fn run(state: &mut ShellState, table: &mut BuiltinTable, line: &str) -> BuiltinResult {
        let words = crate::interpreter::words::split_command_words(line);
        run_builtin(state, table, &words[0], &words[1..]).expect("builtin exists")
    }

    fn setup() -> (ShellState, BuiltinTable) {
        (ShellState::new(), BuiltinTable::new())
    }

    #[test]
    fn test_typeset_integer_then_float() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -i x=3");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.lookup("x").unwrap().type_tag(),
            ParamType::Integer
        );

        let r = run(&mut state, &mut table, "typeset -E x");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        let pm = state.params.lookup("x").unwrap();
        assert_eq!(pm.type_tag(), ParamType::FloatE);
        let v = state.params.get_value("x").unwrap();
        assert!(v.as_scalar().unwrap().starts_with('3'));
    }

    #[test]
    fn test_readonly_set_and_clear() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -r x=1");
        assert_eq!(r.exit_code, 0);

        let r = run(&mut state, &mut table, "typeset x=2");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("read-only variable: x"));

        let r = run(&mut state, &mut table, "typeset +r x=2");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("x"),
            Some(ParamValue::Scalar("2".to_string()))
        );

        // POSIX mode refuses the same thing through plain typeset.
        let r = run(&mut state, &mut table, "typeset -r x=1");
        assert_eq!(r.exit_code, 0);
        state.options.posix_builtins = true;
        let r = run(&mut state, &mut table, "typeset +r x=3");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("read-only variable: x"));
    }

    #[test]
    fn test_export_marks_and_mirrors() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "export X=v");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert!(state.params.lookup("X").unwrap().is_exported());
        assert_eq!(state.env.get("X"), Some("v"));
    }

    #[test]
    fn test_readonly_builtin_defaults_r() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "readonly x=1");
        assert!(state.params.lookup("x").unwrap().is_readonly());
    }

    #[test]
    fn test_integer_builtin_base_option() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "integer -i16 n=255");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("n"),
            Some(ParamValue::Scalar("16#FF".to_string()))
        );

        let r = run(&mut state, &mut table, "integer -i99 m=1");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("invalid base"));
    }

    #[test]
    fn test_float_builtin_defaults_e() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "float f=2");
        assert_eq!(
            state.params.lookup("f").unwrap().type_tag(),
            ParamType::FloatE
        );
        // float -F flips to fixed notation despite the -E default.
        run(&mut state, &mut table, "float -F g=2");
        assert_eq!(
            state.params.lookup("g").unwrap().type_tag(),
            ParamType::FloatF
        );
    }

    #[test]
    fn test_array_literal_assignment() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -a xs=(a b c)");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("xs"),
            Some(ParamValue::Array(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
    }

    #[test]
    fn test_unique_dedup_via_option() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -U xs=(a b a c b)");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("xs"),
            Some(ParamValue::Array(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
    }

    #[test]
    fn test_assoc_literal_keyed() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -A h=([k1]=v1 [k2]=v2)");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        match state.params.get_value("h") {
            Some(ParamValue::Hash(h)) => {
                assert_eq!(h.get("k1").map(|s| s.as_str()), Some("v1"));
                assert_eq!(h.get("k2").map(|s| s.as_str()), Some("v2"));
            }
            other => panic!("expected hash, got {:?}", other),
        }
    }

    #[test]
    fn test_tie_creates_pair_and_join() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -T PATHVAR pathvar");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        state
            .params
            .set_value("PATHVAR", ParamValue::Scalar("/bin:/usr/bin".to_string()))
            .unwrap();
        assert_eq!(
            state.params.get_value("pathvar"),
            Some(ParamValue::Array(vec![
                "/bin".to_string(),
                "/usr/bin".to_string()
            ]))
        );
    }

    #[test]
    fn test_tie_self_reject_leaves_nothing() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -T XX XX");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("can't tie a variable to itself"));
        assert!(!state.params.contains("XX"));
    }

    #[test]
    fn test_tie_keeps_existing_scalar_value() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset P=/bin:/sbin");
        let r = run(&mut state, &mut table, "typeset -T P p");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("p"),
            Some(ParamValue::Array(vec![
                "/bin".to_string(),
                "/sbin".to_string()
            ]))
        );
    }

    #[test]
    fn test_untie_rejected() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset -T PV pv");
        let r = run(&mut state, &mut table, "typeset +T PV pv");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("use unset to remove tied variables"));
    }

    #[test]
    fn test_tie_arity_errors() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -T ONLY");
        assert!(r.stderr.contains("-T requires names of scalar and array"));
        let r = run(&mut state, &mut table, "typeset -T a b c d");
        assert!(r.stderr.contains("too many arguments for -T"));
    }

    #[test]
    fn test_local_requires_deeper_scope_semantics() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset x=outer");
        state.params.push_scope();
        let r = run(&mut state, &mut table, "local x=inner");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert_eq!(
            state.params.get_value("x"),
            Some(ParamValue::Scalar("inner".to_string()))
        );
        state.params.pop_scope();
        assert_eq!(
            state.params.get_value("x"),
            Some(ParamValue::Scalar("outer".to_string()))
        );
    }

    #[test]
    fn test_typeset_g_reuses_visible_param() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset x=outer");
        state.params.push_scope();
        let r = run(&mut state, &mut table, "typeset -g x=changed");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        state.params.pop_scope();
        assert_eq!(
            state.params.get_value("x"),
            Some(ParamValue::Scalar("changed".to_string()))
        );
    }

    #[test]
    fn test_print_mode_round_trips() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset -i x=5");
        let r = run(&mut state, &mut table, "typeset -p x");
        assert_eq!(r.stdout, "typeset -i x=5\n");

        let r = run(&mut state, &mut table, "typeset -p nosuch");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("no such variable: nosuch"));
    }

    #[test]
    fn test_posix_export_listing_form() {
        let (mut state, mut table) = setup();
        state.options.posix_builtins = true;
        run(&mut state, &mut table, "export X=v");
        let r = run(&mut state, &mut table, "export -p");
        assert!(r.stdout.contains("export X=v"), "stdout: {}", r.stdout);
    }

    #[test]
    fn test_pattern_mode_applies_to_matches() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset AA_ONE=1");
        run(&mut state, &mut table, "typeset AA_TWO=2");
        run(&mut state, &mut table, "typeset BB=3");
        let r = run(&mut state, &mut table, "typeset -m -x AA_*");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        assert!(state.params.lookup("AA_ONE").unwrap().is_exported());
        assert!(state.params.lookup("AA_TWO").unwrap().is_exported());
        assert!(!state.params.lookup("BB").unwrap().is_exported());
    }

    #[test]
    fn test_bare_existing_name_displays() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset x=v");
        let r = run(&mut state, &mut table, "typeset x");
        assert_eq!(r.stdout, "x=v\n");
        state.options.typeset_silent = true;
        let r = run(&mut state, &mut table, "typeset x");
        assert_eq!(r.stdout, "");
    }

    #[test]
    fn test_special_retype_via_handler() {
        let (mut state, mut table) = setup();
        let r = run(&mut state, &mut table, "typeset -E SECONDS");
        assert_eq!(r.exit_code, 0, "stderr: {}", r.stderr);
        let r = run(&mut state, &mut table, "typeset -a RANDOM");
        assert_eq!(r.exit_code, 1);
        assert!(r.stderr.contains("can't change type of a special parameter"));
    }

    #[test]
    fn test_listing_no_args() {
        let (mut state, mut table) = setup();
        run(&mut state, &mut table, "typeset -x EX=1");
        let r = run(&mut state, &mut table, "typeset");
        assert!(r.stdout.contains("EX=1"), "stdout: {}", r.stdout);
        // Flag-filtered listing only shows matching parameters; SECONDS is
        // not exported and stays out.
        let r = run(&mut state, &mut table, "typeset -x");
        assert!(r.stdout.contains("EX=1"));
        assert!(!r.stdout.contains("SECONDS"));
    }
}
