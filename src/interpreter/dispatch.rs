//! Builtin Dispatch
//!
//! The hash table of builtin commands: each entry pairs an option table
//! with a handler function. `run_builtin` looks the command up, drives the
//! option parser, and hands the parsed invocation to the handler. Entries
//! can be disabled (hidden without being removed) and re-enabled.

use indexmap::IndexMap;

use crate::interpreter::builtins::cd_cmd::handle_cd;
use crate::interpreter::builtins::enable_cmd::handle_enable;
use crate::interpreter::builtins::print_cmd::handle_print;
use crate::interpreter::builtins::test_cmd::handle_test;
use crate::interpreter::builtins::typeset_cmd::handle_typeset;
use crate::interpreter::builtins::unset_cmd::handle_unset;
use crate::interpreter::option_parser::parse;
use crate::interpreter::options::{OptionSpec, ParsedOptions, SpecFlags};
use crate::interpreter::types::{BuiltinResult, ShellState};

/// Which builtin a shared handler is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Typeset,
    Declare,
    Local,
    Export,
    Readonly,
    IntegerCmd,
    FloatCmd,
    Cd,
    Pushd,
    Popd,
    Echo,
    Print,
    Test,
    Bracket,
    True,
    False,
    Enable,
    Disable,
    Unset,
}

impl BuiltinKind {
    /// The typeset family shares one handler and most of its rules.
    pub fn is_typeset_family(self) -> bool {
        matches!(
            self,
            BuiltinKind::Typeset
                | BuiltinKind::Declare
                | BuiltinKind::Local
                | BuiltinKind::Export
                | BuiltinKind::Readonly
                | BuiltinKind::IntegerCmd
                | BuiltinKind::FloatCmd
        )
    }
}

/// One parsed invocation as seen by a handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The command name as invoked (chdir vs cd matters for diagnostics).
    pub name: String,
    pub kind: BuiltinKind,
    pub opts: ParsedOptions,
    pub args: Vec<String>,
}

pub type HandlerFn = fn(&mut ShellState, &mut BuiltinTable, &Invocation) -> BuiltinResult;

#[derive(Debug, Clone)]
pub struct BuiltinEntry {
    pub spec: OptionSpec,
    pub kind: BuiltinKind,
    pub handler: HandlerFn,
    pub enabled: bool,
}

/// The builtin command table.
#[derive(Debug, Clone)]
pub struct BuiltinTable {
    entries: IndexMap<String, BuiltinEntry>,
}

impl BuiltinTable {
    /// Table seeded with the standard builtins.
    pub fn new() -> Self {
        let mut t = BuiltinTable { entries: IndexMap::new() };
        for (name, flags, optstr, defopts, min, max, kind, handler) in builtin_rows() {
            t.entries.insert(
                name.to_string(),
                BuiltinEntry {
                    spec: OptionSpec::new(name, flags, optstr, defopts, min, max),
                    kind,
                    handler,
                    enabled: true,
                },
            );
        }
        t
    }

    /// Look up an enabled builtin.
    pub fn lookup(&self, name: &str) -> Option<&BuiltinEntry> {
        self.entries.get(name).filter(|e| e.enabled)
    }

    /// Look up regardless of enabled state (enable/disable need this).
    pub fn lookup_any(&self, name: &str) -> Option<&BuiltinEntry> {
        self.entries.get(name)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.get_mut(name) {
            Some(e) => {
                e.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Names with the given enabled state, sorted.
    pub fn names_with_state(&self, enabled: bool) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.enabled == enabled)
            .map(|(n, _)| n.clone())
            .collect();
        names.sort();
        names
    }

    pub fn all_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl Default for BuiltinTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute one builtin command line. Returns `None` when the name is not
/// an enabled builtin, leaving resolution to the caller.
pub fn run_builtin(
    state: &mut ShellState,
    table: &mut BuiltinTable,
    name: &str,
    args: &[String],
) -> Option<BuiltinResult> {
    let (spec, kind, handler) = {
        let entry = table.lookup(name)?;
        (entry.spec.clone(), entry.kind, entry.handler)
    };

    let mut trace = String::new();
    if state.options.xtrace {
        trace.push_str("+ ");
        trace.push_str(name);
        for a in args {
            trace.push(' ');
            trace.push_str(a);
        }
        trace.push('\n');
    }

    let mut result = match parse(&spec, args) {
        Ok((opts, residual)) => {
            let inv = Invocation {
                name: name.to_string(),
                kind,
                opts,
                args: residual,
            };
            handler(state, table, &inv)
        }
        Err(e) => BuiltinResult::failure(format!("{}: {}\n", name, e), 1),
    };
    if !trace.is_empty() {
        result.stderr = format!("{}{}", trace, result.stderr);
    }
    state.last_exit_code = result.exit_code;
    Some(result)
}

fn handle_true(_: &mut ShellState, _: &mut BuiltinTable, _: &Invocation) -> BuiltinResult {
    BuiltinResult::ok()
}

fn handle_false(_: &mut ShellState, _: &mut BuiltinTable, _: &Invocation) -> BuiltinResult {
    BuiltinResult::failure("", 1)
}

type BuiltinRow = (
    &'static str,
    SpecFlags,
    &'static str,
    &'static str,
    usize,
    Option<usize>,
    BuiltinKind,
    HandlerFn,
);

#[rustfmt::skip]
fn builtin_rows() -> Vec<BuiltinRow> {
    use BuiltinKind::*;
    const TS: SpecFlags = SpecFlags::PLUS_OPTS
        .union(SpecFlags::MAGIC_EQUALS)
        .union(SpecFlags::PSPECIAL);
    const CD: SpecFlags = SpecFlags::SKIP_INVALID
        .union(SpecFlags::SKIP_DASH)
        .union(SpecFlags::DASHDASH_VALID);
    vec![
        ("[",        SpecFlags::HANDLES_OPTS, "", "", 0, None, Bracket, handle_test),
        (":",        SpecFlags::PSPECIAL, "", "", 0, None, True, handle_true),
        ("cd",       CD, "qsPL", "", 0, Some(2), Cd, handle_cd),
        ("chdir",    CD, "qsPL", "", 0, Some(2), Cd, handle_cd),
        ("declare",  TS, "AE:%F:%HL:%R:%TUZ:%aghi:%lmp:%rtux", "", 0, None, Declare, handle_typeset),
        ("disable",  SpecFlags::NONE, "m", "", 0, None, Disable, handle_enable),
        ("echo",     SpecFlags::SKIP_INVALID, "neE", "-", 0, None, Echo, handle_print),
        ("enable",   SpecFlags::NONE, "m", "", 0, None, Enable, handle_enable),
        ("export",   TS, "E:%F:%HL:%R:%TUZ:%ahi:%lp:%rtu", "xg", 0, None, Export, handle_typeset),
        ("false",    SpecFlags::NONE, "", "", 0, None, False, handle_false),
        ("float",    TS, "E:%F:%HL:%R:%Z:%ghlp:%rtux", "E", 0, None, FloatCmd, handle_typeset),
        ("integer",  TS, "HL:%R:%Z:%ghi:%lp:%rtux", "i", 0, None, IntegerCmd, handle_typeset),
        ("local",    TS, "AE:%F:%HL:%R:%TUZ:%ahi:%lp:%rtux", "", 0, None, Local, handle_typeset),
        ("popd",     CD, "q", "", 0, Some(1), Popd, handle_cd),
        ("print",    SpecFlags::PRINT_OPTS, "abcC:Df:ilmnNoOpPrRsSu:v:x:X:z-", "", 0, None, Print, handle_print),
        ("pushd",    CD, "qsPL", "", 0, Some(2), Pushd, handle_cd),
        ("readonly", TS, "AE:%F:%HL:%R:%TUZ:%aghi:%lptux", "r", 0, None, Readonly, handle_typeset),
        ("test",     SpecFlags::HANDLES_OPTS, "", "", 0, None, Test, handle_test),
        ("true",     SpecFlags::NONE, "", "", 0, None, True, handle_true),
        ("typeset",  TS, "AE:%F:%HL:%R:%TUZ:%aghi:%lmp:%rtux", "", 0, None, Typeset, handle_typeset),
        ("unset",    SpecFlags::PSPECIAL, "mv", "", 1, None, Unset, handle_unset),
    ]
}
