//! just-zsh - a zsh-flavored builtin command engine
//!
//! This library implements the table-driven option parser, builtin
//! dispatch table and parameter typeset/declaration machinery of a
//! zsh-style shell, usable for interpretation or analysis.

pub mod interpreter;

pub use interpreter::{
    parse, run_builtin, BuiltinKind, BuiltinResult, BuiltinTable, OptionError, OptionSpec,
    ParsedOptions, ShellOptions, ShellState, TypesetError,
};
