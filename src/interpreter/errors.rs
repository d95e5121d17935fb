//! Engine Errors
//!
//! Error types for the two decision components: the option parser and the
//! parameter attribute reconciler. Neither component prints anything; the
//! builtin handlers render these into a stderr diagnostic and a status-1
//! result. Both error families map to exit status 1 at the command level.

use thiserror::Error;

/// Errors produced while matching an argument vector against an option spec.
///
/// Parsing is pure: when any of these is returned, no shell state has been
/// touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// A letter not present in the builtin's option string.
    #[error("bad option: {sense}{letter}")]
    BadOption { sense: char, letter: char },

    /// A letter with a mandatory argument reached the end of the word list.
    #[error("argument expected: -{letter}")]
    MissingArgument { letter: char },

    /// More than [`MAX_OPT_ARGS`](crate::interpreter::options::MAX_OPT_ARGS)
    /// option arguments captured in one invocation.
    #[error("too many option arguments")]
    TooManyOptionArguments,

    /// Fewer residual words than the spec's minimum.
    #[error("not enough arguments")]
    NotEnoughArguments,

    /// More residual words than the spec's maximum.
    #[error("too many arguments")]
    TooManyArguments,
}

/// Errors produced by the parameter attribute reconciler and the typeset
/// family of builtins.
///
/// On failure the existing parameter record is left completely unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesetError {
    #[error("{name}: can't change type of a special parameter")]
    CannotRetypeSpecial { name: String },

    #[error("{name}: can't change type of autoloaded parameter")]
    CannotRetypeAutoload { name: String },

    #[error("read-only variable: {name}")]
    ReadOnly { name: String },

    #[error("{name}: can't assign array value to non-array")]
    ArrayValueNonArray { name: String },

    #[error("{name}: can't assign array value to non-array special")]
    ArrayValueNonArraySpecial { name: String },

    #[error("{name}: inconsistent type for assignment")]
    InconsistentAssignment { name: String },

    #[error("not an identifier: {name}")]
    NotAnIdentifier { name: String },

    #[error("not valid in this context: {name}")]
    NotValidHere { name: String },

    #[error("{name}: restricted")]
    Restricted { name: String },

    #[error("can't tie a variable to itself: {name}")]
    SelfTie { name: String },

    #[error("can't tie array elements: {name}")]
    TieArrayElement { name: String },

    #[error("first argument of tie must be scalar: {name}")]
    TieFirstScalar { name: String },

    #[error("second argument of tie must be array: {name}")]
    TieSecondArray { name: String },

    #[error("only one tied parameter can have value: {name}")]
    OneTieValue { name: String },

    #[error("already tied as non-scalar: {name}")]
    AlreadyTiedNonScalar { name: String },

    #[error("can't tie already tied scalar: {name}")]
    AlreadyTiedScalar { name: String },

    #[error("-T requires names of scalar and array")]
    TieRequiresPair,

    #[error("too many arguments for -T")]
    TooManyTieArguments,

    #[error("incompatible options for -T")]
    IncompatibleTieOptions,

    #[error("use unset to remove tied variables")]
    UntieNotAllowed,

    #[error("bad base value: {arg}")]
    BadBase { arg: String },

    #[error("invalid base (must be 2 to 36 inclusive): {base}")]
    BadBaseRange { base: i64 },

    #[error("bad precision value: {arg}")]
    BadPrecision { arg: String },

    #[error("bad width value: {arg}")]
    BadWidth { arg: String },

    #[error("bad argument to -p: {arg}")]
    BadPrintArg { arg: String },

    #[error("no such variable: {name}")]
    NoSuchVariable { name: String },

    #[error("bad pattern : {pat}")]
    BadPattern { pat: String },
}
