//! Option Tables
//!
//! Declarative per-builtin description of the options a builtin accepts,
//! plus the per-invocation record the parser fills in. Option strings use
//! the compact table encoding: each letter may be followed by `:` (mandatory
//! argument), `::` (optional argument in the same word) or `:%` (optional
//! numeric argument in the same or next word).

use std::collections::HashMap;

/// Hard ceiling on captured option arguments per invocation. Callers have
/// historically relied on option-argument indexes fitting in six bits, so
/// the bound stays even though nothing here packs indexes into bit fields.
pub const MAX_OPT_ARGS: usize = 63;

/// What kind of argument an option letter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgArity {
    /// Plain boolean flag.
    None,
    /// Mandatory argument: rest of the word, or the next word.
    Required,
    /// Optional argument, only from the rest of the same word.
    OptionalSameWord,
    /// Optional numeric argument: digit-leading rest of the word, or the
    /// next word when that word is entirely digits.
    OptionalNumeric,
}

/// Behavior modifiers for a builtin's argument handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecFlags(u16);

impl SpecFlags {
    pub const NONE: SpecFlags = SpecFlags(0);
    /// `+x` turns options off as well as `-x` turning them on.
    pub const PLUS_OPTS: SpecFlags = SpecFlags(1 << 0);
    /// The handler does all of its own argument parsing (test, [).
    pub const HANDLES_OPTS: SpecFlags = SpecFlags(1 << 1);
    /// `--` is consumed before being considered as an option word (cd).
    pub const DASHDASH_VALID: SpecFlags = SpecFlags(1 << 2);
    /// A lone `-` is a positional argument, not an option word.
    pub const SKIP_DASH: SpecFlags = SpecFlags(1 << 3);
    /// A word containing any unrecognized letter is a positional argument.
    pub const SKIP_INVALID: SpecFlags = SpecFlags(1 << 4);
    /// `-<digit>` words are options rather than numbers.
    pub const KEEP_NUM: SpecFlags = SpecFlags(1 << 5);
    /// print's `-R` collapses the recognized set to echo's `ne`.
    pub const PRINT_OPTS: SpecFlags = SpecFlags(1 << 6);
    /// Takes assignment words (`name=value`, `name=(...)`).
    pub const MAGIC_EQUALS: SpecFlags = SpecFlags(1 << 7);
    /// Precommand/keyword builtin: cannot be shadowed, errors are special.
    pub const PSPECIAL: SpecFlags = SpecFlags(1 << 8);

    pub const fn union(self, other: SpecFlags) -> SpecFlags {
        SpecFlags(self.0 | other.0)
    }

    pub fn contains(self, other: SpecFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SpecFlags) {
        self.0 |= other.0;
    }
}

/// One builtin's immutable option table entry.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub flags: SpecFlags,
    /// Recognized letters in declaration order.
    pub letters: Vec<(char, ArgArity)>,
    /// Letters forced On when the invocation did not touch them.
    pub default_opts: &'static str,
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
}

impl OptionSpec {
    /// Build a spec from a compact option string (`"qsPL"`, `"E:%F:%..."`).
    /// An empty option string means the builtin takes no options at all.
    pub fn new(
        name: &'static str,
        flags: SpecFlags,
        optstr: &str,
        default_opts: &'static str,
        min_args: usize,
        max_args: Option<usize>,
    ) -> Self {
        OptionSpec {
            name,
            flags,
            letters: parse_optstr(optstr),
            default_opts,
            min_args,
            max_args,
        }
    }

    pub fn arity_of(&self, letter: char) -> Option<ArgArity> {
        self.letters
            .iter()
            .find(|(c, _)| *c == letter)
            .map(|(_, a)| *a)
    }

    pub fn recognizes(&self, letter: char) -> bool {
        self.letters.iter().any(|(c, _)| *c == letter)
    }

    pub fn has_optstr(&self) -> bool {
        !self.letters.is_empty()
    }
}

fn parse_optstr(optstr: &str) -> Vec<(char, ArgArity)> {
    let chars: Vec<char> = optstr.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let letter = chars[i];
        i += 1;
        let arity = if i < chars.len() && chars[i] == ':' {
            i += 1;
            if i < chars.len() && chars[i] == ':' {
                i += 1;
                ArgArity::OptionalSameWord
            } else if i < chars.len() && chars[i] == '%' {
                i += 1;
                ArgArity::OptionalNumeric
            } else {
                ArgArity::Required
            }
        } else {
            ArgArity::None
        };
        out.push((letter, arity));
    }
    out
}

/// Parse-time state of one option letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionState {
    /// Seen with `-` sense.
    On,
    /// Seen with `+` sense.
    Off,
    /// Seen with an argument; the index points into the captured list.
    WithArg { minus: bool, index: usize },
}

/// The per-invocation record built by the parser: letter states plus the
/// captured option arguments.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    ind: HashMap<char, OptionState>,
    args: Vec<String>,
}

impl ParsedOptions {
    pub fn new() -> Self {
        ParsedOptions::default()
    }

    /// Letter seen at all, either sense.
    pub fn is_set(&self, letter: char) -> bool {
        self.ind.contains_key(&letter)
    }

    /// Letter seen with `-` sense.
    pub fn is_minus(&self, letter: char) -> bool {
        matches!(
            self.ind.get(&letter),
            Some(OptionState::On) | Some(OptionState::WithArg { minus: true, .. })
        )
    }

    /// Letter seen with `+` sense.
    pub fn is_plus(&self, letter: char) -> bool {
        matches!(
            self.ind.get(&letter),
            Some(OptionState::Off) | Some(OptionState::WithArg { minus: false, .. })
        )
    }

    pub fn state(&self, letter: char) -> Option<OptionState> {
        self.ind.get(&letter).copied()
    }

    pub fn has_arg(&self, letter: char) -> bool {
        matches!(self.ind.get(&letter), Some(OptionState::WithArg { .. }))
    }

    pub fn arg(&self, letter: char) -> Option<&str> {
        match self.ind.get(&letter) {
            Some(OptionState::WithArg { index, .. }) => {
                self.args.get(*index).map(|s| s.as_str())
            }
            _ => None,
        }
    }

    /// Record a letter with no argument.
    pub fn set(&mut self, letter: char, minus: bool) {
        self.ind
            .insert(letter, if minus { OptionState::On } else { OptionState::Off });
    }

    /// Forget a letter entirely (used by POSIX pre-steps that ignore -p).
    pub fn unset(&mut self, letter: char) {
        self.ind.remove(&letter);
    }

    /// Record a letter together with a captured argument. Fails once the
    /// invocation-wide ceiling is reached.
    pub fn set_with_arg(&mut self, letter: char, minus: bool, arg: String) -> Result<(), ()> {
        if self.args.len() == MAX_OPT_ARGS {
            return Err(());
        }
        self.args.push(arg);
        self.ind.insert(
            letter,
            OptionState::WithArg {
                minus,
                index: self.args.len() - 1,
            },
        );
        Ok(())
    }

    /// Letters the invocation touched, in no particular order.
    pub fn touched(&self) -> impl Iterator<Item = char> + '_ {
        self.ind.keys().copied()
    }
}
