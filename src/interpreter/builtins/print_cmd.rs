//! echo/print
//!
//! Output builtins, here mainly because they exercise the two odd parser
//! paths: echo's skip-invalid handling (an unrecognized flag word becomes
//! text) and print's `-R` collapse to echo rules. Only the output-shaping
//! subset of print's many options is implemented.

use crate::interpreter::dispatch::{BuiltinKind, BuiltinTable, Invocation};
use crate::interpreter::types::{BuiltinResult, ShellState};

pub fn handle_print(
    _state: &mut ShellState,
    _table: &mut BuiltinTable,
    inv: &Invocation,
) -> BuiltinResult {
    let ops = &inv.opts;
    let mut words = inv.args.clone();

    // Raw modes and -E suppress escape handling; echo interprets escapes
    // unless told not to.
    let raw = ops.is_minus('r') || ops.is_minus('R');
    let escapes = if inv.kind == BuiltinKind::Echo {
        !ops.is_minus('E') || ops.is_minus('e')
    } else {
        ops.is_minus('e') || !raw
    };

    if inv.kind == BuiltinKind::Print {
        if ops.is_minus('o') {
            words.sort();
        } else if ops.is_minus('O') {
            words.sort();
            words.reverse();
        }
    }

    let sep = if inv.kind == BuiltinKind::Print && ops.is_minus('l') {
        "\n"
    } else {
        " "
    };

    let mut out = String::new();
    let mut stopped = false;
    for (i, w) in words.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        if escapes {
            let (text, stop) = expand_escapes(w);
            out.push_str(&text);
            if stop {
                stopped = true;
                break;
            }
        } else {
            out.push_str(w);
        }
    }
    if !ops.is_minus('n') && !stopped {
        out.push('\n');
    }
    BuiltinResult::with_stdout(out)
}

/// Interpret backslash escapes. The bool reports `\c`, which ends output
/// and suppresses the trailing newline.
fn expand_escapes(word: &str) -> (String, bool) {
    let mut out = String::new();
    let mut chars = word.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('e') => out.push('\x1b'),
            Some('\\') => out.push('\\'),
            Some('c') => return (out, true),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    (out, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::dispatch::run_builtin;
    use crate::interpreter::words::split_command_words;

    fn run(line: &str) -> BuiltinResult {
        let mut state = ShellState::new();
        let mut table = BuiltinTable::new();
        let words = split_command_words(line);
        run_builtin(&mut state, &mut table, &words[0], &words[1..]).expect("builtin exists")
    }

    #[test]
    fn test_echo_basic() {
        assert_eq!(run("echo a b").stdout, "a b\n");
        assert_eq!(run("echo -n a").stdout, "a");
    }

    #[test]
    fn test_echo_unknown_flag_is_text() {
        assert_eq!(run("echo -x a").stdout, "-x a\n");
    }

    #[test]
    fn test_echo_escapes_default_on() {
        assert_eq!(run(r"echo 'a\tb'").stdout, "a\tb\n");
        assert_eq!(run(r"echo -E 'a\tb'").stdout, "a\\tb\n");
    }

    #[test]
    fn test_print_sort_and_lines() {
        assert_eq!(run("print -o c a b").stdout, "a b c\n");
        assert_eq!(run("print -O a c b").stdout, "c b a\n");
        assert_eq!(run("print -l a b").stdout, "a\nb\n");
    }

    #[test]
    fn test_print_r_is_raw_and_big_r_switches_rules() {
        assert_eq!(run(r"print -r 'a\tb'").stdout, "a\\tb\n");
        // After -R only -n/-e are options; -l is ordinary text.
        assert_eq!(run("print -R -l x").stdout, "-l x\n");
    }

    #[test]
    fn test_escape_c_stops_output() {
        assert_eq!(run(r"echo 'ab\cdef'").stdout, "ab");
    }
}
