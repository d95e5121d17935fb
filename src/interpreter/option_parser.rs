//! Option Parser
//!
//! Matches one invocation's argument vector against a builtin's
//! [`OptionSpec`], producing the recognized-option record and the residual
//! positional arguments. Parsing is a pure function of `(spec, argv)`; all
//! state mutation belongs to the handler that receives the result.
//!
//! Word handling follows the shell conventions: `-xy` is two options, `+x`
//! turns an option off where the builtin allows it, `--x` means `-x`, a
//! lone `-`, `+` or `--` ends option scanning, and option arguments may sit
//! in the same word or the following one depending on the letter's arity.

use crate::interpreter::errors::OptionError;
use crate::interpreter::options::{ArgArity, OptionSpec, ParsedOptions, SpecFlags};

/// Parse `argv` against `spec`.
///
/// On success returns the populated [`ParsedOptions`] and the residual
/// positional arguments (arity-checked against the spec). For specs flagged
/// `HANDLES_OPTS` the vector is returned untouched with an empty record.
pub fn parse(
    spec: &OptionSpec,
    argv: &[String],
) -> Result<(ParsedOptions, Vec<String>), OptionError> {
    let mut ops = ParsedOptions::new();

    if spec.flags.contains(SpecFlags::HANDLES_OPTS) {
        return Ok((ops, argv.to_vec()));
    }

    // PRINT_OPTS may narrow the recognized set mid-scan, so work on copies.
    let mut letters = spec.letters.clone();
    let mut flags = spec.flags;

    let mut i = 0;

    if spec.has_optstr() {
        while i < argv.len() {
            let word: Vec<char> = argv[i].chars().collect();
            let minus = word.first() == Some(&'-');
            let plus = flags.contains(SpecFlags::PLUS_OPTS) && word.first() == Some(&'+');
            if !minus && !plus {
                break;
            }
            // Digits aren't options unless the builtin says they are.
            if !flags.contains(SpecFlags::KEEP_NUM)
                && word.len() > 1
                && word[1].is_ascii_digit()
            {
                break;
            }
            // For cd and friends a bare dash is a positional argument.
            if flags.contains(SpecFlags::SKIP_DASH) && word.len() == 1 {
                break;
            }
            if flags.contains(SpecFlags::DASHDASH_VALID) && argv[i] == "--" {
                i += 1;
                break;
            }
            // Unrecognized options to echo etc. are not really options; the
            // pre-scan does not understand option arguments.
            if flags.contains(SpecFlags::SKIP_INVALID)
                && word[1..].iter().any(|c| !recognized(&letters, *c))
            {
                break;
            }

            // A second leading dash is skipped: --x is -x, -- ends options.
            let start = if word.len() > 1 && word[1] == '-' { 2 } else { 1 };
            if word.len() <= start {
                // "-", "+" or "--": mark the end-of-options indicators.
                ops.set('-', true);
                if plus {
                    ops.set('+', true);
                }
                i += 1;
                break;
            }

            let mut k = start;
            while k < word.len() {
                let c = word[k];
                let arity = match arity_of(&letters, c) {
                    Some(a) => a,
                    None => {
                        return Err(OptionError::BadOption {
                            sense: if minus { '-' } else { '+' },
                            letter: c,
                        });
                    }
                };
                match arity {
                    ArgArity::None => {
                        ops.set(c, minus);
                        k += 1;
                    }
                    ArgArity::Required => {
                        let arg = if k + 1 < word.len() {
                            word[k + 1..].iter().collect::<String>()
                        } else {
                            i += 1;
                            match argv.get(i) {
                                Some(next) => next.clone(),
                                None => {
                                    return Err(OptionError::MissingArgument { letter: c });
                                }
                            }
                        };
                        capture(&mut ops, c, minus, arg)?;
                        k = word.len();
                    }
                    ArgArity::OptionalSameWord => {
                        if k + 1 < word.len() {
                            let arg = word[k + 1..].iter().collect::<String>();
                            capture(&mut ops, c, minus, arg)?;
                            k = word.len();
                        } else {
                            ops.set(c, minus);
                            k += 1;
                        }
                    }
                    ArgArity::OptionalNumeric => {
                        if k + 1 < word.len() && word[k + 1].is_ascii_digit() {
                            let arg = word[k + 1..].iter().collect::<String>();
                            capture(&mut ops, c, minus, arg)?;
                            k = word.len();
                        } else if k + 1 >= word.len() && next_is_numeric(argv, i) {
                            i += 1;
                            capture(&mut ops, c, minus, argv[i].clone())?;
                            k = word.len();
                        } else {
                            ops.set(c, minus);
                            k += 1;
                        }
                    }
                }
            }

            i += 1;

            // For print, everything after -R is handed to echo's rules.
            if flags.contains(SpecFlags::PRINT_OPTS) && ops.is_set('R') && !ops.is_set('f') {
                letters = vec![('n', ArgArity::None), ('e', ArgArity::None)];
                flags.insert(SpecFlags::SKIP_INVALID);
            }

            if ops.is_set('-') {
                break;
            }
        }
    } else if !flags.contains(SpecFlags::HANDLES_OPTS)
        && argv.first().map(|s| s.as_str()) == Some("--")
    {
        ops.set('-', true);
        i += 1;
    }

    // Pre-set options the invocation did not touch.
    for c in spec.default_opts.chars() {
        if !ops.is_set(c) {
            ops.set(c, true);
        }
    }

    let residual: Vec<String> = argv[i..].to_vec();
    if residual.len() < spec.min_args {
        return Err(OptionError::NotEnoughArguments);
    }
    if let Some(max) = spec.max_args {
        if residual.len() > max {
            return Err(OptionError::TooManyArguments);
        }
    }

    Ok((ops, residual))
}

fn recognized(letters: &[(char, ArgArity)], c: char) -> bool {
    letters.iter().any(|(l, _)| *l == c)
}

fn arity_of(letters: &[(char, ArgArity)], c: char) -> Option<ArgArity> {
    letters.iter().find(|(l, _)| *l == c).map(|(_, a)| *a)
}

fn capture(ops: &mut ParsedOptions, c: char, minus: bool, arg: String) -> Result<(), OptionError> {
    ops.set_with_arg(c, minus, arg)
        .map_err(|_| OptionError::TooManyOptionArguments)
}

fn next_is_numeric(argv: &[String], i: usize) -> bool {
    argv.get(i + 1)
        .map(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::options::OptionState;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn cd_spec() -> OptionSpec {
        OptionSpec::new(
            "cd",
            SpecFlags::SKIP_INVALID
                .union(SpecFlags::SKIP_DASH)
                .union(SpecFlags::DASHDASH_VALID),
            "qsPL",
            "",
            0,
            Some(2),
        )
    }

    #[test]
    fn test_no_args_yields_exactly_defaults() {
        let spec = OptionSpec::new("getln", SpecFlags::NONE, "ecnAlE", "zr", 0, None);
        let (ops, residual) = parse(&spec, &[]).unwrap();
        assert!(residual.is_empty());
        assert!(ops.is_minus('z'));
        assert!(ops.is_minus('r'));
        let touched: Vec<char> = ops.touched().collect();
        assert_eq!(touched.len(), 2);
    }

    #[test]
    fn test_combined_word_and_senses() {
        let spec = OptionSpec::new("alias", SpecFlags::PLUS_OPTS, "Lgmrs", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["-Lg", "+m", "name"])).unwrap();
        assert!(ops.is_minus('L'));
        assert!(ops.is_minus('g'));
        assert!(ops.is_plus('m'));
        assert_eq!(residual, args(&["name"]));
    }

    #[test]
    fn test_cd_scenario_dashdash() {
        let (ops, residual) = parse(&cd_spec(), &args(&["-P", "--", "-weird"])).unwrap();
        assert!(ops.is_minus('P'));
        assert!(!ops.is_set('q'));
        assert_eq!(residual, args(&["-weird"]));
    }

    #[test]
    fn test_skip_dash_keeps_bare_dash() {
        let (ops, residual) = parse(&cd_spec(), &args(&["-"])).unwrap();
        assert!(!ops.is_set('-'));
        assert_eq!(residual, args(&["-"]));
    }

    #[test]
    fn test_skip_invalid_word_becomes_positional() {
        let spec = OptionSpec::new("echo", SpecFlags::SKIP_INVALID, "neE", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["-nx", "hi"])).unwrap();
        assert!(!ops.is_set('n'));
        assert_eq!(residual, args(&["-nx", "hi"]));
    }

    #[test]
    fn test_bad_option_reports_sense_and_letter() {
        let spec = OptionSpec::new("dirs", SpecFlags::PLUS_OPTS, "clpv", "", 0, None);
        let err = parse(&spec, &args(&["+x"])).unwrap_err();
        assert_eq!(err, OptionError::BadOption { sense: '+', letter: 'x' });
    }

    #[test]
    fn test_required_argument_same_and_next_word() {
        let spec = OptionSpec::new("fc", SpecFlags::NONE, "e:l", "", 0, None);
        let (ops, _) = parse(&spec, &args(&["-evi"])).unwrap();
        assert_eq!(ops.arg('e'), Some("vi"));

        let (ops, residual) = parse(&spec, &args(&["-e", "vi", "rest"])).unwrap();
        assert_eq!(ops.arg('e'), Some("vi"));
        assert_eq!(residual, args(&["rest"]));

        let err = parse(&spec, &args(&["-e"])).unwrap_err();
        assert_eq!(err, OptionError::MissingArgument { letter: 'e' });
    }

    #[test]
    fn test_optional_same_word_never_eats_next() {
        let spec = OptionSpec::new("read", SpecFlags::NONE, "t::r", "", 0, None);
        let (ops, _) = parse(&spec, &args(&["-t5"])).unwrap();
        assert_eq!(ops.arg('t'), Some("5"));

        let (ops, residual) = parse(&spec, &args(&["-t", "5"])).unwrap();
        assert!(ops.is_minus('t'));
        assert!(!ops.has_arg('t'));
        assert_eq!(residual, args(&["5"]));
    }

    #[test]
    fn test_optional_numeric_rules() {
        let spec = OptionSpec::new("typeset", SpecFlags::PLUS_OPTS, "i:%r", "", 0, None);
        // Digit remainder in the same word.
        let (ops, _) = parse(&spec, &args(&["-i16", "x"])).unwrap();
        assert_eq!(ops.arg('i'), Some("16"));
        // All-digit next word.
        let (ops, residual) = parse(&spec, &args(&["-i", "16", "x"])).unwrap();
        assert_eq!(ops.arg('i'), Some("16"));
        assert_eq!(residual, args(&["x"]));
        // Non-numeric next word stays positional, option is boolean.
        let (ops, residual) = parse(&spec, &args(&["-i", "x"])).unwrap();
        assert!(ops.is_minus('i'));
        assert!(!ops.has_arg('i'));
        assert_eq!(residual, args(&["x"]));
        // Mixed next word (digit-leading but not all digits) is positional.
        let (ops, residual) = parse(&spec, &args(&["-i", "16x"])).unwrap();
        assert!(!ops.has_arg('i'));
        assert_eq!(residual, args(&["16x"]));
    }

    #[test]
    fn test_non_keepnum_digit_word_is_positional() {
        let spec = OptionSpec::new("shift", SpecFlags::NONE, "p", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["-2"])).unwrap();
        assert!(!ops.is_set('p'));
        assert_eq!(residual, args(&["-2"]));
    }

    #[test]
    fn test_double_dash_is_single_dash_prefix() {
        let spec = OptionSpec::new("dirs", SpecFlags::NONE, "clpv", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["--v", "x"])).unwrap();
        assert!(ops.is_minus('v'));
        assert_eq!(residual, args(&["x"]));
    }

    #[test]
    fn test_lone_dash_terminates_options() {
        let spec = OptionSpec::new("dirs", SpecFlags::NONE, "clpv", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["-", "-v"])).unwrap();
        assert!(ops.is_set('-'));
        assert!(!ops.is_set('v'));
        assert_eq!(residual, args(&["-v"]));
    }

    #[test]
    fn test_dash_dash_without_optstr() {
        let spec = OptionSpec::new("true", SpecFlags::NONE, "", "", 0, None);
        let (ops, residual) = parse(&spec, &args(&["--", "x"])).unwrap();
        assert!(ops.is_set('-'));
        assert_eq!(residual, args(&["x"]));
    }

    #[test]
    fn test_handles_own_options() {
        let spec = OptionSpec::new("test", SpecFlags::HANDLES_OPTS, "", "", 0, None);
        let input = args(&["-n", "foo", "]"]);
        let (ops, residual) = parse(&spec, &input).unwrap();
        assert_eq!(ops.touched().count(), 0);
        assert_eq!(residual, input);
    }

    #[test]
    fn test_arity_bounds() {
        let spec = OptionSpec::new("umask", SpecFlags::NONE, "S", "", 1, Some(2));
        assert_eq!(
            parse(&spec, &[]).unwrap_err(),
            OptionError::NotEnoughArguments
        );
        assert!(parse(&spec, &args(&["a"])).is_ok());
        assert!(parse(&spec, &args(&["a", "b"])).is_ok());
        assert_eq!(
            parse(&spec, &args(&["a", "b", "c"])).unwrap_err(),
            OptionError::TooManyArguments
        );
    }

    #[test]
    fn test_option_argument_ceiling() {
        let spec = OptionSpec::new("zmodload", SpecFlags::NONE, "P:", "", 0, None);
        let mut words: Vec<String> = Vec::new();
        for n in 0..63 {
            words.push(format!("-P{}", n));
        }
        let (ops, _) = parse(&spec, &words).unwrap();
        assert_eq!(ops.arg('P'), Some("62"));

        words.push("-P63".to_string());
        assert_eq!(
            parse(&spec, &words).unwrap_err(),
            OptionError::TooManyOptionArguments
        );
    }

    #[test]
    fn test_print_opts_switches_to_echo_rules() {
        let spec = OptionSpec::new(
            "print",
            SpecFlags::PRINT_OPTS,
            "abcC:Df:ilmnNoOpPrRsSu:v:x:X:z-",
            "",
            0,
            None,
        );
        // After -R, only -n/-e are options; -z would normally be one.
        let (ops, residual) = parse(&spec, &args(&["-R", "-n", "-z", "word"])).unwrap();
        assert!(ops.is_minus('R'));
        assert!(ops.is_minus('n'));
        assert!(!ops.is_set('z'));
        assert_eq!(residual, args(&["-z", "word"]));
    }

    #[test]
    fn test_defaults_do_not_override_touched() {
        let spec = OptionSpec::new("rehash", SpecFlags::PLUS_OPTS, "df", "r", 0, Some(0));
        let (ops, _) = parse(&spec, &[]).unwrap();
        assert!(ops.is_minus('r'));
        // 'r' is not in the optstr but defaults still force it on; a letter
        // that was explicitly touched keeps its sense.
        let spec2 = OptionSpec::new("getln", SpecFlags::PLUS_OPTS, "zr", "zr", 0, None);
        let (ops, _) = parse(&spec2, &args(&["+z"])).unwrap();
        assert!(ops.is_plus('z'));
        assert!(ops.is_minus('r'));
    }

    #[test]
    fn test_round_trip_flatten() {
        // For a spec with only argumentless letters, flattening the parsed
        // record back into words re-parses to the same record.
        let spec = OptionSpec::new("jobs", SpecFlags::PLUS_OPTS, "dlprs", "", 0, None);
        let input = args(&["-dl", "+p", "--", "job1"]);
        let (ops, residual) = parse(&spec, &input).unwrap();

        let mut flat: Vec<String> = Vec::new();
        for (letter, _) in &spec.letters {
            match ops.state(*letter) {
                Some(OptionState::On) => flat.push(format!("-{}", letter)),
                Some(OptionState::Off) => flat.push(format!("+{}", letter)),
                _ => {}
            }
        }
        flat.push("--".to_string());
        flat.extend(residual.clone());

        let (ops2, residual2) = parse(&spec, &flat).unwrap();
        assert_eq!(residual, residual2);
        for (letter, _) in &spec.letters {
            assert_eq!(ops.state(*letter), ops2.state(*letter), "letter {}", letter);
        }
    }
}
