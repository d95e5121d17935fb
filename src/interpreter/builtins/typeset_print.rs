//! Typeset Listings
//!
//! Rendering of parameters for `typeset`/`typeset -p` and friends. Pure
//! consumers of the parameter records; nothing here mutates.

use crate::interpreter::params::flags::{ParamFlags, ParamType};
use crate::interpreter::params::namespace::Namespace;
use crate::interpreter::params::value::{justify, ParamValue};

/// Attribute letters in declaration-table order, used both for translating
/// options and for rendering reusable typeset commands.
pub const ATTR_LETTERS: &[(char, ParamFlags)] = &[
    ('a', ParamFlags::ARRAY),
    ('i', ParamFlags::INTEGER),
    ('E', ParamFlags::EFLOAT),
    ('F', ParamFlags::FFLOAT),
    ('A', ParamFlags::HASHED),
    ('L', ParamFlags::LEFT),
    ('R', ParamFlags::RIGHT_B),
    ('Z', ParamFlags::RIGHT_Z),
    ('l', ParamFlags::LOWER),
    ('u', ParamFlags::UPPER),
    ('r', ParamFlags::READONLY),
    ('t', ParamFlags::TAGGED),
    ('x', ParamFlags::EXPORTED),
    ('U', ParamFlags::UNIQUE),
    ('h', ParamFlags::HIDE),
    ('H', ParamFlags::HIDEVAL),
    ('T', ParamFlags::TIED),
];

/// How a parameter line is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Reusable `typeset -flags name=value` form; `line` puts container
    /// elements one per line.
    Typeset { line: bool },
    /// POSIX `export name=value` form.
    PosixExport,
    /// POSIX `readonly name=value` form.
    PosixReadonly,
    /// Plain listing with a type word: `integer n=5`, `array xs=( a b )`.
    Type,
    /// Only the name.
    NameOnly,
    /// `name=value` with no decoration.
    Value,
}

/// Quote a value for reusable output.
pub fn quote_value(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:%+@^,".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "'\\''"))
    }
}

fn flag_letters(flags: ParamFlags, base: i64, width: usize) -> String {
    let mut out = String::new();
    for &(letter, bit) in ATTR_LETTERS {
        if !flags.contains(bit) {
            continue;
        }
        out.push(letter);
        match bit {
            ParamFlags::INTEGER | ParamFlags::EFLOAT | ParamFlags::FFLOAT if base != 0 => {
                out.push_str(&base.to_string());
            }
            ParamFlags::LEFT | ParamFlags::RIGHT_B | ParamFlags::RIGHT_Z if width != 0 => {
                out.push_str(&width.to_string());
            }
            _ => {}
        }
    }
    out
}

fn type_word(tag: ParamType) -> Option<&'static str> {
    match tag {
        ParamType::Integer => Some("integer"),
        ParamType::FloatE | ParamType::FloatF => Some("float"),
        ParamType::Array => Some("array"),
        ParamType::Hashed => Some("association"),
        ParamType::Scalar => None,
    }
}

fn render_elements(elems: &[String], line: bool) -> String {
    if elems.is_empty() {
        return "( )".to_string();
    }
    let sep = if line { "\n  " } else { " " };
    let body: Vec<String> = elems.iter().map(|e| quote_value(e)).collect();
    if line {
        format!("(\n  {}\n)", body.join(sep))
    } else {
        format!("( {} )", body.join(sep))
    }
}

fn render_hash(pairs: &[(String, String)], line: bool) -> String {
    if pairs.is_empty() {
        return "( )".to_string();
    }
    let body: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("[{}]={}", quote_value(k), quote_value(v)))
        .collect();
    if line {
        format!("(\n  {}\n)", body.join("\n  "))
    } else {
        format!("( {} )", body.join(" "))
    }
}

/// Render one parameter, or `None` when the mode excludes it (an unset
/// parameter in value modes, say).
pub fn format_param(ns: &mut Namespace, name: &str, mode: ListMode) -> Option<String> {
    let (flags, base, width) = {
        let pm = ns.lookup(name)?;
        (pm.flags, pm.base, pm.width)
    };
    let tag = flags.type_tag();
    let value = ns.get_value(name);

    let rendered_value = |line: bool| -> Option<String> {
        match &value {
            Some(ParamValue::Scalar(s)) => {
                Some(quote_value(&justify(flags, width, s)))
            }
            Some(ParamValue::Array(v)) => Some(render_elements(v, line)),
            Some(ParamValue::Hash(h)) => {
                let pairs: Vec<(String, String)> =
                    h.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                Some(render_hash(&pairs, line))
            }
            None => None,
        }
    };

    match mode {
        ListMode::NameOnly => Some(name.to_string()),
        ListMode::Value => {
            let v = rendered_value(false)?;
            Some(format!("{}={}", name, v))
        }
        ListMode::Type => {
            let v = rendered_value(false);
            let word = type_word(tag);
            match (word, v) {
                (Some(w), Some(v)) => Some(format!("{} {}={}", w, name, v)),
                (Some(w), None) => Some(format!("{} {}", w, name)),
                (None, Some(v)) => Some(format!("{}={}", name, v)),
                (None, None) => Some(name.to_string()),
            }
        }
        ListMode::PosixExport => match rendered_value(false) {
            Some(v) => Some(format!("export {}={}", name, v)),
            None => Some(format!("export {}", name)),
        },
        ListMode::PosixReadonly => match rendered_value(false) {
            Some(v) => Some(format!("readonly {}={}", name, v)),
            None => Some(format!("readonly {}", name)),
        },
        ListMode::Typeset { line } => {
            let letters = flag_letters(flags, base, width);
            let head = if letters.is_empty() {
                format!("typeset {}", name)
            } else {
                format!("typeset -{} {}", letters, name)
            };
            if flags.contains(ParamFlags::HIDEVAL) {
                return Some(head);
            }
            match rendered_value(line) {
                Some(v) => Some(format!("{}={}", head, v)),
                None => Some(head),
            }
        }
    }
}

/// Render every visible parameter whose flags contain `must` and avoid
/// `exclude`, sorted by name.
pub fn list_params(
    ns: &mut Namespace,
    must: ParamFlags,
    exclude: ParamFlags,
    mode: ListMode,
) -> String {
    let mut names = ns.visible_names();
    names.sort();
    let mut out = String::new();
    for name in names {
        let flags = match ns.lookup(&name) {
            Some(pm) => pm.flags,
            None => continue,
        };
        if flags.contains(ParamFlags::UNSET) && !matches!(mode, ListMode::PosixExport | ListMode::PosixReadonly) {
            continue;
        }
        if !flags.contains(must) || flags.intersects(exclude) {
            continue;
        }
        if let Some(line) = format_param(ns, &name, mode) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::params::param::Param;

    fn seed(ns: &mut Namespace, name: &str, flags: ParamFlags, value: ParamValue) {
        let mut pm = Param::new(name, flags, 0);
        pm.value = value;
        ns.insert(pm);
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("plain"), "plain");
        assert_eq!(quote_value("/usr/bin"), "/usr/bin");
        assert_eq!(quote_value("has space"), "'has space'");
        assert_eq!(quote_value(""), "''");
        assert_eq!(quote_value("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_typeset_form_scalar() {
        let mut ns = Namespace::new();
        seed(
            &mut ns,
            "x",
            ParamFlags::READONLY | ParamFlags::EXPORTED,
            ParamValue::Scalar("v".to_string()),
        );
        let line = format_param(&mut ns, "x", ListMode::Typeset { line: false }).unwrap();
        assert_eq!(line, "typeset -rx x=v");
    }

    #[test]
    fn test_typeset_form_integer_with_base() {
        let mut ns = Namespace::new();
        let mut pm = Param::new("n", ParamFlags::INTEGER, 0);
        pm.base = 16;
        pm.value = ParamValue::Scalar("16#FF".to_string());
        ns.insert(pm);
        let line = format_param(&mut ns, "n", ListMode::Typeset { line: false }).unwrap();
        assert_eq!(line, "typeset -i16 n=16#FF");
    }

    #[test]
    fn test_typeset_form_array_and_line_mode() {
        let mut ns = Namespace::new();
        seed(
            &mut ns,
            "xs",
            ParamFlags::ARRAY,
            ParamValue::Array(vec!["a".to_string(), "b c".to_string()]),
        );
        let line = format_param(&mut ns, "xs", ListMode::Typeset { line: false }).unwrap();
        assert_eq!(line, "typeset -a xs=( a 'b c' )");
        let multi = format_param(&mut ns, "xs", ListMode::Typeset { line: true }).unwrap();
        assert!(multi.contains("(\n  a\n  'b c'\n)"));
    }

    #[test]
    fn test_hideval_suppresses_value() {
        let mut ns = Namespace::new();
        seed(
            &mut ns,
            "secret",
            ParamFlags::HIDEVAL,
            ParamValue::Scalar("v".to_string()),
        );
        let line = format_param(&mut ns, "secret", ListMode::Typeset { line: false }).unwrap();
        assert_eq!(line, "typeset -H secret");
    }

    #[test]
    fn test_posix_export_form() {
        let mut ns = Namespace::new();
        seed(
            &mut ns,
            "X",
            ParamFlags::EXPORTED,
            ParamValue::Scalar("v".to_string()),
        );
        let line = format_param(&mut ns, "X", ListMode::PosixExport).unwrap();
        assert_eq!(line, "export X=v");
    }

    #[test]
    fn test_list_filters_by_flags() {
        let mut ns = Namespace::new();
        seed(&mut ns, "a", ParamFlags::EXPORTED, ParamValue::Scalar("1".to_string()));
        seed(&mut ns, "b", ParamFlags::NONE, ParamValue::Scalar("2".to_string()));
        let out = list_params(&mut ns, ParamFlags::EXPORTED, ParamFlags::NONE, ListMode::NameOnly);
        assert_eq!(out, "a\n");
    }

    #[test]
    fn test_type_mode() {
        let mut ns = Namespace::new();
        seed(&mut ns, "n", ParamFlags::INTEGER, ParamValue::Scalar("5".to_string()));
        let line = format_param(&mut ns, "n", ListMode::Type).unwrap();
        assert_eq!(line, "integer n=5");
    }
}
