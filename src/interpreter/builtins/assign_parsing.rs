//! Assignment Word Parsing
//!
//! The typeset family receives words of the form `name`, `name=value` or
//! `name=(elem ...)`. This module turns one word into an [`Assignment`];
//! splitting the parenthesized element list is quote-aware but performs no
//! expansion (word expansion happened before the builtin was invoked).

use lazy_static::lazy_static;
use regex_lite::Regex;

lazy_static! {
    static ref KEYED_ELEM_RE: Regex = Regex::new(r"^\[([^\]]+)\]=(.*)$").unwrap();
}

/// The value part of an assignment word.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    Scalar(String),
    Array(Vec<String>),
}

/// One parsed `name[=value]` word.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Option<AssignValue>,
}

impl Assignment {
    pub fn bare(name: &str) -> Self {
        Assignment { name: name.to_string(), value: None }
    }

    pub fn has_array_value(&self) -> bool {
        matches!(self.value, Some(AssignValue::Array(_)))
    }
}

/// Parse one argument word. Returns `None` for an empty name (`=foo`),
/// which the caller reports as a bad assignment.
pub fn parse_assignment(word: &str) -> Option<Assignment> {
    if word.starts_with('=') {
        return None;
    }
    let eq = match word.find('=') {
        Some(i) => i,
        None => return Some(Assignment::bare(word)),
    };
    let name = word[..eq].to_string();
    let rest = &word[eq + 1..];
    if rest.starts_with('(') && rest.ends_with(')') && rest.len() >= 2 {
        let elems = parse_array_elements(&rest[1..rest.len() - 1]);
        Some(Assignment { name, value: Some(AssignValue::Array(elems)) })
    } else {
        Some(Assignment { name, value: Some(AssignValue::Scalar(rest.to_string())) })
    }
}

/// Split the inside of `(...)` into elements, honoring single and double
/// quotes and backslash escapes.
pub fn parse_array_elements(content: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_element = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' => {
                if in_element {
                    elements.push(std::mem::take(&mut current));
                    in_element = false;
                }
            }
            '\'' => {
                in_element = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_element = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => {
                            if let Some(&n) = chars.peek() {
                                if n == '"' || n == '\\' {
                                    chars.next();
                                    current.push(n);
                                } else {
                                    current.push('\\');
                                }
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            '\\' => {
                in_element = true;
                if let Some(n) = chars.next() {
                    current.push(n);
                }
            }
            _ => {
                in_element = true;
                current.push(c);
            }
        }
    }
    if in_element {
        elements.push(current);
    }
    elements
}

/// Interpret `[key]=value` elements for an association literal. Returns
/// `None` unless every element is keyed.
pub fn parse_keyed_elements(elems: &[String]) -> Option<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for el in elems {
        let caps = KEYED_ELEM_RE.captures(el)?;
        pairs.push((caps[1].to_string(), caps[2].to_string()));
    }
    Some(pairs)
}
