//! Parameter Values
//!
//! The closed value representation (scalar, array, association) plus the
//! rendering rules tied to attributes: radix output for integers, precision
//! for floats, width justification, case folding and unique-array dedup.

use indexmap::IndexMap;

use crate::interpreter::params::flags::{ParamFlags, ParamType};

/// A parameter's value. Exactly one shape applies at a time, consistent
/// with the owning parameter's type tag (numeric types use `Scalar`).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(String),
    Array(Vec<String>),
    Hash(IndexMap<String, String>),
}

impl ParamValue {
    pub fn empty_for(tag: ParamType) -> ParamValue {
        match tag {
            ParamType::Array => ParamValue::Array(Vec::new()),
            ParamType::Hashed => ParamValue::Hash(IndexMap::new()),
            ParamType::Integer => ParamValue::Scalar("0".to_string()),
            ParamType::FloatE | ParamType::FloatF => ParamValue::Scalar("0".to_string()),
            ParamType::Scalar => ParamValue::Scalar(String::new()),
        }
    }

    pub fn is_array_like(&self) -> bool {
        matches!(self, ParamValue::Array(_) | ParamValue::Hash(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ParamValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ParamValue::Array(v) => Some(v),
            _ => None,
        }
    }
}

/// Remove duplicate elements, keeping the first occurrence of each.
pub fn uniq_array(elems: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::new();
    elems.retain(|e| {
        if seen.iter().any(|s| s == e) {
            false
        } else {
            seen.push(e.clone());
            true
        }
    });
}

/// Fold a scalar according to the case attributes, at assignment time.
pub fn apply_case(flags: ParamFlags, value: &str) -> String {
    if flags.contains(ParamFlags::LOWER) {
        value.to_lowercase()
    } else if flags.contains(ParamFlags::UPPER) {
        value.to_uppercase()
    } else {
        value.to_string()
    }
}

/// Parse a scalar as an integer, honoring a `base#digits` prefix. Anything
/// unparsable evaluates to 0, the way arithmetic assignment treats junk.
pub fn parse_integer(text: &str) -> i64 {
    let t = text.trim();
    if let Some(hash) = t.find('#') {
        let (base_s, digits) = t.split_at(hash);
        if let Ok(base) = base_s.parse::<u32>() {
            if (2..=36).contains(&base) {
                return i64::from_str_radix(&digits[1..], base).unwrap_or(0);
            }
        }
        return 0;
    }
    t.parse::<i64>().unwrap_or(0)
}

pub fn parse_float(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(0.0)
}

/// Render an integer in `base`, using the `base#digits` form for any radix
/// other than 10.
pub fn format_integer(n: i64, base: i64) -> String {
    if !(2..=36).contains(&base) || base == 10 {
        return n.to_string();
    }
    let negative = n < 0;
    let mut m = n.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let d = (m % base as u64) as u32;
        digits.push(std::char::from_digit(d, base as u32).unwrap().to_ascii_uppercase());
        m /= base as u64;
        if m == 0 {
            break;
        }
    }
    digits.reverse();
    let body: String = digits.into_iter().collect();
    if negative {
        format!("-{}#{}", base, body)
    } else {
        format!("{}#{}", base, body)
    }
}

/// Render a float per the parameter's float type. The `base` field holds
/// the output precision; 0 means the default of 10 digits.
pub fn format_float(v: f64, tag: ParamType, base: i64) -> String {
    let prec = if base > 0 { base as usize } else { 10 };
    match tag {
        ParamType::FloatE => format!("{:.*e}", prec, v),
        _ => format!("{:.*}", prec, v),
    }
}

/// Re-render a scalar after a numeric retype or base change.
pub fn reinterpret_numeric(text: &str, tag: ParamType, base: i64) -> String {
    match tag {
        ParamType::Integer => format_integer(parse_integer(text), base),
        ParamType::FloatE | ParamType::FloatF => format_float(parse_float(text), tag, base),
        _ => text.to_string(),
    }
}

/// Apply width justification to a scalar for display.
///
/// Left justification strips leading blanks, then pads or truncates on the
/// right. Right justification pads on the left with blanks or zeroes,
/// truncating from the left when too long.
pub fn justify(flags: ParamFlags, width: usize, value: &str) -> String {
    if width == 0 {
        return value.to_string();
    }
    if flags.contains(ParamFlags::LEFT) {
        let stripped = value.trim_start_matches(' ');
        let mut s: String = stripped.chars().take(width).collect();
        while s.chars().count() < width {
            s.push(' ');
        }
        s
    } else if flags.intersects(ParamFlags::RIGHT_B | ParamFlags::RIGHT_Z) {
        let count = value.chars().count();
        if count >= width {
            value.chars().skip(count - width).collect()
        } else {
            let fill = if flags.contains(ParamFlags::RIGHT_Z) { '0' } else { ' ' };
            let mut s: String = std::iter::repeat(fill).take(width - count).collect();
            s.push_str(value);
            s
        }
    } else {
        value.to_string()
    }
}
