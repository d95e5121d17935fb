//! Parameter Records
//!
//! One record per name per visible scope level. Records are owned by the
//! [`Namespace`](crate::interpreter::params::namespace::Namespace); shadowed
//! records sit beneath the visible one on that name's stack.

use crate::interpreter::params::flags::{ParamFlags, ParamType};
use crate::interpreter::params::special::SpecialAccessor;
use crate::interpreter::params::value::ParamValue;

/// Which side of a tied pair a record is, and who its peer is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TieSide {
    /// The scalar side: reads join the peer array, writes split into it.
    /// `join` of `None` concatenates with no separator.
    Scalar { peer: String, join: Option<char> },
    /// The array side, holding the actual elements.
    Array { peer: String },
}

/// A symbol-table entry for one shell parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub flags: ParamFlags,
    /// Scope nesting depth this record lives at; 0 is global.
    pub level: usize,
    /// Output radix for integers, output precision for floats; 0 = default.
    pub base: i64,
    /// Justification width; 0 = none.
    pub width: usize,
    pub value: ParamValue,
    pub tie: Option<TieSide>,
    /// Present only on special parameters.
    pub special: Option<Box<dyn SpecialAccessor>>,
}

impl Param {
    pub fn new(name: &str, flags: ParamFlags, level: usize) -> Self {
        let value = ParamValue::empty_for(flags.type_tag());
        Param {
            name: name.to_string(),
            flags,
            level,
            base: 0,
            width: 0,
            value,
            tie: None,
            special: None,
        }
    }

    pub fn type_tag(&self) -> ParamType {
        self.flags.type_tag()
    }

    pub fn is_special(&self) -> bool {
        self.flags.contains(ParamFlags::SPECIAL)
    }

    pub fn is_readonly(&self) -> bool {
        self.flags.contains(ParamFlags::READONLY)
    }

    pub fn is_unset(&self) -> bool {
        self.flags.contains(ParamFlags::UNSET)
    }

    pub fn is_exported(&self) -> bool {
        self.flags.contains(ParamFlags::EXPORTED)
    }

    /// The scalar side of a tied pair.
    pub fn tied_scalar(&self) -> Option<(&str, Option<char>)> {
        match &self.tie {
            Some(TieSide::Scalar { peer, join }) => Some((peer.as_str(), *join)),
            _ => None,
        }
    }

    /// The array side of a tied pair.
    pub fn tied_array_peer(&self) -> Option<&str> {
        match &self.tie {
            Some(TieSide::Array { peer }) => Some(peer.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_value_matches_type() {
        let p = Param::new("xs", ParamFlags::ARRAY, 0);
        assert_eq!(p.type_tag(), ParamType::Array);
        assert_eq!(p.value, ParamValue::Array(Vec::new()));

        let p = Param::new("n", ParamFlags::INTEGER, 0);
        assert_eq!(p.value, ParamValue::Scalar("0".to_string()));

        let p = Param::new("s", ParamFlags::NONE, 2);
        assert_eq!(p.level, 2);
        assert_eq!(p.value, ParamValue::Scalar(String::new()));
    }

    #[test]
    fn test_tie_sides() {
        let mut p = Param::new("path", ParamFlags::TIED, 0);
        p.tie = Some(TieSide::Scalar { peer: "paths".to_string(), join: Some(':') });
        assert_eq!(p.tied_scalar(), Some(("paths", Some(':'))));
        assert_eq!(p.tied_array_peer(), None);
    }
}
