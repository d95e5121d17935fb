//! Parameter Namespace
//!
//! The symbol table for shell parameters. Each name owns a stack of
//! records: the visible record on top, shadowed outer-scope records below.
//! Scope push/pop are explicit operations; popping a scope removes the
//! records declared at that level and re-exposes what they shadowed.
//!
//! Value reads and writes go through the namespace so that tied pairs and
//! special accessors resolve correctly.

use indexmap::IndexMap;

use crate::interpreter::errors::TypesetError;
use crate::interpreter::params::flags::{ParamFlags, ParamType};
use crate::interpreter::params::param::{Param, TieSide};
use crate::interpreter::params::value::{
    apply_case, reinterpret_numeric, uniq_array, ParamValue,
};

#[derive(Debug, Default)]
pub struct Namespace {
    table: IndexMap<String, Vec<Param>>,
    level: usize,
}

/// Join array elements into a tied scalar's value.
pub fn join_elems(elems: &[String], join: Option<char>) -> String {
    match join {
        Some(c) => elems.join(&c.to_string()),
        None => elems.concat(),
    }
}

/// Split a tied scalar's value into array elements.
pub fn split_scalar(text: &str, join: Option<char>) -> Vec<String> {
    match join {
        Some(c) => {
            if text.is_empty() {
                Vec::new()
            } else {
                text.split(c).map(|s| s.to_string()).collect()
            }
        }
        None => {
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            }
        }
    }
}

impl Namespace {
    pub fn new() -> Self {
        Namespace::default()
    }

    pub fn current_level(&self) -> usize {
        self.level
    }

    /// Enter a function/block scope. Returns the new level.
    pub fn push_scope(&mut self) -> usize {
        self.level += 1;
        self.level
    }

    /// Unwind the innermost scope, dropping records declared at it and
    /// re-exposing what they shadowed. Returns the affected names so the
    /// caller can resync the environment mirror.
    pub fn pop_scope(&mut self) -> Vec<String> {
        let mut affected = Vec::new();
        if self.level == 0 {
            return affected;
        }
        let level = self.level;
        let mut emptied = Vec::new();
        for (name, stack) in self.table.iter_mut() {
            let mut touched = false;
            while stack.last().map(|p| p.level) == Some(level) {
                stack.pop();
                touched = true;
            }
            if touched {
                affected.push(name.clone());
            }
            if stack.is_empty() {
                emptied.push(name.clone());
            }
        }
        for name in emptied {
            self.table.shift_remove(&name);
        }
        self.level -= 1;
        affected
    }

    /// The visible record for a name.
    pub fn lookup(&self, name: &str) -> Option<&Param> {
        self.table.get(name).and_then(|s| s.last())
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.table.get_mut(name).and_then(|s| s.last_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Install a record: replaces the visible record when it lives at the
    /// same level, otherwise shadows it.
    pub fn insert(&mut self, param: Param) {
        let stack = self.table.entry(param.name.clone()).or_default();
        match stack.last() {
            Some(top) if top.level == param.level => {
                *stack.last_mut().unwrap() = param;
            }
            _ => stack.push(param),
        }
    }

    /// Remove the visible record entirely.
    pub fn remove(&mut self, name: &str) -> Option<Param> {
        let stack = self.table.get_mut(name)?;
        let removed = stack.pop();
        if stack.is_empty() {
            self.table.shift_remove(name);
        }
        removed
    }

    /// Names of all visible records, in insertion order.
    pub fn visible_names(&self) -> Vec<String> {
        self.table.keys().cloned().collect()
    }

    /// Read a parameter's value, resolving specials and tied scalars.
    /// Unset parameters read as `None`.
    pub fn get_value(&mut self, name: &str) -> Option<ParamValue> {
        let (unset, special, tie) = {
            let pm = self.lookup(name)?;
            (pm.is_unset(), pm.special.is_some(), pm.tie.clone())
        };
        if unset {
            return None;
        }
        if special {
            return self.lookup_mut(name)?.special.as_mut().map(|a| a.get());
        }
        if let Some(TieSide::Scalar { peer, join }) = tie {
            let elems = match self.lookup(&peer) {
                Some(apm) => apm.value.as_array().unwrap_or(&[]).to_vec(),
                None => Vec::new(),
            };
            return Some(ParamValue::Scalar(join_elems(&elems, join)));
        }
        Some(self.lookup(name)?.value.clone())
    }

    /// Write a parameter's value. Readonly is checked here, at assignment
    /// time, so that a same-call `-r` applied after the value still works.
    pub fn set_value(&mut self, name: &str, value: ParamValue) -> Result<(), TypesetError> {
        let (flags, tie, base) = {
            let pm = self.lookup(name).ok_or_else(|| TypesetError::NoSuchVariable {
                name: name.to_string(),
            })?;
            (pm.flags, pm.tie.clone(), pm.base)
        };
        if flags.contains(ParamFlags::READONLY) {
            return Err(TypesetError::ReadOnly { name: name.to_string() });
        }

        if flags.contains(ParamFlags::SPECIAL) {
            let pm = self.lookup_mut(name).unwrap();
            if let Some(acc) = pm.special.as_mut() {
                acc.set(&value);
            }
            pm.flags.remove(ParamFlags::UNSET);
            return Ok(());
        }

        match tie {
            Some(TieSide::Scalar { peer, join }) => {
                let text = match &value {
                    ParamValue::Scalar(s) => apply_case(flags, s),
                    ParamValue::Array(v) => join_elems(v, join),
                    ParamValue::Hash(_) => {
                        return Err(TypesetError::InconsistentAssignment {
                            name: name.to_string(),
                        })
                    }
                };
                let mut elems = split_scalar(&text, join);
                let peer_unique = self
                    .lookup(&peer)
                    .map(|p| p.flags.contains(ParamFlags::UNIQUE))
                    .unwrap_or(false);
                if flags.contains(ParamFlags::UNIQUE) || peer_unique {
                    uniq_array(&mut elems);
                }
                if let Some(apm) = self.lookup_mut(&peer) {
                    apm.value = ParamValue::Array(elems);
                    apm.flags.remove(ParamFlags::UNSET);
                }
                let pm = self.lookup_mut(name).unwrap();
                pm.flags.remove(ParamFlags::UNSET);
                Ok(())
            }
            Some(TieSide::Array { peer }) => {
                let mut elems = match value {
                    ParamValue::Array(v) => v,
                    ParamValue::Scalar(s) => split_scalar(&s, None),
                    ParamValue::Hash(_) => {
                        return Err(TypesetError::InconsistentAssignment {
                            name: name.to_string(),
                        })
                    }
                };
                let peer_unique = self
                    .lookup(&peer)
                    .map(|p| p.flags.contains(ParamFlags::UNIQUE))
                    .unwrap_or(false);
                if flags.contains(ParamFlags::UNIQUE) || peer_unique {
                    uniq_array(&mut elems);
                }
                let pm = self.lookup_mut(name).unwrap();
                pm.value = ParamValue::Array(elems);
                pm.flags.remove(ParamFlags::UNSET);
                if let Some(spm) = self.lookup_mut(&peer) {
                    spm.flags.remove(ParamFlags::UNSET);
                }
                Ok(())
            }
            None => {
                let stored = coerce_value(name, flags, base, value)?;
                let pm = self.lookup_mut(name).unwrap();
                pm.value = stored;
                pm.flags.remove(ParamFlags::UNSET);
                Ok(())
            }
        }
    }
}

/// Shape a raw value to the parameter's type, applying case folding,
/// numeric reinterpretation and unique-array dedup.
fn coerce_value(
    name: &str,
    flags: ParamFlags,
    base: i64,
    value: ParamValue,
) -> Result<ParamValue, TypesetError> {
    let tag = flags.type_tag();
    match tag {
        ParamType::Array => {
            let mut elems = match value {
                ParamValue::Array(v) => v,
                // Lenient fallback: a scalar assigned to an array makes a
                // one-element array, the empty scalar an empty one.
                ParamValue::Scalar(s) => {
                    if s.is_empty() {
                        Vec::new()
                    } else {
                        vec![s]
                    }
                }
                ParamValue::Hash(_) => {
                    return Err(TypesetError::InconsistentAssignment {
                        name: name.to_string(),
                    })
                }
            };
            if flags.contains(ParamFlags::UNIQUE) {
                uniq_array(&mut elems);
            }
            Ok(ParamValue::Array(elems))
        }
        ParamType::Hashed => match value {
            ParamValue::Hash(h) => Ok(ParamValue::Hash(h)),
            // Alternating key/value elements build an association.
            ParamValue::Array(v) => {
                let mut h = IndexMap::new();
                let mut it = v.into_iter();
                while let Some(k) = it.next() {
                    h.insert(k, it.next().unwrap_or_default());
                }
                Ok(ParamValue::Hash(h))
            }
            ParamValue::Scalar(_) => Err(TypesetError::InconsistentAssignment {
                name: name.to_string(),
            }),
        },
        ParamType::Integer | ParamType::FloatE | ParamType::FloatF => {
            let text = match value {
                ParamValue::Scalar(s) => s,
                ParamValue::Array(v) => v.join(" "),
                ParamValue::Hash(_) => {
                    return Err(TypesetError::InconsistentAssignment {
                        name: name.to_string(),
                    })
                }
            };
            Ok(ParamValue::Scalar(reinterpret_numeric(&text, tag, base)))
        }
        ParamType::Scalar => {
            let text = match value {
                ParamValue::Scalar(s) => s,
                ParamValue::Array(v) => v.join(" "),
                ParamValue::Hash(_) => {
                    return Err(TypesetError::InconsistentAssignment {
                        name: name.to_string(),
                    })
                }
            };
            Ok(ParamValue::Scalar(apply_case(flags, &text)))
        }
    }
}
