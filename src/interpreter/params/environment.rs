//! Environment Mirror
//!
//! The exported-variable view handed to child processes. Only scalar-valued
//! parameters are mirrored (a tied scalar mirrors its joined value); arrays
//! and associations never are, and Unset parameters are withheld until they
//! materialize.

use indexmap::IndexMap;

use crate::interpreter::params::flags::ParamType;
use crate::interpreter::params::namespace::Namespace;
use crate::interpreter::params::value::ParamValue;

#[derive(Debug, Clone, Default)]
pub struct EnvMirror {
    vars: IndexMap<String, String>,
}

impl EnvMirror {
    pub fn new() -> Self {
        EnvMirror::default()
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        EnvMirror {
            vars: vars.into_iter().collect(),
        }
    }

    pub fn export_scalar(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    pub fn unexport(&mut self, name: &str) {
        self.vars.shift_remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(|s| s.as_str())
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Bring the mirror in line with one parameter's current state. Called
/// after every mutation that may change export status or value.
pub fn sync_param(ns: &mut Namespace, env: &mut EnvMirror, name: &str) {
    let exported = match ns.lookup(name) {
        Some(pm) => {
            pm.is_exported()
                && !pm.is_unset()
                && !matches!(pm.type_tag(), ParamType::Array | ParamType::Hashed)
        }
        None => false,
    };
    if !exported {
        env.unexport(name);
        return;
    }
    match ns.get_value(name) {
        Some(ParamValue::Scalar(s)) => env.export_scalar(name, &s),
        _ => env.unexport(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::params::flags::ParamFlags;
    use crate::interpreter::params::param::Param;

    #[test]
    fn test_export_and_unexport() {
        let mut env = EnvMirror::new();
        env.export_scalar("FOO", "bar");
        assert_eq!(env.get("FOO"), Some("bar"));
        env.unexport("FOO");
        assert!(!env.is_exported("FOO"));
    }

    #[test]
    fn test_sync_exported_scalar() {
        let mut ns = Namespace::new();
        let mut env = EnvMirror::new();
        ns.insert(Param::new("X", ParamFlags::EXPORTED, 0));
        ns.set_value("X", ParamValue::Scalar("v".to_string())).unwrap();
        sync_param(&mut ns, &mut env, "X");
        assert_eq!(env.get("X"), Some("v"));
    }

    #[test]
    fn test_sync_skips_arrays_and_unset() {
        let mut ns = Namespace::new();
        let mut env = EnvMirror::new();
        ns.insert(Param::new(
            "XS",
            ParamFlags::ARRAY | ParamFlags::EXPORTED,
            0,
        ));
        sync_param(&mut ns, &mut env, "XS");
        assert!(!env.is_exported("XS"));

        ns.insert(Param::new("Y", ParamFlags::EXPORTED | ParamFlags::UNSET, 0));
        sync_param(&mut ns, &mut env, "Y");
        assert!(!env.is_exported("Y"));
    }

    #[test]
    fn test_sync_removes_on_unexport() {
        let mut ns = Namespace::new();
        let mut env = EnvMirror::new();
        ns.insert(Param::new("X", ParamFlags::EXPORTED, 0));
        ns.set_value("X", ParamValue::Scalar("v".to_string())).unwrap();
        sync_param(&mut ns, &mut env, "X");
        assert!(env.is_exported("X"));

        if let Some(pm) = ns.lookup_mut("X") {
            pm.flags.remove(ParamFlags::EXPORTED);
        }
        sync_param(&mut ns, &mut env, "X");
        assert!(!env.is_exported("X"));
    }
}
