//! Parameter Attribute Reconciler
//!
//! Decides, for one name, how a requested attribute delta combines with
//! whatever record already exists: reuse in place, shadow into a new local,
//! retype through destroy-and-recreate, or reject. The rules around
//! specials, readonly, POSIX mode and tied pairs all live here.
//!
//! Ordering contract: attribute flags are applied before any value, and
//! ReadOnly strictly after the value, so "set and freeze" works in one call.

use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::interpreter::errors::TypesetError;
use crate::interpreter::params::environment::{sync_param, EnvMirror};
use crate::interpreter::params::flags::{ParamFlags, ParamType};
use crate::interpreter::params::namespace::Namespace;
use crate::interpreter::params::param::{Param, TieSide};
use crate::interpreter::params::value::{uniq_array, ParamValue};
use crate::interpreter::types::ShellOptions;

lazy_static! {
    static ref VALID_NAME_RE: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();
}

pub fn valid_identifier(name: &str) -> bool {
    VALID_NAME_RE.is_match(name)
}

/// The attribute delta for one reconcile call.
#[derive(Debug, Clone, Default)]
pub struct AttrRequest {
    pub on: ParamFlags,
    /// Off set after conflict resolution.
    pub off: ParamFlags,
    /// Off bits the user explicitly requested with `+letters`.
    pub roff: ParamFlags,
    /// Radix/precision from the numeric option argument, already validated.
    pub base: Option<i64>,
    /// Width from the justification option argument, already validated.
    pub width: Option<usize>,
}

/// Tie wiring for a record being created or updated by `typeset -T`.
#[derive(Debug, Clone)]
pub enum TiePlan {
    Scalar { peer: String, join: Option<char> },
    Array { peer: String },
}

/// What the caller should do after a successful reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypesetOutcome {
    /// The parameter was created or updated.
    Changed,
    /// Existing parameter, no flags, no value: display it, change nothing.
    Display,
}

/// Reconcile one name against a requested attribute delta and optional
/// value. `export_cmd` marks invocations through the export builtin, which
/// POSIX mode treats more leniently for readonly clearing.
pub fn typeset_single(
    ns: &mut Namespace,
    env: &mut EnvMirror,
    opts: &ShellOptions,
    export_cmd: bool,
    name: &str,
    req: &AttrRequest,
    new_value: Option<ParamValue>,
    tie: Option<TiePlan>,
) -> Result<TypesetOutcome, TypesetError> {
    let mut on = req.on;
    let mut off = req.off;
    let roff = req.roff;
    let posix = opts.posix_builtins;
    let locallevel = ns.current_level();

    let existing = ns.lookup(name).map(|pm| ExistingInfo {
        flags: pm.flags,
        level: pm.level,
    });

    // Reuse the existing record? 2 means "reuse but preserve the Unset
    // flag" (a special that is currently unset). POSIX quirk: readonly or
    // exported survive on an unset parameter and keep it reusable.
    let mut usepm: u8 = 0;
    if let Some(info) = &existing {
        if !info.flags.contains(ParamFlags::UNSET)
            || (posix && info.flags.intersects(ParamFlags::READONLY | ParamFlags::EXPORTED))
        {
            usepm = 1;
        } else if info.flags.contains(ParamFlags::SPECIAL) {
            usepm = 2;
        }
    }

    // Localizing at a deeper level never reuses; a special stays special in
    // its local copy unless hidden.
    let mut newspecial = false;
    if usepm > 0 {
        let info = existing.as_ref().unwrap();
        if locallevel != info.level && on.contains(ParamFlags::LOCAL) {
            if info.flags.contains(ParamFlags::SPECIAL)
                && !on.contains(ParamFlags::HIDE)
                && !(info.flags & ParamFlags::HIDE & !off).contains(ParamFlags::HIDE)
            {
                newspecial = true;
            }
            usepm = 0;
        }
    }

    let asg_arrayp = matches!(
        new_value,
        Some(ParamValue::Array(_)) | Some(ParamValue::Hash(_))
    );
    let asg_valuep = new_value.is_some();

    // An array value with a plain-scalar request implies -a.
    if asg_arrayp
        && on.type_tag() == ParamType::Scalar
        && !on.intersects(ParamFlags::NUMERIC_BITS)
        && !existing.as_ref().map_or(false, |i| {
            usepm > 0
                && matches!(i.flags.type_tag(), ParamType::Array | ParamType::Hashed)
        })
    {
        on.insert(ParamFlags::ARRAY);
    }

    // Type-change detection.
    let mut tc = false;
    if usepm > 0
        && asg_arrayp
        && !newspecial
        && !matches!(
            existing.as_ref().unwrap().flags.type_tag(),
            ParamType::Array | ParamType::Hashed
        )
    {
        if on.intersects(ParamFlags::NUMERIC_BITS) {
            return Err(TypesetError::ArrayValueNonArray { name: name.to_string() });
        }
        if existing.as_ref().unwrap().flags.contains(ParamFlags::SPECIAL) {
            return Err(TypesetError::ArrayValueNonArraySpecial { name: name.to_string() });
        }
        tc = true;
        usepm = 0;
    } else if usepm > 0 || newspecial {
        let flags = existing.as_ref().unwrap().flags;
        let chflags = ((off & flags) | (on & !flags)) & ParamFlags::TYPE_CHANGE_BITS;
        // Switching between the two float types keeps the record.
        if !chflags.is_empty() && chflags != (ParamFlags::EFLOAT | ParamFlags::FFLOAT) {
            tc = true;
            usepm = 0;
        }
    }

    // Retyping or clearing readonly is dangerous on specials and autoloaded
    // parameters; SECONDS-style numeric toggles are the one carve-out.
    let readonly_removal = (usepm > 0 || newspecial)
        && existing
            .as_ref()
            .map_or(false, |i| (off & i.flags).contains(ParamFlags::READONLY));
    let mut special_keeps_type = false;
    if readonly_removal || tc {
        let info = existing.as_ref().unwrap();
        if info.flags.contains(ParamFlags::SPECIAL) {
            let mut err = true;
            if !readonly_removal {
                let target = retype_target(on, off, info.flags);
                if newspecial {
                    if matches!(
                        target,
                        ParamType::Scalar
                            | ParamType::Integer
                            | ParamType::FloatE
                            | ParamType::FloatF
                    ) && special_can_retype(ns, name, target)
                    {
                        special_keeps_type = true;
                        err = false;
                        tc = false;
                    }
                } else if special_retype_in_place(ns, name, target) {
                    usepm = 1;
                    err = false;
                }
            }
            if err {
                return Err(TypesetError::CannotRetypeSpecial { name: name.to_string() });
            }
        } else if info.flags.contains(ParamFlags::AUTOLOAD) {
            return Err(TypesetError::CannotRetypeAutoload { name: name.to_string() });
        }
    } else if newspecial {
        special_keeps_type = true;
    }

    // POSIX tightening: readonly/export with nothing to assign defers
    // materialization, and readonly can only be cleared through export.
    if posix {
        let unset_existing = existing
            .as_ref()
            .map_or(true, |i| i.flags.contains(ParamFlags::UNSET));
        if on.intersects(ParamFlags::READONLY | ParamFlags::EXPORTED)
            && (usepm == 0 || unset_existing)
            && !asg_valuep
        {
            on.insert(ParamFlags::UNSET);
        } else if usepm > 0
            && existing.as_ref().unwrap().flags.contains(ParamFlags::READONLY)
            && !on.contains(ParamFlags::READONLY)
            && !export_cmd
        {
            return Err(TypesetError::ReadOnly { name: name.to_string() });
        }
    }

    if usepm > 0 {
        return reuse_in_place(
            ns, env, opts, name, on, off, roff, usepm, req, new_value, tie,
            asg_arrayp, asg_valuep,
        );
    }

    // Creating (or retyping into) a fresh record: the value must agree with
    // the requested shape.
    if asg_arrayp {
        if !on.intersects(ParamFlags::ARRAY | ParamFlags::HASHED) {
            return Err(TypesetError::InconsistentAssignment { name: name.to_string() });
        }
    } else if asg_valuep && on.intersects(ParamFlags::ARRAY | ParamFlags::HASHED) {
        return Err(TypesetError::InconsistentAssignment { name: name.to_string() });
    }

    let mut keeplocal: Option<usize> = None;
    let mut value = new_value;
    if tc {
        let info = existing.as_ref().unwrap();
        // Maintain readonly/exported status across the retype, and keep the
        // record at its current level of localness.
        on.insert(!off & (ParamFlags::READONLY | ParamFlags::EXPORTED) & info.flags);
        keeplocal = Some(info.level);
        // Carry the old value over, but not from, to, or between the
        // container shapes.
        if !asg_valuep
            && !(info.flags | on).intersects(ParamFlags::ARRAY | ParamFlags::HASHED)
        {
            value = ns.get_value(name);
        }
        ns.remove(name);
    }

    if newspecial {
        create_local_special(
            ns,
            name,
            on,
            off,
            req,
            opts,
            special_keeps_type,
            asg_valuep,
        )?;
    } else {
        if !valid_identifier(name) {
            return Err(if name.chars().next().map_or(false, |c| c.is_ascii_digit()) {
                TypesetError::NotAnIdentifier { name: name.to_string() }
            } else {
                TypesetError::NotValidHere { name: name.to_string() }
            });
        }
        if existing
            .as_ref()
            .map_or(false, |i| i.flags.contains(ParamFlags::RESTRICTED))
            && opts.restricted
        {
            return Err(TypesetError::Restricted { name: name.to_string() });
        }
        // Create with everything except ReadOnly, which lands after the
        // value.
        let level = keeplocal.unwrap_or(if on.contains(ParamFlags::LOCAL) {
            locallevel
        } else {
            0
        });
        let mut create_flags = on & !(ParamFlags::READONLY | ParamFlags::LOCAL);
        if existing
            .as_ref()
            .map_or(false, |i| i.flags.contains(ParamFlags::RESTRICTED))
        {
            create_flags.insert(ParamFlags::RESTRICTED);
        }
        let mut npm = Param::new(name, create_flags, level);
        npm.base = req.base.unwrap_or(0);
        npm.width = req.width.unwrap_or(0);
        npm.tie = tie.map(|t| match t {
            TiePlan::Scalar { peer, join } => TieSide::Scalar { peer, join },
            TiePlan::Array { peer } => TieSide::Array { peer },
        });
        ns.insert(npm);
    }

    if let Some(v) = value {
        if let Err(e) = ns.set_value(name, v) {
            // Leave no half-created record behind.
            if !newspecial {
                ns.remove(name);
            }
            return Err(e);
        }
    }
    if on.contains(ParamFlags::READONLY) {
        if let Some(pm) = ns.lookup_mut(name) {
            pm.flags.insert(ParamFlags::READONLY);
        }
    }
    sync_param(ns, env, name);
    Ok(TypesetOutcome::Changed)
}

struct ExistingInfo {
    flags: ParamFlags,
    level: usize,
}

/// The numeric type a retype request aims at. An explicit type bit in `on`
/// wins; a bare `+i`/`+E`/`+F` implies the opposite family.
fn retype_target(on: ParamFlags, off: ParamFlags, old: ParamFlags) -> ParamType {
    match on.type_tag() {
        ParamType::Scalar => {
            if off.contains(ParamFlags::INTEGER) && old.contains(ParamFlags::INTEGER) {
                ParamType::FloatF
            } else if off.intersects(ParamFlags::EFLOAT | ParamFlags::FFLOAT)
                && old.intersects(ParamFlags::EFLOAT | ParamFlags::FFLOAT)
            {
                ParamType::Integer
            } else {
                ParamType::Scalar
            }
        }
        t => t,
    }
}

fn special_can_retype(ns: &mut Namespace, name: &str, target: ParamType) -> bool {
    if target == ParamType::Scalar {
        // Copying the existing type is always fine.
        return true;
    }
    match ns.lookup(name).and_then(|p| p.special.as_ref()) {
        Some(acc) => {
            let mut probe = acc.box_clone();
            probe.retype_numeric(target)
        }
        None => false,
    }
}

fn special_retype_in_place(ns: &mut Namespace, name: &str, target: ParamType) -> bool {
    match ns.lookup_mut(name).and_then(|p| p.special.as_mut()) {
        Some(acc) => acc.retype_numeric(target),
        None => false,
    }
}

#[allow(clippy::too_many_arguments)]
fn reuse_in_place(
    ns: &mut Namespace,
    env: &mut EnvMirror,
    opts: &ShellOptions,
    name: &str,
    mut on: ParamFlags,
    mut off: ParamFlags,
    roff: ParamFlags,
    usepm: u8,
    req: &AttrRequest,
    new_value: Option<ParamValue>,
    tie: Option<TiePlan>,
    asg_arrayp: bool,
    asg_valuep: bool,
) -> Result<TypesetOutcome, TypesetError> {
    let flags = ns.lookup(name).map(|p| p.flags).unwrap_or_default();
    let container = matches!(flags.type_tag(), ParamType::Array | ParamType::Hashed);

    if asg_arrayp && !container {
        return Err(TypesetError::InconsistentAssignment { name: name.to_string() });
    }
    if asg_valuep && !asg_arrayp && container {
        return Err(TypesetError::InconsistentAssignment { name: name.to_string() });
    }

    on.remove(ParamFlags::LOCAL);
    if on.is_empty() && roff.is_empty() && !asg_valuep && tie.is_none() {
        return Ok(TypesetOutcome::Display);
    }
    if flags.contains(ParamFlags::RESTRICTED) && opts.restricted {
        return Err(TypesetError::Restricted { name: name.to_string() });
    }
    // Refuse up front so a failed assignment leaves the record untouched;
    // readonly cleared in the same call does not block the write.
    if asg_valuep
        && flags.contains(ParamFlags::READONLY)
        && !off.contains(ParamFlags::READONLY)
    {
        return Err(TypesetError::ReadOnly { name: name.to_string() });
    }

    // Unique dedup happens up front, unless the parameter stays readonly.
    if on.contains(ParamFlags::UNIQUE) && !(flags & ParamFlags::READONLY & !off).contains(ParamFlags::READONLY) {
        match flags.type_tag() {
            ParamType::Array => {
                if let Some(pm) = ns.lookup_mut(name) {
                    if let ParamValue::Array(elems) = &mut pm.value {
                        uniq_array(elems);
                    }
                }
            }
            ParamType::Scalar => {
                let peer = ns
                    .lookup(name)
                    .and_then(|p| p.tied_scalar().map(|(peer, _)| peer.to_string()));
                if let Some(peer) = peer {
                    if let Some(apm) = ns.lookup_mut(&peer) {
                        if let ParamValue::Array(elems) = &mut apm.value {
                            uniq_array(elems);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // Apply the flag delta, ReadOnly excepted. A plain reuse also clears
    // Unset (the parameter materializes), except that POSIX keeps a
    // readonly parameter deferred and an unset special stays as it was.
    if usepm != 2 && !(on.contains(ParamFlags::READONLY) && opts.posix_builtins) {
        off.insert(ParamFlags::UNSET);
    }
    {
        let pm = ns.lookup_mut(name).unwrap();
        pm.flags = (pm.flags | (on & !ParamFlags::READONLY)) & !off;
        if on.intersects(ParamFlags::JUSTIFY_BITS) {
            if let Some(w) = req.width {
                pm.width = w;
            }
        }
        if on.intersects(ParamFlags::NUMERIC_BITS) {
            if let Some(b) = req.base {
                pm.base = b;
            }
        }
    }

    // Re-tie bookkeeping: an already-tied scalar picking up a new join
    // character keeps its array but joins differently from now on.
    if let Some(TiePlan::Scalar { join, .. }) = &tie {
        if let Some(pm) = ns.lookup_mut(name) {
            if let Some(TieSide::Scalar { join: old_join, .. }) = &mut pm.tie {
                *old_join = *join;
            }
        }
    }

    if let Some(v) = new_value {
        ns.set_value(name, v)?;
    }

    // ReadOnly goes on last so a same-call assignment lands first.
    if on.contains(ParamFlags::READONLY) {
        if let Some(pm) = ns.lookup_mut(name) {
            pm.flags.insert(ParamFlags::READONLY);
        }
    }
    sync_param(ns, env, name);
    Ok(TypesetOutcome::Changed)
}

#[allow(clippy::too_many_arguments)]
fn create_local_special(
    ns: &mut Namespace,
    name: &str,
    on: ParamFlags,
    off: ParamFlags,
    req: &AttrRequest,
    opts: &ShellOptions,
    keeps_type: bool,
    asg_valuep: bool,
) -> Result<(), TypesetError> {
    let (old_flags, old_base, old_width, accessor) = match ns.lookup(name) {
        Some(pm) => (
            pm.flags,
            pm.base,
            pm.width,
            pm.special.as_ref().map(|a| a.box_clone()),
        ),
        None => return Err(TypesetError::NoSuchVariable { name: name.to_string() }),
    };
    if old_flags.contains(ParamFlags::RESTRICTED) && opts.restricted {
        return Err(TypesetError::Restricted { name: name.to_string() });
    }

    let mut flags = ((old_flags & ParamFlags::TYPE_BITS) | on | ParamFlags::SPECIAL) & !off;
    flags.remove(ParamFlags::LOCAL);
    // Readonlyness of specials must be preserved.
    flags.insert(old_flags & ParamFlags::READONLY);

    let mut npm = Param::new(name, flags & !ParamFlags::READONLY, ns.current_level());
    npm.flags = flags;
    npm.base = if on.intersects(ParamFlags::NUMERIC_BITS) {
        req.base.unwrap_or(0)
    } else {
        old_base
    };
    npm.width = if on.intersects(ParamFlags::JUSTIFY_BITS) {
        req.width.unwrap_or(0)
    } else {
        old_width
    };
    npm.special = accessor;

    if keeps_type {
        let target = npm.flags.type_tag();
        if let Some(acc) = npm.special.as_mut() {
            acc.retype_numeric(target);
        }
    }
    // The local copy starts fresh unless the special is readonly.
    if !asg_valuep && !old_flags.contains(ParamFlags::READONLY) {
        if let Some(acc) = npm.special.as_mut() {
            let reset = match npm.flags.type_tag() {
                ParamType::Integer | ParamType::FloatE | ParamType::FloatF => "0",
                _ => "",
            };
            acc.set(&ParamValue::Scalar(reset.to_string()));
        }
    }
    ns.insert(npm);
    Ok(())
}
