//! Parameter subsystem
//!
//! Records, values, attribute flags, the namespace that owns them, the
//! environment mirror, and the attribute reconciler.

pub mod environment;
pub mod flags;
pub mod namespace;
pub mod param;
pub mod reconcile;
pub mod special;
pub mod value;

pub use environment::EnvMirror;
pub use flags::{ParamFlags, ParamType};
pub use namespace::Namespace;
pub use param::{Param, TieSide};
pub use reconcile::{typeset_single, AttrRequest, TiePlan, TypesetOutcome};
pub use special::SpecialAccessor;
pub use value::ParamValue;
