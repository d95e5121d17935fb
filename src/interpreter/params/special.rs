//! Special Parameters
//!
//! Parameters like SECONDS and RANDOM are backed by interpreter state, not
//! a value cell. Each carries a [`SpecialAccessor`] that owns the get/set
//! behavior; the attribute machinery treats the parameter like any other
//! except that its type may never change (SECONDS being the one sanctioned
//! exception, which toggles between integer and float output).

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::interpreter::params::flags::ParamType;
use crate::interpreter::params::value::ParamValue;

/// Get/set hooks for a special parameter.
pub trait SpecialAccessor: fmt::Debug {
    /// Current value, rendered for the parameter's type.
    fn get(&mut self) -> ParamValue;

    /// Store a value; accessors interpret the scalar as they see fit.
    fn set(&mut self, value: &ParamValue);

    /// Attempt the numeric retype carve-out. Returns false when this
    /// special does not support changing type (the common case).
    fn retype_numeric(&mut self, _target: ParamType) -> bool {
        false
    }

    fn box_clone(&self) -> Box<dyn SpecialAccessor>;
}

impl Clone for Box<dyn SpecialAccessor> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Elapsed-time clock behind SECONDS. Reads report time since shell start
/// plus any offset a write established; the integer/float distinction only
/// affects rendering, which is why retyping between the two is allowed.
#[derive(Debug, Clone)]
pub struct SecondsAccessor {
    started: Instant,
    offset: f64,
    float: bool,
}

impl SecondsAccessor {
    pub fn new() -> Self {
        SecondsAccessor {
            started: Instant::now(),
            offset: 0.0,
            float: false,
        }
    }

    fn raw(&self) -> f64 {
        self.started.elapsed().as_secs_f64() + self.offset
    }
}

impl Default for SecondsAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialAccessor for SecondsAccessor {
    fn get(&mut self) -> ParamValue {
        let raw = self.raw();
        if self.float {
            ParamValue::Scalar(format!("{:.9}", raw))
        } else {
            ParamValue::Scalar((raw as i64).to_string())
        }
    }

    fn set(&mut self, value: &ParamValue) {
        if let ParamValue::Scalar(s) = value {
            let target: f64 = s.trim().parse().unwrap_or(0.0);
            self.offset = target - self.started.elapsed().as_secs_f64();
        }
    }

    fn retype_numeric(&mut self, target: ParamType) -> bool {
        match target {
            ParamType::Integer => {
                self.float = false;
                true
            }
            ParamType::FloatE | ParamType::FloatF => {
                self.float = true;
                true
            }
            _ => false,
        }
    }

    fn box_clone(&self) -> Box<dyn SpecialAccessor> {
        Box::new(self.clone())
    }
}

/// 15-bit pseudo-random generator behind RANDOM; writing seeds it.
pub struct RandomAccessor {
    rng: StdRng,
}

impl fmt::Debug for RandomAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomAccessor").finish_non_exhaustive()
    }
}

impl RandomAccessor {
    pub fn new() -> Self {
        RandomAccessor {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RandomAccessor {
    fn clone(&self) -> Self {
        // A clone keeps its own stream; reseed from the parent's output.
        let mut parent = self.rng.clone();
        RandomAccessor {
            rng: StdRng::seed_from_u64(parent.next_u64()),
        }
    }
}

impl SpecialAccessor for RandomAccessor {
    fn get(&mut self) -> ParamValue {
        ParamValue::Scalar(self.rng.gen_range(0..32768i32).to_string())
    }

    fn set(&mut self, value: &ParamValue) {
        if let ParamValue::Scalar(s) = value {
            let seed: u64 = s.trim().parse().unwrap_or(0);
            self.rng = StdRng::seed_from_u64(seed);
        }
    }

    fn box_clone(&self) -> Box<dyn SpecialAccessor> {
        Box::new(self.clone())
    }
}
