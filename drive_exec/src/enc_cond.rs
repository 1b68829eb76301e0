//! # Encoder signal conditioner
//!
//! Raw encoder readings come as a wrapping tick count plus a velocity counter which the hardware
//! only reports to 16 bits, so it aliases at high speed. Position deltas on their own are too
//! noisy for control. The conditioner takes the median of the last three position-derived
//! velocities and uses that estimate to unwrap the hardware velocity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use hw_if::{
    eqpt::EncoderPort,
    registry::{PortError, PortRegistry},
};
use util::maths::median3;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mask giving the native width of the hardware velocity counter.
const VEL_HINT_MASK: i64 = 0xFFFF;

/// The velocity hint is corrected by multiples of this amount.
///
/// Units: ticks/second
pub const VEL_CORRECTION_QUANTUM: f64 = 65536.0;

/// Number of slots in the velocity history.
const HISTORY_LEN: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration of a single encoder channel, as found in parameter files.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EncoderCfg {
    /// Name of the encoder port in the port registry.
    pub port: String,

    /// If true both position and velocity are negated.
    #[serde(default)]
    pub reversed: bool,
}

/// One conditioned reading from a single encoder.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct EncoderSample {
    /// Units: ticks
    pub position: i32,

    /// Change in position since the last sample.
    ///
    /// Units: ticks
    pub delta: i32,

    /// Units: ticks/second
    pub velocity: f64,
}

/// Conditioner for one encoder channel.
pub struct EncCond {
    port: Option<Box<dyn EncoderPort>>,

    reversed: bool,

    last_position: Option<i32>,

    vel_history: [f64; HISTORY_LEN],
    history_idx: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EncCond {
    pub fn new(port: Box<dyn EncoderPort>, reversed: bool) -> Self {
        Self {
            port: Some(port),
            reversed,
            last_position: None,
            vel_history: [0.0; HISTORY_LEN],
            history_idx: 0,
        }
    }

    /// A conditioner with no channel behind it, producing only zero samples.
    pub fn unconfigured() -> Self {
        Self {
            port: None,
            reversed: false,
            last_position: None,
            vel_history: [0.0; HISTORY_LEN],
            history_idx: 0,
        }
    }

    /// Take the configured port out of the registry and build the conditioner for it.
    pub fn from_cfg(cfg: &EncoderCfg, ports: &mut PortRegistry) -> Result<Self, PortError> {
        let port = ports.take_encoder(&cfg.port)?;

        Ok(Self::new(port, cfg.reversed))
    }

    pub fn is_configured(&self) -> bool {
        self.port.is_some()
    }

    /// Forget all history, the next sample will be treated as the first.
    pub fn reset(&mut self) {
        self.last_position = None;
        self.vel_history = [0.0; HISTORY_LEN];
        self.history_idx = 0;
    }

    /// Read the encoder port and condition the reading.
    ///
    /// `dt` is the time since the previous call in seconds.
    pub fn update(&mut self, dt: f64) -> EncoderSample {
        let reading = match self.port {
            Some(ref mut p) => p.read(),
            None => return EncoderSample::default(),
        };

        self.process(reading.position, reading.velocity, dt)
    }

    /// Condition a raw position and velocity hint.
    pub fn process(&mut self, raw_position: i32, raw_velocity: i32, dt: f64) -> EncoderSample {
        let (position, hint) = if self.reversed {
            (raw_position.wrapping_neg(), raw_velocity.wrapping_neg())
        }
        else {
            (raw_position, raw_velocity)
        };

        let last_position = match self.last_position {
            Some(p) => p,
            None => {
                // Seed the history with the sign extended hint
                let seed = (hint as i16) as f64;
                self.vel_history = [seed; HISTORY_LEN];
                self.history_idx = 0;
                self.last_position = Some(position);

                return EncoderSample {
                    position,
                    delta: 0,
                    velocity: seed,
                };
            }
        };

        let delta = position.wrapping_sub(last_position);
        self.last_position = Some(position);

        if dt.is_finite() && dt > 0.0 {
            self.vel_history[self.history_idx] = delta as f64 / dt;
            self.history_idx = (self.history_idx + 1) % HISTORY_LEN;
        }

        let estimate = median3(self.vel_history[0], self.vel_history[1], self.vel_history[2]);

        EncoderSample {
            position,
            delta,
            velocity: inverse_overflow(hint, estimate),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Mask the hint to its native width then shift it by the multiple of the correction quantum
/// which brings it closest to `estimate`.
fn inverse_overflow(hint: i32, estimate: f64) -> f64 {
    let real = (hint as i64 & VEL_HINT_MASK) as f64;

    real + ((estimate - real) / VEL_CORRECTION_QUANTUM).round() * VEL_CORRECTION_QUANTUM
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
