use std::f64::consts::TAU;

use crate::foundation::math::wrap;

/// Scale floor before ignition. Keeps a shrinking sprite strictly positive.
pub(crate) const MIN_SCALE: f64 = 1e-3;

/// Exponent that turns the smooth twinkle sine into brief sharp spikes.
const TWINKLE_SPIKE_EXPONENT: i32 = 10;

/// Aggregated per-layer animation parameters.
///
/// Both scene front-ends — the flat `LayerSpec` fields and the declarative
/// behavior list — compile into this one representation; the engine never
/// looks at the front-ends again after load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Sinusoidal vertical bob, pixels.
    pub bob_amplitude: f64,
    pub bob_frequency: f64,
    /// Parallax multiplier on the global scroll counter.
    pub scroll_speed: f64,
    /// Constant velocities in pixels/second.
    pub vertical_drift: f64,
    pub horizontal_drift: f64,
    /// Hard Y bound for vertical drift (clamped, not reflected).
    pub drift_cap_y: Option<f64>,
    /// Linear rate of change of render scale per second.
    pub scale_drift: f64,
    /// Factor applied to `scale_drift` once the cap time has elapsed.
    pub cap_scale_multiplier: f64,
    /// Scale at/below which the layer freezes and starts twinkling.
    pub twinkle_min_scale: f64,
    /// Depth of the twinkle dip: steady base opacity is `1 - amplitude`.
    pub twinkle_amplitude: f64,
    pub twinkle_frequency: f64,
    /// Per-layer twinkle randomization source (the layer's x offset).
    pub twinkle_seed: f64,
    /// Rotation oscillation, degrees peak and cycles/second.
    pub oscillate_amplitude: f64,
    pub oscillate_frequency: f64,
    /// Optional opacity pulsing.
    pub pulse: Option<Pulse>,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            bob_amplitude: 0.0,
            bob_frequency: 0.0,
            scroll_speed: 1.0,
            vertical_drift: 0.0,
            horizontal_drift: 0.0,
            drift_cap_y: None,
            scale_drift: 0.0,
            cap_scale_multiplier: 1.0,
            twinkle_min_scale: 0.0,
            twinkle_amplitude: 0.17,
            twinkle_frequency: 1.0,
            twinkle_seed: 0.0,
            oscillate_amplitude: 0.0,
            oscillate_frequency: 0.0,
            pulse: None,
        }
    }
}

/// Opacity pulsing parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pulse {
    pub min: f64,
    pub max: f64,
    pub frequency: f64,
    pub wave: PulseWave,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseWave {
    #[default]
    Sine,
}

/// Precomputed phase boundaries of the drift/scale state machine.
///
/// Solved once per load from the layer's resting Y; infinities mean "never".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSolution {
    /// Elapsed time at which unclamped vertical drift first reaches the cap.
    pub time_to_cap: f64,
    /// Elapsed time at which scale crosses the twinkle threshold.
    pub time_to_ignite: f64,
    /// Scale at the moment the cap time elapses (phase 2 starting point).
    pub scale_at_cap: f64,
}

impl MotionParams {
    /// Solve the two-phase scale machine against a resting Y position.
    ///
    /// `rest_y` is the layer's anchored top-edge Y without bob or drift; the
    /// cap time deliberately ignores bob.
    pub fn solve(&self, rest_y: f64) -> MotionSolution {
        let time_to_cap = match self.drift_cap_y {
            Some(cap) if self.vertical_drift != 0.0 => {
                ((cap - rest_y) / self.vertical_drift).max(0.0)
            }
            _ => f64::INFINITY,
        };

        let scale_at_cap = if time_to_cap.is_finite() {
            1.0 + self.scale_drift * time_to_cap
        } else {
            1.0
        };

        let time_to_ignite = self.solve_ignition(time_to_cap, scale_at_cap);

        MotionSolution {
            time_to_cap,
            time_to_ignite,
            scale_at_cap,
        }
    }

    fn solve_ignition(&self, time_to_cap: f64, scale_at_cap: f64) -> f64 {
        let threshold = self.twinkle_min_scale;
        if threshold <= 0.0 {
            return f64::INFINITY;
        }
        if threshold >= 1.0 {
            return 0.0;
        }

        // Phase 1: rate `scale_drift` from scale 1.0.
        if self.scale_drift < 0.0 {
            let t1 = (threshold - 1.0) / self.scale_drift;
            if t1 <= time_to_cap {
                return t1;
            }
        }

        if !time_to_cap.is_finite() {
            return f64::INFINITY;
        }

        // Phase 2: accelerated rate once the cap time has elapsed.
        let rate = self.scale_drift * self.cap_scale_multiplier;
        if rate < 0.0 && scale_at_cap > threshold {
            return time_to_cap + (threshold - scale_at_cap) / rate;
        }
        f64::INFINITY
    }

    /// Effective time driving scale and drifted position.
    ///
    /// Frozen at the ignition boundary: once a layer ignites it stops
    /// drifting and shrinking permanently.
    pub fn physics_time(&self, solution: &MotionSolution, elapsed: f64) -> f64 {
        elapsed.min(solution.time_to_ignite)
    }

    /// Render scale at `elapsed` seconds.
    pub fn scale_at(&self, solution: &MotionSolution, elapsed: f64) -> f64 {
        let t = self.physics_time(solution, elapsed);
        let raw = if t <= solution.time_to_cap {
            1.0 + self.scale_drift * t
        } else {
            let rate = self.scale_drift * self.cap_scale_multiplier;
            solution.scale_at_cap + rate * (t - solution.time_to_cap)
        };
        if elapsed >= solution.time_to_ignite {
            raw.max(self.twinkle_min_scale)
        } else {
            raw.max(MIN_SCALE)
        }
    }

    /// Drift displacement at `elapsed` seconds, before any cap clamp.
    pub fn drift_at(&self, solution: &MotionSolution, elapsed: f64) -> kurbo::Vec2 {
        let t = self.physics_time(solution, elapsed);
        kurbo::Vec2::new(self.horizontal_drift * t, self.vertical_drift * t)
    }

    /// Clamp an absolute Y against the drift cap, honoring drift direction.
    pub fn clamp_to_cap(&self, y: f64) -> f64 {
        match self.drift_cap_y {
            Some(cap) if self.vertical_drift < 0.0 => y.max(cap),
            Some(cap) if self.vertical_drift > 0.0 => y.min(cap),
            _ => y,
        }
    }

    /// Sinusoidal bob offset for a given phase accumulator.
    ///
    /// Zero amplitude or frequency means the effect is inactive.
    pub fn bob_offset(&self, phase: f64) -> f64 {
        if self.bob_amplitude <= 0.0 || self.bob_frequency <= 0.0 {
            return 0.0;
        }
        self.bob_amplitude * (self.bob_frequency * phase).sin()
    }

    /// Rotation oscillation in degrees at `elapsed` seconds.
    pub fn rotation_deg_at(&self, elapsed: f64) -> f64 {
        if self.oscillate_amplitude == 0.0 || self.oscillate_frequency <= 0.0 {
            return 0.0;
        }
        self.oscillate_amplitude * (TAU * self.oscillate_frequency * elapsed).sin()
    }

    /// Layer opacity at `elapsed` seconds: pulse times post-ignition twinkle.
    pub fn opacity_at(&self, solution: &MotionSolution, elapsed: f64) -> f64 {
        let mut opacity = match self.pulse {
            Some(p) => pulse_value(&p, elapsed),
            None => 1.0,
        };
        if elapsed >= solution.time_to_ignite {
            opacity *= self.twinkle_opacity(elapsed);
        }
        opacity.clamp(0.0, 1.0)
    }

    fn twinkle_opacity(&self, elapsed: f64) -> f64 {
        if self.twinkle_amplitude <= 0.0 || self.twinkle_frequency <= 0.0 {
            return 1.0;
        }
        let phase = wrap(self.twinkle_seed, 360.0) / 10.0;
        let rate = 1.0 + wrap(self.twinkle_seed, 10.0) / 20.0;
        let raw = ((elapsed * rate + phase) * self.twinkle_frequency).sin();
        let spike = ((raw + 1.0) / 2.0).powi(TWINKLE_SPIKE_EXPONENT);
        let base = (1.0 - self.twinkle_amplitude).clamp(0.0, 1.0);
        base + (1.0 - base) * spike
    }
}

fn pulse_value(p: &Pulse, elapsed: f64) -> f64 {
    if p.frequency <= 0.0 {
        return 1.0;
    }
    match p.wave {
        PulseWave::Sine => p.min + (p.max - p.min) * ((TAU * p.frequency * elapsed).sin() + 1.0) / 2.0,
    }
}
