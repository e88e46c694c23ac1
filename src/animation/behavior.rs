use crate::{
    animation::motion::{MotionParams, Pulse, PulseWave},
    foundation::error::{DioramaError, DioramaResult},
};

/// One declarative animation behavior.
///
/// Scenes may describe motion either through the flat per-layer fields or
/// through a tagged list of these variants; both compile into the same
/// [`MotionParams`] aggregate, behaviors last (overwriting the fields they
/// name).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorSpec {
    Bob {
        amplitude: f64,
        frequency: f64,
    },
    Drift {
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        cap_y: Option<f64>,
    },
    ScaleDrift {
        rate: f64,
        #[serde(default = "default_cap_multiplier")]
        multiplier_after_cap: f64,
    },
    Twinkle {
        min_scale: f64,
        #[serde(default = "default_twinkle_amplitude")]
        amplitude: f64,
        #[serde(default = "default_twinkle_frequency")]
        frequency: f64,
    },
    Oscillate {
        amplitude: f64,
        frequency: f64,
    },
    Pulse {
        min: f64,
        max: f64,
        frequency: f64,
        #[serde(default)]
        wave: PulseWave,
    },
}

fn default_cap_multiplier() -> f64 {
    1.0
}

fn default_twinkle_amplitude() -> f64 {
    0.17
}

fn default_twinkle_frequency() -> f64 {
    1.0
}

impl BehaviorSpec {
    pub fn validate(&self) -> DioramaResult<()> {
        match *self {
            Self::Bob {
                amplitude,
                frequency,
            } => {
                if amplitude < 0.0 || frequency < 0.0 {
                    return Err(DioramaError::scene(
                        "bob amplitude/frequency must be >= 0",
                    ));
                }
            }
            Self::Drift { .. } | Self::ScaleDrift { .. } | Self::Oscillate { .. } => {}
            Self::Twinkle {
                min_scale,
                amplitude,
                frequency,
            } => {
                if min_scale < 0.0 {
                    return Err(DioramaError::scene("twinkle min_scale must be >= 0"));
                }
                if !(0.0..=1.0).contains(&amplitude) {
                    return Err(DioramaError::scene("twinkle amplitude must be in [0, 1]"));
                }
                if frequency < 0.0 {
                    return Err(DioramaError::scene("twinkle frequency must be >= 0"));
                }
            }
            Self::Pulse { min, max, .. } => {
                if min > max {
                    return Err(DioramaError::scene("pulse min must be <= max"));
                }
                if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) {
                    return Err(DioramaError::scene("pulse min/max must be in [0, 1]"));
                }
            }
        }
        Ok(())
    }

    /// Fold this behavior into the aggregate the engine runs on.
    pub fn apply(&self, params: &mut MotionParams) {
        match *self {
            Self::Bob {
                amplitude,
                frequency,
            } => {
                params.bob_amplitude = amplitude;
                params.bob_frequency = frequency;
            }
            Self::Drift { dx, dy, cap_y } => {
                params.horizontal_drift = dx;
                params.vertical_drift = dy;
                params.drift_cap_y = cap_y;
            }
            Self::ScaleDrift {
                rate,
                multiplier_after_cap,
            } => {
                params.scale_drift = rate;
                params.cap_scale_multiplier = multiplier_after_cap;
            }
            Self::Twinkle {
                min_scale,
                amplitude,
                frequency,
            } => {
                params.twinkle_min_scale = min_scale;
                params.twinkle_amplitude = amplitude;
                params.twinkle_frequency = frequency;
            }
            Self::Oscillate {
                amplitude,
                frequency,
            } => {
                params.oscillate_amplitude = amplitude;
                params.oscillate_frequency = frequency;
            }
            Self::Pulse {
                min,
                max,
                frequency,
                wave,
            } => {
                params.pulse = Some(Pulse {
                    min,
                    max,
                    frequency,
                    wave,
                });
            }
        }
    }
}

/// Compile a behavior list on top of an already-populated aggregate.
pub fn compile_behaviors(
    behaviors: &[BehaviorSpec],
    params: &mut MotionParams,
) -> DioramaResult<()> {
    for b in behaviors {
        b.validate()?;
        b.apply(params);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_json_round_trips() {
        let json = r#"[
            {"kind": "bob", "amplitude": 12.0, "frequency": 0.02},
            {"kind": "oscillate", "amplitude": 10.0, "frequency": 1.0},
            {"kind": "pulse", "min": 0.0, "max": 1.0, "frequency": 1.0}
        ]"#;
        let list: Vec<BehaviorSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 3);
        assert!(matches!(
            list[2],
            BehaviorSpec::Pulse {
                wave: PulseWave::Sine,
                ..
            }
        ));

        let back = serde_json::to_string(&list).unwrap();
        let again: Vec<BehaviorSpec> = serde_json::from_str(&back).unwrap();
        assert_eq!(list, again);
    }

    #[test]
    fn behaviors_overwrite_flat_fields() {
        let mut params = MotionParams {
            bob_amplitude: 3.0,
            bob_frequency: 1.0,
            ..MotionParams::default()
        };
        compile_behaviors(
            &[BehaviorSpec::Bob {
                amplitude: 12.0,
                frequency: 0.5,
            }],
            &mut params,
        )
        .unwrap();
        assert_eq!(params.bob_amplitude, 12.0);
        assert_eq!(params.bob_frequency, 0.5);
    }

    #[test]
    fn drift_behavior_sets_cap() {
        let mut params = MotionParams::default();
        compile_behaviors(
            &[BehaviorSpec::Drift {
                dx: 1.0,
                dy: -8.0,
                cap_y: Some(40.0),
            }],
            &mut params,
        )
        .unwrap();
        assert_eq!(params.horizontal_drift, 1.0);
        assert_eq!(params.vertical_drift, -8.0);
        assert_eq!(params.drift_cap_y, Some(40.0));
    }

    #[test]
    fn pulse_validation_rejects_inverted_range() {
        let bad = BehaviorSpec::Pulse {
            min: 0.8,
            max: 0.2,
            frequency: 1.0,
            wave: PulseWave::Sine,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn twinkle_validation_bounds_amplitude() {
        let bad = BehaviorSpec::Twinkle {
            min_scale: 0.4,
            amplitude: 1.5,
            frequency: 1.0,
        };
        assert!(bad.validate().is_err());
    }
}
