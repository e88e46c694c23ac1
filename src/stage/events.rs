/// Boundary/transition events surfaced by the stage.
///
/// Returned from `Stage::tick` for machine consumption and mirrored to the
/// `tracing` stream for humans; a collaborator persists or displays them.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StageEvent {
    /// A drifting layer's vertical travel hit its configured cap.
    HeightCapReached {
        layer: String,
        elapsed: f64,
        y: f64,
        scale: f64,
    },
    /// A shrinking layer crossed its twinkle threshold and froze.
    StarIgnited {
        layer: String,
        elapsed: f64,
        y: f64,
        scale: f64,
    },
    /// A sampled target surface flipped from rising to falling.
    Peak {
        target: String,
        reactor: String,
        elapsed: f64,
        y: f64,
        tilt_deg: f64,
    },
    /// A sampled target surface flipped from falling to rising.
    Valley {
        target: String,
        reactor: String,
        elapsed: f64,
        y: f64,
        tilt_deg: f64,
    },
}

impl StageEvent {
    pub(crate) fn log(&self) {
        match self {
            Self::HeightCapReached {
                layer,
                elapsed,
                y,
                scale,
            } => {
                tracing::info!(
                    layer = %layer,
                    elapsed = *elapsed,
                    y = *y,
                    scale = *scale,
                    "height cap reached"
                );
            }
            Self::StarIgnited {
                layer,
                elapsed,
                y,
                scale,
            } => {
                tracing::info!(
                    layer = %layer,
                    elapsed = *elapsed,
                    y = *y,
                    scale = *scale,
                    "star ignited"
                );
            }
            Self::Peak {
                target,
                reactor,
                elapsed,
                y,
                tilt_deg,
            } => {
                tracing::info!(
                    target_layer = %target,
                    reactor = %reactor,
                    elapsed = *elapsed,
                    y = *y,
                    tilt_deg = *tilt_deg,
                    "peak detected"
                );
            }
            Self::Valley {
                target,
                reactor,
                elapsed,
                y,
                tilt_deg,
            } => {
                tracing::info!(
                    target_layer = %target,
                    reactor = %reactor,
                    elapsed = *elapsed,
                    y = *y,
                    tilt_deg = *tilt_deg,
                    "valley detected"
                );
            }
        }
    }
}
