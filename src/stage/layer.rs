use std::f64::consts::PI;

use kurbo::Affine;

use crate::{
    animation::motion::{MotionParams, MotionSolution},
    assets::sprite::PreparedSprite,
    foundation::core::Screen,
    foundation::error::DioramaResult,
    render::surface::Surface,
    scene::model::LayerSpec,
    stage::events::StageEvent,
};

/// Scroll distance over which the crest-tilt effect ramps in from zero.
const TILT_RAMP_SCROLL: f64 = 300.0;

/// Gain applied to the sampled surface slope before clamping.
const TILT_GAIN: f64 = 50.0;

/// Spatial phase contribution per screen pixel when sampling a tiled
/// environment layer at a given x.
const SPATIAL_PHASE_PER_PX: f64 = 0.01;

/// One-shot transition latch, owned by the layer's runtime state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OneShot {
    #[default]
    Armed,
    Fired,
}

impl OneShot {
    /// True exactly once.
    fn fire(&mut self) -> bool {
        std::mem::replace(self, Self::Fired) == Self::Armed
    }
}

#[derive(Debug, Default)]
struct LayerRuntime {
    cap: OneShot,
    ignition: OneShot,
    last_pose: Option<Pose>,
}

/// Fully resolved draw state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Top-left corner of the scaled sprite before rotation.
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Rotation about the sprite center, degrees.
    pub tilt_deg: f64,
    pub opacity: f64,
}

/// Target-surface measurement handed to a reacting layer by the stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Target layer's effective Y at the reactor's horizontal center.
    pub y: f64,
    /// Local slope of the target surface at that point.
    pub slope: f64,
}

/// One animated cut-out: immutable config plus per-load runtime state.
///
/// A layer owns the deterministic mapping from
/// `(elapsed, scroll, optional surface sample)` to a draw transform, and
/// composites itself onto the destination surface.
pub struct Layer {
    spec: LayerSpec,
    params: MotionParams,
    solution: MotionSolution,
    sprite: PreparedSprite,
    /// Anchored top-edge Y at scale 1 with `y_offset` applied; the resting
    /// position all dynamic terms displace from.
    rest_y: f64,
    runtime: LayerRuntime,
}

impl Layer {
    /// Build a layer from its spec and an already-resolved sprite.
    ///
    /// Sprite resolution is the caller's responsibility; a missing asset is
    /// fatal to that layer's construction, never handled here.
    pub fn build(spec: LayerSpec, sprite: PreparedSprite, screen: Screen) -> DioramaResult<Self> {
        spec.validate()?;
        let params = spec.motion_params()?;

        let anchor_y = screen.height_f() * spec.vertical_percent;
        let base_y = spec
            .vertical_anchor
            .top_edge(anchor_y, sprite.base_height_f());
        let rest_y = base_y + spec.y_offset;
        let solution = params.solve(rest_y);

        Ok(Self {
            spec,
            params,
            solution,
            sprite,
            rest_y,
            runtime: LayerRuntime::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn z_depth(&self) -> i32 {
        self.spec.z_depth
    }

    pub fn spec(&self) -> &LayerSpec {
        &self.spec
    }

    /// Reaction target name, when this layer is reactive.
    pub fn reaction_target(&self) -> Option<&str> {
        self.spec
            .environmental_reaction
            .as_ref()
            .map(|r| r.target_layer.as_str())
    }

    /// Half the horizontal distance between the two slope probes.
    pub fn probe_half_span(&self) -> f64 {
        self.spec
            .environmental_reaction
            .as_ref()
            .map_or(2.0, |r| 2.0 * r.hull_length_factor)
    }

    pub fn last_pose(&self) -> Option<Pose> {
        self.runtime.last_pose
    }

    fn scaled_width(&self, scale: f64) -> f64 {
        self.sprite.width_f() * scale
    }

    /// The sprite's effective top-edge Y when sampled at screen `x`.
    ///
    /// Tiled environment layers take a spatial phase so the surface
    /// undulates across the screen; everything else bobs uniformly.
    pub fn surface_y(&self, elapsed: f64, scroll: f64, x: f64) -> f64 {
        let phase = if self.spec.tile_horizontal {
            scroll * self.params.scroll_speed + x * SPATIAL_PHASE_PER_PX
        } else {
            scroll
        };
        let drift = self.params.drift_at(&self.solution, elapsed);
        self.params
            .clamp_to_cap(self.rest_y + drift.y + self.params.bob_offset(phase))
    }

    /// Horizontal center of the sprite as currently drawn.
    pub fn horizontal_center(&self, elapsed: f64, scroll: f64, screen: Screen) -> f64 {
        let scale = self.params.scale_at(&self.solution, elapsed);
        let w = self.scaled_width(scale);
        self.wrapped_x(elapsed, scroll, screen, w) + w / 2.0
    }

    fn wrapped_x(&self, elapsed: f64, scroll: f64, screen: Screen, scaled_w: f64) -> f64 {
        let t = self.params.physics_time(&self.solution, elapsed);
        let travel =
            scroll * self.params.scroll_speed + self.spec.x_offset + self.params.horizontal_drift * t;
        let period = screen.width_f() + scaled_w;
        if period <= 0.0 {
            return 0.0;
        }
        travel.rem_euclid(period) - scaled_w
    }

    /// Resolve this frame's draw state.
    pub fn pose(
        &self,
        elapsed: f64,
        scroll: f64,
        screen: Screen,
        env: Option<SurfaceSample>,
    ) -> Pose {
        let scale = self.params.scale_at(&self.solution, elapsed);
        let drift = self.params.drift_at(&self.solution, elapsed);

        let bob = self.params.bob_offset(scroll);
        let mut y = self.params.clamp_to_cap(self.rest_y + bob + drift.y);
        let x = self.wrapped_x(elapsed, scroll, screen, self.scaled_width(scale));

        let mut tilt_deg = self.params.rotation_deg_at(elapsed);
        if let (Some(reaction), Some(sample)) = (&self.spec.environmental_reaction, env) {
            let ramp = (scroll / TILT_RAMP_SCROLL).min(1.0);
            let crest = (sample.slope.atan() * 180.0 / PI * TILT_GAIN * ramp)
                .clamp(-reaction.max_tilt_angle, reaction.max_tilt_angle);
            tilt_deg += crest;

            let follow = reaction.vertical_follow_factor;
            if follow > 0.0 {
                let drawn_h = self.sprite.base_height_f() * scale;
                y = sample.y - drawn_h * (1.0 - follow);
            }
        }

        Pose {
            x,
            y,
            scale,
            tilt_deg,
            opacity: self.params.opacity_at(&self.solution, elapsed),
        }
    }

    /// Fire any newly crossed transition edges, exactly once per load.
    pub fn take_transition_events(&mut self, elapsed: f64, pose: Pose) -> Vec<StageEvent> {
        let mut events = Vec::new();
        if elapsed >= self.solution.time_to_cap && self.runtime.cap.fire() {
            events.push(StageEvent::HeightCapReached {
                layer: self.spec.name.clone(),
                elapsed,
                y: pose.y,
                scale: pose.scale,
            });
        }
        if elapsed >= self.solution.time_to_ignite && self.runtime.ignition.fire() {
            events.push(StageEvent::StarIgnited {
                layer: self.spec.name.clone(),
                elapsed,
                y: pose.y,
                scale: pose.scale,
            });
        }
        events
    }

    pub(crate) fn remember_pose(&mut self, pose: Pose) {
        self.runtime.last_pose = Some(pose);
    }

    /// Composite this layer onto `surface` for the given frame state.
    pub fn draw(
        &self,
        surface: &mut Surface,
        elapsed: f64,
        scroll: f64,
        screen: Screen,
        pose: Pose,
    ) {
        let opacity = pose.opacity as f32;

        if self.spec.is_background {
            surface.blit_cover(&self.sprite, opacity);
            return;
        }

        if self.spec.tile_horizontal {
            self.draw_tiled(surface, elapsed, scroll, screen, pose);
            return;
        }

        let w = self.sprite.width_f() * pose.scale;
        let h = self.sprite.height_f() * pose.scale;
        let center = kurbo::Vec2::new(w / 2.0, h / 2.0);
        let transform = Affine::translate((pose.x, pose.y))
            * Affine::translate(center)
            * Affine::rotate(pose.tilt_deg.to_radians())
            * Affine::translate(-center)
            * Affine::scale(pose.scale);
        surface.blit_affine(&self.sprite, transform, opacity);
    }

    /// Repeat the sprite across the screen width, each repeat dropped onto
    /// the surface height sampled at its own center.
    fn draw_tiled(
        &self,
        surface: &mut Surface,
        elapsed: f64,
        scroll: f64,
        screen: Screen,
        pose: Pose,
    ) {
        let stride = self.scaled_width(pose.scale);
        if stride < 1.0 {
            return;
        }
        let start =
            -(scroll * self.params.scroll_speed + self.spec.x_offset).rem_euclid(stride) - stride;
        let mut x = start;
        while x < screen.width_f() {
            let y = self.surface_y(elapsed, scroll, x + stride / 2.0);
            let t = Affine::translate((x, y)) * Affine::scale(pose.scale);
            surface.blit_affine(&self.sprite, t, pose.opacity as f32);
            x += stride;
        }
    }
}
