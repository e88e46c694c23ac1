//! Diorama is a layered "paper theatre" scene engine.
//!
//! A scene is a stack of flat sprite cut-outs, each animated by procedural,
//! physics-like motion (bobbing, drifting, scaling, opacity pulsing) and
//! composited back-to-front onto a CPU surface every frame. One reactive
//! behavior crosses layers: a sprite can tilt as if riding the crest of a
//! neighboring "wave" layer.
//!
//! # Frame pipeline
//!
//! 1. **Advance**: [`Stage::tick`] accumulates elapsed time and the fixed
//!    per-frame scroll step, and polls the scene file for hot reload.
//! 2. **Couple**: for every reactive layer, the stage probes its target
//!    layer's surface height around the reactor's horizontal center.
//! 3. **Resolve**: each [`Layer`] maps `(elapsed, scroll, sample)` to a
//!    draw [`Pose`] — position, scale, tilt, opacity.
//! 4. **Composite**: layers draw themselves onto the [`Surface`] in
//!    ascending z-depth order; the caller owns the pixels afterwards.
//!
//! Boundary events (height cap, ignition, peak, valley) are returned from
//! every tick and mirrored to the `tracing` stream.
//!
//! The engine is deliberately single-threaded and synchronous: one writer
//! of simulation state, no suspension points inside a frame, and scene
//! reload is mtime polling rather than filesystem callbacks.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod foundation;
mod render;
mod scene;
mod stage;

pub use animation::behavior::{BehaviorSpec, compile_behaviors};
pub use animation::motion::{MotionParams, MotionSolution, Pulse, PulseWave};
pub use assets::decode::decode_rgba;
pub use assets::sprite::{PreparedSprite, SpriteOps};
pub use foundation::core::{Affine, Point, Rect, Rgba8Premul, Screen, Vec2, VerticalAnchor};
pub use foundation::error::{DioramaError, DioramaResult};
pub use render::composite::over;
pub use render::surface::Surface;
pub use scene::model::{EnvironmentalReaction, LayerSpec, SceneDoc};
pub use scene::watch::SceneFile;
pub use stage::events::StageEvent;
pub use stage::layer::{Layer, Pose, SurfaceSample};
pub use stage::{SCROLL_STEP, Stage};
