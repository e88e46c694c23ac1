use std::{collections::HashMap, path::Path, time::SystemTime};

use crate::{
    assets::sprite::PreparedSprite,
    foundation::core::{Rgba8Premul, Screen},
    foundation::error::DioramaResult,
    render::surface::Surface,
    scene::model::SceneDoc,
    scene::watch::SceneFile,
};

pub mod events;
pub mod layer;

use events::StageEvent;
use layer::{Layer, SurfaceSample};

/// Fixed scroll advance per frame. Deliberately independent of `dt`:
/// horizontal travel is tied to frame count, not wall-clock time.
pub const SCROLL_STEP: f64 = 3.0;

/// Direction memory for one sampled target surface.
#[derive(Clone, Copy, Debug, Default)]
struct SurfaceTrace {
    prev_y: Option<f64>,
    /// +1 while the sampled value grows, -1 while it shrinks, 0 unknown.
    dir: i8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flip {
    Peak,
    Valley,
}

/// Feed one sample; report a direction flip exactly on its edge frame.
fn detect_flip(trace: &mut SurfaceTrace, y: f64) -> Option<Flip> {
    let prev_y = trace.prev_y.replace(y);
    let Some(prev_y) = prev_y else {
        return None;
    };

    let dy = y - prev_y;
    let dir: i8 = if dy > 0.0 {
        1
    } else if dy < 0.0 {
        -1
    } else {
        return None;
    };

    let flipped = trace.dir != 0 && trace.dir != dir;
    trace.dir = dir;
    if !flipped {
        return None;
    }
    // The sampled value was growing and now shrinks: a local maximum.
    Some(if dir < 0 { Flip::Peak } else { Flip::Valley })
}

/// The authoritative scene: ordered layers plus the simulation clock.
///
/// One writer, no suspension points: a tick fully computes and composites a
/// frame or the frame does not exist.
pub struct Stage {
    screen: Screen,
    layers: Vec<Layer>,
    scroll: f64,
    elapsed: f64,
    scene: Option<SceneFile>,
    traces: HashMap<String, SurfaceTrace>,
    last_reload: Option<SystemTime>,
}

impl Stage {
    /// Load a scene description from disk and build its layers.
    ///
    /// A layer whose sprite is missing or undecodable is skipped with a
    /// warning; a malformed scene document is fatal on this initial load.
    #[tracing::instrument(skip(path))]
    pub fn load(path: impl AsRef<Path>, screen: Screen) -> DioramaResult<Self> {
        let scene = SceneFile::open(path.as_ref());
        let text = scene.read()?;
        let doc = SceneDoc::from_json(&text)?;
        let layers = build_layers(&doc, scene.root(), screen);
        tracing::info!(
            path = %scene.path().display(),
            layers = layers.len(),
            "scene loaded"
        );
        Ok(Self {
            screen,
            layers,
            scroll: 0.0,
            elapsed: 0.0,
            scene: Some(scene),
            traces: HashMap::new(),
            last_reload: Some(SystemTime::now()),
        })
    }

    /// Assemble a stage from prebuilt layers, without a backing file.
    ///
    /// No hot reload; useful for embedding and tests.
    pub fn from_layers(mut layers: Vec<Layer>, screen: Screen) -> Self {
        layers.sort_by_key(Layer::z_depth);
        Self {
            screen,
            layers,
            scroll: 0.0,
            elapsed: 0.0,
            scene: None,
            traces: HashMap::new(),
            last_reload: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    /// Layers in draw order (ascending z-depth).
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn last_reload(&self) -> Option<SystemTime> {
        self.last_reload
    }

    /// Advance the simulation by `dt` seconds and composite one frame.
    ///
    /// Returns the boundary/transition events that fired this frame, in
    /// layer draw order; each is also mirrored to the log stream.
    pub fn tick(&mut self, dt: f64, frame: &mut Surface) -> DioramaResult<Vec<StageEvent>> {
        self.elapsed += dt.max(0.0);
        self.scroll += SCROLL_STEP;
        self.poll_reload();

        frame.clear(Rgba8Premul::transparent());

        let samples = self.resolve_samples();
        let mut out = Vec::new();

        for i in 0..self.layers.len() {
            let pose = self.layers[i].pose(self.elapsed, self.scroll, self.screen, samples[i]);

            for event in self.layers[i].take_transition_events(self.elapsed, pose) {
                event.log();
                out.push(event);
            }

            if let (Some(sample), Some(target)) = (samples[i], self.layers[i].reaction_target()) {
                let trace = self.traces.entry(target.to_string()).or_default();
                if let Some(flip) = detect_flip(trace, sample.y) {
                    let event = match flip {
                        Flip::Peak => StageEvent::Peak {
                            target: target.to_string(),
                            reactor: self.layers[i].name().to_string(),
                            elapsed: self.elapsed,
                            y: sample.y,
                            tilt_deg: pose.tilt_deg,
                        },
                        Flip::Valley => StageEvent::Valley {
                            target: target.to_string(),
                            reactor: self.layers[i].name().to_string(),
                            elapsed: self.elapsed,
                            y: sample.y,
                            tilt_deg: pose.tilt_deg,
                        },
                    };
                    event.log();
                    out.push(event);
                }
            }

            self.layers[i].remember_pose(pose);
            self.layers[i].draw(frame, self.elapsed, self.scroll, self.screen, pose);
        }

        Ok(out)
    }

    /// Probe each reactive layer's target surface around the reactor's
    /// horizontal center. A missing target simply yields no sample.
    fn resolve_samples(&self) -> Vec<Option<SurfaceSample>> {
        let mut samples = vec![None; self.layers.len()];
        for (i, reactor) in self.layers.iter().enumerate() {
            let Some(target_name) = reactor.reaction_target() else {
                continue;
            };
            let Some(target) = self.layer(target_name) else {
                continue;
            };

            let cx = reactor.horizontal_center(self.elapsed, self.scroll, self.screen);
            let span = reactor.probe_half_span();
            let y = target.surface_y(self.elapsed, self.scroll, cx);
            let y_behind = target.surface_y(self.elapsed, self.scroll, cx - span);
            let y_ahead = target.surface_y(self.elapsed, self.scroll, cx + span);
            samples[i] = Some(SurfaceSample {
                y,
                slope: (y_behind - y_ahead) / (2.0 * span),
            });
        }
        samples
    }

    /// Poll the scene file's mtime; swap in the new scene when it parses,
    /// keep running the last good one when it does not.
    fn poll_reload(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };
        if !scene.poll_changed() {
            return;
        }

        let rebuilt = scene
            .read()
            .and_then(|text| SceneDoc::from_json(&text))
            .map(|doc| build_layers(&doc, scene.root(), self.screen));

        match rebuilt {
            Ok(layers) => {
                self.layers = layers;
                self.scroll = 0.0;
                self.elapsed = 0.0;
                self.traces.clear();
                self.last_reload = Some(SystemTime::now());
                tracing::info!(
                    path = %scene.path().display(),
                    layers = self.layers.len(),
                    "scene reloaded"
                );
            }
            Err(error) => {
                tracing::warn!(%error, "scene reload failed; keeping last good scene");
            }
        }
    }
}

/// Build layers in draw order, skipping entries whose sprite cannot be
/// resolved or decoded.
fn build_layers(doc: &SceneDoc, root: &Path, screen: Screen) -> Vec<Layer> {
    let mut layers = Vec::with_capacity(doc.layers.len());
    for spec in doc.sorted_layers() {
        let sprite_path = root.join(&spec.sprite);
        let built = std::fs::read(&sprite_path)
            .map_err(|e| {
                crate::foundation::error::DioramaError::asset(format!(
                    "read sprite '{}': {e}",
                    sprite_path.display()
                ))
            })
            .and_then(|bytes| PreparedSprite::prepare(&bytes, &spec.sprite_ops(), screen))
            .and_then(|sprite| Layer::build(spec.clone(), sprite, screen));

        match built {
            Ok(layer) => layers.push(layer),
            Err(error) => {
                tracing::warn!(layer = %spec.name, %error, "skipping layer");
            }
        }
    }
    layers
}
