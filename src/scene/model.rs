use crate::{
    animation::behavior::{BehaviorSpec, compile_behaviors},
    animation::motion::MotionParams,
    assets::sprite::SpriteOps,
    foundation::core::VerticalAnchor,
    foundation::error::{DioramaError, DioramaResult},
};

/// A parsed scene description: an ordered list of layer entries.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneDoc {
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
}

/// One layer entry of the scene description.
///
/// Everything beyond `name`/`sprite` is optional; absent fields take the
/// documented defaults. Replaced wholesale on reload, never mutated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerSpec {
    pub name: String,
    /// Sprite image path, resolved relative to the scene file.
    pub sprite: String,

    /// Draw/update order, ascending (lower drawn first).
    #[serde(default)]
    pub z_depth: i32,

    /// Base vertical anchor as a fraction of screen height.
    #[serde(default = "default_vertical_percent")]
    pub vertical_percent: f64,
    #[serde(default)]
    pub vertical_anchor: VerticalAnchor,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,

    /// Scale to cover the whole screen, centered; ignores all positioning.
    #[serde(default)]
    pub is_background: bool,
    /// Repeat edge-to-edge to fill the screen width.
    #[serde(default)]
    pub tile_horizontal: bool,
    /// Pixels cropped from each horizontal edge (seam removal).
    #[serde(default)]
    pub tile_border: u32,

    #[serde(default)]
    pub height_scale: Option<f64>,
    #[serde(default)]
    pub target_height: Option<f64>,
    #[serde(default)]
    pub fill_down: bool,

    #[serde(default)]
    pub bob_amplitude: f64,
    #[serde(default)]
    pub bob_frequency: f64,
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f64,
    #[serde(default)]
    pub vertical_drift: f64,
    #[serde(default)]
    pub horizontal_drift: f64,
    #[serde(default)]
    pub drift_cap_y: Option<f64>,
    #[serde(default)]
    pub scale_drift: f64,
    #[serde(default = "default_cap_multiplier")]
    pub scale_drift_multiplier_after_cap: f64,
    #[serde(default)]
    pub twinkle_min_scale: f64,
    #[serde(default = "default_twinkle_amplitude")]
    pub twinkle_amplitude: f64,
    #[serde(default = "default_twinkle_frequency")]
    pub twinkle_frequency: f64,

    #[serde(default)]
    pub environmental_reaction: Option<EnvironmentalReaction>,

    /// Declarative behavior list; applied after the flat fields above.
    #[serde(default)]
    pub behaviors: Vec<BehaviorSpec>,
}

/// Couples a layer's tilt/position to another named layer's surface.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentalReaction {
    pub target_layer: String,
    #[serde(default = "default_max_tilt")]
    pub max_tilt_angle: f64,
    #[serde(default)]
    pub vertical_follow_factor: f64,
    #[serde(default = "default_hull_length")]
    pub hull_length_factor: f64,
}

fn default_vertical_percent() -> f64 {
    0.5
}

fn default_scroll_speed() -> f64 {
    1.0
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

fn default_max_tilt() -> f64 {
    25.0
}

fn default_hull_length() -> f64 {
    1.0
}

impl SceneDoc {
    /// Parse and validate a scene from JSON text.
    pub fn from_json(text: &str) -> DioramaResult<Self> {
        let doc: SceneDoc = serde_json::from_str(text)
            .map_err(|e| DioramaError::scene(format!("parse scene JSON: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn validate(&self) -> DioramaResult<()> {
        let mut seen = std::collections::HashSet::new();
        for layer in &self.layers {
            layer.validate()?;
            if !seen.insert(layer.name.as_str()) {
                return Err(DioramaError::scene(format!(
                    "duplicate layer name '{}'",
                    layer.name
                )));
            }
        }
        Ok(())
    }

    /// Layers in draw order: stable sort, ascending `z_depth`.
    pub fn sorted_layers(&self) -> Vec<LayerSpec> {
        let mut layers = self.layers.clone();
        layers.sort_by_key(|l| l.z_depth);
        layers
    }
}

impl LayerSpec {
    /// Minimal spec with defaults for everything optional.
    pub fn new(name: impl Into<String>, sprite: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sprite: sprite.into(),
            z_depth: 0,
            vertical_percent: default_vertical_percent(),
            vertical_anchor: VerticalAnchor::default(),
            x_offset: 0.0,
            y_offset: 0.0,
            is_background: false,
            tile_horizontal: false,
            tile_border: 0,
            height_scale: None,
            target_height: None,
            fill_down: false,
            bob_amplitude: 0.0,
            bob_frequency: 0.0,
            scroll_speed: default_scroll_speed(),
            vertical_drift: 0.0,
            horizontal_drift: 0.0,
            drift_cap_y: None,
            scale_drift: 0.0,
            scale_drift_multiplier_after_cap: default_cap_multiplier(),
            twinkle_min_scale: 0.0,
            twinkle_amplitude: default_twinkle_amplitude(),
            twinkle_frequency: default_twinkle_frequency(),
            environmental_reaction: None,
            behaviors: Vec::new(),
        }
    }

    pub fn validate(&self) -> DioramaResult<()> {
        if self.name.trim().is_empty() {
            return Err(DioramaError::scene("layer name must be non-empty"));
        }
        if self.sprite.trim().is_empty() {
            return Err(DioramaError::scene(format!(
                "layer '{}' must name a sprite",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.vertical_percent) {
            return Err(DioramaError::scene(format!(
                "layer '{}': vertical_percent must be in [0, 1]",
                self.name
            )));
        }
        if let Some(h) = self.height_scale
            && h <= 0.0
        {
            return Err(DioramaError::scene(format!(
                "layer '{}': height_scale must be > 0",
                self.name
            )));
        }
        if let Some(h) = self.target_height
            && h <= 0.0
        {
            return Err(DioramaError::scene(format!(
                "layer '{}': target_height must be > 0",
                self.name
            )));
        }
        if let Some(reaction) = &self.environmental_reaction {
            if reaction.target_layer == self.name {
                return Err(DioramaError::scene(format!(
                    "layer '{}' cannot react to itself",
                    self.name
                )));
            }
            if reaction.max_tilt_angle < 0.0 {
                return Err(DioramaError::scene(format!(
                    "layer '{}': max_tilt_angle must be >= 0",
                    self.name
                )));
            }
            if !(0.0..=1.0).contains(&reaction.vertical_follow_factor) {
                return Err(DioramaError::scene(format!(
                    "layer '{}': vertical_follow_factor must be in [0, 1]",
                    self.name
                )));
            }
            if reaction.hull_length_factor <= 0.0 {
                return Err(DioramaError::scene(format!(
                    "layer '{}': hull_length_factor must be > 0",
                    self.name
                )));
            }
        }
        for b in &self.behaviors {
            b.validate()?;
        }
        Ok(())
    }

    /// Compile both motion front-ends into the engine aggregate.
    pub fn motion_params(&self) -> DioramaResult<MotionParams> {
        let mut params = MotionParams {
            bob_amplitude: self.bob_amplitude,
            bob_frequency: self.bob_frequency,
            scroll_speed: self.scroll_speed,
            vertical_drift: self.vertical_drift,
            horizontal_drift: self.horizontal_drift,
            drift_cap_y: self.drift_cap_y,
            scale_drift: self.scale_drift,
            cap_scale_multiplier: self.scale_drift_multiplier_after_cap,
            twinkle_min_scale: self.twinkle_min_scale,
            twinkle_amplitude: self.twinkle_amplitude,
            twinkle_frequency: self.twinkle_frequency,
            twinkle_seed: self.x_offset,
            ..MotionParams::default()
        };
        compile_behaviors(&self.behaviors, &mut params)?;
        Ok(params)
    }

    pub fn sprite_ops(&self) -> SpriteOps {
        SpriteOps {
            tile_border: self.tile_border,
            height_scale: self.height_scale,
            target_height: self.target_height,
            fill_down: self.fill_down,
        }
    }
}
