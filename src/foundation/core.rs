use crate::foundation::error::{DioramaError, DioramaResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Destination surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> DioramaResult<Self> {
        if width == 0 || height == 0 {
            return Err(DioramaError::scene("screen width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn width_f(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f(self) -> f64 {
        f64::from(self.height)
    }
}

/// Which edge of a sprite the vertical anchor point refers to.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    #[default]
    Top,
    Center,
    Bottom,
}

impl VerticalAnchor {
    /// Convert an anchor line at `anchor_y` into the sprite's top edge Y.
    pub fn top_edge(self, anchor_y: f64, sprite_height: f64) -> f64 {
        match self {
            Self::Top => anchor_y,
            Self::Center => anchor_y - sprite_height / 2.0,
            Self::Bottom => anchor_y - sprite_height,
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}
