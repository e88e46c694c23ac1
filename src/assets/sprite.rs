use std::sync::Arc;

use crate::{
    assets::decode,
    foundation::core::Screen,
    foundation::error::{DioramaError, DioramaResult},
};

/// Load-time sprite preprocessing requested by a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpriteOps {
    /// Pixels cropped from each horizontal edge before use.
    pub tile_border: u32,
    /// Pre-scale to this fraction of screen height; wins over `target_height`.
    pub height_scale: Option<f64>,
    /// Pre-scale to this absolute pixel height.
    pub target_height: Option<f64>,
    /// Extrude the bottom edge color downward by one screen height.
    pub fill_down: bool,
}

/// Prepared raster sprite in premultiplied RGBA8 form.
///
/// All load-time ops have already been applied; renderers never touch IO.
#[derive(Clone, Debug)]
pub struct PreparedSprite {
    pub width: u32,
    pub height: u32,
    /// Height before fill-down extrusion. Anchor math positions the sprite
    /// by this height so the extruded skirt hangs below the art.
    pub base_height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedSprite {
    /// Decode and prepare sprite bytes for a given screen.
    pub fn prepare(bytes: &[u8], ops: &SpriteOps, screen: Screen) -> DioramaResult<Self> {
        let img = decode::decode_rgba(bytes)?;
        Self::prepare_rgba(img, ops, screen)
    }

    /// Prepare an already-decoded straight-alpha image.
    pub fn prepare_rgba(
        mut img: image::RgbaImage,
        ops: &SpriteOps,
        screen: Screen,
    ) -> DioramaResult<Self> {
        if ops.tile_border > 0 {
            img = crop_horizontal_border(img, ops.tile_border)?;
        }

        let target_height = ops
            .height_scale
            .map(|f| f * screen.height_f())
            .or(ops.target_height);
        if let Some(target_h) = target_height {
            img = prescale_to_height(img, target_h)?;
        }

        let base_height = img.height();
        if ops.fill_down {
            img = extrude_bottom(img, screen.height);
        }

        let (width, height) = img.dimensions();
        let mut rgba8_premul = img.into_raw();
        decode::premultiply_rgba8_in_place(&mut rgba8_premul);

        Ok(Self {
            width,
            height,
            base_height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Build a sprite from raw straight-alpha RGBA8 bytes (no ops applied).
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> DioramaResult<Self> {
        if rgba8.len() != (width as usize) * (height as usize) * 4 {
            return Err(DioramaError::asset(
                "rgba8 byte length does not match dimensions",
            ));
        }
        let mut rgba8_premul = rgba8;
        decode::premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(Self {
            width,
            height,
            base_height: height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Build a uniformly colored sprite. Handy for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DioramaResult<Self> {
        let mut bytes = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as u64) * (height as u64) {
            bytes.extend_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, bytes)
    }

    pub fn width_f(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f(&self) -> f64 {
        f64::from(self.height)
    }

    pub fn base_height_f(&self) -> f64 {
        f64::from(self.base_height)
    }
}

fn crop_horizontal_border(img: image::RgbaImage, border: u32) -> DioramaResult<image::RgbaImage> {
    let (w, h) = img.dimensions();
    if border.saturating_mul(2) >= w {
        return Err(DioramaError::asset(format!(
            "tile_border {border} leaves no pixels of a {w}px wide sprite"
        )));
    }
    Ok(image::imageops::crop_imm(&img, border, 0, w - 2 * border, h).to_image())
}

fn prescale_to_height(img: image::RgbaImage, target_h: f64) -> DioramaResult<image::RgbaImage> {
    let (w, h) = img.dimensions();
    if target_h <= 0.0 || !target_h.is_finite() {
        return Err(DioramaError::asset("prescale target height must be > 0"));
    }
    let factor = target_h / f64::from(h);
    let new_w = ((f64::from(w) * factor).round() as u32).max(1);
    let new_h = (target_h.round() as u32).max(1);
    if (new_w, new_h) == (w, h) {
        return Ok(img);
    }
    Ok(image::imageops::resize(
        &img,
        new_w,
        new_h,
        image::imageops::FilterType::Triangle,
    ))
}

/// Extend the image downward by `extra` rows of the bottom-center color so
/// vertical drift never exposes a gap beneath the art.
fn extrude_bottom(img: image::RgbaImage, extra: u32) -> image::RgbaImage {
    let (w, h) = img.dimensions();
    let fill = *img.get_pixel(w / 2, h - 1);
    let mut out = image::RgbaImage::from_pixel(w, h + extra, fill);
    image::imageops::replace(&mut out, &img, 0, 0);
    out
}
