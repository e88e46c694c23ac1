use kurbo::{Affine, Point};

use crate::{
    assets::sprite::PreparedSprite,
    foundation::core::{Rgba8Premul, Screen},
    render::composite,
};

/// CPU destination surface: row-major premultiplied RGBA8.
///
/// The stage composites every layer into one of these per frame; what
/// happens to the pixels afterwards (window present, PNG dump, encoder) is
/// the caller's business.
#[derive(Clone, Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(screen: Screen) -> Self {
        Self {
            width: screen.width,
            height: screen.height,
            data: vec![0; (screen.width as usize) * (screen.height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Pixel at `(x, y)`, or transparent black outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Composite `sprite` under `transform` (sprite-local px -> surface px)
    /// with nearest-neighbour sampling.
    pub fn blit_affine(&mut self, sprite: &PreparedSprite, transform: Affine, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let det = transform.determinant();
        if det == 0.0 || !det.is_finite() {
            return;
        }
        let inverse = transform.inverse();

        let (sw, sh) = (sprite.width_f(), sprite.height_f());
        let corners = [
            transform * Point::new(0.0, 0.0),
            transform * Point::new(sw, 0.0),
            transform * Point::new(0.0, sh),
            transform * Point::new(sw, sh),
        ];
        let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = corners
            .iter()
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = corners
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().min(self.width as f64) as u32).min(self.width);
        let y1 = (max_y.ceil().min(self.height as f64) as u32).min(self.height);

        let src = sprite.rgba8_premul.as_slice();
        for py in y0..y1 {
            for px in x0..x1 {
                let p = inverse * Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
                if p.x < 0.0 || p.y < 0.0 || p.x >= sw || p.y >= sh {
                    continue;
                }
                let sx = p.x as u32;
                let sy = p.y as u32;
                let si = ((sy as usize) * (sprite.width as usize) + (sx as usize)) * 4;
                let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
                if s[3] == 0 {
                    continue;
                }
                let di = ((py as usize) * (self.width as usize) + (px as usize)) * 4;
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                let out = composite::over(d, s, opacity);
                self.data[di..di + 4].copy_from_slice(&out);
            }
        }
    }

    /// Scale `sprite` uniformly to fully cover the surface (aspect
    /// preserved), centered, and composite it once.
    pub fn blit_cover(&mut self, sprite: &PreparedSprite, opacity: f32) {
        let (sw, sh) = (sprite.width_f(), sprite.height_f());
        if sw <= 0.0 || sh <= 0.0 {
            return;
        }
        let scale = (f64::from(self.width) / sw).max(f64::from(self.height) / sh);
        let dx = (f64::from(self.width) - sw * scale) / 2.0;
        let dy = (f64::from(self.height) - sh * scale) / 2.0;
        let t = Affine::translate((dx, dy)) * Affine::scale(scale);
        self.blit_affine(sprite, t, opacity);
    }
}
