use anyhow::Context;

use crate::foundation::error::DioramaResult;

/// Decode encoded sprite bytes into straight-alpha RGBA8.
///
/// Premultiplication happens after the load-time sprite ops (crop, prescale,
/// fill-down) so those operate on straight alpha.
pub fn decode_rgba(bytes: &[u8]) -> DioramaResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode sprite from memory")?;
    Ok(dyn_img.to_rgba8())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
