//! ARGB8888 colour helpers.
//!
//! Colours are packed as `0xAARRGGBB` in a `u32`, matching the streaming
//! texture format the window presents.

/// Frame background (AliceBlue).
pub const BACKGROUND: u32 = 0xFFF0F8FF;

/// Alpha of every shaded face.
pub const FACE_ALPHA: u8 = 225;

#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[inline]
pub fn unpack_argb(color: u32) -> (u8, u8, u8, u8) {
    (
        (color >> 24) as u8,
        (color >> 16) as u8,
        (color >> 8) as u8,
        color as u8,
    )
}

/// A grey with equal channels and the face alpha.
#[inline]
pub fn grey(shade: u8) -> u32 {
    pack_argb(FACE_ALPHA, shade, shade, shade)
}

/// Composite `src` over `dst` (source-over). The result keeps `dst`'s alpha,
/// so an opaque surface stays opaque.
#[inline]
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let (sa, sr, sg, sb) = unpack_argb(src);
    match sa {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let (da, dr, dg, db) = unpack_argb(dst);
    let mix = |s: u8, d: u8| -> u8 {
        let s = s as u32;
        let d = d as u32;
        let a = sa as u32;
        // Rounded integer lerp: (s * a + d * (255 - a)) / 255
        ((s * a + d * (255 - a) + 127) / 255) as u8
    };
    pack_argb(da, mix(sr, dr), mix(sg, dg), mix(sb, db))
}

/// Convert a packed ARGB colour to RGBA bytes.
#[inline]
pub fn to_rgba(color: u32) -> [u8; 4] {
    let (a, r, g, b) = unpack_argb(color);
    [r, g, b, a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip() {
        let c = pack_argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c, 0x12345678);
        assert_eq!(unpack_argb(c), (0x12, 0x34, 0x56, 0x78));
        assert_eq!(to_rgba(c), [0x34, 0x56, 0x78, 0x12]);
    }

    #[test]
    fn test_blend_extremes() {
        let dst = BACKGROUND;
        assert_eq!(blend_over(0xFF102030, dst), 0xFF102030);
        assert_eq!(blend_over(0x00102030, dst), dst);
    }

    #[test]
    fn test_blend_face_over_background() {
        // black at alpha 225 over AliceBlue: 240 * 30 / 255 = 28.2 -> 28
        let out = blend_over(grey(0), BACKGROUND);
        let (a, r, g, b) = unpack_argb(out);
        assert_eq!(a, 255);
        assert_eq!(r, 28);
        assert_eq!(g, 29);
        assert_eq!(b, 30);
    }
}
