use crate::error::Result;
use crate::image::{PixelBuffer, BYTES_PER_PIXEL};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

// Below this spread between the largest and smallest channel a pixel counts
// as gray, with hue 0.
const ACHROMATIC_EPSILON: f32 = 1e-6;

const DEFAULT_LOW_HUE: f32 = 15.0;
const DEFAULT_HIGH_HUE: f32 = 45.0;
const DEFAULT_TARGET_HUE: f32 = 195.0;

//===========================================================================//

/// Which hues get recolored, and to what.
///
/// Hues are in degrees.  A pixel whose hue `h` satisfies
/// `low_hue <= h <= high_hue` has its hue replaced by `target_hue`, keeping
/// its saturation and lightness.  The default band is orange (15°–45°)
/// mapped to deep sky blue (195°).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct TintBand {
    low_hue: f32,
    high_hue: f32,
    target_hue: f32,
}

impl Default for TintBand {
    fn default() -> TintBand {
        TintBand {
            low_hue: DEFAULT_LOW_HUE,
            high_hue: DEFAULT_HIGH_HUE,
            target_hue: DEFAULT_TARGET_HUE,
        }
    }
}

impl TintBand {
    /// Creates a band.  Every hue must lie in `[0, 360)` and `low_hue` must
    /// not exceed `high_hue`.
    pub fn new(
        low_hue: f32,
        high_hue: f32,
        target_hue: f32,
    ) -> Result<TintBand> {
        for (name, hue) in
            [("low", low_hue), ("high", high_hue), ("target", target_hue)]
        {
            if !(0.0..360.0).contains(&hue) {
                config_error!(
                    "Invalid {} hue (was {}, but must be in [0, 360))",
                    name,
                    hue
                );
            }
        }
        if low_hue > high_hue {
            config_error!(
                "Empty hue band (low hue {} is above high hue {})",
                low_hue,
                high_hue
            );
        }
        Ok(TintBand { low_hue, high_hue, target_hue })
    }

    /// Returns the lower (inclusive) bound of the recolored hues.
    pub fn low_hue(&self) -> f32 {
        self.low_hue
    }

    /// Returns the upper (inclusive) bound of the recolored hues.
    pub fn high_hue(&self) -> f32 {
        self.high_hue
    }

    /// Returns the hue that recolored pixels receive.
    pub fn target_hue(&self) -> f32 {
        self.target_hue
    }

    /// Returns true if a pixel of this hue gets recolored.  Both bounds are
    /// part of the band.
    pub fn contains(&self, hue: f32) -> bool {
        !(hue < self.low_hue || hue > self.high_hue)
    }

    /// Recolors every in-band pixel of `image`.  Alpha is never changed and
    /// fully transparent pixels are not touched at all.
    pub fn apply(&self, image: &mut PixelBuffer) {
        for y in 0..image.height() {
            for px in image.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL) {
                if px[3] == 0 {
                    continue;
                }
                if let Some([blue, green, red]) =
                    self.remap(px[0], px[1], px[2])
                {
                    px[0] = blue;
                    px[1] = green;
                    px[2] = red;
                }
            }
        }
    }

    /// Returns the new `[blue, green, red]` for an in-band color, or `None`
    /// if the color is left alone.
    fn remap(&self, blue: u8, green: u8, red: u8) -> Option<[u8; 3]> {
        let hsl = Hsl::from_rgb(red, green, blue);
        if !self.contains(hsl.hue) {
            return None;
        }
        let (red, green, blue) =
            Hsl { hue: self.target_hue, ..hsl }.to_rgb();
        Some([blue, green, red])
    }
}

//===========================================================================//

/// Hue in degrees, saturation and lightness in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hsl {
    pub(crate) hue: f32,
    pub(crate) saturation: f32,
    pub(crate) lightness: f32,
}

impl Hsl {
    pub(crate) fn from_rgb(red: u8, green: u8, blue: u8) -> Hsl {
        let r = red as f32 / 255.0;
        let g = green as f32 / 255.0;
        let b = blue as f32 / 255.0;
        let maxc = r.max(g.max(b));
        let minc = r.min(g.min(b));
        let lightness = (maxc + minc) * 0.5;
        let d = maxc - minc;
        if d <= ACHROMATIC_EPSILON {
            return Hsl { hue: 0.0, saturation: 0.0, lightness };
        }
        let saturation = d / (1.0 - (2.0 * lightness - 1.0).abs());
        let sector = if maxc == r {
            ((g - b) / d) % 6.0
        } else if maxc == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        let mut hue = sector * 60.0;
        if hue < 0.0 {
            hue += 360.0;
        }
        Hsl { hue, saturation, lightness }
    }

    /// Converts back to 8-bit channels, truncating after clamping.
    pub(crate) fn to_rgb(self) -> (u8, u8, u8) {
        let Hsl { hue, saturation, lightness } = self;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = lightness - c / 2.0;
        let (r, g, b) = if hue < 60.0 {
            (c, x, 0.0)
        } else if hue < 120.0 {
            (x, c, 0.0)
        } else if hue < 180.0 {
            (0.0, c, x)
        } else if hue < 240.0 {
            (0.0, x, c)
        } else if hue < 300.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };
        (to_channel(r + m), to_channel(g + m), to_channel(b + m))
    }
}

fn to_channel(value: f32) -> u8 {
    (value * 255.0).clamp(0.0, 255.0) as u8
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Hsl, TintBand};
    use crate::error::RebuildError;
    use crate::image::PixelBuffer;

    fn tint_one(bgra: [u8; 4]) -> [u8; 4] {
        let mut image = PixelBuffer::new(1, 1).unwrap();
        image.set_pixel(0, 0, bgra);
        TintBand::default().apply(&mut image);
        image.pixel(0, 0)
    }

    #[test]
    fn orange_becomes_deep_sky_blue() {
        assert_eq!(tint_one([0, 128, 255, 255]), [255, 191, 0, 255]);
    }

    #[test]
    fn alpha_is_preserved() {
        assert_eq!(tint_one([0, 128, 255, 77]), [255, 191, 0, 77]);
    }

    #[test]
    fn transparent_pixels_are_untouched() {
        assert_eq!(tint_one([0, 128, 255, 0]), [0, 128, 255, 0]);
    }

    #[test]
    fn out_of_band_hues_are_untouched() {
        // Pure red (0°), green (120°), and blue (240°).
        assert_eq!(tint_one([0, 0, 255, 255]), [0, 0, 255, 255]);
        assert_eq!(tint_one([0, 255, 0, 255]), [0, 255, 0, 255]);
        assert_eq!(tint_one([255, 0, 0, 255]), [255, 0, 0, 255]);
    }

    #[test]
    fn grays_are_untouched() {
        for value in [0, 1, 128, 254, 255] {
            let px = [value, value, value, 255];
            assert_eq!(tint_one(px), px);
        }
    }

    #[test]
    fn band_edges_are_inclusive() {
        let band = TintBand::default();
        assert!(band.contains(15.0));
        assert!(band.contains(45.0));
        assert!(!band.contains(14.999));
        assert!(!band.contains(45.001));
    }

    #[test]
    fn colors_just_inside_and_outside_the_band() {
        // Green 64 gives a hue just above 15°, green 63 just below.
        assert_ne!(tint_one([0, 64, 255, 255]), [0, 64, 255, 255]);
        assert_eq!(tint_one([0, 63, 255, 255]), [0, 63, 255, 255]);
        // Green 191 gives a hue just below 45°, green 192 just above.
        assert_ne!(tint_one([0, 191, 255, 255]), [0, 191, 255, 255]);
        assert_eq!(tint_one([0, 192, 255, 255]), [0, 192, 255, 255]);
    }

    #[test]
    fn recolor_keeps_saturation_and_lightness() {
        let before = Hsl::from_rgb(200, 120, 60);
        assert!(before.hue >= 15.0 && before.hue <= 45.0);
        let [blue, green, red, _] = tint_one([60, 120, 200, 255]);
        let after = Hsl::from_rgb(red, green, blue);
        assert!((after.hue - 195.0).abs() < 1.5, "hue {}", after.hue);
        assert!((after.saturation - before.saturation).abs() < 0.02);
        assert!((after.lightness - before.lightness).abs() < 0.01);
    }

    #[test]
    fn tinting_twice_is_a_fixed_point() {
        let once = tint_one([40, 150, 230, 255]);
        assert_eq!(tint_one(once), once);
    }

    #[test]
    fn hue_of_primary_colors() {
        assert_eq!(Hsl::from_rgb(255, 0, 0).hue, 0.0);
        assert_eq!(Hsl::from_rgb(0, 255, 0).hue, 120.0);
        assert_eq!(Hsl::from_rgb(0, 0, 255).hue, 240.0);
        assert_eq!(Hsl::from_rgb(255, 0, 255).hue, 300.0);
    }

    #[test]
    fn custom_band() {
        let band = TintBand::new(100.0, 140.0, 0.0).unwrap();
        let mut image = PixelBuffer::new(2, 1).unwrap();
        image.set_pixel(0, 0, [0, 255, 0, 255]);
        image.set_pixel(1, 0, [0, 128, 255, 255]);
        band.apply(&mut image);
        assert_eq!(image.pixel(0, 0), [0, 0, 255, 255]);
        assert_eq!(image.pixel(1, 0), [0, 128, 255, 255]);
    }

    #[test]
    fn invalid_bands_are_rejected() {
        assert!(matches!(
            TintBand::new(45.0, 15.0, 195.0),
            Err(RebuildError::Config(_))
        ));
        assert!(matches!(
            TintBand::new(15.0, 45.0, 360.0),
            Err(RebuildError::Config(_))
        ));
        assert!(matches!(
            TintBand::new(-1.0, 45.0, 195.0),
            Err(RebuildError::Config(_))
        ));
    }
}

//===========================================================================//
