use crate::colors::ColorValue;

/// Pixel offset into a displayed image, origin top-left.
///
/// Signed because pointer offsets can land a pixel outside the element
/// (e.g. `-1` on the left border); those are rejected by [`sample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Unsigned position if the coordinate lies in `[0, width) x [0, height)`.
    pub fn within(self, width: u32, height: u32) -> Option<(u32, u32)> {
        let x = u32::try_from(self.x).ok()?;
        let y = u32::try_from(self.y).ok()?;
        (x < width && y < height).then_some((x, y))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    #[error("image source unavailable: {0}")]
    SourceUnavailable(String),
}

impl SampleError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable(reason.into())
    }
}

/// Read access to a bitmap addressed in the same space as input coordinates.
pub trait PixelSource {
    /// Width and height in pixels. Fails when the bitmap cannot be read at all.
    fn dimensions(&self) -> Result<(u32, u32), SampleError>;

    /// RGBA at an in-bounds position. Callers go through [`sample`], which
    /// has already checked the bounds.
    fn read_rgba(&self, x: u32, y: u32) -> Result<[u8; 4], SampleError>;
}

impl<P: PixelSource + ?Sized> PixelSource for &P {
    fn dimensions(&self) -> Result<(u32, u32), SampleError> {
        (**self).dimensions()
    }

    fn read_rgba(&self, x: u32, y: u32) -> Result<[u8; 4], SampleError> {
        (**self).read_rgba(x, y)
    }
}

/// Color of a single pixel.
pub fn sample<P: PixelSource + ?Sized>(
    source: &P,
    coord: PixelCoord,
) -> Result<ColorValue, SampleError> {
    let (width, height) = source.dimensions()?;
    let (x, y) = coord.within(width, height).ok_or(SampleError::OutOfBounds {
        x: coord.x,
        y: coord.y,
        width,
        height,
    })?;
    source.read_rgba(x, y).map(ColorValue::from_rgba)
}

/// Map an in-bounds pixel of an image shown at size `from` onto the same image
/// stored at size `to`. Positions scale proportionally and never leave `to`.
pub fn rescale(x: u32, y: u32, from: (u32, u32), to: (u32, u32)) -> (u32, u32) {
    let axis = |v: u32, from: u32, to: u32| -> u32 {
        if from == 0 || to == 0 {
            return 0;
        }
        ((v as u64 * to as u64) / from as u64).min(to as u64 - 1) as u32
    };
    (axis(x, from.0, to.0), axis(y, from.1, to.1))
}

/// Load state of an overlay image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSlot<P> {
    #[default]
    Loading,
    Ready(P),
    Unavailable(String),
}

impl<P: PixelSource> PixelSource for ImageSlot<P> {
    fn dimensions(&self) -> Result<(u32, u32), SampleError> {
        match self {
            Self::Loading => Err(SampleError::unavailable("image has not finished loading")),
            Self::Ready(source) => source.dimensions(),
            Self::Unavailable(reason) => Err(SampleError::unavailable(reason.clone())),
        }
    }

    fn read_rgba(&self, x: u32, y: u32) -> Result<[u8; 4], SampleError> {
        match self {
            Self::Ready(source) => source.read_rgba(x, y),
            Self::Loading => Err(SampleError::unavailable("image has not finished loading")),
            Self::Unavailable(reason) => Err(SampleError::unavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::RgbaBitmap;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaBitmap {
        RgbaBitmap::solid(width, height, rgba)
    }

    #[test]
    fn solid_image_samples_to_its_hex() {
        let image = solid(4, 3, [255, 0, 16, 255]);
        for y in 0..3 {
            for x in 0..4 {
                let color = sample(&image, PixelCoord::new(x, y)).expect("in bounds");
                assert_eq!(color.to_hex(), "#ff0010");
            }
        }
    }

    #[test]
    fn corners_are_in_bounds() {
        let image = solid(8, 5, [1, 2, 3, 255]);
        assert!(sample(&image, PixelCoord::new(0, 0)).is_ok());
        assert!(sample(&image, PixelCoord::new(7, 4)).is_ok());
    }

    #[test]
    fn just_outside_is_out_of_bounds() {
        let image = solid(8, 5, [1, 2, 3, 255]);
        assert_eq!(
            sample(&image, PixelCoord::new(8, 0)),
            Err(SampleError::OutOfBounds {
                x: 8,
                y: 0,
                width: 8,
                height: 5
            })
        );
        assert!(matches!(
            sample(&image, PixelCoord::new(-1, 2)),
            Err(SampleError::OutOfBounds { x: -1, .. })
        ));
        assert!(matches!(
            sample(&image, PixelCoord::new(0, 5)),
            Err(SampleError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn reads_the_addressed_pixel_not_a_neighbour() {
        let mut image = solid(3, 3, [0, 0, 0, 255]);
        image.put_pixel(2, 1, [0x12, 0x34, 0x56, 0x00]);
        assert_eq!(
            sample(&image, PixelCoord::new(2, 1)).map(|c| c.to_hex()),
            Ok("#123456".to_string())
        );
        assert_eq!(
            sample(&image, PixelCoord::new(1, 2)).map(|c| c.to_hex()),
            Ok("#000000".to_string())
        );
    }

    #[test]
    fn loading_slot_is_unavailable_even_for_origin() {
        let slot: ImageSlot<RgbaBitmap> = ImageSlot::Loading;
        assert!(matches!(
            sample(&slot, PixelCoord::new(0, 0)),
            Err(SampleError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn failed_slot_carries_its_reason() {
        let slot: ImageSlot<RgbaBitmap> = ImageSlot::Unavailable("tainted canvas".into());
        assert_eq!(
            sample(&slot, PixelCoord::new(0, 0)),
            Err(SampleError::SourceUnavailable("tainted canvas".into()))
        );
    }

    #[test]
    fn ready_slot_delegates() {
        let slot = ImageSlot::Ready(solid(2, 2, [9, 8, 7, 255]));
        assert_eq!(
            sample(&slot, PixelCoord::new(1, 1)),
            Ok(ColorValue::new(9, 8, 7))
        );
    }

    #[test]
    fn within_handles_extremes() {
        assert_eq!(PixelCoord::new(i32::MIN, 0).within(10, 10), None);
        assert_eq!(PixelCoord::new(i32::MAX, 0).within(u32::MAX, 10), Some((i32::MAX as u32, 0)));
        assert_eq!(PixelCoord::new(0, 0).within(0, 0), None);
    }

    #[test]
    fn rescale_keeps_same_size_positions() {
        assert_eq!(rescale(0, 0, (268, 312), (268, 312)), (0, 0));
        assert_eq!(rescale(267, 311, (268, 312), (268, 312)), (267, 311));
    }

    #[test]
    fn rescale_maps_a_zoomed_in_overlay_onto_the_stored_image() {
        // Overlay drawn at 8600x10002 on screen, image stored at 1072x1248.
        let shown = (8600, 10002);
        let stored = (1072, 1248);
        assert_eq!(rescale(0, 0, shown, stored), (0, 0));
        assert_eq!(rescale(4300, 5001, shown, stored), (536, 624));
        assert_eq!(rescale(8599, 10001, shown, stored), (1071, 1247));
    }

    #[test]
    fn rescale_spreads_a_zoomed_out_overlay_across_the_stored_image() {
        let shown = (268, 312);
        let stored = (1072, 1248);
        assert_eq!(rescale(1, 1, shown, stored), (4, 4));
        assert_eq!(rescale(267, 311, shown, stored), (1068, 1244));
    }

    #[test]
    fn rescale_tolerates_empty_sizes() {
        assert_eq!(rescale(5, 5, (0, 0), (10, 10)), (0, 0));
        assert_eq!(rescale(5, 5, (10, 10), (0, 0)), (0, 0));
    }
}
