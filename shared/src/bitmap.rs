use crate::sampler::{PixelSource, SampleError};

/// Row-major, tightly packed RGBA8 pixels held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaBitmap {
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Overwrite one pixel. Out-of-range writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.data[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

impl PixelSource for RgbaBitmap {
    fn dimensions(&self) -> Result<(u32, u32), SampleError> {
        Ok((self.width, self.height))
    }

    fn read_rgba(&self, x: u32, y: u32) -> Result<[u8; 4], SampleError> {
        let offset = self.offset(x, y).ok_or(SampleError::OutOfBounds {
            x: x as i32,
            y: y as i32,
            width: self.width,
            height: self.height,
        })?;
        let px = &self.data[offset..offset + 4];
        Ok([px[0], px[1], px[2], px[3]])
    }
}
