//! Frame image and object-index buffers.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use super::projection::Pixel;

/// Per-pixel object index for one frame.
///
/// `0` is empty sky; `n` is object index `n - 1`. Row-major, square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    size: u32,
    data: Vec<u32>,
}

impl IndexBuffer {
    /// An all-zero buffer of `size × size` pixels.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            data: vec![0; size as usize * size as usize],
        }
    }

    /// Wraps existing row-major data; `None` if the length does not match.
    pub fn from_vec(size: u32, data: Vec<u32>) -> Option<Self> {
        (data.len() == size as usize * size as usize).then_some(Self { size, data })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Value at a signed position; `None` outside the buffer.
    pub fn get(&self, row: i64, col: i64) -> Option<u32> {
        let size = i64::from(self.size);
        if row < 0 || col < 0 || row >= size || col >= size {
            return None;
        }
        Some(self.data[(row * size + col) as usize])
    }

    pub fn set(&mut self, pixel: Pixel, value: u32) {
        let offset = pixel.row as usize * self.size as usize + pixel.col as usize;
        self.data[offset] = value;
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Number of pixels holding `value`.
    pub fn count(&self, value: u32) -> usize {
        self.data.iter().filter(|&&v| v == value).count()
    }
}

/// The reusable image and index buffers of one batch.
#[derive(Debug, Default)]
pub(crate) struct FrameBuffers {
    size: u32,
    pub(crate) images: Vec<RgbaImage>,
    pub(crate) indices: Vec<IndexBuffer>,
}

impl FrameBuffers {
    pub(crate) fn new(size: u32) -> Self {
        Self {
            size,
            images: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Sizes the buffers for `frames` frames and clears every pixel.
    pub(crate) fn prepare(&mut self, frames: usize) {
        let size = self.size;
        self.images.truncate(frames);
        self.indices.truncate(frames);
        while self.images.len() < frames {
            self.images.push(RgbaImage::new(size, size));
            self.indices.push(IndexBuffer::new(size));
        }

        self.images.par_iter_mut().for_each(|image| {
            image
                .pixels_mut()
                .for_each(|pixel| *pixel = Rgba([0, 0, 0, 0]))
        });
        self.indices.par_iter_mut().for_each(IndexBuffer::clear);
    }
}

/// Paints a filled disc into both buffers, clipped to the image.
pub(crate) fn paint_marker(
    image: &mut RgbaImage,
    index: &mut IndexBuffer,
    centre: Pixel,
    radius: u32,
    color: Rgba<u8>,
    value: u32,
) {
    let size = i64::from(index.size());
    let r = i64::from(radius);
    let (row0, col0) = (i64::from(centre.row), i64::from(centre.col));

    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (row, col) = (row0 + dy, col0 + dx);
            if row < 0 || col < 0 || row >= size || col >= size {
                continue;
            }
            let pixel = Pixel {
                row: row as u32,
                col: col as u32,
            };
            image.put_pixel(pixel.col, pixel.row, color);
            index.set(pixel, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_buffer_bounds() {
        let mut buffer = IndexBuffer::new(4);
        buffer.set(Pixel { row: 1, col: 2 }, 7);

        assert_eq!(buffer.get(1, 2), Some(7));
        assert_eq!(buffer.get(0, 0), Some(0));
        assert_eq!(buffer.get(-1, 0), None);
        assert_eq!(buffer.get(0, 4), None);
        assert_eq!(buffer.count(7), 1);

        buffer.clear();
        assert_eq!(buffer.count(0), 16);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert!(IndexBuffer::from_vec(2, vec![0; 4]).is_some());
        assert!(IndexBuffer::from_vec(2, vec![0; 5]).is_none());
    }

    #[test]
    fn test_marker_disc_shape() {
        let mut image = RgbaImage::new(9, 9);
        let mut index = IndexBuffer::new(9);
        paint_marker(&mut image, &mut index, Pixel { row: 4, col: 4 }, 2, Rgba([255; 4]), 3);

        // Rows of a radius 2 disc cover 1 + 3 + 5 + 3 + 1 pixels
        assert_eq!(index.count(3), 13);
        assert_eq!(image.get_pixel(4, 4), &Rgba([255; 4]));
        assert_eq!(index.get(2, 2), Some(0));
    }

    #[test]
    fn test_marker_clipped_at_corner() {
        let mut image = RgbaImage::new(4, 4);
        let mut index = IndexBuffer::new(4);
        paint_marker(&mut image, &mut index, Pixel { row: 0, col: 0 }, 1, Rgba([1; 4]), 1);
        assert_eq!(index.count(1), 3);
    }

    #[test]
    fn test_prepare_clears_and_resizes() {
        let mut buffers = FrameBuffers::new(8);
        buffers.prepare(3);
        buffers.indices[2].set(Pixel { row: 0, col: 0 }, 9);
        buffers.images[2].put_pixel(0, 0, Rgba([9; 4]));

        buffers.prepare(2);
        assert_eq!(buffers.images.len(), 2);
        buffers.prepare(3);
        assert_eq!(buffers.indices.len(), 3);
        assert!(buffers.indices.iter().all(|index| index.count(0) == 64));
        assert!(buffers.images.iter().all(|image| image.pixels().all(|p| p.0 == [0; 4])));
    }
}
