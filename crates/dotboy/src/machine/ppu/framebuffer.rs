use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Side of the square background plane in pixels.
pub const BUFFER_SIDE: usize = 256;

/// One 256x256 plane of shade bytes (0xFF white to 0x00 black).
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: Box<[u8; BUFFER_SIDE * BUFFER_SIDE]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([0xFF; BUFFER_SIDE * BUFFER_SIDE]),
        }
    }
}

impl FrameBuffer {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * BUFFER_SIDE + x]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * BUFFER_SIDE;
        &mut self.pixels[start..start + BUFFER_SIDE]
    }

    /// Write the visible 160x144 region as RGB24 into `out`.
    ///
    /// Stops early if `out` is shorter than a full frame.
    pub fn copy_visible_rgb(&self, out: &mut [u8]) {
        let mut chunks = out.chunks_exact_mut(3);
        for y in 0..SCREEN_HEIGHT {
            for x in 0..SCREEN_WIDTH {
                let Some(rgb) = chunks.next() else {
                    return;
                };
                rgb.fill(self.pixel(x, y));
            }
        }
    }
}

/// Back buffer written by the renderer, front buffer exposed to readers.
#[derive(Clone, Default)]
pub struct DoubleBuffer {
    buffers: [FrameBuffer; 2],
    back: usize,
}

impl DoubleBuffer {
    #[inline]
    pub fn back_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buffers[self.back]
    }

    /// Last completed frame.
    #[inline]
    pub fn front(&self) -> &FrameBuffer {
        &self.buffers[self.back ^ 1]
    }

    pub fn swap(&mut self) {
        self.back ^= 1;
    }
}
