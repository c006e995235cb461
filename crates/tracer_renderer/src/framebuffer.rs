//! Shared output buffer of packed 8-bit pixels.
//!
//! Workers write through a shared reference while the render runs. Each
//! pixel index is written by exactly one worker because every coordinate
//! is claimed from the work queue exactly once, so the per-pixel atomics
//! never contend and no lock is taken.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::renderer::RenderError;
use crate::scheduler::PixelCoord;

/// A 24-bit RGB color packed as `0x00RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedRgb(u32);

impl PackedRgb {
    pub const BLACK: PackedRgb = PackedRgb(0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Rebuild from a packed value, ignoring the unused top byte.
    pub const fn from_u32(packed: u32) -> Self {
        Self(packed & 0x00FF_FFFF)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn channels(self) -> [u8; 3] {
        [self.r(), self.g(), self.b()]
    }
}

/// Final image of a render.
///
/// Stored top row first: pixel `(u, v)` with `v` counted up from the bottom
/// of the image lives at index `(height - 1 - v) * width + u`.
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<AtomicU32>,
}

impl Framebuffer {
    /// Allocate a black framebuffer.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(RenderError::ImageTooLarge { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|source| RenderError::Allocation { pixels: len, source })?;
        pixels.extend((0..len).map(|_| AtomicU32::new(PackedRgb::BLACK.to_u32())));

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Buffer index of a scene-space pixel coordinate, if it is inside the image.
    pub fn index_of(&self, coord: PixelCoord) -> Option<usize> {
        if coord.u >= self.width || coord.v >= self.height {
            return None;
        }
        let row = (self.height - 1 - coord.v) as usize;
        Some(row * self.width as usize + coord.u as usize)
    }

    /// Store the final color of one pixel.
    pub(crate) fn write(&self, coord: PixelCoord, color: PackedRgb) {
        match self.index_of(coord) {
            Some(index) => self.pixels[index].store(color.to_u32(), Ordering::Relaxed),
            None => log::error!(
                "pixel ({}, {}) is outside the {}x{} framebuffer",
                coord.u,
                coord.v,
                self.width,
                self.height
            ),
        }
    }

    /// Pixel at image column `x`, row `y` (row 0 is the top of the image).
    pub fn get(&self, x: u32, y: u32) -> Option<PackedRgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        Some(PackedRgb::from_u32(self.pixels[index].load(Ordering::Relaxed)))
    }

    /// Pixel at a scene-space coordinate.
    pub fn get_coord(&self, coord: PixelCoord) -> Option<PackedRgb> {
        self.index_of(coord)
            .map(|index| PackedRgb::from_u32(self.pixels[index].load(Ordering::Relaxed)))
    }

    /// All pixels in buffer order, top row first.
    pub fn pixels(&self) -> Vec<PackedRgb> {
        self.pixels
            .iter()
            .map(|p| PackedRgb::from_u32(p.load(Ordering::Relaxed)))
            .collect()
    }

    /// Flatten to RGB bytes (for display or saving).
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels().into_iter().flat_map(PackedRgb::channels).collect()
    }
}
