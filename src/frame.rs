use std::fmt;

use serde::Serialize;

use crate::error::{BinarizeError, Result};

/// Numeric pixel that can be tested against zero
pub trait Pixel: Copy {
    /// Strictly greater than zero
    fn is_lit(self) -> bool;
}

macro_rules! impl_pixel {
    ($($t:ty => $zero:expr),* $(,)?) => {
        $(
            impl Pixel for $t {
                #[inline]
                fn is_lit(self) -> bool {
                    self > $zero
                }
            }
        )*
    };
}

impl_pixel!(
    u8 => 0, u16 => 0, u32 => 0, u64 => 0,
    i8 => 0, i16 => 0, i32 => 0, i64 => 0,
    f32 => 0.0, f64 => 0.0,
);

impl Pixel for bool {
    #[inline]
    fn is_lit(self) -> bool {
        self
    }
}

/// IEEE 754 half-precision value kept as its raw bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F16(pub u16);

impl F16 {
    const SIGN: u16 = 0x8000;
    const EXPONENT: u16 = 0x7c00;
    const MANTISSA: u16 = 0x03ff;

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn to_bits(self) -> u16 {
        self.0
    }

    pub fn is_nan(self) -> bool {
        self.0 & Self::EXPONENT == Self::EXPONENT && self.0 & Self::MANTISSA != 0
    }
}

impl Pixel for F16 {
    /// Positive, non-zero and not NaN; `+inf` counts as lit
    #[inline]
    fn is_lit(self) -> bool {
        self.0 & Self::SIGN == 0 && self.0 != 0 && !self.is_nan()
    }
}

/// Frame dimensions - rows x cols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameShape {
    pub rows: usize,
    pub cols: usize,
}

impl FrameShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Pixels per frame
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// One frame - its position in the stack and a row-major view of its pixels
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a, T> {
    pub number: usize,
    pub shape: FrameShape,
    pub pixels: &'a [T],
}

impl<'a, T> Frame<'a, T> {
    pub fn pixels(&self) -> &'a [T] {
        self.pixels
    }

    /// Row `r`, left to right
    pub fn row(&self, r: usize) -> &'a [T] {
        let start = r * self.shape.cols;
        &self.pixels[start..start + self.shape.cols]
    }
}

/// Ordered stack of equally-shaped frames stored contiguously, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStack<T> {
    shape: FrameShape,
    frame_count: usize,
    pixels: Vec<T>,
}

impl<T: Pixel> FrameStack<T> {
    /// Wrap an already flattened buffer of `frame_count` frames
    pub fn from_flat(frame_count: usize, shape: FrameShape, pixels: Vec<T>) -> Result<Self> {
        let expected = frame_count
            .checked_mul(shape.len())
            .ok_or_else(|| BinarizeError::InvalidConfig(format!("{} frames of {} overflow", frame_count, shape)))?;

        if pixels.len() != expected {
            return Err(BinarizeError::InvalidConfig(format!(
                "{} pixels cannot form {} frames of {}",
                pixels.len(),
                frame_count,
                shape
            )));
        }

        Ok(Self {
            shape,
            frame_count,
            pixels,
        })
    }

    /// Build from per-frame rows, rejecting ragged rows and frames whose
    /// shape differs from the first frame
    pub fn from_frames<F, R>(frames: F) -> Result<Self>
    where
        F: IntoIterator<Item = R>,
        R: AsRef<[Vec<T>]>,
    {
        let mut shape: Option<FrameShape> = None;
        let mut pixels = Vec::new();
        let mut frame_count = 0;

        for (number, frame) in frames.into_iter().enumerate() {
            let rows = frame.as_ref();
            let cols = rows.first().map_or(0, Vec::len);
            let expected = *shape.get_or_insert(FrameShape::new(rows.len(), cols));

            if let Some(bad) = rows.iter().find(|row| row.len() != expected.cols) {
                return Err(BinarizeError::ShapeMismatch {
                    frame: number,
                    expected,
                    found: FrameShape::new(rows.len(), bad.len()),
                });
            }
            if rows.len() != expected.rows {
                return Err(BinarizeError::ShapeMismatch {
                    frame: number,
                    expected,
                    found: FrameShape::new(rows.len(), cols),
                });
            }

            for row in rows {
                pixels.extend_from_slice(row);
            }
            frame_count += 1;
        }

        Ok(Self {
            shape: shape.unwrap_or(FrameShape::new(0, 0)),
            frame_count,
            pixels,
        })
    }

    pub fn empty(shape: FrameShape) -> Self {
        Self {
            shape,
            frame_count: 0,
            pixels: Vec::new(),
        }
    }
}

impl<T> FrameStack<T> {
    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Total pixels across every frame
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    pub fn frame(&self, number: usize) -> Option<Frame<'_, T>> {
        if number >= self.frame_count {
            return None;
        }
        let len = self.shape.len();
        let start = number * len;
        Some(Frame {
            number,
            shape: self.shape,
            pixels: &self.pixels[start..start + len],
        })
    }

    /// Frames in stack order
    pub fn frames(&self) -> FrameIterator<'_, T> {
        FrameIterator {
            stack: self,
            next: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a FrameStack<T> {
    type Item = Frame<'a, T>;
    type IntoIter = FrameIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames()
    }
}

/// Yields frames in order
/// Zero-sized frames are still yielded once per frame
pub struct FrameIterator<'a, T> {
    stack: &'a FrameStack<T>,
    next: usize,
}

impl<'a, T> Iterator for FrameIterator<'a, T> {
    type Item = Frame<'a, T>;

    fn next(&mut self) -> Option<Frame<'a, T>> {
        let frame = self.stack.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.stack.frame_count - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for FrameIterator<'_, T> {}
