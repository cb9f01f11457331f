use std::io::{self, Write};

use serde::Serialize;

use crate::frame::{Frame, FrameStack, Pixel};

/// Character written for a pixel above zero
pub const LIT: u8 = b'1';
/// Character written for every other pixel
pub const DARK: u8 = b'0';

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Counts gathered while binarizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BinarizeStats {
    pub frames: usize,
    pub pixels: usize,
    pub lit: usize,
}

impl BinarizeStats {
    fn merge(&mut self, other: BinarizeStats) {
        self.frames += other.frames;
        self.pixels += other.pixels;
        self.lit += other.lit;
    }
}

#[inline]
pub fn encode_pixel<T: Pixel>(value: T) -> u8 {
    if value.is_lit() {
        LIT
    } else {
        DARK
    }
}

/// Writes frames as a flat run of '0'/'1' characters
///
/// Output is batched into chunks of `chunk_size` bytes before reaching the
/// writer; the bytes are identical to writing one character per pixel.
#[derive(Debug, Clone)]
pub struct Binarizer {
    chunk_size: usize,
}

impl Binarizer {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Chunk size is clamped to at least one byte
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Binarize every frame of `stack` in order
    pub fn write_stack<T: Pixel, W: Write>(&self, stack: &FrameStack<T>, out: &mut W) -> io::Result<BinarizeStats> {
        self.write_frames(stack.frames(), out)
    }

    /// Binarize frames in iteration order, no separators between them
    pub fn write_frames<'a, T, I, W>(&self, frames: I, out: &mut W) -> io::Result<BinarizeStats>
    where
        T: Pixel + 'a,
        I: IntoIterator<Item = Frame<'a, T>>,
        W: Write,
    {
        let mut buffer = Vec::with_capacity(self.chunk_size);
        let mut stats = BinarizeStats::default();

        for frame in frames {
            let frame_stats = self.encode_frame(&frame, &mut buffer, out)?;
            stats.merge(frame_stats);
            log::trace!("Frame {} binarized ({} lit)", frame.number, frame_stats.lit);
        }

        if !buffer.is_empty() {
            out.write_all(&buffer)?;
        }

        log::debug!(
            "Binarized {} frames, {} pixels, {} lit",
            stats.frames,
            stats.pixels,
            stats.lit
        );
        Ok(stats)
    }

    fn encode_frame<T: Pixel, W: Write>(&self, frame: &Frame<'_, T>, buffer: &mut Vec<u8>, out: &mut W) -> io::Result<BinarizeStats> {
        let mut lit = 0;
        let mut rest = frame.pixels();

        // Every flushed batch is exactly chunk_size bytes; the tail carries over
        while !rest.is_empty() {
            let take = (self.chunk_size - buffer.len()).min(rest.len());
            let (head, tail) = rest.split_at(take);
            for &pixel in head {
                let c = encode_pixel(pixel);
                lit += (c == LIT) as usize;
                buffer.push(c);
            }
            rest = tail;

            if buffer.len() == self.chunk_size {
                out.write_all(buffer)?;
                buffer.clear();
            }
        }

        Ok(BinarizeStats {
            frames: 1,
            pixels: frame.pixels().len(),
            lit,
        })
    }
}

impl Default for Binarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Binarize a stack into an in-memory string
pub fn binarize_to_string<T: Pixel>(stack: &FrameStack<T>) -> String {
    stack
        .frames()
        .flat_map(|frame| frame.pixels().iter())
        .map(|&pixel| char::from(encode_pixel(pixel)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameShape;

    #[test]
    fn single_frame_row_major() {
        let stack = FrameStack::from_frames(vec![vec![vec![0, 1], vec![-1, 5]]]).unwrap();
        assert_eq!(binarize_to_string(&stack), "0110");
    }

    #[test]
    fn frames_concatenate_in_order() {
        let stack = FrameStack::from_frames(vec![vec![vec![0, 3]], vec![vec![-5, 0]]]).unwrap();
        assert_eq!(binarize_to_string(&stack), "0100");
    }

    #[test]
    fn boundary_zero_is_dark() {
        let stack = FrameStack::from_frames(vec![vec![vec![0.0f32, -0.0, 1e-30]]]).unwrap();
        assert_eq!(binarize_to_string(&stack), "001");
    }

    #[test]
    fn chunk_size_does_not_change_bytes() {
        let pixels: Vec<i16> = (0..997).map(|i| (i % 7) as i16 - 3).collect();
        let stack = FrameStack::from_flat(1, FrameShape::new(1, 997), pixels).unwrap();

        let mut reference = Vec::new();
        Binarizer::new().write_stack(&stack, &mut reference).unwrap();

        for chunk_size in [1, 2, 3, 64, 996, 997, 998, 4096] {
            let mut out = Vec::new();
            Binarizer::new().with_chunk_size(chunk_size).write_stack(&stack, &mut out).unwrap();
            assert_eq!(out, reference, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn stats_count_lit_pixels() {
        let stack = FrameStack::from_frames(vec![vec![vec![1u8, 0, 2]], vec![vec![0, 0, 9]]]).unwrap();
        let mut out = Vec::new();
        let stats = Binarizer::new().write_stack(&stack, &mut out).unwrap();

        assert_eq!(
            stats,
            BinarizeStats {
                frames: 2,
                pixels: 6,
                lit: 3
            }
        );
    }

    #[test]
    fn empty_stack_writes_nothing() {
        let stack = FrameStack::<u8>::empty(FrameShape::new(480, 640));
        let mut out = Vec::new();
        let stats = Binarizer::new().write_stack(&stack, &mut out).unwrap();

        assert!(out.is_empty());
        assert_eq!(stats.frames, 0);
    }

    /// Accepts `limit` bytes, then fails every write
    struct FailingWriter {
        written: Vec<u8>,
        limit: usize,
        batches: Vec<usize>,
    }

    impl FailingWriter {
        fn new(limit: usize) -> Self {
            Self {
                written: Vec::new(),
                limit,
                batches: Vec::new(),
            }
        }
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = room.min(buf.len());
            self.written.extend_from_slice(&buf[..n]);
            self.batches.push(buf.len());
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_surfaces_after_prefix() {
        let stack = FrameStack::from_frames(vec![
            vec![vec![1u8, 0, 1, 0]],
            vec![vec![0, 0, 1, 1]],
            vec![vec![1, 1, 1, 1]],
        ])
        .unwrap();
        let mut out = FailingWriter::new(6);

        let err = Binarizer::new().with_chunk_size(2).write_stack(&stack, &mut out).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(out.written, b"101000");
    }

    #[test]
    fn batches_are_exactly_chunk_size() {
        let stack = FrameStack::from_flat(3, FrameShape::new(1, 5), vec![1u8; 15]).unwrap();
        let mut out = FailingWriter::new(usize::MAX);

        Binarizer::new().with_chunk_size(4).write_stack(&stack, &mut out).unwrap();

        assert_eq!(out.batches, vec![4, 4, 4, 3]);
        assert_eq!(out.written.len(), 15);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        assert_eq!(Binarizer::new().with_chunk_size(0).chunk_size(), 1);
    }
}
