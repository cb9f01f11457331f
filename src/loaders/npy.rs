//! Decoder for the numpy `.npy` array format (versions 1.0, 2.0 and 3.0)
//!
//! Layout: 6 magic bytes, major/minor version, a little-endian header length
//! (u16 for 1.x, u32 for 2.x/3.x), then an ASCII python dict literal with the
//! keys `descr`, `fortran_order` and `shape`, then the raw payload.

use std::fmt;

use serde::Serialize;

use super::LoadedFrames;
use crate::frame::{FrameShape, FrameStack, Pixel, F16};

pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

macro_rules! decode_num {
    ($payload:expr, $endian:expr, $t:ty) => {{
        const N: usize = std::mem::size_of::<$t>();
        match $endian {
            Endian::Little => decode_elements::<$t, N>($payload, <$t>::from_le_bytes),
            Endian::Big => decode_elements::<$t, N>($payload, <$t>::from_be_bytes),
        }
    }};
}

/// Element type named by a `descr` string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
}

impl DType {
    pub fn size(self) -> usize {
        match self {
            DType::Bool | DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 | DType::F16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::U32 => "uint32",
            DType::U64 => "uint64",
            DType::I8 => "int8",
            DType::I16 => "int16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F16 => "float16",
            DType::F32 => "float32",
            DType::F64 => "float64",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Parsed `.npy` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub dtype: DType,
    pub endian: Endian,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl NpyHeader {
    pub fn element_count(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Axis 0 indexes frames; axis 1 is rows; every later axis folds into cols
    pub fn frame_layout(&self) -> Result<(usize, FrameShape), String> {
        let (&frames, rest) = self
            .shape
            .split_first()
            .ok_or("array is 0-dimensional and has no frame axis")?;

        let rows = rest.first().copied().unwrap_or(1);
        let cols = rest
            .iter()
            .skip(1)
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or("frame shape overflows")?;

        Ok((frames, FrameShape::new(rows, cols)))
    }
}

/// Decode a complete `.npy` file held in memory
pub fn decode_npy(bytes: &[u8]) -> Result<LoadedFrames, String> {
    let (header, payload) = parse_header(bytes)?;
    let (frame_count, shape) = header.frame_layout()?;
    let count = header.element_count().ok_or("array shape overflows")?;

    let needed = count
        .checked_mul(header.dtype.size())
        .ok_or("array byte size overflows")?;
    if payload.len() < needed {
        return Err(format!(
            "payload truncated: need {} bytes for shape {:?}, found {}",
            needed,
            header.shape,
            payload.len()
        ));
    }
    let payload = &payload[..needed];

    log::debug!(
        "npy header: dtype={} endian={:?} fortran_order={} shape={:?}",
        header.dtype,
        header.endian,
        header.fortran_order,
        header.shape
    );

    let frames = match header.dtype {
        DType::Bool => LoadedFrames::Bool(build(&header, frame_count, shape, decode_elements(payload, |b: [u8; 1]| b[0] != 0))?),
        DType::U8 => LoadedFrames::U8(build(&header, frame_count, shape, decode_elements(payload, |b: [u8; 1]| b[0]))?),
        DType::I8 => LoadedFrames::I8(build(&header, frame_count, shape, decode_elements(payload, |b: [u8; 1]| b[0] as i8))?),
        DType::U16 => LoadedFrames::U16(build(&header, frame_count, shape, decode_num!(payload, header.endian, u16))?),
        DType::U32 => LoadedFrames::U32(build(&header, frame_count, shape, decode_num!(payload, header.endian, u32))?),
        DType::U64 => LoadedFrames::U64(build(&header, frame_count, shape, decode_num!(payload, header.endian, u64))?),
        DType::I16 => LoadedFrames::I16(build(&header, frame_count, shape, decode_num!(payload, header.endian, i16))?),
        DType::I32 => LoadedFrames::I32(build(&header, frame_count, shape, decode_num!(payload, header.endian, i32))?),
        DType::I64 => LoadedFrames::I64(build(&header, frame_count, shape, decode_num!(payload, header.endian, i64))?),
        DType::F16 => LoadedFrames::F16(build(
            &header,
            frame_count,
            shape,
            decode_num!(payload, header.endian, u16).into_iter().map(F16::from_bits).collect(),
        )?),
        DType::F32 => LoadedFrames::F32(build(&header, frame_count, shape, decode_num!(payload, header.endian, f32))?),
        DType::F64 => LoadedFrames::F64(build(&header, frame_count, shape, decode_num!(payload, header.endian, f64))?),
    };

    Ok(frames)
}

/// Split the header from the payload
pub fn parse_header(bytes: &[u8]) -> Result<(NpyHeader, &[u8]), String> {
    if bytes.len() < 10 || &bytes[..6] != NPY_MAGIC {
        return Err("not an npy file (bad magic)".to_string());
    }

    let major = bytes[6];
    let (header_len, offset) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("npy header truncated".to_string());
            }
            (u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize, 12)
        }
        v => return Err(format!("unsupported npy format version {}", v)),
    };

    let end = offset + header_len;
    if bytes.len() < end {
        return Err("npy header truncated".to_string());
    }
    let text = std::str::from_utf8(&bytes[offset..end]).map_err(|_| "npy header is not valid text".to_string())?;

    Ok((parse_header_dict(text)?, &bytes[end..]))
}

fn parse_header_dict(text: &str) -> Result<NpyHeader, String> {
    let descr = dict_value(text, "descr").ok_or("npy header missing 'descr'")?;
    let descr = descr.trim_matches(|c: char| c == '\'' || c == '"');
    let (dtype, endian) = parse_descr(descr)?;

    let fortran_order = match dict_value(text, "fortran_order").ok_or("npy header missing 'fortran_order'")? {
        "True" => true,
        "False" => false,
        other => return Err(format!("bad fortran_order value '{}'", other)),
    };

    let shape_text = dict_value(text, "shape").ok_or("npy header missing 'shape'")?;
    let shape = shape_text
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('L').parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("bad shape {}", shape_text))?;

    Ok(NpyHeader {
        dtype,
        endian,
        fortran_order,
        shape,
    })
}

/// Raw text of `'key': value` inside the header dict
fn dict_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let start = text
        .find(&format!("'{}'", key))
        .or_else(|| text.find(&format!("\"{}\"", key)))?;
    let rest = &text[start + key.len() + 2..];
    let rest = rest.trim_start().strip_prefix(':')?.trim_start();

    let end = if rest.starts_with('(') {
        rest.find(')')? + 1
    } else if let Some(quote) = rest.chars().next().filter(|c| *c == '\'' || *c == '"') {
        rest[1..].find(quote)? + 2
    } else {
        rest.find(|c: char| c == ',' || c == '}').unwrap_or(rest.len())
    };

    Some(rest[..end].trim())
}

fn parse_descr(descr: &str) -> Result<(DType, Endian), String> {
    let (endian, code) = match descr.as_bytes().first() {
        Some(b'<') | Some(b'|') => (Endian::Little, &descr[1..]),
        Some(b'>') => (Endian::Big, &descr[1..]),
        Some(b'=') => (native_endian(), &descr[1..]),
        _ => (native_endian(), descr),
    };

    let dtype = match code {
        "b1" | "?" => DType::Bool,
        "u1" | "B" => DType::U8,
        "i1" | "b" => DType::I8,
        "u2" => DType::U16,
        "i2" => DType::I16,
        "u4" => DType::U32,
        "i4" => DType::I32,
        "u8" => DType::U64,
        "i8" => DType::I64,
        "f2" | "e" => DType::F16,
        "f4" => DType::F32,
        "f8" => DType::F64,
        other => return Err(format!("unsupported dtype '{}'", other)),
    };

    Ok((dtype, endian))
}

fn native_endian() -> Endian {
    if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    }
}

fn decode_elements<T, const N: usize>(payload: &[u8], f: impl Fn([u8; N]) -> T) -> Vec<T> {
    payload
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            f(buf)
        })
        .collect()
}

fn build<T: Pixel>(header: &NpyHeader, frame_count: usize, shape: FrameShape, data: Vec<T>) -> Result<FrameStack<T>, String> {
    let data = if header.fortran_order {
        fortran_to_c(&data, &header.shape)
    } else {
        data
    };
    FrameStack::from_flat(frame_count, shape, data).map_err(|e| e.to_string())
}

/// Reorder a column-major buffer into row-major order
fn fortran_to_c<T: Copy>(data: &[T], shape: &[usize]) -> Vec<T> {
    if shape.len() < 2 || data.is_empty() {
        return data.to_vec();
    }

    // Column-major strides: the first axis varies fastest
    let mut strides = vec![1usize; shape.len()];
    for axis in 1..shape.len() {
        strides[axis] = strides[axis - 1] * shape[axis - 1];
    }

    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; shape.len()];
    for _ in 0..data.len() {
        let offset: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
        out.push(data[offset]);

        // Advance the row-major counter, last axis fastest
        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}
