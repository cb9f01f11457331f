#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Serialize an array as an `.npy` (format 1.0) byte buffer
pub fn npy_bytes(descr: &str, shape: &[usize], fortran_order: bool, payload: &[u8]) -> Vec<u8> {
    let shape_text = match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => format!(
            "({})",
            dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    };
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': {}, 'shape': {}, }}",
        descr,
        if fortran_order { "True" } else { "False" },
        shape_text
    );
    // numpy pads the header so the payload starts on a 64-byte boundary
    while (10 + header.len() + 1) % 64 != 0 {
        header.push(' ');
    }
    header.push('\n');

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn u8_npy(shape: &[usize], pixels: &[u8]) -> Vec<u8> {
    npy_bytes("|u1", shape, false, pixels)
}

pub fn i32_npy(shape: &[usize], pixels: &[i32]) -> Vec<u8> {
    let payload: Vec<u8> = pixels.iter().flat_map(|p| p.to_le_bytes()).collect();
    npy_bytes("<i4", shape, false, &payload)
}

pub fn f64_npy(shape: &[usize], pixels: &[f64]) -> Vec<u8> {
    let payload: Vec<u8> = pixels.iter().flat_map(|p| p.to_le_bytes()).collect();
    npy_bytes("<f8", shape, false, &payload)
}

/// Pack named arrays into an `.npz` archive
pub fn npz_bytes(entries: &[(&str, Vec<u8>)], method: CompressionMethod) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        let options = SimpleFileOptions::default().compression_method(method);
        zip.start_file(format!("{}.npy", name), options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

pub fn write_npz(path: &Path, entries: &[(&str, Vec<u8>)]) {
    std::fs::write(path, npz_bytes(entries, CompressionMethod::Stored)).unwrap();
}
