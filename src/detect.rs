//! PDF input detection: header sniffing and folder discovery.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_LEN: usize = 8; // "%PDF-1.7"

/// Read the header of a file and return its PDF version (e.g. "1.7").
pub fn sniff_version<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = [0u8; HEADER_LEN];
    let mut file = File::open(path)?;
    let read = file.read(&mut header)?;
    version_from_header(&header[..read])
}

/// Extract the PDF version from the first bytes of a file.
pub fn version_from_header(data: &[u8]) -> Result<String> {
    if data.len() < HEADER_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..HEADER_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).to_string())
        }
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).to_string(),
        )),
    }
}

/// Whether the path ends in `.pdf`, ignoring case.
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// List the PDF files directly inside `dir`, sorted by file name.
pub fn list_pdf_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
