//! Image metadata
//!
//! Cover and profile images are referenced by relative path in content
//! files. The loader resolves them to server and filesystem paths and reads
//! their intrinsic dimensions from the file header.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::error::ContentError;
use crate::helpers::full_relative_path;

lazy_static! {
    static ref SVG_TAG: Regex = Regex::new(r"(?s)<svg\b[^>]*>").unwrap();
    static ref SVG_WIDTH: Regex = Regex::new(r#"\swidth\s*=\s*["']([\d.]+)(?:px)?["']"#).unwrap();
    static ref SVG_HEIGHT: Regex =
        Regex::new(r#"\sheight\s*=\s*["']([\d.]+)(?:px)?["']"#).unwrap();
    static ref SVG_VIEWBOX: Regex =
        Regex::new(r#"\sviewBox\s*=\s*["']\s*[-\d.]+[\s,]+[-\d.]+[\s,]+([\d.]+)[\s,]+([\d.]+)\s*["']"#)
            .unwrap();
}

/// Intrinsic pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// A resolved image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    pub height: u32,
    pub width: u32,
    /// Path as written in the content file
    pub relative_path: String,
    /// Root-relative URL path
    pub relative_server_path: String,
    /// Location on disk, only meaningful during the build
    #[serde(rename = "absoluteFSPath")]
    pub absolute_fs_path: PathBuf,
}

impl ImageMeta {
    /// Resolve `relative_path` against the content directory `fs_dir`,
    /// which is served at `server_dir`, and read its dimensions.
    pub async fn resolve(
        sizer: &dyn ImageSizer,
        relative_path: &str,
        fs_dir: &Path,
        server_dir: &str,
    ) -> Result<Self, ContentError> {
        let absolute_fs_path = fs_dir.join(relative_path);
        let bytes = tokio::fs::read(&absolute_fs_path)
            .await
            .map_err(|e| ContentError::io(&absolute_fs_path, e))?;
        let size = sizer
            .dimensions(&bytes)
            .ok_or_else(|| ContentError::UnknownImageFormat {
                path: absolute_fs_path.clone(),
            })?;

        Ok(Self {
            height: size.height,
            width: size.width,
            relative_path: relative_path.to_string(),
            relative_server_path: full_relative_path(server_dir, relative_path),
            absolute_fs_path,
        })
    }
}

/// Reads image dimensions from encoded image bytes
pub trait ImageSizer: Send + Sync {
    /// `None` when the format is not recognized
    fn dimensions(&self, bytes: &[u8]) -> Option<ImageSize>;
}

/// Header-only sizer for PNG, GIF, JPEG, WebP and SVG
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSizer;

impl ImageSizer for HeaderSizer {
    fn dimensions(&self, bytes: &[u8]) -> Option<ImageSize> {
        png_size(bytes)
            .or_else(|| gif_size(bytes))
            .or_else(|| jpeg_size(bytes))
            .or_else(|| webp_size(bytes))
            .or_else(|| svg_size(bytes))
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

fn le_u16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_le_bytes([b[0], b[1]])))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u24(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 3)?;
    Some(u32::from(b[0]) | u32::from(b[1]) << 8 | u32::from(b[2]) << 16)
}

fn png_size(bytes: &[u8]) -> Option<ImageSize> {
    if !bytes.starts_with(b"\x89PNG\r\n\x1a\n") || bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    Some(ImageSize {
        width: be_u32(bytes, 16)?,
        height: be_u32(bytes, 20)?,
    })
}

fn gif_size(bytes: &[u8]) -> Option<ImageSize> {
    if !bytes.starts_with(b"GIF87a") && !bytes.starts_with(b"GIF89a") {
        return None;
    }
    Some(ImageSize {
        width: le_u16(bytes, 6)?,
        height: le_u16(bytes, 8)?,
    })
}

fn jpeg_size(bytes: &[u8]) -> Option<ImageSize> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut i = 2;
    while i + 1 < bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            // fill byte
            0xFF => i += 1,
            0xD0..=0xD9 | 0x01 => i += 2,
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return Some(ImageSize {
                    height: be_u16(bytes, i + 5)?,
                    width: be_u16(bytes, i + 7)?,
                });
            }
            _ => i += 2 + be_u16(bytes, i + 2)? as usize,
        }
    }
    None
}

fn webp_size(bytes: &[u8]) -> Option<ImageSize> {
    if !bytes.starts_with(b"RIFF") || bytes.get(8..12)? != b"WEBP" {
        return None;
    }
    match bytes.get(12..16)? {
        b"VP8X" => Some(ImageSize {
            width: le_u24(bytes, 24)? + 1,
            height: le_u24(bytes, 27)? + 1,
        }),
        b"VP8 " => Some(ImageSize {
            width: le_u16(bytes, 26)? & 0x3FFF,
            height: le_u16(bytes, 28)? & 0x3FFF,
        }),
        b"VP8L" => {
            let b = bytes.get(21..25)?;
            let (b0, b1, b2, b3) = (u32::from(b[0]), u32::from(b[1]), u32::from(b[2]), u32::from(b[3]));
            Some(ImageSize {
                width: 1 + (((b1 & 0x3F) << 8) | b0),
                height: 1 + (((b3 & 0x0F) << 10) | (b2 << 2) | ((b1 & 0xC0) >> 6)),
            })
        }
        _ => None,
    }
}

fn svg_size(bytes: &[u8]) -> Option<ImageSize> {
    let text = std::str::from_utf8(bytes).ok()?;
    let tag = SVG_TAG.find(text)?.as_str();

    let attr = |re: &Regex| -> Option<u32> {
        let value: f64 = re.captures(tag)?.get(1)?.as_str().parse().ok()?;
        Some(value.round() as u32)
    };

    if let (Some(width), Some(height)) = (attr(&*SVG_WIDTH), attr(&*SVG_HEIGHT)) {
        return Some(ImageSize { width, height });
    }

    let captures = SVG_VIEWBOX.captures(tag)?;
    let width: f64 = captures.get(1)?.as_str().parse().ok()?;
    let height: f64 = captures.get(2)?.as_str().parse().ok()?;
    Some(ImageSize {
        width: width.round() as u32,
        height: height.round() as u32,
    })
}
