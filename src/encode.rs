//! QR encoding: PNG bitmap for the worker thread, half-block text for the
//! instant fallback.
//!
//! The `qrcode` crate produces the module matrix; rasterization and the
//! terminal rendition are built here so both paths share one scaling policy.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::request::{GenerationRequest, Level};

/// Quiet zone width in modules, per the QR specification.
const QUIET_ZONE: u32 = 4;

/// Quiet border for the half-block rendition, in modules. Narrower than the
/// bitmap's: terminal cells are large and two modules scan fine.
const CELL_MARGIN: i32 = 2;

fn ec_level(level: Level) -> EcLevel {
    match level {
        Level::L => EcLevel::L,
        Level::M => EcLevel::M,
        Level::Q => EcLevel::Q,
        Level::H => EcLevel::H,
    }
}

/// Encode a request to PNG bytes at approximately `request.size` pixels.
///
/// Modules are scaled by an integer factor so edges stay crisp; the output
/// dimension is the largest multiple of the module count (plus quiet zone)
/// not exceeding the requested size, floored at 1 px per module.
pub fn encode_png(request: &GenerationRequest) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(
        request.text.as_bytes(),
        ec_level(request.level),
    )
    .with_context(|| {
        format!("QR encoding failed for {} byte(s) of text", request.text.len())
    })?;
    let modules = code.to_colors();
    let count = code.width() as u32;
    let total = count + 2 * QUIET_ZONE;
    let scale = (request.size / total).max(1);
    let dim = total * scale;

    let mut img = GrayImage::from_pixel(dim, dim, Luma([255u8]));
    for (i, color) in modules.iter().enumerate() {
        if *color == Color::Dark {
            let x = (i as u32 % count + QUIET_ZONE) * scale;
            let y = (i as u32 / count + QUIET_ZONE) * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x + dx, y + dy, Luma([0u8]));
                }
            }
        }
    }

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(png)
}

/// Render the symbol as half-block text, two module rows per output line.
///
/// Always synchronous — this is what the viewer shows while a bitmap encode
/// is in flight. Drawn in inverse video (light modules as blocks) so the
/// symbol scans on dark terminal backgrounds, with the quiet border coming
/// out as a solid block frame.
pub fn render_cells(text: &str, level: Level) -> Result<String> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level(level))
        .with_context(|| format!("QR encoding failed for {} byte(s) of text", text.len()))?;
    let modules = code.to_colors();
    let count = code.width() as i32;

    // Out-of-range coordinates are the quiet border, i.e. light.
    let light = |x: i32, y: i32| -> bool {
        !(x >= 0 && y >= 0 && x < count && y < count
            && modules[(y * count + x) as usize] == Color::Dark)
    };

    let mut out = String::new();
    let mut y = -CELL_MARGIN;
    while y < count + CELL_MARGIN {
        for x in -CELL_MARGIN..count + CELL_MARGIN {
            out.push(match (light(x, y), light(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        y += 2;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(text: &str, level: Level, size: u32) -> GenerationRequest {
        GenerationRequest::new(text, level, size).unwrap()
    }

    #[test]
    fn png_magic_bytes() {
        let png = encode_png(&req("hello", Level::M, 200)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn png_dimension_near_requested_size() {
        let png = encode_png(&req("hello", Level::M, 200)).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), img.height());
        assert!(img.width() <= 200, "got {}", img.width());
        // "hello" at M fits version 1 (21 modules + quiet zone = 29);
        // the integer scale should still land reasonably close.
        assert!(img.width() >= 100, "got {}", img.width());
    }

    #[test]
    fn png_tiny_size_floors_at_one_px_per_module() {
        let png = encode_png(&req("hello", Level::L, 1)).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert!(img.width() >= 21 + 2 * QUIET_ZONE);
    }

    #[test]
    fn cells_are_rectangular() {
        let cells = render_cells("hello world", Level::L).unwrap();
        let widths: Vec<usize> = cells.lines().map(|l| l.chars().count()).collect();
        assert!(!widths.is_empty());
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn cells_have_quiet_border() {
        let cells = render_cells("hello", Level::L).unwrap();
        let first = cells.lines().next().unwrap();
        // Top border rows are entirely light.
        assert!(first.chars().all(|c| c == '█'));
    }

    #[test]
    fn higher_level_is_denser_or_equal() {
        let low = render_cells("some text to encode", Level::L).unwrap();
        let high = render_cells("some text to encode", Level::H).unwrap();
        assert!(high.lines().count() >= low.lines().count());
    }
}
