//! Screen layout: form rows, QR anchor, status bar, pixel geometry.

use crate::probe::LayoutSnapshot;

/// Rows above the QR area: text field, level/size line, separator.
pub(super) const FORM_ROWS: u16 = 3;

pub(super) struct Layout {
    pub term_cols: u16,
    pub term_rows: u16,
    pub cell_w: u16, // pixels per cell (width); 0 when unreported
    pub cell_h: u16, // pixels per cell (height); 0 when unreported
    pub anchor_row: u16, // first row of the QR area
    pub qr_rows: u16,    // rows available to the symbol
    pub status_row: u16, // last row
}

pub(super) fn compute_layout(term_cols: u16, term_rows: u16, pixel_w: u16, pixel_h: u16) -> Layout {
    let cell_w = if term_cols > 0 { pixel_w / term_cols } else { 0 };
    let cell_h = if term_rows > 0 { pixel_h / term_rows } else { 0 };
    let status_row = term_rows.saturating_sub(1);
    let anchor_row = FORM_ROWS.min(status_row);
    let qr_rows = status_row.saturating_sub(anchor_row);
    Layout { term_cols, term_rows, cell_w, cell_h, anchor_row, qr_rows, status_row }
}

impl Layout {
    /// Whether the terminal reported pixel geometry (needed for both the
    /// size probe and Kitty image placement).
    pub(super) fn has_pixels(&self) -> bool {
        self.cell_w > 0 && self.cell_h > 0
    }

    /// Measurement for the size probe. `None` without pixel geometry — the
    /// probe then keeps the prior size.
    pub(super) fn snapshot(&self) -> Option<LayoutSnapshot> {
        if !self.has_pixels() {
            return None;
        }
        Some(LayoutSnapshot {
            container_width: u32::from(self.term_cols) * u32::from(self.cell_w),
            anchor_top: u32::from(self.anchor_row) * u32::from(self.cell_h),
            viewport_height: u32::from(self.term_rows) * u32::from(self.cell_h),
        })
    }
}
