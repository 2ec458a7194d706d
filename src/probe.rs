//! Responsive size computation from live layout measurements.
//!
//! Measurement access goes through the `Measure` capability so the
//! computation is testable without a real terminal.

/// Legibility floor in pixels — the symbol never shrinks below this.
pub const MIN_SIZE: u32 = 128;
/// Default horizontal margin kept inside the container width.
pub const MARGIN_H: u32 = 20;
/// Default vertical margin kept above the bottom of the viewport.
pub const MARGIN_V: u32 = 60;

/// One synchronous measurement of the space available to the symbol, in
/// pixels. Read at probe time, never cached beyond one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub container_width: u32,
    /// Pixel offset of the symbol's top edge from the top of the viewport.
    pub anchor_top: u32,
    pub viewport_height: u32,
}

/// Capability for reading the current layout geometry.
pub trait Measure {
    /// Returns `None` when no measurement is available (e.g. the terminal
    /// does not report pixel dimensions); the caller keeps the prior size.
    fn measure(&self) -> Option<LayoutSnapshot>;
}

/// Margins and floor applied when converting a snapshot to a size.
#[derive(Debug, Clone, Copy)]
pub struct SizeRule {
    pub min_size: u32,
    pub margin_h: u32,
    pub margin_v: u32,
}

impl Default for SizeRule {
    fn default() -> Self {
        Self { min_size: MIN_SIZE, margin_h: MARGIN_H, margin_v: MARGIN_V }
    }
}

impl SizeRule {
    /// Recommended pixel size for a snapshot.
    ///
    /// The symbol must not exceed the horizontal space of its container nor
    /// push past the bottom of the viewport, but never shrinks below
    /// `min_size`.
    pub fn size_for(&self, snap: LayoutSnapshot) -> u32 {
        let width = snap
            .container_width
            .saturating_sub(self.margin_h)
            .max(self.min_size);
        let height = snap
            .viewport_height
            .saturating_sub(snap.anchor_top)
            .saturating_sub(self.margin_v)
            .max(self.min_size);
        width.min(height)
    }
}
