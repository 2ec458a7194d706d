//! Auto/manual size arbitration.
//!
//! Each mode keeps its own last-known size; switching modes never discards
//! the inactive value, and auto updates never overwrite a manually entered
//! size (nor vice versa).

/// Which size source is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    Auto,
    Manual,
}

#[derive(Debug)]
pub struct SizeModeController {
    mode: SizeMode,
    auto_size: u32,
    manual_size: u32,
}

impl SizeModeController {
    /// Starts in `Auto` with the given initial sizes.
    pub fn new(auto_size: u32, manual_size: u32) -> Self {
        Self { mode: SizeMode::Auto, auto_size, manual_size }
    }

    pub fn mode(&self) -> SizeMode {
        self.mode
    }

    /// Switch modes without altering either stored size.
    pub fn set_mode(&mut self, mode: SizeMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            SizeMode::Auto => SizeMode::Manual,
            SizeMode::Manual => SizeMode::Auto,
        };
    }

    /// Update the manual size only. Zero is ignored.
    pub fn set_manual_size(&mut self, n: u32) {
        if n > 0 {
            self.manual_size = n;
        }
    }

    /// Update the auto (measured) size only. Invoked by the resize watcher.
    pub fn set_auto_size(&mut self, n: u32) {
        if n > 0 {
            self.auto_size = n;
        }
    }

    /// Step the manual size by `delta` pixels, flooring at 1.
    pub fn bump_manual(&mut self, delta: i32) {
        let next = i64::from(self.manual_size) + i64::from(delta);
        self.manual_size = next.clamp(1, i64::from(u32::MAX)) as u32;
    }

    pub fn auto_size(&self) -> u32 {
        self.auto_size
    }

    pub fn manual_size(&self) -> u32 {
        self.manual_size
    }

    /// The single pixel dimension actually used for rendering.
    pub fn effective_size(&self) -> u32 {
        match self.mode {
            SizeMode::Auto => self.auto_size,
            SizeMode::Manual => self.manual_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_auto() {
        let sizes = SizeModeController::new(128, 512);
        assert_eq!(sizes.mode(), SizeMode::Auto);
        assert_eq!(sizes.effective_size(), 128);
    }

    #[test]
    fn effective_follows_mode() {
        let mut sizes = SizeModeController::new(300, 500);
        assert_eq!(sizes.effective_size(), 300);
        sizes.set_mode(SizeMode::Manual);
        assert_eq!(sizes.effective_size(), 500);
    }

    #[test]
    fn auto_update_while_manual_active() {
        // Resize while the user has a manual size selected: auto keeps
        // tracking in the background, effective stays manual.
        let mut sizes = SizeModeController::new(300, 500);
        sizes.set_mode(SizeMode::Manual);
        sizes.set_auto_size(320);
        assert_eq!(sizes.effective_size(), 500);
        sizes.set_mode(SizeMode::Auto);
        assert_eq!(sizes.effective_size(), 320);
    }

    #[test]
    fn manual_edit_while_auto_active() {
        let mut sizes = SizeModeController::new(300, 500);
        sizes.set_manual_size(640);
        assert_eq!(sizes.effective_size(), 300);
        assert_eq!(sizes.manual_size(), 640);
        sizes.toggle_mode();
        assert_eq!(sizes.effective_size(), 640);
    }

    #[test]
    fn toggling_preserves_both_values() {
        let mut sizes = SizeModeController::new(300, 500);
        for _ in 0..5 {
            sizes.toggle_mode();
        }
        assert_eq!(sizes.auto_size(), 300);
        assert_eq!(sizes.manual_size(), 500);
    }

    #[test]
    fn zero_sizes_ignored() {
        let mut sizes = SizeModeController::new(300, 500);
        sizes.set_manual_size(0);
        sizes.set_auto_size(0);
        assert_eq!(sizes.auto_size(), 300);
        assert_eq!(sizes.manual_size(), 500);
    }

    #[test]
    fn bump_floors_at_one() {
        let mut sizes = SizeModeController::new(300, 10);
        sizes.bump_manual(-100);
        assert_eq!(sizes.manual_size(), 1);
        sizes.bump_manual(16);
        assert_eq!(sizes.manual_size(), 17);
    }
}
