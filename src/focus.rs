//! Focus selection for photo panels.
//!
//! Every entry into the Focused layout advances to the next panel, wrapping
//! around. The selector starts at index 0 and advances *before* the first
//! focus, so the first focused panel is index 1 when there are at least two.

/// Cyclic index into the focusable panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusSelector {
    index: usize,
    count: usize,
}

impl FocusSelector {
    /// Selector over `count` panels, starting at panel 0.
    pub fn new(count: usize) -> Self {
        Self { index: 0, count }
    }

    /// Advance on entering Focused: `(index + 1) % max(1, count)`.
    pub fn on_focus_entry(&mut self) -> usize {
        self.index = (self.index + 1) % self.count.max(1);
        self.index
    }

    /// Change the number of focusable panels, clamping the current index.
    pub fn set_focusable_count(&mut self, count: usize) {
        self.count = count;
        self.index = self.index.min(count.saturating_sub(1));
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Panel to pull into view, if any exist.
    pub fn focus(&self) -> Option<usize> {
        (self.count > 0).then_some(self.index)
    }
}

impl Default for FocusSelector {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_and_wraps() {
        let mut focus = FocusSelector::new(3);
        assert_eq!(focus.on_focus_entry(), 1);
        assert_eq!(focus.on_focus_entry(), 2);
        assert_eq!(focus.on_focus_entry(), 0);
        assert_eq!(focus.focus(), Some(0));
    }

    #[test]
    fn test_zero_count_has_no_focus() {
        let mut focus = FocusSelector::new(0);
        assert_eq!(focus.on_focus_entry(), 0);
        assert_eq!(focus.index(), 0);
        assert_eq!(focus.focus(), None);
    }

    #[test]
    fn test_single_panel_stays_put() {
        let mut focus = FocusSelector::new(1);
        for _ in 0..5 {
            assert_eq!(focus.on_focus_entry(), 0);
        }
    }

    #[test]
    fn test_shrinking_count_clamps() {
        let mut focus = FocusSelector::new(10);
        for _ in 0..7 {
            focus.on_focus_entry();
        }
        assert_eq!(focus.index(), 7);
        focus.set_focusable_count(4);
        assert_eq!(focus.index(), 3);
        focus.set_focusable_count(0);
        assert_eq!(focus.index(), 0);
        assert_eq!(focus.focus(), None);
    }
}
