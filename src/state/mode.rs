//! Mode resolution from modifier state.

use crate::layout::LayoutMode;

/// Derive the layout mode from the current modifiers.
///
/// An explicit XOR, not an OR: holding shift while capslock is engaged
/// cancels back to normal-case glyphs.
#[inline]
pub fn resolve_mode(have_shift: bool, have_capslock: bool) -> LayoutMode {
    if have_shift != have_capslock {
        LayoutMode::Shift
    } else {
        LayoutMode::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, LayoutMode::Normal)]
    #[case(true, false, LayoutMode::Shift)]
    #[case(false, true, LayoutMode::Shift)]
    #[case(true, true, LayoutMode::Normal)]
    fn modifier_xor_truth_table(
        #[case] have_shift: bool,
        #[case] have_capslock: bool,
        #[case] expected: LayoutMode,
    ) {
        assert_eq!(resolve_mode(have_shift, have_capslock), expected);
    }
}
