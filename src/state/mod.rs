//! Multi-touch key state machine.
//!
//! Each touch runs `idle -> down -> idle` independently; correctness across
//! an arbitrary number of simultaneous contacts comes from keying all state
//! by [`TouchRef`], not from locking — events arrive serially on one
//! control thread. State mutations report what they dirtied through
//! [`Response`] flags, and the caller decides what to recompute; there is
//! no observer graph.

use std::collections::HashMap;

use tracing::debug;

use crate::event::{KeyActivation, TouchId, TouchRef};
use crate::layout::hit::KeyHit;
use crate::layout::{KeyAction, KeyPosition, LayoutMode};

pub mod mode;

use mode::resolve_mode;

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// What one touch event produced and dirtied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    /// Event for the input sink, if a key activated.
    pub activation: Option<KeyActivation>,
    /// The layout key fired; the host should show its layout picker.
    pub layout_requested: bool,
    /// The modifier flip changed the layout mode; glyphs need redrawing
    /// (positions do not).
    pub mode_changed: bool,
    /// The active-key set changed; highlights need redrawing.
    pub highlight_changed: bool,
}

// ---------------------------------------------------------------------------
// KeyStateMachine
// ---------------------------------------------------------------------------

/// Bookkeeping for one down touch, captured at touch-down time so touch-up
/// behaves consistently even if the layout changed in between.
#[derive(Debug)]
struct DownKey {
    action: Option<KeyAction>,
    position: KeyPosition,
}

/// Per-touch activation state and modifier flags.
#[derive(Debug, Default)]
pub struct KeyStateMachine {
    /// Highlighted keys, keyed by touch (plus the capslock pseudo-touch).
    active: HashMap<TouchRef, KeyPosition>,
    /// Touches currently down on a key.
    down: HashMap<TouchId, DownKey>,
    /// True while any shift-designated touch is held.
    have_shift: bool,
    /// Toggled by capslock downs; persists across touches.
    have_capslock: bool,
}

impl KeyStateMachine {
    /// Create an idle state machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The layout mode implied by the current modifiers.
    pub fn mode(&self) -> LayoutMode {
        resolve_mode(self.have_shift, self.have_capslock)
    }

    /// Whether a shift key is currently held.
    pub fn have_shift(&self) -> bool {
        self.have_shift
    }

    /// Whether capslock is currently engaged.
    pub fn have_capslock(&self) -> bool {
        self.have_capslock
    }

    /// Keys to highlight, keyed by the touch holding them down (the
    /// capslock entry persists while engaged).
    pub fn active_keys(&self) -> &HashMap<TouchRef, KeyPosition> {
        &self.active
    }

    /// A touch landed on a key.
    ///
    /// Character and edit keys activate immediately, before any modifier
    /// bookkeeping. Shift engages while held; capslock toggles and moves
    /// its highlight to the pseudo-touch; the layout key only raises
    /// `layout_requested`.
    pub fn key_down(&mut self, touch: TouchId, hit: &KeyHit<'_>) -> Response {
        let mode_before = self.mode();
        let action = hit.key.action;
        self.down.insert(touch, DownKey { action, position: hit.position });

        let activation = match action {
            Some(a) if a.is_shift() || matches!(a, KeyAction::Capslock | KeyAction::Layout) => {
                None
            }
            _ => Some(KeyActivation::from_key(hit.key)),
        };

        let mut layout_requested = false;
        let mut touch_ref = TouchRef::Real(touch);
        match action {
            Some(KeyAction::Capslock) => {
                self.have_capslock = !self.have_capslock;
                debug!(engaged = self.have_capslock, "capslock toggled");
                touch_ref = TouchRef::CapslockPseudo;
            }
            Some(a) if a.is_shift() => self.have_shift = true,
            Some(KeyAction::Layout) => layout_requested = true,
            _ => {}
        }

        self.active.insert(touch_ref, hit.position);

        Response {
            activation,
            layout_requested,
            mode_changed: self.mode() != mode_before,
            highlight_changed: true,
        }
    }

    /// A previously-down touch lifted.
    ///
    /// Unknown touches (never down on a key, or already cleaned up) are a
    /// no-op. Releasing shift disengages it; releasing capslock re-inserts
    /// the pseudo-touch highlight while capslock remains engaged — the
    /// asymmetry with shift is deliberate.
    pub fn key_up(&mut self, touch: TouchId) -> Response {
        let mode_before = self.mode();
        let Some(down) = self.down.remove(&touch) else {
            return Response::default();
        };

        let touch_ref = if down.action == Some(KeyAction::Capslock) {
            TouchRef::CapslockPseudo
        } else {
            TouchRef::Real(touch)
        };

        let mut highlight_changed = false;
        if self.active.remove(&touch_ref).is_some() {
            highlight_changed = true;
            match down.action {
                Some(a) if a.is_shift() => self.have_shift = false,
                Some(KeyAction::Capslock) if self.have_capslock => {
                    self.active.insert(TouchRef::CapslockPseudo, down.position);
                }
                _ => {}
            }
        }

        Response {
            activation: None,
            layout_requested: false,
            mode_changed: self.mode() != mode_before,
            highlight_changed,
        }
    }

    /// A grabbed touch was cancelled by the delivery system.
    ///
    /// Treated identically to touch-up: without this, the active-key map
    /// would leak entries for contacts that never report an up.
    pub fn cancel(&mut self, touch: TouchId) -> Response {
        self.key_up(touch)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
