//! Touch identity and output events, decoupled from any input stack.
//!
//! The host delivers touch contacts with opaque ids; the core never
//! inspects them beyond equality. The one special case is the capslock
//! highlight, which outlives any touch: it is tracked under a dedicated
//! [`TouchRef`] variant instead of a reserved magic id.

use serde::{Deserialize, Serialize};

use crate::layout::{KeyAction, KeyDef};

// ---------------------------------------------------------------------------
// TouchId / TouchRef
// ---------------------------------------------------------------------------

/// Opaque identifier of one touch contact, assigned by the host's input
/// stack. Unique among concurrently-down touches.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TouchId(pub u64);

/// Key type of the active-key map.
///
/// Real touches highlight under their own id for the duration of the
/// contact. The capslock indicator is a persistent pseudo-touch: it is
/// distinct from every real id and survives touch lifecycles while
/// capslock stays engaged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchRef {
    Real(TouchId),
    CapslockPseudo,
}

// ---------------------------------------------------------------------------
// KeyActivation
// ---------------------------------------------------------------------------

/// A key-activation event for the external input sink.
///
/// For `action: None` the sink inserts `payload` literally; for
/// backspace/enter/escape it performs the corresponding edit-control
/// behavior. Shift, capslock, and layout keys never activate — they only
/// mutate keyboard state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyActivation {
    /// Text shown on the key that fired.
    pub display: String,
    /// Literal text to insert when this is a character key.
    pub payload: String,
    /// Edit-control action, if any.
    pub action: Option<KeyAction>,
}

impl KeyActivation {
    /// Build the activation for a key definition.
    pub(crate) fn from_key(key: &KeyDef) -> Self {
        Self { display: key.display.clone(), payload: key.emit.clone(), action: key.action }
    }

    /// Whether this activation inserts literal text.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.action.is_none()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
