//! # keyplane
//!
//! The core of a data-driven, multi-touch on-screen keyboard.
//!
//! Key layouts are declarative row/column tables; keyplane compiles them
//! into pixel rectangles for arbitrary widget sizes and margins, inverts
//! that mapping to resolve touches back to keys, and tracks modifier and
//! key-down state across any number of concurrent touch contacts. It draws
//! nothing and reads no files: renderers, input sinks, and layout storage
//! are external collaborators reached through value types.
//!
//! ## Core Systems
//!
//! - **[`geometry`]** — Point, Size, HintRect, PixelRect, Margins primitives
//! - **[`layout`]** — Layout tables, key definitions, validation
//! - **[`layout::source`]** — JSON layout descriptions, built-in qwerty
//! - **[`layout::catalog`]** — Named layout registry with fallback resolution
//! - **[`layout::compile`]** — Two-stage hint/pixel geometry compiler
//! - **[`layout::hit`]** — Touch-to-key hit testing
//! - **[`event`]** — Touch identity and key-activation events
//! - **[`state`]** — Multi-touch key state machine and mode resolution
//! - **[`keyboard`]** — Facade tying everything together

// Foundation
pub mod geometry;

// Layout tables and geometry
pub mod layout;

// Events and touch state
pub mod event;
pub mod state;

// Facade
pub mod keyboard;
