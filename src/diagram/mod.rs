//! Diagram core: geometry constants, pure layout, viewport transform and the
//! interaction state machine. Everything here is renderer-agnostic.

pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod viewport;
