//! Intermediate representation for partially built SQL.
//!
//! - [`Slot`]: one value awaiting escaping or binding
//! - [`Placeholder`]: a named slot that has not been supplied yet
//! - [`Composition`]: ordered text / slots / placeholders
//! - [`CompositionGroup`]: sibling compositions joined with a separator

mod composition;
mod group;
mod placeholder;
mod slot;

pub use composition::{Composition, Item, Piece, Segment};
pub use group::CompositionGroup;
pub use placeholder::Placeholder;
pub use slot::{Slot, SlotOptions};
