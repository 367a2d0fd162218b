//! Core dataflow primitives for reactive state
//!
//! - **[`Relay`]** - Type-safe event streaming over unbounded channels
//! - **[`Atom`]** - Observable value with explicit listener subscriptions
//!
//! Relays carry events out of a domain ("settings were applied"), Atoms
//! hold the state that collaborators observe ("comparison mode is on").

pub mod atom;
pub mod relay;

pub use atom::{Atom, Subscription};
pub use relay::{Relay, RelayError, relay};
