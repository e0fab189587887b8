//! # FoodBot Dialogue
//!
//! Turns a user's chat messages into ledger updates and replies.
//!
//! Each user has one [`DialogueState`]; the [`DialogueController`] serializes
//! every user's messages and drives the `/add` flow, limit updates, and
//! report requests. Transport concerns stay outside this crate: the
//! controller consumes text and selection payloads and returns [`Reply`]
//! values.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod command;
pub mod controller;
pub mod error;
pub mod reply;
pub mod selection;
pub mod state;

pub use clock::*;
pub use command::*;
pub use controller::*;
pub use error::*;
pub use reply::*;
pub use selection::*;
pub use state::*;
