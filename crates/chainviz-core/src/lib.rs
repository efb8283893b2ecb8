//! Core analytics for coreference-chain visualisation.
//!
//! Consumes a flat list of [`Mention`] records and produces plain data for a
//! renderer: per-conversation timelines ([`timeline`]) and corpus-wide
//! reference-type transition statistics ([`transition`]). Every operation is
//! a pure function of its inputs; this crate does no I/O.

pub mod chain;
pub mod classify;
pub mod corpus;
pub mod error;
pub mod explorer;
pub mod mention;
pub mod reference;
pub mod salience;
pub mod timeline;
pub mod transition;

pub use error::{Error, Result};
pub use mention::{ChainKey, Mention};
pub use reference::{ReferenceType, TransitionState};
