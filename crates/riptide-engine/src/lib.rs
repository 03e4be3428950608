//! Transfer-engine binding for the workspace.
//!
//! A cloneable [`MagnetEngine`] front enqueues commands over a bounded
//! channel to a background worker that owns the session backend; per-transfer
//! handles carry the transfer id plus a clone of the command sender. The
//! default backend is [`session::SimSession`], a simulated session that
//! stands in until a native libtorrent-backed session lands.

mod adapter;
mod command;
mod worker;

pub mod magnet;
pub mod session;

pub use adapter::MagnetEngine;
pub use magnet::{MagnetError, ParsedMagnet, parse_magnet};
pub use session::{Session, SimProfile, SimSession, TransferId, TransferMetadata};
