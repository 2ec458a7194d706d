//! qrview — terminal QR code generator with live resizing.
//!
//! The symbol tracks the terminal geometry: a size probe turns pixel
//! measurements into a target dimension, and a keyed regeneration pipeline
//! re-encodes the bitmap whenever the request identity (text, level, size)
//! changes, discarding results that arrive for a superseded request.

pub mod config;
pub mod encode;
pub mod generator;
pub mod permalink;
pub mod probe;
pub mod request;
pub mod size_mode;
pub mod viewer;
pub mod watch;
