//! External process launching and supervision.
//!
//! A launch request is validated ([`launcher`]), spawned, and then either
//! governed to completion in the foreground ([`supervisor`]) or handed to
//! the shared [`registry`] to run in the background. Captured output flows
//! through [`output`] buffers; [`probe`] answers "is that pid still alive".

pub mod errors;
pub mod handler;
pub mod launcher;
pub mod output;
pub mod probe;
pub mod registry;
pub mod supervisor;
pub mod types;
