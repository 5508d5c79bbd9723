//! A small, protocol-agnostic framework for streaming application-layer
//! parsing, of the kind a network intrusion detection engine runs over
//! reassembled TCP byte streams.
//!
//! The framework does not own flows, timeouts, or byte delivery — a host
//! (e.g. a stream reassembly engine) hands it chunks of bytes as they
//! arrive, tagged with a direction and an end-of-stream flag, and the
//! framework's [`dispatch::parse`] drives whichever protocol is
//! registered for that flow through its field-extraction cascade,
//! producing typed protocol state the host can inspect or subscribe to.
//!
//! Seven pieces make this up:
//!
//! - [`spm`]: single-pattern delimiter search.
//! - [`pool`]: thread-local recycling of the buffers behind owned fields.
//! - [`parse_state`]: per-direction carry-over, cursor, and EOF tracking
//!   across chunk boundaries.
//! - [`field`]: field identifiers, the borrowed/owned byte sum type, and
//!   the per-call result list.
//! - [`registry`]: the one-shot `RegistryBuilder` → immutable `Registry`
//!   that maps protocols and fields to parsers.
//! - [`dispatch`]: the recursive dispatcher that drives a direction's
//!   cascade and recurses into subparsers as fields are emitted.
//! - [`protocols::http`]: the HTTP/1.x exemplar protocol cascade built on
//!   top of all of the above.
//!
//! [`flow::Flow`] ties the last three together into what a host actually
//! holds one of per tracked connection.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod field;
pub mod flow;
pub mod parse_state;
pub mod pool;
pub mod protocols;
pub mod registry;
pub mod spm;

pub use error::ParserError;
pub use flow::Flow;
pub use registry::{Registry, RegistryBuilder};

/// Builds the [`Registry`] for every protocol this crate ships — today,
/// just [`protocols::http`]. A host embedding more protocols would extend
/// this the same way `protocols::http::register` is called here.
pub fn build_registry() -> Result<Registry, ParserError> {
    let mut builder = RegistryBuilder::new();
    protocols::http::register(&mut builder);
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_builds_cleanly() {
        build_registry().expect("shipped protocols must register without error");
    }
}
