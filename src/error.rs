//! Error types for the streaming parser framework.
//!
//! Transient conditions (delimiter not yet found, field incomplete) are not
//! errors at all — they are represented by [`crate::field::FieldStatus`].
//! `ParserError` covers only the two kinds of failure `spec.md` §7 calls
//! fatal: resource exhaustion and contract violations at registration or
//! dispatch time.

use thiserror::Error;

use crate::field::FieldId;

/// Fatal errors raised by the registry or the dispatcher.
#[derive(Error, Debug)]
pub enum ParserError {
    /// A carry buffer or result element could not be allocated.
    #[error("allocation failed while buffering field data")]
    Alloc,

    /// A subparser reported [`crate::dispatch::StepStatus::Fatal`] on a
    /// dispatched field. Mirrors `AppLayerDoParse` capturing a negative
    /// recursive return, breaking its loop, and setting `retval = -1` so the
    /// failure reaches the outer `parse()` caller.
    #[error("subparser for protocol {protocol:?} field {field_id} reported a fatal error")]
    SubparserFailed {
        protocol: &'static str,
        field_id: FieldId,
    },

    /// `parse` was called for a (protocol, direction) pair with no
    /// registered top-level parser.
    #[error("no top-level parser registered for protocol {protocol:?} direction {direction:?}")]
    NoTopParser {
        protocol: &'static str,
        direction: &'static str,
    },

    /// `finalize()` detected a cycle in the subparser registration graph.
    #[error("subparser registration graph contains a cycle reachable from {protocol}")]
    Cycle { protocol: &'static str },

    /// A subparser was registered against a parent name that was never
    /// itself registered as a protocol or subparser.
    #[error("subparser {name:?} declares unknown parent {parent:?}")]
    UnknownParent {
        name: &'static str,
        parent: &'static str,
    },
}
