//! The recursive dispatcher: drives a direction's top-level parser across
//! chunk boundaries and, for every field it emits that has a registered
//! subparser, recurses into that subparser on the field's own bytes.
//!
//! This is the Rust rendition of `original_source/src/app-layer-parser.c`'s
//! `AppLayerDoParse` / `AppLayerParse`. The source recurses through a
//! fixed two-level table (`al_proto_table` → `al_parser_table`); here the
//! recursion is unbounded in depth (anything [`crate::registry::Registry`]
//! wires up), matching `spec.md` §4.F's generic cascade description rather
//! than HTTP's specific two-level shape.

use std::any::Any;

use crate::error::ParserError;
use crate::field::ResultList;
use crate::parse_state::{ParseState, ParseStateStore};
use crate::registry::Registry;

/// Outcome of a top-level parser invocation for one chunk.
pub enum DispatchOutcome {
    /// The parser's cascade reached its terminal step; its cursor has been
    /// reset to `0` and it is ready to parse the next top-level unit (e.g.
    /// the next HTTP request on the same connection, in protocols that
    /// allow it).
    Complete,
    /// Not enough data yet; carry-over has been stored and the cursor left
    /// where it was.
    Incomplete,
    /// The parser detected a contract violation it cannot recover from.
    Error(ParserError),
}

/// Outcome of a single subparser invocation, always run in one shot on a
/// complete, forced-EOF buffer (a field already extracted by its parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The subparser's cascade completed.
    Complete,
    /// The subparser's cascade did not complete on the bytes it was given.
    /// Since subparsers always run on a bounded, EOF-terminated buffer,
    /// this means the field was malformed — there is no "wait for more"
    /// here, unlike a top-level parser's `Incomplete`.
    Incomplete,
    /// The subparser detected data it refuses to process further (e.g. a
    /// step that is only ever reached via a contract the caller violated).
    Fatal,
}

/// Implemented by a protocol's top-level, per-direction parser: the entry
/// point the dispatcher calls for every chunk arriving in that direction.
pub trait TopParser: Send + Sync {
    fn parse<'a>(
        &self,
        state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> DispatchOutcome;
}

/// Implemented by a subparser registered against a parent's field id: runs
/// its own cascade on exactly the bytes of that one field.
pub trait StepParser: Send + Sync {
    fn parse<'a>(
        &self,
        state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> StepStatus;
}

/// Parses one chunk of `input` arriving in direction `to_server` for
/// `protocol`, recursing into every field's subparser as the top-level
/// parser emits it.
///
/// `eof` marks this as the last chunk this direction will ever see (e.g.
/// connection close, or a framing layer's explicit end-of-message signal).
/// Matches `AppLayerParse`'s `(f, alstate, pstate, input, input_len,
/// output, flags)` entry point, minus flow lookup — the caller already
/// holds `state` and `pstate_store` for the flow in question.
pub fn parse(
    registry: &Registry,
    protocol: &'static str,
    to_server: bool,
    state: &mut dyn Any,
    pstate_store: &mut ParseStateStore,
    input: &[u8],
    eof: bool,
) -> Result<(), ParserError> {
    let direction = if to_server { "to_server" } else { "to_client" };
    let pstate = pstate_store.for_direction(to_server);
    if eof {
        pstate.set_eof();
    }

    // A fresh direction pins its top-level parser once; later chunks reuse
    // that same entry rather than re-resolving it from `(protocol,
    // direction)`, matching `dir.current_parser = registry[proto].top[dir]`
    // assigned only "if dir is fresh".
    let top = match pstate.current_parser() {
        Some(key) => registry.top_parser_by_key(key).ok_or_else(|| {
            log::warn!("pinned parser for {protocol:?} {direction} vanished from the registry");
            ParserError::NoTopParser { protocol, direction }
        })?,
        None => {
            let (key, top) = registry.top_parser(protocol, to_server).ok_or_else(|| {
                log::warn!("no top-level parser registered for {protocol:?} {direction}");
                ParserError::NoTopParser { protocol, direction }
            })?;
            pstate.set_current_parser(key);
            top
        }
    };

    let mut output = ResultList::new();
    let outcome = top.parse(state, pstate, input, &mut output);

    // Fields are dispatched to subparsers regardless of whether the
    // top-level cascade itself completed this call — a field already
    // reported Complete by the cascade is fully formed even if the
    // cascade as a whole is waiting on more data for its next field.
    let dispatch_result = dispatch_fields(registry, protocol, state, pstate, output);

    match outcome {
        DispatchOutcome::Error(e) => {
            log::error!("{protocol} {direction} parser reported a fatal error: {e}");
            Err(e)
        }
        DispatchOutcome::Complete | DispatchOutcome::Incomplete => dispatch_result,
    }
}

/// Recurses into every emitted field's subparser, if one is registered,
/// then releases the field's bytes back to the pool.
///
/// The recursive call reuses the *same* `ParseState` the parent cascade is
/// using rather than allocating a fresh one, saving and restoring the
/// cursor and forcing EOF on for the duration of the call — exactly what
/// `AppLayerDoParse` does around its own recursive call (save
/// `parser_state->parse_field`, set `APP_LAYER_PARSER_EOF`, recurse,
/// restore both). A field's bytes are already a complete, bounded unit, so
/// forcing EOF is always correct for the nested call; reusing the same
/// `ParseState` rather than a fresh one preserves that restore step
/// instead of inventing a simpler-but-different scheme.
///
/// Unlike `AppLayerDoParse`, this also saves and restores `carry`: the
/// field being dispatched here already completed, but the parent cascade
/// may have buffered carry-over for its *next*, still-pending step (e.g. a
/// request line completing while headers are mid-parse in the same
/// chunk). Without isolating it, the subparser's own `extract_by_delimiter`
/// call would see that unrelated carry and splice it into this field.
///
/// Returns `Err` the first time a subparser reports
/// [`StepStatus::Fatal`], after which no further field in this call is
/// dispatched — mirroring `AppLayerDoParse`'s own loop, which captures the
/// recursive call's return value, `break`s on a negative result, and sets
/// `retval = -1` so the failure reaches the outer `AppLayerParse` caller
/// (`app-layer-parser.c:409-416`). Every element's bytes are still released
/// back to the pool regardless of where the break happens, matching
/// `AppLayerParserResultCleanup` freeing the whole result list after the
/// loop exits either way.
fn dispatch_fields<'a>(
    registry: &Registry,
    protocol: &'static str,
    state: &mut dyn Any,
    pstate: &mut ParseState,
    output: ResultList<'a>,
) -> Result<(), ParserError> {
    let mut fatal: Option<ParserError> = None;
    for element in output.into_iter() {
        if fatal.is_none() {
            if let Some((_, sub)) = registry.subparser_for_field(protocol, element.field_id) {
                let saved_cursor = pstate.field_cursor();
                let was_eof = pstate.is_eof();
                let saved_carry = pstate.take_carry();
                pstate.reset_cursor();
                pstate.set_eof();

                let mut nested = ResultList::new();
                let status = sub.parse(state, pstate, element.bytes.as_slice(), &mut nested);

                if !was_eof {
                    pstate.clear_eof();
                }
                pstate.set_cursor(saved_cursor);
                pstate.set_carry(saved_carry);

                if status == StepStatus::Fatal {
                    let field_id = element.field_id;
                    log::error!(
                        "subparser for protocol {protocol:?} field {field_id} reported a fatal error"
                    );
                    fatal = Some(ParserError::SubparserFailed { protocol, field_id });
                } else if let Err(e) = dispatch_fields(registry, protocol, state, pstate, nested) {
                    fatal = Some(e);
                }
            }
        }
        element.bytes.release();
    }
    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
