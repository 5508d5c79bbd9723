//! Per-direction parse state: carry-over bytes, cursor position, and the
//! in-progress/EOF-seen flags.
//!
//! Mirrors `original_source/src/app-layer-parser.c`'s `ParserState`
//! (`store`, `store_len`, `parse_field`, `flags`) and the pair of them kept
//! per flow in `f->alparser`. One [`ParseState`] exists per direction; a
//! [`ParseStateStore`] bundles the to-server/to-client pair the same way
//! `AppLayerParserStateStore` does.

use bitmask_enum::bitmask;

use crate::registry::ParserKey;

/// Status flags tracked alongside a direction's cursor and carry-over.
/// Grounded in `retina-core`'s `filter/actions.rs` `#[bitmask] enum
/// ActionData` — a packed bitset is the idiomatic replacement for the
/// source's `uint8_t flags` with `APP_LAYER_PARSER_EOF` /
/// `APP_LAYER_PARSER_NO_INSPECTION` style constants.
#[bitmask(u8)]
pub enum ParseFlags {
    /// The current chunk is the last one this direction will ever see.
    EofSeen,
}

/// One direction's parsing progress across chunk boundaries.
///
/// # Invariants (`spec.md` §3/§4.C)
///
/// - `carry` is non-empty only between calls, never observed non-empty by
///   a parser mid-call: every extractor either consumes it immediately at
///   the top of the call or replaces it before returning.
/// - `current_parser` is assigned once a top-level parser has decided
///   which cascade step is active, and is stable for the lifetime of the
///   direction.
/// - `field_cursor` indexes which step of the current parser's cascade
///   runs next; it resets to `0` only when a parser's cascade reaches its
///   terminal step successfully.
#[derive(Debug)]
pub struct ParseState {
    carry: Vec<u8>,
    current_parser: Option<ParserKey>,
    field_cursor: usize,
    flags: ParseFlags,
}

impl Default for ParseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseState {
    pub fn new() -> Self {
        ParseState {
            carry: Vec::new(),
            current_parser: None,
            field_cursor: 0,
            flags: ParseFlags::none(),
        }
    }

    pub fn carry(&self) -> &[u8] {
        &self.carry
    }

    /// Takes ownership of the carry buffer, leaving an empty one behind.
    /// Used by an extractor that is about to either consume the carry into
    /// a straddling field or rebuild it with newly-appended bytes.
    pub fn take_carry(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.carry)
    }

    pub fn set_carry(&mut self, buf: Vec<u8>) {
        self.carry = buf;
    }

    pub fn has_carry(&self) -> bool {
        !self.carry.is_empty()
    }

    pub fn current_parser(&self) -> Option<ParserKey> {
        self.current_parser
    }

    pub fn set_current_parser(&mut self, key: ParserKey) {
        self.current_parser = Some(key);
    }

    pub fn field_cursor(&self) -> usize {
        self.field_cursor
    }

    pub fn advance_cursor(&mut self) {
        self.field_cursor += 1;
    }

    /// Resets the cursor to the start of a parser's cascade. Called when
    /// the cascade reaches its terminal step (`spec.md` §4.C).
    pub fn reset_cursor(&mut self) {
        self.field_cursor = 0;
    }

    /// Restores a previously saved cursor. Used by the dispatcher around a
    /// recursive subparser invocation on the same `ParseState`, mirroring
    /// `AppLayerDoParse`'s save/restore of `parser_state->parse_field`.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.field_cursor = cursor;
    }

    pub fn is_eof(&self) -> bool {
        self.flags.contains(ParseFlags::EofSeen)
    }

    pub fn set_eof(&mut self) {
        self.flags |= ParseFlags::EofSeen;
    }

    /// Clears the EOF flag. Used by the dispatcher to restore a direction's
    /// true EOF status after forcing it on for one recursive subparser call.
    pub fn clear_eof(&mut self) {
        self.flags &= !ParseFlags::EofSeen;
    }
}

/// The pair of [`ParseState`]s a flow keeps for a given protocol, one per
/// direction — the Rust rendition of `AppLayerParserStateStore`.
#[derive(Debug, Default)]
pub struct ParseStateStore {
    to_server: ParseState,
    to_client: ParseState,
}

impl ParseStateStore {
    pub fn new() -> Self {
        ParseStateStore {
            to_server: ParseState::new(),
            to_client: ParseState::new(),
        }
    }

    pub fn for_direction(&mut self, to_server: bool) -> &mut ParseState {
        if to_server {
            &mut self.to_server
        } else {
            &mut self.to_client
        }
    }
}
