//! Per-flow storage: protocol state and parse state, indexed by the slot
//! the registry assigned each protocol at registration time.
//!
//! Mirrors Suricata's `Flow::l7data[]` / `f->alparser`: a flow is, from
//! this crate's point of view, nothing but a small table of opaque
//! protocol-state boxes and their matching [`ParseStateStore`]s. The host
//! owns connection tracking, timeouts, and flow lookup itself (`spec.md`
//! §6 names this an explicit Non-goal); this type only owns what a single
//! flow's worth of parser state looks like once the host has one to hand
//! to [`parse`](crate::dispatch::parse).

use std::any::Any;

use crate::dispatch;
use crate::error::ParserError;
use crate::parse_state::ParseStateStore;
use crate::registry::{Registry, StorageSlot};

/// One flow's parser-visible state: a protocol-state box and a
/// to-server/to-client [`ParseStateStore`] pair, lazily created on first
/// use and indexed by [`StorageSlot`].
#[derive(Default)]
pub struct Flow {
    protocol_states: Vec<Option<Box<dyn Any + Send>>>,
    parse_states: Vec<Option<ParseStateStore>>,
}

impl Flow {
    pub fn new() -> Self {
        Flow {
            protocol_states: Vec::new(),
            parse_states: Vec::new(),
        }
    }

    fn ensure_slot(&mut self, slot: StorageSlot) {
        let idx = slot.0;
        if self.protocol_states.len() <= idx {
            self.protocol_states.resize_with(idx + 1, || None);
            self.parse_states.resize_with(idx + 1, || None);
        }
    }

    /// Returns a typed view of this flow's protocol-state for `protocol`,
    /// if it has been allocated (i.e. at least one [`Flow::handle`] call
    /// has been made for it) and `T` matches what was registered.
    pub fn state<T: Any>(&self, registry: &Registry, protocol: &str) -> Option<&T> {
        let slot = registry.storage_slot(protocol)?;
        self.protocol_states.get(slot.0)?.as_deref()?.downcast_ref::<T>()
    }

    /// Feeds one chunk of `input`, arriving in direction `to_server`, for
    /// `protocol` into this flow's parser state, recursing into every
    /// field's subparser as it is emitted.
    ///
    /// The Rust rendition of `AppLayerParse(f, proto, flags, input,
    /// input_len)`: the source looks up `f->l7data[al_proto_table[proto]
    /// .storage_id]` and `f->alparser` before calling `AppLayerDoParse`;
    /// here that lookup is `protocol_state` / `parse_state_store`.
    pub fn handle(
        &mut self,
        registry: &Registry,
        protocol: &'static str,
        to_server: bool,
        input: &[u8],
        eof: bool,
    ) -> Result<(), ParserError> {
        let slot = registry.storage_slot(protocol).ok_or_else(|| {
            log::warn!("handle() called for unregistered protocol {protocol:?}");
            ParserError::NoTopParser {
                protocol,
                direction: if to_server { "to_server" } else { "to_client" },
            }
        })?;
        self.ensure_slot(slot);

        if self.protocol_states[slot.0].is_none() {
            let funcs = registry
                .state_alloc(protocol)
                .expect("protocol registered without state_funcs");
            self.protocol_states[slot.0] = Some((funcs.alloc)());
        }
        // Taken out rather than borrowed in place so that `pstate_store`,
        // a borrow of the sibling `parse_states` field, can coexist with
        // it without the borrow checker needing to see through two
        // `Vec` index expressions into disjoint allocations.
        let mut state = self.protocol_states[slot.0].take().unwrap();
        let pstate_store = self.parse_states[slot.0].get_or_insert_with(ParseStateStore::new);

        let result = dispatch::parse(
            registry,
            protocol,
            to_server,
            state.as_mut(),
            pstate_store,
            input,
            eof,
        );
        self.protocol_states[slot.0] = Some(state);
        result
    }
}
