//! Protocol registry: the immutable, post-init table mapping
//! `(protocol, direction)` to top-level parsers and `(protocol, field id)`
//! to subparsers.
//!
//! `original_source/src/app-layer-parser.c` keeps this as a pair of fixed
//! global arrays (`al_proto_table`, `al_parser_table`) mutated in place
//! during a one-shot init, then read for the lifetime of the process. Per
//! the Design Notes in `spec.md` §9 this becomes a value type: a
//! [`RegistryBuilder`] performs the registration calls and `finalize()`
//! consumes it into a [`Registry`] that is never mutated again — sharable
//! across worker threads behind an `Arc` with no locking, the same
//! read-only-after-init guarantee `retina-core`'s `ParserRegistry` and
//! filter predicate tree (`filter/ptree.rs`, built once from the parsed
//! filter AST) both rely on.

use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;

use crate::dispatch::{StepParser, TopParser};
use crate::error::ParserError;
use crate::field::FieldId;

/// Identifies a registered top-level parser or subparser. Opaque to
/// protocol authors; only the registry and dispatcher interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserKey(usize);

/// A registered protocol-state storage slot index, assigned on first
/// `register_protocol` call for a given protocol name (one slot shared by
/// both directions, matching `AppLayerRegisterProto`'s
/// `if (al_proto_table[proto].storage_id == 0)` guard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageSlot(pub usize);

struct Entry {
    name: &'static str,
    parser: ParserEntryKind,
    /// `None` for top-level entries; `Some(parent)` for subparsers.
    parent: Option<&'static str>,
    local_field_id: FieldId,
}

enum ParserEntryKind {
    Top(Box<dyn TopParser>),
    Sub(Box<dyn StepParser>),
}

/// Per-protocol lifecycle hooks for allocating/freeing its protocol-state.
pub struct StateFuncs {
    pub alloc: fn() -> Box<dyn std::any::Any + Send>,
}

struct ProtocolEntry {
    storage_slot: StorageSlot,
    to_server: Option<ParserKey>,
    to_client: Option<ParserKey>,
    state_funcs: Option<StateFuncs>,
    /// `field_map[local_field_id] = subparser key`, sized to
    /// `max_local_field_id + 1`; index 0 ([`crate::field::FIELD_NONE`]) is
    /// always absent.
    field_map: HashMap<FieldId, ParserKey>,
}

/// Builder for the one-shot registration phase. Every registration method
/// mirrors a function from `spec.md` §4.E / §6.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    protocols: HashMap<&'static str, ProtocolEntry>,
    next_slot: usize,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder {
            entries: Vec::new(),
            protocols: HashMap::new(),
            next_slot: 1, // slot 0 is reserved for the parse-state store
        }
    }

    /// Returns `protocol`'s entry, creating it (and assigning it a fresh
    /// storage slot) on first mention by *any* registration method. Slot
    /// assignment no longer depends on `register_protocol` being the first
    /// call for a protocol — `register_subparser` or `register_state_funcs`
    /// arriving first used to leave the entry pinned at a placeholder slot
    /// `0` forever, colliding with the parse-state store's reserved slot.
    fn protocol_entry(&mut self, protocol: &'static str) -> &mut ProtocolEntry {
        if !self.protocols.contains_key(protocol) {
            let slot = StorageSlot(self.next_slot);
            self.next_slot += 1;
            self.protocols.insert(
                protocol,
                ProtocolEntry {
                    storage_slot: slot,
                    to_server: None,
                    to_client: None,
                    state_funcs: None,
                    field_map: HashMap::new(),
                },
            );
        }
        self.protocols.get_mut(protocol).expect("just inserted")
    }

    /// Registers the top-level parser for `protocol`'s `direction`. On a
    /// protocol's first registration (either direction), assigns it a fresh
    /// protocol-state storage slot.
    pub fn register_protocol(
        &mut self,
        name: &'static str,
        protocol: &'static str,
        to_server: bool,
        top_parser: Box<dyn TopParser>,
    ) {
        let key = ParserKey(self.entries.len());
        self.entries.push(Entry {
            name,
            parser: ParserEntryKind::Top(top_parser),
            parent: None,
            local_field_id: FieldId::default(),
        });

        let proto_entry = self.protocol_entry(protocol);
        if to_server {
            proto_entry.to_server = Some(key);
        } else {
            proto_entry.to_client = Some(key);
        }
    }

    /// Declares that whenever `parent_name`'s parser produces a field with
    /// identifier `local_field_id`, `subparser` should be invoked on that
    /// field's bytes.
    pub fn register_subparser(
        &mut self,
        name: &'static str,
        protocol: &'static str,
        local_field_id: FieldId,
        subparser: Box<dyn StepParser>,
        parent_name: &'static str,
    ) {
        let key = ParserKey(self.entries.len());
        self.entries.push(Entry {
            name,
            parser: ParserEntryKind::Sub(subparser),
            parent: Some(parent_name),
            local_field_id,
        });

        self.protocol_entry(protocol).field_map.insert(local_field_id, key);
    }

    /// Wires the protocol-state lifecycle for `protocol`.
    pub fn register_state_funcs(&mut self, protocol: &'static str, alloc: StateFuncs) {
        self.protocol_entry(protocol).state_funcs = Some(alloc);
    }

    /// Consumes the builder, checking that every subparser's declared
    /// parent was actually registered and that the registration graph is
    /// acyclic (depth is bounded by construction — top parser → line parser
    /// → leaf — but a misregistration could in principle create a cycle;
    /// `retina-core` already depends on `petgraph`, used here for the same
    /// kind of graph well-formedness check its filter predicate tree does).
    pub fn finalize(self) -> Result<Registry, ParserError> {
        let mut graph = DiGraph::<(), ()>::new();
        let mut node_for_name: HashMap<&'static str, petgraph::graph::NodeIndex> = HashMap::new();
        for e in &self.entries {
            node_for_name
                .entry(e.name)
                .or_insert_with(|| graph.add_node(()));
        }
        for e in &self.entries {
            if let Some(parent) = e.parent {
                let parent_idx = *node_for_name.get(parent).ok_or(ParserError::UnknownParent {
                    name: e.name,
                    parent,
                })?;
                let child_idx = node_for_name[e.name];
                graph.add_edge(parent_idx, child_idx, ());
            }
        }
        if is_cyclic_directed(&graph) {
            log::error!("registration graph contains a cycle, refusing to finalize");
            return Err(ParserError::Cycle {
                protocol: self
                    .entries
                    .first()
                    .map(|e| e.name)
                    .unwrap_or("<unknown>"),
            });
        }

        log::trace!(
            "registry finalized: {} parsers across {} protocols",
            self.entries.len(),
            self.protocols.len()
        );
        Ok(Registry {
            entries: self.entries,
            protocols: self.protocols,
        })
    }
}

/// The immutable, read-only-after-init registry. Cheap to share across
/// worker threads behind an `Arc` since no field is ever mutated after
/// `finalize()`.
pub struct Registry {
    entries: Vec<Entry>,
    protocols: HashMap<&'static str, ProtocolEntry>,
}

impl Registry {
    pub fn top_parser(&self, protocol: &str, to_server: bool) -> Option<(ParserKey, &dyn TopParser)> {
        let proto = self.protocols.get(protocol)?;
        let key = if to_server {
            proto.to_server?
        } else {
            proto.to_client?
        };
        match &self.entries[key.0].parser {
            ParserEntryKind::Top(p) => Some((key, p.as_ref())),
            ParserEntryKind::Sub(_) => None,
        }
    }

    /// Resolves a previously-assigned [`ParserKey`] back to its top-level
    /// parser — used once a direction's `current_parser` has been pinned,
    /// so later chunks invoke the same entry without re-resolving it from
    /// `(protocol, direction)` each time (`spec.md` §4.C/§4.F).
    pub fn top_parser_by_key(&self, key: ParserKey) -> Option<&dyn TopParser> {
        match &self.entries[key.0].parser {
            ParserEntryKind::Top(p) => Some(p.as_ref()),
            ParserEntryKind::Sub(_) => None,
        }
    }

    pub fn subparser_for_field(&self, protocol: &str, field_id: FieldId) -> Option<(ParserKey, &dyn StepParser)> {
        let proto = self.protocols.get(protocol)?;
        let key = *proto.field_map.get(&field_id)?;
        match &self.entries[key.0].parser {
            ParserEntryKind::Sub(p) => Some((key, p.as_ref())),
            ParserEntryKind::Top(_) => None,
        }
    }

    pub fn storage_slot(&self, protocol: &str) -> Option<StorageSlot> {
        self.protocols.get(protocol).map(|p| p.storage_slot)
    }

    pub fn state_alloc(&self, protocol: &str) -> Option<&StateFuncs> {
        self.protocols.get(protocol).and_then(|p| p.state_funcs.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchOutcome, StepParser, StepStatus, TopParser};
    use crate::field::ResultList;
    use crate::parse_state::ParseState;

    struct NoopTop;
    impl TopParser for NoopTop {
        fn parse<'a>(
            &self,
            _state: &mut dyn std::any::Any,
            _pstate: &mut ParseState,
            _input: &'a [u8],
            _output: &mut ResultList<'a>,
        ) -> DispatchOutcome {
            DispatchOutcome::Complete
        }
    }

    struct NoopSub;
    impl StepParser for NoopSub {
        fn parse<'a>(
            &self,
            _state: &mut dyn std::any::Any,
            _pstate: &mut ParseState,
            _input: &'a [u8],
            _output: &mut ResultList<'a>,
        ) -> StepStatus {
            StepStatus::Fatal
        }
    }

    #[test]
    fn unknown_parent_is_rejected_at_finalize() {
        let mut b = RegistryBuilder::new();
        b.register_subparser("proto.sub", "proto", 1, Box::new(NoopSub), "proto.missing");
        assert!(matches!(
            b.finalize(),
            Err(ParserError::UnknownParent { .. })
        ));
    }

    #[test]
    fn cycle_is_rejected_at_finalize() {
        let mut b = RegistryBuilder::new();
        // a depends on b, b depends on a: a genuine cycle in the
        // registration graph, which should never arise from real
        // protocol authoring but must still be caught.
        b.register_subparser("a", "proto", 1, Box::new(NoopSub), "b");
        b.register_subparser("b", "proto", 2, Box::new(NoopSub), "a");
        assert!(matches!(b.finalize(), Err(ParserError::Cycle { .. })));
    }

    #[test]
    fn storage_slot_assigned_once_per_protocol() {
        let mut b = RegistryBuilder::new();
        b.register_protocol("proto", "proto", true, Box::new(NoopTop));
        b.register_protocol("proto", "proto", false, Box::new(NoopTop));
        let reg = b.finalize().unwrap();
        assert!(reg.storage_slot("proto").is_some());
        assert!(reg.top_parser("proto", true).is_some());
        assert!(reg.top_parser("proto", false).is_some());
    }

    #[test]
    fn storage_slot_is_not_pinned_to_placeholder_when_subparser_registers_first() {
        let mut b = RegistryBuilder::new();
        // Register a second protocol's top parser first, so "proto"'s slot
        // would be the second one assigned if ordering mattered.
        b.register_protocol("other.top", "other", true, Box::new(NoopTop));
        b.register_subparser("proto.sub", "proto", 1, Box::new(NoopSub), "proto.top");
        b.register_protocol("proto.top", "proto", true, Box::new(NoopTop));
        let reg = b.finalize().unwrap();

        let proto_slot = reg.storage_slot("proto").unwrap();
        let other_slot = reg.storage_slot("other").unwrap();
        assert_ne!(proto_slot.0, 0, "slot 0 is reserved for the parse-state store");
        assert_ne!(proto_slot, other_slot);
    }
}
