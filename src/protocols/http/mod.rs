//! HTTP/1.x exemplar protocol: the cascade `spec.md` uses throughout to
//! pin down the framework's field-extraction and dispatch semantics.
//!
//! `register` wires every parser into a [`RegistryBuilder`] the same way
//! `original_source/src/app-layer-http.c`'s `RegisterHTTPParsers` wires
//! them into the global `al_proto_table`/`al_parser_table`.

mod fields;
mod parser;
mod state;

pub use state::{HttpMethod, HttpState};

use crate::registry::{RegistryBuilder, StateFuncs};

/// Name of the protocol as registered with the framework.
pub const PROTOCOL: &str = "http";

/// Registers the full HTTP cascade — both directions' top-level parsers,
/// both line parsers, and the two leaf field parsers — against `builder`.
pub fn register(builder: &mut RegistryBuilder) {
    builder.register_protocol(PROTOCOL, PROTOCOL, true, Box::new(parser::HttpRequestParser));
    builder.register_protocol(PROTOCOL, PROTOCOL, false, Box::new(parser::HttpResponseParser));

    builder.register_subparser(
        "http.request_line",
        PROTOCOL,
        fields::REQUEST_LINE,
        Box::new(parser::HttpRequestLineParser),
        PROTOCOL,
    );
    builder.register_subparser(
        "http.request.method",
        PROTOCOL,
        fields::REQUEST_METHOD,
        Box::new(parser::HttpRequestMethodParser),
        "http.request_line",
    );

    builder.register_subparser(
        "http.response_line",
        PROTOCOL,
        fields::RESPONSE_LINE,
        Box::new(parser::HttpResponseLineParser),
        PROTOCOL,
    );
    builder.register_subparser(
        "http.response.code",
        PROTOCOL,
        fields::RESPONSE_CODE,
        Box::new(parser::HttpResponseCodeParser),
        "http.response_line",
    );

    builder.register_state_funcs(
        PROTOCOL,
        StateFuncs {
            alloc: || Box::new(HttpState::new()),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_cycles_or_unknown_parents() {
        let mut builder = RegistryBuilder::new();
        register(&mut builder);
        let registry = builder.finalize().expect("http cascade registers cleanly");
        assert!(registry.top_parser(PROTOCOL, true).is_some());
        assert!(registry.top_parser(PROTOCOL, false).is_some());
        assert!(registry.state_alloc(PROTOCOL).is_some());
    }
}
