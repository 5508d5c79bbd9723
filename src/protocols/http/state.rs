//! Per-flow HTTP protocol state: the fields a detection engine actually
//! reads, as opposed to the transient parsing progress in
//! [`crate::parse_state::ParseState`].

/// The request method, so far as this parser bothers to distinguish.
/// Mirrors `original_source/src/app-layer-http.c`'s `HttpRequestMethod`
/// exactly — the original only special-cases GET and POST, and this is a
/// protocol exemplar rather than a complete method table, so no others are
/// invented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Unknown,
    Get,
    Post,
}

/// Protocol state for one HTTP flow, allocated once per flow and shared by
/// both directions' parsers.
#[derive(Debug, Default)]
pub struct HttpState {
    pub method: HttpMethod,
    pub response_code: u16,
}

impl HttpState {
    pub fn new() -> Self {
        HttpState::default()
    }
}
