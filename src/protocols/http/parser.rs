//! The HTTP cascade: request/response top-level parsers, their line
//! parsers, and the two leaf field parsers (method, status code).
//!
//! Every cascade step below is a direct port of the matching `case` in
//! `original_source/src/app-layer-http.c`'s `HTTPParseRequest`,
//! `HTTPParseResponse`, `HTTPParseRequestLine`, `HTTPParseResponseLine`,
//! `HTTPParseRequestMethod`, and `HTTPParseResponseCode` — same field
//! order, same delimiters, same early-return-on-incomplete behavior.

use std::any::Any;

use crate::dispatch::{DispatchOutcome, StepParser, StepStatus, TopParser};
use crate::extract::{extract_by_delimiter, extract_by_eof};
use crate::field::{FieldStatus, ResultList};
use crate::parse_state::ParseState;

use super::fields;
use super::state::{HttpMethod, HttpState};

fn http_state(state: &mut dyn Any) -> &mut HttpState {
    state.downcast_mut::<HttpState>().expect("http protocol state")
}

/// `HTTPParseRequest`: request line, then headers, then an EOF-terminated
/// body (this exemplar has no `Content-Length` or chunked-encoding
/// awareness, matching the original's Non-goal scope).
pub struct HttpRequestParser;

impl TopParser for HttpRequestParser {
    fn parse<'a>(
        &self,
        _state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> DispatchOutcome {
        let mut offset = 0usize;
        let mut cursor = pstate.field_cursor();

        if cursor == 0 {
            let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b"\r\n");
            offset += consumed;
            match status {
                FieldStatus::Complete => {
                    if let Some(bytes) = field {
                        output.push(fields::REQUEST_LINE, bytes);
                    }
                    cursor = 1;
                }
                FieldStatus::NeedsMore => {
                    pstate.set_cursor(0);
                    return DispatchOutcome::Incomplete;
                }
            }
        }

        if cursor == 1 {
            let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b"\r\n\r\n");
            offset += consumed;
            match status {
                FieldStatus::Complete => {
                    if let Some(bytes) = field {
                        output.push(fields::REQUEST_HEADERS, bytes);
                    }
                    cursor = 2;
                }
                FieldStatus::NeedsMore => {
                    pstate.set_cursor(1);
                    return DispatchOutcome::Incomplete;
                }
            }
        }

        // cursor == 2: body, terminated by EOF.
        let eof = pstate.is_eof();
        let (status, field) = extract_by_eof(pstate, &input[offset..], eof);
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::REQUEST_BODY, bytes);
                }
                pstate.reset_cursor();
                DispatchOutcome::Complete
            }
            FieldStatus::NeedsMore => {
                pstate.set_cursor(2);
                DispatchOutcome::Incomplete
            }
        }
    }
}

/// `HTTPParseResponse`: response line, headers, EOF-terminated body.
pub struct HttpResponseParser;

impl TopParser for HttpResponseParser {
    fn parse<'a>(
        &self,
        _state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> DispatchOutcome {
        let mut offset = 0usize;
        let mut cursor = pstate.field_cursor();

        if cursor == 0 {
            let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b"\r\n");
            offset += consumed;
            match status {
                FieldStatus::Complete => {
                    if let Some(bytes) = field {
                        output.push(fields::RESPONSE_LINE, bytes);
                    }
                    cursor = 1;
                }
                FieldStatus::NeedsMore => {
                    pstate.set_cursor(0);
                    return DispatchOutcome::Incomplete;
                }
            }
        }

        if cursor == 1 {
            let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b"\r\n\r\n");
            offset += consumed;
            match status {
                FieldStatus::Complete => {
                    if let Some(bytes) = field {
                        output.push(fields::RESPONSE_HEADERS, bytes);
                    }
                    cursor = 2;
                }
                FieldStatus::NeedsMore => {
                    pstate.set_cursor(1);
                    return DispatchOutcome::Incomplete;
                }
            }
        }

        let eof = pstate.is_eof();
        let (status, field) = extract_by_eof(pstate, &input[offset..], eof);
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::RESPONSE_BODY, bytes);
                }
                pstate.reset_cursor();
                DispatchOutcome::Complete
            }
            FieldStatus::NeedsMore => {
                pstate.set_cursor(2);
                DispatchOutcome::Incomplete
            }
        }
    }
}

/// `HTTPParseRequestLine`: method, URI, then an EOF-terminated version
/// (runs once, on the whole request line, with EOF forced by the
/// dispatcher — see `crate::dispatch`).
pub struct HttpRequestLineParser;

impl StepParser for HttpRequestLineParser {
    fn parse<'a>(
        &self,
        _state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> StepStatus {
        let mut offset = 0usize;

        let (status, field, consumed) = extract_by_delimiter(pstate, input, b" ");
        offset += consumed;
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::REQUEST_METHOD, bytes);
                }
            }
            FieldStatus::NeedsMore => return StepStatus::Incomplete,
        }

        let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b" ");
        offset += consumed;
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::REQUEST_URI, bytes);
                }
            }
            FieldStatus::NeedsMore => return StepStatus::Incomplete,
        }

        let (status, field) = extract_by_eof(pstate, &input[offset..], true);
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::REQUEST_VERSION, bytes);
                }
                StepStatus::Complete
            }
            FieldStatus::NeedsMore => StepStatus::Incomplete,
        }
    }
}

/// `HTTPParseResponseLine`: version, code, then an EOF-terminated reason
/// phrase.
pub struct HttpResponseLineParser;

impl StepParser for HttpResponseLineParser {
    fn parse<'a>(
        &self,
        _state: &mut dyn Any,
        pstate: &mut ParseState,
        input: &'a [u8],
        output: &mut ResultList<'a>,
    ) -> StepStatus {
        let mut offset = 0usize;

        let (status, field, consumed) = extract_by_delimiter(pstate, input, b" ");
        offset += consumed;
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::RESPONSE_VERSION, bytes);
                }
            }
            FieldStatus::NeedsMore => return StepStatus::Incomplete,
        }

        let (status, field, consumed) = extract_by_delimiter(pstate, &input[offset..], b" ");
        offset += consumed;
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::RESPONSE_CODE, bytes);
                }
            }
            FieldStatus::NeedsMore => return StepStatus::Incomplete,
        }

        let (status, field) = extract_by_eof(pstate, &input[offset..], true);
        match status {
            FieldStatus::Complete => {
                if let Some(bytes) = field {
                    output.push(fields::RESPONSE_MSG, bytes);
                }
                StepStatus::Complete
            }
            FieldStatus::NeedsMore => StepStatus::Incomplete,
        }
    }
}

/// `HTTPParseRequestMethod`: recognizes `GET` and `POST`, leaves
/// `HttpMethod::Unknown` for anything else. Not a cascade — runs once on
/// the whole method field and always reports success, matching the
/// source's unconditional `return 1`.
pub struct HttpRequestMethodParser;

impl StepParser for HttpRequestMethodParser {
    fn parse<'a>(
        &self,
        state: &mut dyn Any,
        _pstate: &mut ParseState,
        input: &'a [u8],
        _output: &mut ResultList<'a>,
    ) -> StepStatus {
        let hstate = http_state(state);
        hstate.method = if input == b"POST" {
            HttpMethod::Post
        } else if input == b"GET" {
            HttpMethod::Get
        } else {
            HttpMethod::Unknown
        };
        StepStatus::Complete
    }
}

/// `HTTPParseResponseCode`.
///
/// # Open Question resolution (`spec.md` §4.G / §9, "OQ2")
///
/// Preserved verbatim from the source: if the code field is longer than 3
/// bytes, or parses to `>= 1000`, the call still reports success but
/// `response_code` is left untouched. This looks like a latent bug in the
/// original (a 4+ digit status line silently keeps whatever code was
/// previously recorded, or `0` on a fresh state) but `spec.md` calls for
/// preserving exact field-level quirks rather than "fixing" them, so no
/// validation or error path is added here.
pub struct HttpResponseCodeParser;

impl StepParser for HttpResponseCodeParser {
    fn parse<'a>(
        &self,
        state: &mut dyn Any,
        _pstate: &mut ParseState,
        input: &'a [u8],
        _output: &mut ResultList<'a>,
    ) -> StepStatus {
        if input.len() > 3 {
            return StepStatus::Complete;
        }

        let value = parse_leading_digits(input);
        if value < 1000 {
            http_state(state).response_code = value as u16;
        }
        StepStatus::Complete
    }
}

/// `strtoul`-alike: consumes leading ASCII digits, stops at the first
/// non-digit, returns `0` if there were none. There is no error return in
/// the source to mirror, so there is none here either.
fn parse_leading_digits(input: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for &b in input {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as u32);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parser_recognizes_get_and_post() {
        let mut state: Box<dyn Any> = Box::new(HttpState::new());
        let mut pstate = ParseState::new();
        let mut out = ResultList::new();

        HttpRequestMethodParser.parse(state.as_mut(), &mut pstate, b"GET", &mut out);
        assert_eq!(http_state(state.as_mut()).method, HttpMethod::Get);

        HttpRequestMethodParser.parse(state.as_mut(), &mut pstate, b"POST", &mut out);
        assert_eq!(http_state(state.as_mut()).method, HttpMethod::Post);

        HttpRequestMethodParser.parse(state.as_mut(), &mut pstate, b"PATCH", &mut out);
        assert_eq!(http_state(state.as_mut()).method, HttpMethod::Unknown);
    }

    #[test]
    fn response_code_parser_sets_code_for_normal_input() {
        let mut state: Box<dyn Any> = Box::new(HttpState::new());
        let mut pstate = ParseState::new();
        let mut out = ResultList::new();

        HttpResponseCodeParser.parse(state.as_mut(), &mut pstate, b"200", &mut out);
        assert_eq!(http_state(state.as_mut()).response_code, 200);
    }

    #[test]
    fn response_code_parser_ignores_overlong_input() {
        let mut state: Box<dyn Any> = Box::new(HttpState::new());
        let mut pstate = ParseState::new();
        let mut out = ResultList::new();
        http_state(state.as_mut()).response_code = 7;

        HttpResponseCodeParser.parse(state.as_mut(), &mut pstate, b"20000", &mut out);
        assert_eq!(http_state(state.as_mut()).response_code, 7);
    }

    #[test]
    fn request_line_parser_splits_method_uri_version() {
        let mut pstate = ParseState::new();
        pstate.set_eof();
        let mut out = ResultList::new();
        let status = HttpRequestLineParser.parse(
            &mut HttpState::new(),
            &mut pstate,
            b"GET /index.html HTTP/1.0",
            &mut out,
        );
        assert_eq!(status, StepStatus::Complete);

        let fields: Vec<_> = out.iter().map(|e| (e.field_id, e.bytes.as_slice().to_vec())).collect();
        assert_eq!(
            fields,
            vec![
                (super::fields::REQUEST_METHOD, b"GET".to_vec()),
                (super::fields::REQUEST_URI, b"/index.html".to_vec()),
                (super::fields::REQUEST_VERSION, b"HTTP/1.0".to_vec()),
            ]
        );
        out.release_all();
    }

    #[test]
    fn request_parser_emits_request_line_headers_and_body() {
        let mut pstate = ParseState::new();
        pstate.set_eof();
        let mut out = ResultList::new();
        let input = b"GET / HTTP/1.0\r\nHost: x\r\n\r\nbodydata";

        let outcome = HttpRequestParser.parse(&mut HttpState::new(), &mut pstate, input, &mut out);
        assert!(matches!(outcome, DispatchOutcome::Complete));

        let ids: Vec<_> = out.iter().map(|e| e.field_id).collect();
        assert_eq!(
            ids,
            vec![fields::REQUEST_LINE, fields::REQUEST_HEADERS, fields::REQUEST_BODY]
        );
        let bodies: Vec<_> = out.iter().map(|e| e.bytes.as_slice().to_vec()).collect();
        assert_eq!(bodies[2], b"bodydata".to_vec());
        out.release_all();
    }
}
