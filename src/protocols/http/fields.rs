//! Field identifiers for the HTTP exemplar protocol.
//!
//! Numbering matches `original_source/src/app-layer-http.c`'s
//! `HTTP_FIELD_*` enum exactly (id `0` reserved for "no field").

use crate::field::FieldId;

pub const REQUEST_LINE: FieldId = 1;
pub const REQUEST_HEADERS: FieldId = 2;
pub const REQUEST_BODY: FieldId = 3;

pub const REQUEST_METHOD: FieldId = 4;
pub const REQUEST_URI: FieldId = 5;
pub const REQUEST_VERSION: FieldId = 6;

pub const RESPONSE_LINE: FieldId = 7;
pub const RESPONSE_HEADERS: FieldId = 8;
pub const RESPONSE_BODY: FieldId = 9;

pub const RESPONSE_VERSION: FieldId = 10;
pub const RESPONSE_CODE: FieldId = 11;
pub const RESPONSE_MSG: FieldId = 12;
