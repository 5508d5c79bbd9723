//! Protocol implementations built on top of the generic framework.
//!
//! `spec.md` treats HTTP as the one exemplar protocol needed to pin down
//! every invariant in the framework; this crate ships exactly that one.
//! A host adding a second protocol would add a sibling module here and a
//! matching `register` call where [`http::register`] is called.

pub mod http;
