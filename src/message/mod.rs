//! Request and response values that flow through route middleware and handlers.
//!
//! Both types are plain owned data. A [`Response`] is threaded by value through the
//! middleware chain and the route handler, so every stage produces the next response
//! rather than mutating a shared one.

mod request;
mod response;

pub use request::Request;
pub use response::Response;

use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
///
/// Header names use `Arc<str>` because the same names repeat across requests.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

pub(crate) fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
