//! # Undertow
//!
//! Functional-style helpers that keep a closure's failure type intact.
//!
//! Every combinator here is generic over the caller's error type `E`: a
//! closure returning `Result<_, E>` passes through a resource runner, an
//! iteration helper, or a presence branch and its failure comes out the
//! other side as the same `E`, without panics or type erasure.
//!
//! - [`resource`] - scoped acquire/use/release with reverse-order cleanup
//! - [`text`] - read a byte stream as text in a given encoding
//! - [`iter`] - fail-fast iteration over sequences and maps
//! - [`optional`] - run a callback on `Some`, a fallback on `None`
//!
//! ## Quick Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::io::{self, Cursor};
//! use undertow::prelude::*;
//!
//! fn load(settings: &BTreeMap<String, String>) -> io::Result<String> {
//!     let mut out = String::new();
//!
//!     for_each_entry(settings, |key, value| {
//!         if value.is_empty() {
//!             return Err(io::Error::new(io::ErrorKind::InvalidInput, key.clone()));
//!         }
//!         out.push_str(key);
//!         Ok(())
//!     })?;
//!
//!     let banner = read_all_text(Cursor::new(b"hello\nworld\n".to_vec()), Encoding::Utf8)?;
//!     out.push_str(&banner);
//!     Ok(out)
//! }
//!
//! let settings = BTreeMap::from([("a".to_string(), "1".to_string())]);
//! assert_eq!(load(&settings).unwrap(), "ahelloworld");
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod iter;
pub mod optional;
pub mod resource;
pub mod testing;
pub mod text;

// Re-exports
pub use iter::{for_each_element, for_each_entry, split};
pub use optional::{on_present_or_else, OptionExt, Otherwise};
pub use resource::{
    closing, with_resource, with_resource_full, with_resources, with_resources_full, Close,
    Closing, Phase, ScopeError,
};
pub use text::{
    concat_lines, read_all_text, read_file_text, DecodeError, Encoding, UnknownEncoding,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::iter::{for_each_element, for_each_entry, split};
    pub use crate::optional::{on_present_or_else, OptionExt, Otherwise};
    pub use crate::resource::{
        closing, with_resource, with_resource_full, with_resources, with_resources_full, Close,
        Closing, Phase, ScopeError,
    };
    pub use crate::text::{
        concat_lines, read_all_text, read_file_text, DecodeError, Encoding, UnknownEncoding,
    };
}
