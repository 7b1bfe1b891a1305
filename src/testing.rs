//! Testing utilities for code built on undertow's combinators.
//!
//! [`ReleaseLog`] hands out [`MockResource`]s and records every acquisition
//! and release, so a test can assert that resources were released exactly
//! once and in the expected order. [`encode`] produces fixture bytes for
//! each [`Encoding`]. With the `proptest` feature, [`Encoding`] also
//! implements `Arbitrary`.
//!
//! # Example
//!
//! ```rust
//! use undertow::resource::with_resources;
//! use undertow::testing::{Event, ReleaseLog};
//!
//! let log = ReleaseLog::new();
//! let result = with_resources(
//!     || Ok::<_, String>(log.acquire("db")),
//!     || Ok(log.acquire("file")),
//!     |_, _| Ok(()),
//! );
//!
//! assert_eq!(result, Ok(()));
//! assert_eq!(
//!     log.events(),
//!     vec![
//!         Event::Acquired("db"),
//!         Event::Acquired("file"),
//!         Event::Released("file"),
//!         Event::Released("db"),
//!     ]
//! );
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::Rc;

use crate::resource::Close;
use crate::text::Encoding;

/// Something that happened to a [`MockResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The named resource was handed out.
    Acquired(&'static str),
    /// The named resource was closed.
    Released(&'static str),
}

/// Shared record of acquisitions and releases.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct ReleaseLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl ReleaseLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a resource named `name`, recording the acquisition.
    pub fn acquire(&self, name: &'static str) -> MockResource {
        self.events.borrow_mut().push(Event::Acquired(name));
        MockResource {
            name,
            log: self.clone(),
            close_failure: None,
        }
    }

    /// Every event so far, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Names of released resources, in release order.
    pub fn released(&self) -> Vec<&'static str> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Released(name) => Some(*name),
                Event::Acquired(_) => None,
            })
            .collect()
    }

    /// How many times `name` was released.
    pub fn released_count(&self, name: &str) -> usize {
        self.released().into_iter().filter(|n| *n == name).count()
    }
}

/// A resource that records its release in a [`ReleaseLog`].
#[derive(Debug)]
pub struct MockResource {
    name: &'static str,
    log: ReleaseLog,
    close_failure: Option<String>,
}

impl MockResource {
    /// The name given at acquisition.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Make `close` fail with `message` (the release is still recorded).
    pub fn failing_close(mut self, message: impl Into<String>) -> Self {
        self.close_failure = Some(message.into());
        self
    }
}

impl Close for MockResource {
    type Error = MockError;

    fn close(self) -> Result<(), MockError> {
        self.log.events.borrow_mut().push(Event::Released(self.name));
        match self.close_failure {
            Some(message) => Err(MockError(format!("{}: {}", self.name, message))),
            None => Ok(()),
        }
    }
}

/// Release failure produced by a [`MockResource`].
///
/// The message is `"<name>: <reason>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

impl From<MockError> for String {
    fn from(err: MockError) -> Self {
        err.0
    }
}

impl From<MockError> for io::Error {
    fn from(err: MockError) -> Self {
        io::Error::other(err)
    }
}

/// Encode `text` as `encoding` would store it, or `None` when the text
/// has characters the encoding cannot represent.
///
/// [`Encoding::Utf16`] output starts with a big-endian byte order mark.
pub fn encode(text: &str, encoding: Encoding) -> Option<Vec<u8>> {
    match encoding {
        Encoding::Utf8 => Some(text.as_bytes().to_vec()),
        Encoding::Utf16 => {
            let mut bytes = vec![0xFE, 0xFF];
            bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            Some(bytes)
        }
        Encoding::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        Encoding::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        Encoding::Latin1 => text.chars().map(|c| u8::try_from(c).ok()).collect(),
        Encoding::Ascii => text
            .chars()
            .map(|c| if c.is_ascii() { Some(c as u8) } else { None })
            .collect(),
    }
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for Encoding {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        proptest::sample::select(Encoding::ALL.to_vec()).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_log_records_in_order() {
        let log = ReleaseLog::new();
        let a = log.acquire("a");
        let b = log.acquire("b");

        assert!(b.close().is_ok());
        assert!(a.close().is_ok());

        assert_eq!(log.released(), vec!["b", "a"]);
        assert_eq!(log.released_count("a"), 1);
        assert_eq!(log.released_count("c"), 0);
    }

    #[test]
    fn failing_close_still_records_release() {
        let log = ReleaseLog::new();

        let err = log.acquire("a").failing_close("stuck").close().unwrap_err();

        assert_eq!(err, MockError("a: stuck".to_string()));
        assert_eq!(log.events(), vec![Event::Acquired("a"), Event::Released("a")]);
    }

    #[test]
    fn encode_rejects_unrepresentable_text() {
        assert_eq!(encode("é", Encoding::Ascii), None);
        assert_eq!(encode("é", Encoding::Latin1), Some(vec![0xE9]));
        assert_eq!(encode("€", Encoding::Latin1), None);
        assert_eq!(encode("A", Encoding::Utf16), Some(vec![0xFE, 0xFF, 0x00, 0x41]));
        assert_eq!(encode("A", Encoding::Utf16Le), Some(vec![0x41, 0x00]));
    }

    #[cfg(feature = "proptest")]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_encoding_decodes_its_own_ascii(
                encoding in any::<Encoding>(),
                text in "[ -~]{0,32}",
            ) {
                let bytes = encode(&text, encoding).expect("ascii is representable everywhere");
                prop_assert_eq!(encoding.decode(&bytes), Ok(text));
            }
        }
    }
}
