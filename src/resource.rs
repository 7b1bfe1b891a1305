//! Scoped resource management with typed failures.
//!
//! A resource is acquired by a fallible producer, handed to a fallible
//! callback by mutable reference, and released before the runner returns,
//! whatever happened in between. This module provides:
//!
//! - [`Close`] - Explicit, fallible release of a resource handle
//! - [`Closing`] / [`closing`] - Attach a release function to any value
//! - [`with_resource`] - Acquire/use/release for one resource
//! - [`with_resources`] - Two resources, released in reverse order (LIFO)
//! - [`with_resource_full`] / [`with_resources_full`] - Same, reporting
//!   suppressed release failures through [`ScopeError`]
//!
//! # Failure precedence
//!
//! The earliest failure wins. An acquisition failure beats everything, a
//! callback failure beats any release failure, and the first release
//! failure beats later ones. Failures that lose are never dropped
//! silently: the `_full` runners attach them to [`ScopeError::suppressed`],
//! the plain runners log them with `tracing::warn!`.
//!
//! If the callback or a release panics, every acquired resource is still
//! released (innermost first) before the first panic resumes.
//!
//! # Example
//!
//! ```rust
//! use std::io::{self, Cursor, Read};
//! use undertow::resource::with_resource;
//!
//! let text = with_resource(
//!     || Ok::<_, io::Error>(Cursor::new(b"payload".to_vec())),
//!     |cursor| {
//!         let mut buf = String::new();
//!         cursor.read_to_string(&mut buf)?;
//!         Ok(buf)
//!     },
//! );
//! assert_eq!(text.unwrap(), "payload");
//! ```

use std::any::Any;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::ops::{Deref, DerefMut};
use std::panic::{self, AssertUnwindSafe};
use std::process::{ChildStderr, ChildStdin, ChildStdout};

// ============================================================================
// Close
// ============================================================================

/// A handle that must be released explicitly, exactly once.
///
/// `close` consumes the handle, so a closed resource cannot be used or
/// closed again.
pub trait Close {
    /// The failure a release can produce.
    type Error;

    /// Release the underlying handle.
    fn close(self) -> Result<(), Self::Error>;
}

impl Close for TcpStream {
    type Error = io::Error;

    fn close(self) -> Result<(), io::Error> {
        match self.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

impl<T> Close for Cursor<T> {
    type Error = io::Error;

    fn close(self) -> Result<(), io::Error> {
        Ok(())
    }
}

impl Close for &[u8] {
    type Error = io::Error;

    fn close(self) -> Result<(), io::Error> {
        Ok(())
    }
}

macro_rules! close_by_drop {
    ($($ty:ty),*) => {
        $(
            impl Close for $ty {
                type Error = io::Error;

                fn close(self) -> Result<(), io::Error> {
                    drop(self);
                    Ok(())
                }
            }
        )*
    };
}

close_by_drop!(File, ChildStdin, ChildStdout, ChildStderr);

impl<R: Read + Close> Close for BufReader<R> {
    type Error = R::Error;

    fn close(self) -> Result<(), R::Error> {
        self.into_inner().close()
    }
}

/// Buffered data is flushed before the inner writer is closed.
impl<W: Write + Close<Error = io::Error>> Close for BufWriter<W> {
    type Error = io::Error;

    fn close(self) -> Result<(), io::Error> {
        self.into_inner().map_err(|e| e.into_error())?.close()
    }
}

impl<R: Close> Close for Box<R> {
    type Error = R::Error;

    fn close(self) -> Result<(), R::Error> {
        (*self).close()
    }
}

// ============================================================================
// Closing - ad hoc resources
// ============================================================================

/// A value paired with the function that releases it.
///
/// Dereferences to the wrapped value, so a callback receiving
/// `&mut Closing<T, F>` can use it as a `&mut T`.
pub struct Closing<T, F> {
    value: T,
    release: F,
}

impl<T: fmt::Debug, F> fmt::Debug for Closing<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closing")
            .field("value", &self.value)
            .field("release", &"<function>")
            .finish()
    }
}

impl<T, F> Deref for Closing<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F> DerefMut for Closing<T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Read, F> Read for Closing<T, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.value.read(buf)
    }
}

impl<T: Write, F> Write for Closing<T, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.value.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.value.flush()
    }
}

impl<T, F, E> Close for Closing<T, F>
where
    F: FnOnce(T) -> Result<(), E>,
{
    type Error = E;

    fn close(self) -> Result<(), E> {
        (self.release)(self.value)
    }
}

/// Turn any value into a [`Close`] resource by supplying its release.
///
/// # Example
///
/// ```rust
/// use undertow::resource::{closing, with_resource};
///
/// let total = with_resource(
///     || Ok::<_, String>(closing(vec![1, 2, 3], |_| Ok::<_, String>(()))),
///     |numbers| Ok(numbers.iter().sum::<i32>()),
/// );
/// assert_eq!(total, Ok(6));
/// ```
pub fn closing<T, F, E>(value: T, release: F) -> Closing<T, F>
where
    F: FnOnce(T) -> Result<(), E>,
{
    Closing { value, release }
}

// ============================================================================
// ScopeError
// ============================================================================

/// The stage of a scoped run in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// A resource producer failed.
    Acquire,
    /// The callback failed.
    Use,
    /// Releasing a resource failed.
    Release,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Acquire => f.write_str("acquire"),
            Phase::Use => f.write_str("use"),
            Phase::Release => f.write_str("release"),
        }
    }
}

/// Failure of a scoped run: the earliest failure plus any release failures
/// that happened after it.
///
/// # Example
///
/// ```rust
/// use undertow::resource::{closing, with_resource_full, Phase};
///
/// let err = with_resource_full(
///     || Ok::<_, String>(closing((), |_| Err("flush failed".to_string()))),
///     |_| Err::<(), _>("write failed".to_string()),
/// )
/// .unwrap_err();
///
/// assert_eq!(err.phase(), Phase::Use);
/// assert_eq!(err.error(), "write failed");
/// assert_eq!(err.suppressed(), ["flush failed".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeError<E> {
    phase: Phase,
    error: E,
    suppressed: Vec<E>,
}

impl<E> ScopeError<E> {
    /// Create an error for `phase` with no suppressed failures.
    pub fn new(phase: Phase, error: E) -> Self {
        ScopeError {
            phase,
            error,
            suppressed: Vec::new(),
        }
    }

    /// Record a later failure that lost to this one.
    pub fn suppress(mut self, error: E) -> Self {
        self.suppressed.push(error);
        self
    }

    /// The phase in which the reported failure occurred.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The reported (earliest) failure.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Release failures that occurred after the reported one, in order.
    pub fn suppressed(&self) -> &[E] {
        &self.suppressed
    }

    /// Split into phase, reported failure, and suppressed failures.
    pub fn into_parts(self) -> (Phase, E, Vec<E>) {
        (self.phase, self.error, self.suppressed)
    }

    /// Maps every contained failure using the provided function.
    pub fn map<F, E2>(self, mut f: F) -> ScopeError<E2>
    where
        F: FnMut(E) -> E2,
    {
        let error = f(self.error);
        ScopeError {
            phase: self.phase,
            error,
            suppressed: self.suppressed.into_iter().map(f).collect(),
        }
    }

    /// Unwrap the reported failure, logging each suppressed one.
    pub fn into_inner(self) -> E
    where
        E: fmt::Debug,
    {
        for suppressed in &self.suppressed {
            tracing::warn!(
                phase = %Phase::Release,
                error = ?suppressed,
                "suppressed release failure"
            );
        }
        self.error
    }
}

impl<E: fmt::Display> fmt::Display for ScopeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Acquire => write!(f, "acquire failed: {}", self.error)?,
            Phase::Use => write!(f, "{}", self.error)?,
            Phase::Release => write!(f, "release failed: {}", self.error)?,
        }
        for suppressed in &self.suppressed {
            write!(f, "; release also failed: {}", suppressed)?;
        }
        Ok(())
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ScopeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

// ============================================================================
// Runners
// ============================================================================

/// A release result, or the payload of a panic raised while releasing.
type Released<E> = Result<Result<(), E>, Box<dyn Any + Send>>;

fn release<R, E>(resource: R) -> Released<E>
where
    R: Close,
    E: From<R::Error>,
{
    panic::catch_unwind(AssertUnwindSafe(|| resource.close().map_err(E::from)))
}

/// Fold a release result into the outcome so far.
fn settle<T, E>(
    outcome: Result<T, ScopeError<E>>,
    released: Result<(), E>,
) -> Result<T, ScopeError<E>> {
    match (outcome, released) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(e)) => Err(ScopeError::new(Phase::Release, e)),
        (Err(err), Err(e)) => Err(err.suppress(e)),
    }
}

/// Fold every release into the outcome. Releases run before this is
/// called; a panic from any of them resumes once all are done.
fn finish<T, E, const N: usize>(
    mut outcome: Result<T, ScopeError<E>>,
    released: [Released<E>; N],
) -> Result<T, ScopeError<E>>
where
    E: fmt::Debug,
{
    let mut panicked = None;
    for result in released {
        match result {
            Ok(result) => outcome = settle(outcome, result),
            Err(payload) => {
                panicked.get_or_insert(payload);
            }
        }
    }

    match panicked {
        Some(payload) => {
            if let Err(err) = outcome {
                tracing::error!(error = ?err.error, "failure lost to a panicking release");
            }
            panic::resume_unwind(payload)
        }
        None => outcome,
    }
}

/// Resume a caught panic once the resources have been released.
fn unwind<E, const N: usize>(payload: Box<dyn Any + Send>, released: [Released<E>; N]) -> !
where
    E: fmt::Debug,
{
    for result in released {
        if let Ok(Err(e)) = result {
            tracing::error!(error = ?e, "resource release failed during unwinding");
        }
    }
    panic::resume_unwind(payload)
}

/// Acquire a resource, run `use_fn` with it, and release it.
///
/// Returns the earliest failure; see [`ScopeError`] for the full picture.
///
/// # Example
///
/// ```rust
/// use undertow::resource::{closing, with_resource_full, Phase};
///
/// let err = with_resource_full(
///     || Ok::<_, String>(closing(7, |_| Err("busy".to_string()))),
///     |n| Ok(**n * 6),
/// )
/// .unwrap_err();
/// assert_eq!(err.phase(), Phase::Release);
/// ```
pub fn with_resource_full<R, T, E, A, U>(acquire: A, use_fn: U) -> Result<T, ScopeError<E>>
where
    A: FnOnce() -> Result<R, E>,
    U: FnOnce(&mut R) -> Result<T, E>,
    R: Close,
    E: From<R::Error> + fmt::Debug,
{
    let mut resource = acquire().map_err(|e| ScopeError::new(Phase::Acquire, e))?;

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| use_fn(&mut resource))) {
        Ok(result) => result.map_err(|e| ScopeError::new(Phase::Use, e)),
        Err(payload) => unwind(payload, [release::<_, E>(resource)]),
    };

    finish(outcome, [release::<_, E>(resource)])
}

/// Acquire two resources, run `use_fn` with both, and release them in
/// reverse order: `second` first, then `first`.
///
/// If acquiring `second` fails, `first` is released and the acquisition
/// failure is reported.
pub fn with_resources_full<R1, R2, T, E, A1, A2, U>(
    acquire_first: A1,
    acquire_second: A2,
    use_fn: U,
) -> Result<T, ScopeError<E>>
where
    A1: FnOnce() -> Result<R1, E>,
    A2: FnOnce() -> Result<R2, E>,
    U: FnOnce(&mut R1, &mut R2) -> Result<T, E>,
    R1: Close,
    R2: Close,
    E: From<R1::Error> + From<R2::Error> + fmt::Debug,
{
    let mut first = acquire_first().map_err(|e| ScopeError::new(Phase::Acquire, e))?;

    let mut second = match panic::catch_unwind(AssertUnwindSafe(acquire_second)) {
        Ok(Ok(second)) => second,
        Ok(Err(e)) => {
            let outcome = Err(ScopeError::new(Phase::Acquire, e));
            return finish(outcome, [release::<_, E>(first)]);
        }
        Err(payload) => unwind(payload, [release::<_, E>(first)]),
    };

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| use_fn(&mut first, &mut second)))
    {
        Ok(result) => result.map_err(|e| ScopeError::new(Phase::Use, e)),
        Err(payload) => unwind(payload, [release::<_, E>(second), release::<_, E>(first)]),
    };

    // LIFO
    finish(outcome, [release::<_, E>(second), release::<_, E>(first)])
}

/// Acquire a resource, run `use_fn` with it, and release it.
///
/// A release failure that follows a callback failure is logged and
/// discarded; the callback failure is returned.
///
/// # Example
///
/// ```rust
/// use std::io;
/// use undertow::resource::with_resource;
///
/// let result: io::Result<()> = with_resource(
///     || Err(io::Error::new(io::ErrorKind::NotFound, "no such device")),
///     |_: &mut std::io::Cursor<Vec<u8>>| Ok(()),
/// );
/// assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
/// ```
pub fn with_resource<R, T, E, A, U>(acquire: A, use_fn: U) -> Result<T, E>
where
    A: FnOnce() -> Result<R, E>,
    U: FnOnce(&mut R) -> Result<T, E>,
    R: Close,
    E: From<R::Error> + fmt::Debug,
{
    with_resource_full(acquire, use_fn).map_err(ScopeError::into_inner)
}

/// Acquire two resources, run `use_fn` with both, and release them
/// `second` first, then `first`.
///
/// # Example
///
/// ```rust
/// use std::io::{self, Cursor, Read, Write};
/// use undertow::resource::with_resources;
///
/// let copied = with_resources(
///     || Ok::<_, io::Error>(Cursor::new(b"abc".to_vec())),
///     || Ok(Cursor::new(Vec::new())),
///     |src, dst| {
///         let n = io::copy(src, dst)?;
///         dst.flush()?;
///         Ok(n)
///     },
/// );
/// assert_eq!(copied.unwrap(), 3);
/// ```
pub fn with_resources<R1, R2, T, E, A1, A2, U>(
    acquire_first: A1,
    acquire_second: A2,
    use_fn: U,
) -> Result<T, E>
where
    A1: FnOnce() -> Result<R1, E>,
    A2: FnOnce() -> Result<R2, E>,
    U: FnOnce(&mut R1, &mut R2) -> Result<T, E>,
    R1: Close,
    R2: Close,
    E: From<R1::Error> + From<R2::Error> + fmt::Debug,
{
    with_resources_full(acquire_first, acquire_second, use_fn).map_err(ScopeError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, ReleaseLog};
    use tracing_test::traced_test;

    #[test]
    fn test_with_resource_success_releases_once() {
        let log = ReleaseLog::new();

        let result = with_resource(
            || Ok::<_, String>(log.acquire("a")),
            |r| Ok(r.name().len()),
        );

        assert_eq!(result, Ok(1));
        assert_eq!(log.events(), vec![Event::Acquired("a"), Event::Released("a")]);
    }

    #[test]
    fn test_with_resource_acquire_failure_skips_callback() {
        let mut called = false;

        let result = with_resource(
            || Err::<crate::testing::MockResource, _>("no handle".to_string()),
            |_| {
                called = true;
                Ok(())
            },
        );

        assert_eq!(result, Err("no handle".to_string()));
        assert!(!called);
    }

    #[test]
    fn test_with_resource_use_failure_still_releases() {
        let log = ReleaseLog::new();

        let result = with_resource(
            || Ok::<_, String>(log.acquire("a")),
            |_| Err::<(), _>("boom".to_string()),
        );

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(log.released(), vec!["a"]);
    }

    #[test]
    fn test_with_resource_release_failure_reported_after_success() {
        let log = ReleaseLog::new();

        let err = with_resource_full(
            || Ok::<_, String>(log.acquire("a").failing_close("disk full")),
            |_| Ok(()),
        )
        .unwrap_err();

        assert_eq!(err.phase(), Phase::Release);
        assert_eq!(err.error(), "a: disk full");
        assert!(err.suppressed().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_with_resource_use_failure_masks_release_failure() {
        let log = ReleaseLog::new();

        let result = with_resource(
            || Ok::<_, String>(log.acquire("a").failing_close("disk full")),
            |_| Err::<(), _>("boom".to_string()),
        );

        assert_eq!(result, Err("boom".to_string()));
        assert!(logs_contain("suppressed release failure"));
        assert!(logs_contain("phase=release"));
        assert!(!logs_contain("phase=use"));
        assert!(logs_contain("disk full"));
    }

    #[test]
    fn test_with_resources_releases_in_reverse_order() {
        let log = ReleaseLog::new();
        let mut calls = 0;

        let result = with_resources(
            || Ok::<_, String>(log.acquire("a")),
            || Ok(log.acquire("b")),
            |a, b| {
                calls += 1;
                Ok(format!("{}{}", a.name(), b.name()))
            },
        );

        assert_eq!(result, Ok("ab".to_string()));
        assert_eq!(calls, 1);
        assert_eq!(
            log.events(),
            vec![
                Event::Acquired("a"),
                Event::Acquired("b"),
                Event::Released("b"),
                Event::Released("a"),
            ]
        );
    }

    #[test]
    fn test_with_resources_second_acquire_failure_releases_first() {
        let log = ReleaseLog::new();
        let mut called = false;

        let err = with_resources_full(
            || Ok::<_, String>(log.acquire("a")),
            || Err::<crate::testing::MockResource, _>("b unavailable".to_string()),
            |_, _| {
                called = true;
                Ok(())
            },
        )
        .unwrap_err();

        assert!(!called);
        assert_eq!(err.phase(), Phase::Acquire);
        assert_eq!(err.error(), "b unavailable");
        assert_eq!(log.released(), vec!["a"]);
        assert_eq!(log.released_count("a"), 1);
    }

    #[test]
    fn test_with_resources_second_acquire_failure_suppresses_first_release() {
        let log = ReleaseLog::new();

        let err = with_resources_full(
            || Ok::<_, String>(log.acquire("a").failing_close("stuck")),
            || Err::<crate::testing::MockResource, _>("b unavailable".to_string()),
            |_, _| Ok(()),
        )
        .unwrap_err();

        assert_eq!(err.error(), "b unavailable");
        assert_eq!(err.suppressed(), ["a: stuck".to_string()]);
    }

    #[test]
    fn test_with_resources_use_failure_suppresses_both_releases() {
        let log = ReleaseLog::new();

        let err = with_resources_full(
            || Ok::<_, String>(log.acquire("a").failing_close("a broke")),
            || Ok(log.acquire("b").failing_close("b broke")),
            |_, _| Err::<(), _>("callback failed".to_string()),
        )
        .unwrap_err();

        assert_eq!(err.phase(), Phase::Use);
        assert_eq!(err.error(), "callback failed");
        assert_eq!(
            err.suppressed(),
            ["b: b broke".to_string(), "a: a broke".to_string()]
        );
        assert_eq!(log.released(), vec!["b", "a"]);
    }

    #[test]
    fn test_with_resources_first_release_failure_wins() {
        let log = ReleaseLog::new();

        let err = with_resources_full(
            || Ok::<_, String>(log.acquire("a").failing_close("a broke")),
            || Ok(log.acquire("b").failing_close("b broke")),
            |_, _| Ok(()),
        )
        .unwrap_err();

        assert_eq!(err.phase(), Phase::Release);
        assert_eq!(err.error(), "b: b broke");
        assert_eq!(err.suppressed(), ["a: a broke".to_string()]);
    }

    #[test]
    fn test_with_resources_panic_releases_both() {
        let log = ReleaseLog::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_resources(
                || Ok::<_, String>(log.acquire("a")),
                || Ok(log.acquire("b")),
                |_, _| -> Result<(), String> { panic!("callback panicked") },
            )
        }));

        assert!(outcome.is_err());
        assert_eq!(log.released(), vec!["b", "a"]);
    }

    #[test]
    fn test_with_resource_panic_releases_once() {
        let log = ReleaseLog::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_resource(
                || Ok::<_, String>(log.acquire("a")),
                |_| -> Result<(), String> { panic!("callback panicked") },
            )
        }));

        assert!(outcome.is_err());
        assert_eq!(log.events(), vec![Event::Acquired("a"), Event::Released("a")]);
    }

    #[test]
    fn test_with_resources_panicking_release_still_releases_first() {
        let log = ReleaseLog::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_resources(
                || Ok::<_, String>(log.acquire("a")),
                || Ok(closing((), |_| -> Result<(), String> { panic!("close panicked") })),
                |_, _| Ok(()),
            )
        }));

        assert!(outcome.is_err());
        assert_eq!(log.released(), vec!["a"]);
    }

    #[test]
    fn test_with_resources_panicking_release_after_panicking_callback() {
        let log = ReleaseLog::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_resources(
                || Ok::<_, String>(log.acquire("a")),
                || Ok(closing((), |_| -> Result<(), String> { panic!("close panicked") })),
                |_, _| -> Result<(), String> { panic!("callback panicked") },
            )
        }));

        let payload = outcome.unwrap_err();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"callback panicked"));
        assert_eq!(log.released(), vec!["a"]);
    }

    #[test]
    fn test_with_resources_panicking_second_acquire_releases_first() {
        let log = ReleaseLog::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            with_resources(
                || Ok::<_, String>(log.acquire("a")),
                || -> Result<crate::testing::MockResource, String> { panic!("acquire panicked") },
                |_, _| Ok(()),
            )
        }));

        assert!(outcome.is_err());
        assert_eq!(log.released(), vec!["a"]);
    }

    #[test]
    fn test_closing_runs_release_with_value() {
        let seen = std::cell::RefCell::new(None);

        let result = with_resource(
            || {
                Ok::<_, String>(closing(String::from("conn"), |v| {
                    *seen.borrow_mut() = Some(v);
                    Ok::<_, String>(())
                }))
            },
            |conn| {
                conn.push_str("-used");
                Ok(())
            },
        );

        assert_eq!(result, Ok(()));
        assert_eq!(seen.into_inner().as_deref(), Some("conn-used"));
    }

    #[test]
    fn test_buf_writer_close_flushes() {
        let mut sink = Vec::new();
        let target = &mut sink;

        let result = with_resource(
            move || Ok::<_, io::Error>(BufWriter::new(Cursor::new(target))),
            |w| w.write_all(b"buffered"),
        );

        assert!(result.is_ok());
        assert_eq!(sink, b"buffered");
    }

    #[test]
    fn test_scope_error_display() {
        let err = ScopeError::new(Phase::Use, "boom").suppress("close failed");
        assert_eq!(err.to_string(), "boom; release also failed: close failed");

        let err = ScopeError::new(Phase::Acquire, "refused");
        assert_eq!(err.to_string(), "acquire failed: refused");

        let err = ScopeError::new(Phase::Release, "refused");
        assert_eq!(err.to_string(), "release failed: refused");
    }

    #[test]
    fn test_scope_error_map_and_into_parts() {
        let err = ScopeError::new(Phase::Use, 1).suppress(2).map(|n| n * 10);
        assert_eq!(err.into_parts(), (Phase::Use, 10, vec![20]));
    }

    #[test]
    fn test_scope_error_source_is_primary() {
        use std::error::Error;

        let err = ScopeError::new(Phase::Use, io::Error::other("primary"))
            .suppress(io::Error::other("secondary"));
        assert_eq!(err.source().map(|s| s.to_string()), Some("primary".to_string()));
    }
}
