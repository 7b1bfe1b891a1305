//! Presence branching on `Option` with typed failures.
//!
//! [`on_present_or_else`] runs a fallible callback when a value is present
//! and hands back an [`Otherwise`] whose single operation runs a fallback
//! only when the value was absent.
//!
//! # Example
//!
//! ```
//! use undertow::optional::OptionExt;
//!
//! let mut log = Vec::new();
//!
//! None::<u32>
//!     .on_present_or_else(|id| -> Result<(), String> {
//!         log.push(format!("loaded {}", id));
//!         Ok(())
//!     })?
//!     .otherwise(|| -> Result<(), String> {
//!         log.push("using defaults".to_string());
//!         Ok(())
//!     })?;
//!
//! assert_eq!(log, vec!["using defaults"]);
//! # Ok::<(), String>(())
//! ```

/// The fallback half of a presence branch.
///
/// Whether the fallback runs is fixed when the `Otherwise` is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Otherwise {
    was_present: bool,
}

impl Otherwise {
    /// Whether the original value was present (and the callback ran).
    pub fn was_present(&self) -> bool {
        self.was_present
    }

    /// Run `action` if and only if the original value was absent.
    ///
    /// When the value was present this does nothing and succeeds.
    pub fn otherwise<E, A>(self, action: A) -> Result<(), E>
    where
        A: FnOnce() -> Result<(), E>,
    {
        if self.was_present {
            Ok(())
        } else {
            action()
        }
    }
}

/// Call `f` with the contained value if there is one.
///
/// A failure from `f` is returned immediately, so no [`Otherwise`] exists
/// to run a fallback afterwards.
///
/// # Example
///
/// ```
/// use undertow::optional::on_present_or_else;
///
/// let mut ran_fallback = false;
/// let branch = on_present_or_else(Some(5), |n| if n > 0 { Ok(()) } else { Err("negative") })
///     .unwrap();
/// branch
///     .otherwise(|| {
///         ran_fallback = true;
///         Ok::<_, &str>(())
///     })
///     .unwrap();
///
/// assert!(branch.was_present());
/// assert!(!ran_fallback);
/// ```
pub fn on_present_or_else<T, E, F>(value: Option<T>, f: F) -> Result<Otherwise, E>
where
    F: FnOnce(T) -> Result<(), E>,
{
    match value {
        Some(value) => {
            f(value)?;
            Ok(Otherwise { was_present: true })
        }
        None => Ok(Otherwise { was_present: false }),
    }
}

/// Method form of [`on_present_or_else`].
pub trait OptionExt<T> {
    /// See [`on_present_or_else`].
    fn on_present_or_else<E, F>(self, f: F) -> Result<Otherwise, E>
    where
        F: FnOnce(T) -> Result<(), E>;
}

impl<T> OptionExt<T> for Option<T> {
    fn on_present_or_else<E, F>(self, f: F) -> Result<Otherwise, E>
    where
        F: FnOnce(T) -> Result<(), E>,
    {
        on_present_or_else(self, f)
    }
}
