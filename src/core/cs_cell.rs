//! Critical section protected cell
//!
//! Shared state that is larger than one atomic word lives in a `CsCell`.
//! Every access runs inside a critical section and holds the borrow only
//! for the duration of the closure.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::critical::critical_section;

/// A cell that can only be accessed within a critical section.
pub struct CsCell<T>(Mutex<RefCell<T>>);

impl<T> CsCell<T> {
    /// Create a new CsCell
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self(Mutex::new(RefCell::new(value)))
    }

    /// Run `f` with exclusive access to the inner value
    ///
    /// Nested calls on the same cell panic on the inner borrow; callers never
    /// re-enter a cell from inside its own closure.
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        critical_section(|cs| f(&mut self.0.borrow_ref_mut(cs)))
    }

    /// Run `f` with shared access to the inner value
    #[inline]
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        critical_section(|cs| f(&self.0.borrow_ref(cs)))
    }
}
