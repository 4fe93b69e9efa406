use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::{ErrorKind, OjaiError, OjaiResult};

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

pub trait ReadExecutor<T: ?Sized> {
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R;
}

impl<T> ReadExecutor<T> for Atomic<T> {
    #[inline]
    fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let read_guard = self.read();
        f(&*read_guard)
    }
}

pub trait WriteExecutor<T: ?Sized> {
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

impl<T> WriteExecutor<T> for Atomic<T> {
    #[inline]
    fn write_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut write_guard = self.write();
        f(&mut *write_guard)
    }
}

/// Shared open/closed state of a connection, store or stream.
///
/// Clones observe the same flag, which is how a store notices that its
/// connection was closed without owning the connection.
#[derive(Clone, Default, Debug)]
pub(crate) struct CloseFlag {
    closed: Arc<AtomicBool>,
}

impl CloseFlag {
    pub(crate) fn new() -> Self {
        CloseFlag {
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Marks the resource closed. Returns `true` only for the call that
    /// actually performed the transition.
    pub(crate) fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fails with [ErrorKind::ClosedResource] if the resource is closed.
    pub(crate) fn check_open(&self, resource: &str) -> OjaiResult<()> {
        if self.is_closed() {
            log::error!("{} is already closed", resource);
            return Err(OjaiError::new(
                &format!("{} is already closed", resource),
                ErrorKind::ClosedResource,
            ));
        }
        Ok(())
    }
}
