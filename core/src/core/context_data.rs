// corchain/src/core/context_data.rs

//! The shared handle through which a chain context travels from step to step.

use crate::core::context::ChainContext;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A handle to the context data of one chain execution, providing shared ownership
/// and interior mutability through a `parking_lot::RwLock`.
///
/// The executor hands a clone of this handle to every step and hook. A step may
/// mutate the data in place and return the same handle, or return a different
/// handle that replaces the working context for the rest of the call.
///
/// IMPORTANT: Lock guards obtained from this struct are blocking and MUST NOT
/// be held across `.await` suspension points in asynchronous code.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  /// Acquires a read lock. The returned guard MUST be dropped before any `.await` point.
  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// Acquires a write lock. The returned guard MUST be dropped before any `.await` point.
  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
    self.0.try_read()
  }

  pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
    self.0.try_write()
  }

  /// Read guard narrowed to one part of the data, e.g. `ctx.map_read(|d| &d.order_id)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  pub fn map_write<F, U: ?Sized>(&self, f: F) -> MappedRwLockWriteGuard<'_, U>
  where
    F: FnOnce(&mut T) -> &mut U,
  {
    RwLockWriteGuard::map(self.write(), f)
  }

  /// True when both handles point at the same underlying data.
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }

  /// Takes the data out of the handle if this is the last handle to it.
  /// Otherwise the handle is given back unchanged.
  pub fn try_into_inner(self) -> Result<T, Self> {
    Arc::try_unwrap(self.0)
      .map(RwLock::into_inner)
      .map_err(ContextData)
  }
}

impl<T: ChainContext> ContextData<T> {
  /// Reads the abort flag, holding the read lock only for the duration of the call.
  pub fn is_aborted(&self) -> bool {
    self.read().is_aborted()
  }

  /// Raises the abort flag so the executor stops issuing further steps.
  pub fn abort(&self) {
    self.write().set_aborted(true);
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
