//! Generic reuse pool.
//!
//! # Responsibilities
//! - Hand out previously released values, or build fresh ones on demand
//! - Accept values back for later reuse
//! - Stay safe for any number of concurrent callers
//!
//! # Design Decisions
//! - Best-effort cache, not an allocator: idle values beyond `max_idle` are dropped
//! - The pool never resets values; callers restore their own defaults before use
//! - `checkout()` returns a guard that releases on drop, so every exit path returns the value

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Default number of idle values kept per pool.
pub const DEFAULT_MAX_IDLE: usize = 1024;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A concurrent-safe cache of reusable `T` values.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    create: Factory<T>,
    max_idle: usize,
}

impl<T> Pool<T> {
    /// Create a pool that builds new values with `create`.
    pub fn new(create: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self::with_max_idle(create, DEFAULT_MAX_IDLE)
    }

    /// Create a pool that keeps at most `max_idle` released values.
    pub fn with_max_idle(create: impl Fn() -> T + Send + Sync + 'static, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            create: Box::new(create),
            max_idle,
        }
    }

    /// Take a cached value, or build a new one. Never blocks on I/O and never fails;
    /// a panicking factory panics here.
    pub fn acquire(&self) -> T {
        let cached = self.lock().pop();
        match cached {
            Some(item) => item,
            None => (self.create)(),
        }
    }

    /// Return a value for possible reuse.
    pub fn release(&self, item: T) {
        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(item);
        }
    }

    /// Acquire a value wrapped in a guard that releases it when dropped.
    pub fn checkout(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            item: Some(self.acquire()),
        }
    }

    /// Number of values currently cached.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock can only interrupt a push or pop, which leaves
    // the Vec intact, so a poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<T>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// A RAII guard over a pooled value.
pub struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    item: Option<T>,
}

impl<T> Pooled<'_, T> {
    /// Detach the value from the pool; it will not be released.
    pub fn into_inner(mut self) -> T {
        match self.item.take() {
            Some(item) => item,
            None => unreachable!("pooled value is present until drop"),
        }
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        match &self.item {
            Some(item) => item,
            None => unreachable!("pooled value is present until drop"),
        }
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("pooled value is present until drop"),
        }
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
