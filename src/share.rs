//! Shared handles and view chains.
//!
//! A [`SharedDict`] is a dictionary behind an `Arc<RwLock<..>>`: clone the
//! handle freely, take the read lock for lookups and the write lock for
//! mutations. The sharable methods additionally tolerate readers racing a
//! writer's *structure* only insofar as the borrow rules already guarantee
//! it; the lock provides the actual exclusion.
//!
//! A dictionary may also be attached as a *view* of another: keys missing
//! locally fall through to the parent, and a local entry shadows any equal
//! key further up the chain. Chains are kept acyclic and bounded at attach
//! time, so [`Dict::lookup`] never spins.

use core::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::dict::{Dict, Installed, Lookup};
use crate::discipline::Discipline;
use crate::error::{DictError, Full};

/// A dictionary shared across threads.
pub type SharedDict<T, D> = Arc<RwLock<Dict<T, D>>>;

/// Longest view chain a dictionary may sit at the bottom of.
pub const MAX_VIEW_DEPTH: usize = 1024;

/// Takes the read lock, surfacing poisoning as [`DictError::LockPoisoned`].
pub fn read<T, D: Discipline<T>>(
    dict: &SharedDict<T, D>,
) -> Result<RwLockReadGuard<'_, Dict<T, D>>, DictError> {
    dict.read().map_err(|_| DictError::LockPoisoned)
}

/// Takes the write lock, surfacing poisoning as [`DictError::LockPoisoned`].
pub fn write<T, D: Discipline<T>>(
    dict: &SharedDict<T, D>,
) -> Result<RwLockWriteGuard<'_, Dict<T, D>>, DictError> {
    dict.write().map_err(|_| DictError::LockPoisoned)
}

/// Attaches `child` as a view of `parent`: lookups on `child` that miss
/// locally continue through `parent` and its own parents.
///
/// The attachment is refused if it would close a cycle (including
/// self-attachment) or push the chain past [`MAX_VIEW_DEPTH`]. A previous
/// attachment of `child` is replaced. The parent is held weakly: dropping
/// every strong handle to it turns later lookups through `child` into
/// [`DictError::ViewParentClosed`].
pub fn view_attach<T, D: Discipline<T>>(
    child: &SharedDict<T, D>,
    parent: &SharedDict<T, D>,
) -> Result<(), DictError> {
    let child_ptr = Arc::as_ptr(child);
    let mut depth = 1;
    let mut at = Arc::clone(parent);
    loop {
        if Arc::as_ptr(&at) == child_ptr {
            return Err(DictError::CycleRejected);
        }
        let up = {
            let guard = read(&at)?;
            guard.view.as_ref().and_then(|weak| weak.upgrade())
        };
        match up {
            Some(next) => {
                depth += 1;
                if depth >= MAX_VIEW_DEPTH {
                    return Err(DictError::ViewDepthExceeded);
                }
                at = next;
            }
            None => break,
        }
    }
    write(child)?.view = Some(Arc::downgrade(parent));
    Ok(())
}

/// Detaches `child` from its parent, if it has one. Returns whether an
/// attachment was removed.
pub fn view_detach<T, D: Discipline<T>>(child: &SharedDict<T, D>) -> Result<bool, DictError> {
    Ok(write(child)?.view.take().is_some())
}

/// Error from [`view_install`].
#[derive(Debug, PartialEq, Eq)]
pub enum ViewInstallError<T> {
    /// The view chain could not be walked.
    Chain(DictError),
    /// The target dictionary is at capacity; the object comes back.
    Full(Full<T>),
}

impl<T> From<DictError> for ViewInstallError<T> {
    fn from(err: DictError) -> Self {
        ViewInstallError::Chain(err)
    }
}

impl<T> From<Full<T>> for ViewInstallError<T> {
    fn from(err: Full<T>) -> Self {
        ViewInstallError::Full(err)
    }
}

impl<T> fmt::Display for ViewInstallError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewInstallError::Chain(err) => err.fmt(f),
            ViewInstallError::Full(err) => err.fmt(f),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for ViewInstallError<T> {}

/// Installs `obj` into the view chain starting at `start`: the target is
/// the nearest dictionary whose local contents already match the object's
/// key, or `start` itself when no dictionary on the chain does. Ordinary
/// inserts and deletes never do this; install-into-view is the one
/// mutation that follows the chain.
pub fn view_install<T, D: Discipline<T>>(
    start: &SharedDict<T, D>,
    obj: T,
) -> Result<Installed<T>, ViewInstallError<T>> {
    let mut at = Arc::clone(start);
    let mut depth = 1;
    loop {
        let (hit, up) = {
            let guard = read(&at)?;
            let hit = guard.contains(guard.discipline().key(&obj));
            let up = match (&guard.view, hit) {
                (Some(weak), false) => {
                    Some(weak.upgrade().ok_or(DictError::ViewParentClosed)?)
                }
                _ => None,
            };
            (hit, up)
        };
        if hit {
            return Ok(write(&at)?.install(obj)?);
        }
        match up {
            Some(parent) => {
                depth += 1;
                if depth > MAX_VIEW_DEPTH {
                    return Err(DictError::ViewDepthExceeded.into());
                }
                at = parent;
            }
            None => return Ok(write(start)?.install(obj)?),
        }
    }
}

impl<T, D: Discipline<T>> Dict<T, D> {
    /// Wraps the dictionary for cross-thread sharing and view attachment.
    pub fn into_shared(self) -> SharedDict<T, D> {
        Arc::new(RwLock::new(self))
    }

    /// `true` if this dictionary is attached as a view of another.
    pub fn is_view(&self) -> bool {
        self.view.is_some()
    }

    /// Probes this dictionary and then its view chain, nearest first, and
    /// applies `visit` to the first match. `Ok(None)` means no dictionary
    /// on the chain holds a matching key.
    ///
    /// Ancestors are read-locked one at a time while visited, so `visit`
    /// must not re-enter the chain.
    pub fn lookup<R>(
        &self,
        how: Lookup,
        key: &D::Key,
        visit: impl FnOnce(&T) -> R,
    ) -> Result<Option<R>, DictError> {
        if let Some(h) = self.probe(how, key) {
            return Ok(self.get(h).map(visit));
        }
        let mut link = self.view.clone();
        let mut depth = 1;
        while let Some(weak) = link {
            let parent = weak.upgrade().ok_or(DictError::ViewParentClosed)?;
            let guard = parent.read().map_err(|_| DictError::LockPoisoned)?;
            if let Some(h) = guard.probe(how, key) {
                let obj = guard.get(h).expect("probed handle");
                return Ok(Some(visit(obj)));
            }
            depth += 1;
            if depth > MAX_VIEW_DEPTH {
                return Err(DictError::ViewDepthExceeded);
            }
            link = guard.view.clone();
        }
        Ok(None)
    }
}
