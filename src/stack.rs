//! Nesting of operation scopes.
//!
//! The root scope at the bottom of the stack is the client-visible logical
//! operation. Nested scopes receive events while they are on top and fold
//! their totals into their parent when popped, so every byte of storage work
//! ends up charged to exactly one logical operation.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use smallvec::SmallVec;
#[cfg(debug_assertions)]
use tracing::warn;

use crate::metrics::OperationMetrics;
use crate::scope::OperationScope;
use crate::units::UnitSize;

/// Ordered set of active scopes for one logical operation, innermost last.
///
/// Owned by a single execution context; no synchronization is involved.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: SmallVec<[OperationScope; 4]>,
    paused: u32,
    unit_size: UnitSize,
}

impl ScopeStack {
    /// Creates a stack whose root is `root`.
    pub fn new(root: OperationScope, unit_size: UnitSize) -> Self {
        let mut scopes = SmallVec::new();
        scopes.push(root);
        Self {
            scopes,
            paused: 0,
            unit_size,
        }
    }

    /// Unit size used when finalizing.
    pub fn unit_size(&self) -> UnitSize {
        self.unit_size
    }

    /// Number of scopes on the stack, including the root.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the root scope measures anything.
    pub fn is_enabled(&self) -> bool {
        self.root().is_enabled()
    }

    /// Whether recording is suspended by a [`PauseGuard`].
    pub fn is_paused(&self) -> bool {
        self.paused > 0
    }

    /// Outermost scope, the one reported for the operation.
    pub fn root(&self) -> &OperationScope {
        &self.scopes[0]
    }

    /// Innermost scope, the one receiving events.
    pub fn current(&self) -> &OperationScope {
        let last = self.scopes.len() - 1;
        &self.scopes[last]
    }

    fn current_mut(&mut self) -> Option<&mut OperationScope> {
        if self.paused > 0 {
            return None;
        }
        self.scopes.last_mut()
    }

    /// Records `bytes` of document data read into the innermost scope.
    #[inline]
    pub fn record_doc_read(&mut self, bytes: u64) {
        if let Some(scope) = self.current_mut() {
            scope.record_doc_read(bytes);
        }
    }

    /// Records `bytes` of document data written into the innermost scope.
    #[inline]
    pub fn record_doc_written(&mut self, bytes: u64) {
        if let Some(scope) = self.current_mut() {
            scope.record_doc_written(bytes);
        }
    }

    /// Records `count` index entries read into the innermost scope.
    #[inline]
    pub fn record_idx_entries_read(&mut self, count: u64) {
        if let Some(scope) = self.current_mut() {
            scope.record_idx_entries_read(count);
        }
    }

    /// Records `count` sorted keys into the innermost scope.
    #[inline]
    pub fn record_keys_sorted(&mut self, count: u64) {
        if let Some(scope) = self.current_mut() {
            scope.record_keys_sorted(count);
        }
    }

    /// Records `count` returned document units into the innermost scope.
    #[inline]
    pub fn record_docs_returned(&mut self, count: u64) {
        if let Some(scope) = self.current_mut() {
            scope.record_docs_returned(count);
        }
    }

    /// Records CPU time into the innermost scope.
    #[inline]
    pub fn record_cpu(&mut self, duration: Duration) {
        if let Some(scope) = self.current_mut() {
            scope.record_cpu(duration);
        }
    }

    /// Pushes a child scope that is popped and merged when the guard drops.
    ///
    /// When measurement is disabled nothing is pushed.
    pub fn push(&mut self) -> ChildScope<'_> {
        let pushed = self.enter();
        ChildScope {
            stack: self,
            pushed,
        }
    }

    /// Pushes a child scope without a guard. Pair with [`pop`](Self::pop).
    ///
    /// Returns `false` when measurement is disabled or the root is already
    /// finalized, and nothing was pushed.
    pub fn enter(&mut self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if self.root().is_closed() {
            #[cfg(debug_assertions)]
            warn!(depth = self.scopes.len(), "metering.stack.push_after_finalize");
            return false;
        }
        let child = self.current().child();
        self.scopes.push(child);
        true
    }

    /// Pops the innermost child and merges its totals into the new top.
    ///
    /// Popping the root is a contract violation and leaves the stack as is.
    pub fn pop(&mut self) -> bool {
        if self.scopes.len() <= 1 {
            #[cfg(debug_assertions)]
            {
                if self.is_enabled() {
                    warn!(depth = self.scopes.len(), "metering.stack.pop_root");
                }
            }
            return false;
        }
        let Some(child) = self.scopes.pop() else {
            return false;
        };
        if let Some(parent) = self.scopes.last_mut() {
            parent.absorb(&child);
        }
        true
    }

    /// Suspends recording until the returned guard drops.
    ///
    /// Work done while paused is charged to no operation.
    pub fn pause(&mut self) -> PauseGuard<'_> {
        self.paused += 1;
        PauseGuard { stack: self }
    }

    /// Current totals of the root scope, excluding unpopped children.
    pub fn snapshot(&self) -> OperationMetrics {
        self.root().snapshot(self.unit_size)
    }

    /// Merges any children still on the stack and finalizes the root.
    pub fn finalize(&mut self) -> OperationMetrics {
        while self.scopes.len() > 1 {
            self.pop();
        }
        let unit_size = self.unit_size;
        self.scopes[0].finalize(unit_size)
    }
}

/// Guard for a pushed child scope; merges it into the parent on drop.
///
/// Dereferences to the owning [`ScopeStack`] so storage code can keep
/// recording, or push further children, through it.
#[derive(Debug)]
pub struct ChildScope<'a> {
    stack: &'a mut ScopeStack,
    pushed: bool,
}

impl Deref for ChildScope<'_> {
    type Target = ScopeStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for ChildScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for ChildScope<'_> {
    fn drop(&mut self) {
        if self.pushed {
            self.stack.pop();
        }
    }
}

/// Guard that keeps recording suspended while alive.
#[derive(Debug)]
pub struct PauseGuard<'a> {
    stack: &'a mut ScopeStack,
}

impl Deref for PauseGuard<'_> {
    type Target = ScopeStack;

    fn deref(&self) -> &Self::Target {
        self.stack
    }
}

impl DerefMut for PauseGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.stack
    }
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.stack.paused = self.stack.paused.saturating_sub(1);
    }
}
