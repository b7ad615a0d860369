//! The reader-extension registry and its dispatch path.
//!
//! [`TagReaders`] is the single owned state object behind `#tag form`
//! expansion: the root tag→handler mapping, the one-time loader gate, and the
//! per-thread override/fallback stacks. It is built once by the host with its
//! collaborator capabilities injected, which is what lets tests isolate runs
//! without process restarts.
//!
//! ## Notes
//! - The first resolve (or `dispatch`) triggers discovery; later calls read
//!   the cached mapping. `reset_cache` restores the defaults snapshot and
//!   forces the next resolve to re-scan.
//! - A scoped override *fully* shadows the root mapping for its dynamic
//!   extent: absence in the override is final, the root is not consulted.
//! - Scopes are RAII guards. Dropping the guard restores the previous scope,
//!   including during unwinds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use crate::config::ReaderConfig;
use crate::defaults;
use crate::discovery::files::SourcePaths;
use crate::discovery::manifest::ManifestIndex;
use crate::errors::ExtensionError;
use crate::form::{Form, ReadForm};
use crate::handler::{BindingResolver, HandlerRef};
use crate::loader;
use crate::tag::Tag;

/// A scoped fallback: invoked with the unmatched tag and the parsed form.
pub type FallbackFn = Arc<dyn Fn(&Tag, Form) -> Result<Form, ExtensionError> + Send + Sync>;

type TagMap = HashMap<Tag, HandlerRef>;

/// The process-wide reader-extension registry.
pub struct TagReaders {
    config: ReaderConfig,
    paths: Arc<dyn SourcePaths>,
    manifest: Arc<dyn ManifestIndex>,
    parser: Arc<dyn ReadForm>,
    bindings: Arc<dyn BindingResolver>,
    /// Snapshot restored by `reset_cache`.
    defaults: TagMap,
    root: RwLock<TagMap>,
    loaded: AtomicBool,
    /// Serializes the one-time load and `reset_cache`.
    load_gate: Mutex<()>,
    overrides: Mutex<HashMap<ThreadId, Vec<Arc<TagMap>>>>,
    fallbacks: Mutex<HashMap<ThreadId, Vec<FallbackFn>>>,
}

impl TagReaders {
    pub fn new(
        config: ReaderConfig,
        paths: Arc<dyn SourcePaths>,
        manifest: Arc<dyn ManifestIndex>,
        parser: Arc<dyn ReadForm>,
        bindings: Arc<dyn BindingResolver>,
    ) -> Self {
        let builtin = defaults::builtin_readers();
        Self {
            config,
            paths,
            manifest,
            parser,
            bindings,
            root: RwLock::new(builtin.clone()),
            defaults: builtin,
            loaded: AtomicBool::new(false),
            load_gate: Mutex::new(()),
            overrides: Mutex::new(HashMap::new()),
            fallbacks: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `tag` to a handler reference.
    ///
    /// If a scoped override is active on this thread it is consulted
    /// exclusively; otherwise the root mapping is consulted, running the
    /// loader first if it has not run yet.
    pub fn resolve(&self, tag: &Tag) -> Result<Option<HandlerRef>, ExtensionError> {
        if let Some(frame) = self.active_override() {
            return Ok(frame.get(tag).cloned());
        }
        self.ensure_loaded()?;
        Ok(read(&self.root).get(tag).cloned())
    }

    /// Expand one `#tag form` literal: resolve and invoke the handler, or the
    /// scoped fallback when no handler matches.
    pub fn dispatch(&self, tag: &Tag, form: Form) -> Result<Form, ExtensionError> {
        match self.resolve(tag)? {
            Some(handler) => handler.invoke(tag, form, self.bindings.as_ref()),
            None => match self.active_fallback() {
                Some(fallback) => fallback(tag, form),
                None => Err(ExtensionError::HandlerNotFound { tag: tag.clone() }),
            },
        }
    }

    /// Register a handler directly in the root mapping, outside the loader.
    ///
    /// The loader is run first if needed, so a registration is never clobbered
    /// by a later lazy load.
    pub fn register(&self, tag: Tag, handler: HandlerRef) -> Result<(), ExtensionError> {
        self.ensure_loaded()?;
        write(&self.root).insert(tag, handler);
        Ok(())
    }

    /// Install a full-shadow override mapping for the current thread's scope.
    #[must_use = "dropping the guard immediately removes the override"]
    pub fn install_override(&self, readers: TagMap) -> OverrideGuard<'_> {
        let thread = thread::current().id();
        lock(&self.overrides)
            .entry(thread)
            .or_default()
            .push(Arc::new(readers));
        OverrideGuard {
            readers: self,
            thread,
        }
    }

    /// Install a fallback for the current thread's scope, replacing the
    /// built-in "no handler for tag" failure.
    #[must_use = "dropping the guard immediately removes the fallback"]
    pub fn set_fallback(
        &self,
        fallback: impl Fn(&Tag, Form) -> Result<Form, ExtensionError> + Send + Sync + 'static,
    ) -> FallbackGuard<'_> {
        let thread = thread::current().id();
        lock(&self.fallbacks)
            .entry(thread)
            .or_default()
            .push(Arc::new(fallback));
        FallbackGuard {
            readers: self,
            thread,
        }
    }

    /// Restore the defaults snapshot and force the next resolve to re-run
    /// discovery. Test isolation only; not part of normal operation.
    pub fn reset_cache(&self) {
        let _gate = lock(&self.load_gate);
        *write(&self.root) = self.defaults.clone();
        self.loaded.store(false, Ordering::Release);
    }

    fn ensure_loaded(&self) -> Result<(), ExtensionError> {
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        let _gate = lock(&self.load_gate);
        // Another thread may have completed the load while we waited.
        if self.loaded.load(Ordering::Acquire) {
            return Ok(());
        }
        let merged = loader::load(
            &self.defaults,
            &self.config,
            self.paths.as_ref(),
            self.manifest.as_ref(),
            self.parser.as_ref(),
        )?;
        *write(&self.root) = merged;
        self.loaded.store(true, Ordering::Release);
        Ok(())
    }

    fn active_override(&self) -> Option<Arc<TagMap>> {
        lock(&self.overrides)
            .get(&thread::current().id())
            .and_then(|stack| stack.last().cloned())
    }

    fn active_fallback(&self) -> Option<FallbackFn> {
        lock(&self.fallbacks)
            .get(&thread::current().id())
            .and_then(|stack| stack.last().cloned())
    }
}

/// Removes its override frame on drop, restoring the previous scope.
pub struct OverrideGuard<'a> {
    readers: &'a TagReaders,
    thread: ThreadId,
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        pop_frame(&self.readers.overrides, self.thread);
    }
}

/// Removes its fallback on drop, restoring the previous scope.
pub struct FallbackGuard<'a> {
    readers: &'a TagReaders,
    thread: ThreadId,
}

impl Drop for FallbackGuard<'_> {
    fn drop(&mut self) {
        pop_frame(&self.readers.fallbacks, self.thread);
    }
}

fn pop_frame<T>(stacks: &Mutex<HashMap<ThreadId, Vec<T>>>, thread: ThreadId) {
    let mut stacks = lock(stacks);
    if let Some(stack) = stacks.get_mut(&thread) {
        stack.pop();
        if stack.is_empty() {
            stacks.remove(&thread);
        }
    }
}

// Lock poisoning only happens when another thread panicked mid-mutation; the
// guarded structures stay structurally valid, so recover the guard rather
// than propagate a panic out of a Drop impl.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read(lock: &RwLock<TagMap>) -> std::sync::RwLockReadGuard<'_, TagMap> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(lock: &RwLock<TagMap>) -> std::sync::RwLockWriteGuard<'_, TagMap> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
