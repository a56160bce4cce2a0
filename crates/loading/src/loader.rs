use std::{
    io::BufRead,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{Result, SourceManager};

/// Byte stream handed to a decoder. Only managers create them.
pub type Stream = Box<dyn BufRead>;

/// Once-flag guarding a loader's one-time setup.
///
/// Decoders are shared by every manager, possibly on several threads at once;
/// `call_once` runs the setup on exactly one of them while the others wait for
/// it. A failed setup leaves the flag unset, so the next load tries again.
#[derive(Debug, Default)]
pub struct InitFlag {
    done: AtomicBool,
    lock: Mutex<()>,
}

impl InitFlag {
    pub const fn new() -> Self {
        InitFlag {
            done: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    pub fn is_set(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn call_once(&self, init: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.is_set() {
            return Ok(());
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_set() {
            return Ok(());
        }
        init()?;
        self.done.store(true, Ordering::Release);
        Ok(())
    }
}

/// Decoder turning a byte stream into a `T`.
///
/// Implementations are registered once per type tag and shared, so they keep no
/// per-load state. The only state they may carry is one-time initialization
/// (bringing up a codec library), performed by `load` before the first decode.
/// Loaders with a real `init` should hand out an `InitFlag` from `init_flag`;
/// `load` then runs `init` once even when several threads decode concurrently.
///
/// `do_load` receives the manager driving the current load; a decoder that needs
/// other resources (a model needing its textures) loads them through it.
pub trait Loader<T>: Send + Sync {
    /// One-time setup. Called at most once, before the first `do_load`.
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn init_flag(&self) -> Option<&InitFlag> {
        None
    }

    fn is_inited(&self) -> bool {
        self.init_flag().is_none_or(InitFlag::is_set)
    }

    fn do_load(
        &self,
        stream: &mut dyn BufRead,
        manager: &mut dyn SourceManager,
        type_tag: &str,
    ) -> Result<T>;

    fn load(
        &self,
        stream: &mut dyn BufRead,
        manager: &mut dyn SourceManager,
        type_tag: &str,
    ) -> Result<T> {
        match self.init_flag() {
            Some(flag) => flag.call_once(|| self.init())?,
            None if !self.is_inited() => self.init()?,
            None => {}
        }
        self.do_load(stream, manager, type_tag)
    }
}
