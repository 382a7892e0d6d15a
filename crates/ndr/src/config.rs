//! Codec configuration

use crate::drep::DataRepresentation;
use crate::error::{Result, MAX_NDR_ALLOCATION_SIZE};
use std::fmt;
use std::sync::Arc;

/// Which way a payload is moving when a hook runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encode,
    Decode,
}

/// What a prepare-payload hook gets to see
#[derive(Debug, Clone, Copy)]
pub struct PayloadEvent {
    pub direction: Direction,
    /// Transfer syntax name ("NDR" or "NDR64")
    pub syntax: &'static str,
    /// Stream position when the hook runs
    pub position: usize,
    pub drep: DataRepresentation,
}

pub type PayloadHook = Arc<dyn Fn(&PayloadEvent) -> Result<()> + Send + Sync>;

/// Optional callbacks run before and after a payload is (un)marshaled.
///
/// A hook error fails the call like any codec error.
#[derive(Clone, Default)]
pub struct Hooks {
    pub before_prepare_payload: Option<PayloadHook>,
    pub after_prepare_payload: Option<PayloadHook>,
}

impl Hooks {
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PayloadEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.before_prepare_payload = Some(Arc::new(hook));
        self
    }

    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PayloadEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.after_prepare_payload = Some(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.before_prepare_payload.is_none() && self.after_prepare_payload.is_none()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_prepare_payload", &self.before_prepare_payload.is_some())
            .field("after_prepare_payload", &self.after_prepare_payload.is_some())
            .finish()
    }
}

/// Settings for one encode or decode pass
#[derive(Debug, Clone)]
pub struct NdrConfig {
    /// Data representation for streams the codec creates itself
    pub drep: DataRepresentation,
    /// Inline referents instead of deferring them, with no referent ids
    pub opaque: bool,
    /// Upper bound on any single decoded allocation, in bytes
    pub max_allocation: usize,
    pub hooks: Hooks,
}

impl Default for NdrConfig {
    fn default() -> Self {
        Self {
            drep: DataRepresentation::ndr(),
            opaque: false,
            max_allocation: MAX_NDR_ALLOCATION_SIZE,
            hooks: Hooks::default(),
        }
    }
}

impl NdrConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drep(mut self, drep: DataRepresentation) -> Self {
        self.drep = drep;
        self
    }

    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    pub fn with_max_allocation(mut self, max_allocation: usize) -> Self {
        self.max_allocation = max_allocation;
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}
