use std::fmt;

use serde::Serialize;

/// Global phase of a [`Kernel`](crate::kernel::Kernel).
///
/// `Initialised` is the frozen state: once reached, only `Shutdown` may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelPhase {
    Dormant,
    BundleSetup,
    Extending,
    Hooking,
    Preparing,
    Initialising,
    Initialised,
    Shutdown,
}

impl KernelPhase {
    /// Alias for the terminal phase reached after a successful `init()`.
    pub const FROZEN: KernelPhase = KernelPhase::Initialised;

    pub fn is_frozen(&self) -> bool {
        matches!(self, KernelPhase::Initialised)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelPhase::Dormant => "dormant",
            KernelPhase::BundleSetup => "bundle-setup",
            KernelPhase::Extending => "extending",
            KernelPhase::Hooking => "hooking",
            KernelPhase::Preparing => "preparing",
            KernelPhase::Initialising => "initialising",
            KernelPhase::Initialised => "initialised",
            KernelPhase::Shutdown => "shutdown",
        }
    }
}

impl Default for KernelPhase {
    fn default() -> Self {
        KernelPhase::Dormant
    }
}

impl fmt::Display for KernelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
