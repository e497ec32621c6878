use std::fmt;

use serde::Serialize;

/// Per-bundle lifecycle phase, in the order the kernel drives bundles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundlePhase {
    #[default]
    Dormant,
    Setup,
    Extending,
    Extended,
    Hooking,
    Hooked,
    BeforePreparation,
    Prepared,
    BeforeInitialisation,
    /// Also reachable as [`BundlePhase::FROZEN`].
    Initialised,
    Shutdown,
}

impl BundlePhase {
    /// Once initialised a bundle is frozen: only shutdown is accepted.
    pub const FROZEN: BundlePhase = BundlePhase::Initialised;

    pub fn is_frozen(self) -> bool {
        self == Self::FROZEN
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BundlePhase::Dormant => "dormant",
            BundlePhase::Setup => "setup",
            BundlePhase::Extending => "extending",
            BundlePhase::Extended => "extended",
            BundlePhase::Hooking => "hooking",
            BundlePhase::Hooked => "hooked",
            BundlePhase::BeforePreparation => "before-preparation",
            BundlePhase::Prepared => "prepared",
            BundlePhase::BeforeInitialisation => "before-initialisation",
            BundlePhase::Initialised => "initialised",
            BundlePhase::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for BundlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
