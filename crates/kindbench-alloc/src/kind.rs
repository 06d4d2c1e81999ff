//! Allocation kinds and the process-wide kind registry.
//!
//! High-bandwidth availability is set via the `KINDBENCH_HBW_NODES`
//! environment variable, read once and cached:
//! - unset, empty or `0`: no high-bandwidth memory. `Hbw` requests fail with
//!   [`AllocError::KindUnavailable`], `HbwPreferred` requests fall back to the
//!   default arena.
//! - anything else: the high-bandwidth arena serves both `Hbw` and
//!   `HbwPreferred`.

use std::sync::OnceLock;

use crate::arena::ArenaId;
use crate::error::AllocError;

/// Allocation kind identifier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Regular heap memory.
    #[default]
    Default,
    /// High-bandwidth memory only. Fails when none is present.
    Hbw,
    /// High-bandwidth memory when present, default memory otherwise.
    HbwPreferred,
    /// Blocks aligned for huge-page backing.
    HugeTlb,
}

impl Kind {
    /// Every registered kind, in declaration order.
    pub const ALL: [Kind; 4] = [Kind::Default, Kind::Hbw, Kind::HbwPreferred, Kind::HugeTlb];

    /// Number of registered kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Parse from string (case-insensitive). Returns `None` for unknown names.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "regular" => Some(Self::Default),
            "hbw" => Some(Self::Hbw),
            "hbw_preferred" | "hbw-preferred" | "hbwpreferred" => Some(Self::HbwPreferred),
            "hugetlb" | "huge" => Some(Self::HugeTlb),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hbw => "hbw",
            Self::HbwPreferred => "hbw_preferred",
            Self::HugeTlb => "hugetlb",
        }
    }

    /// Dense index into per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Default => 0,
            Self::Hbw => 1,
            Self::HbwPreferred => 2,
            Self::HugeTlb => 3,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a kind against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Arena that serves the request.
    pub arena: ArenaId,
    /// True when a preferred kind was redirected to the default arena.
    pub fell_back: bool,
}

/// Which kinds have backing memory on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRegistry {
    hbw_available: bool,
}

impl KindRegistry {
    #[must_use]
    pub const fn new(hbw_available: bool) -> Self {
        Self { hbw_available }
    }

    /// Build from the raw value of `KINDBENCH_HBW_NODES`.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        let hbw_available = value
            .map(str::trim)
            .is_some_and(|v| !v.is_empty() && v != "0");
        Self::new(hbw_available)
    }

    /// Build from the current process environment (uncached).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var("KINDBENCH_HBW_NODES").ok().as_deref())
    }

    #[must_use]
    pub const fn hbw_available(&self) -> bool {
        self.hbw_available
    }

    /// Returns true if an allocation of `kind` can succeed.
    #[must_use]
    pub const fn is_available(&self, kind: Kind) -> bool {
        !matches!(kind, Kind::Hbw) || self.hbw_available
    }

    /// Map `kind` to the arena that serves it.
    pub fn resolve(&self, kind: Kind) -> Result<Resolution, AllocError> {
        if !self.is_available(kind) {
            return Err(AllocError::KindUnavailable(kind));
        }
        let resolution = match kind {
            Kind::Default => Resolution {
                arena: ArenaId::Default,
                fell_back: false,
            },
            Kind::HugeTlb => Resolution {
                arena: ArenaId::Huge,
                fell_back: false,
            },
            Kind::Hbw => Resolution {
                arena: ArenaId::HighBandwidth,
                fell_back: false,
            },
            Kind::HbwPreferred if self.hbw_available => Resolution {
                arena: ArenaId::HighBandwidth,
                fell_back: false,
            },
            Kind::HbwPreferred => Resolution {
                arena: ArenaId::Default,
                fell_back: true,
            },
        };
        Ok(resolution)
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new(false)
    }
}

static GLOBAL_REGISTRY: OnceLock<KindRegistry> = OnceLock::new();

/// Get the process-wide registry (reads env var on first call, caches thereafter).
#[must_use]
pub fn registry() -> &'static KindRegistry {
    GLOBAL_REGISTRY.get_or_init(KindRegistry::from_env)
}
