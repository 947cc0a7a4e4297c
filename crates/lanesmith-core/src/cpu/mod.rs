//! Capability probe.
//!
//! This module provides:
//! - `FeatureSet` and the per-architecture bit constants
//! - `Vendor` / `Architecture` / `Microarchitecture` identification
//! - `detect()` for a fresh probe and `probe()` for the cached process-wide result
//! - cycle counter and timer utilities

#[cfg(target_arch = "aarch64")]
mod arm;
pub mod clock;
mod features;
mod microarch;
#[cfg(target_arch = "x86_64")]
mod x86;


use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub use clock::{timer_frequency, timer_ticks, CycleCounter};
pub use features::{arm as arm_bits, system as system_bits, x86 as x86_bits};
pub use features::{FeatureSet, NameTable};
pub use microarch::{parse_arm_cpuinfo, Architecture, Microarchitecture, Vendor};

/// Everything the probe learned about the running processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Processor vendor.
    pub vendor: Vendor,
    /// Instruction set architecture family.
    pub architecture: Architecture,
    /// Microarchitecture tag used for dispatch preference.
    pub microarchitecture: Microarchitecture,
    /// Detected capabilities.
    pub features: FeatureSet,
}

impl CpuInfo {
    /// Describes a CPU with nothing but the Default requirements satisfied.
    #[must_use]
    pub const fn baseline() -> Self {
        Self {
            vendor: Vendor::Unknown,
            architecture: Architecture::current(),
            microarchitecture: Microarchitecture::Unknown,
            features: FeatureSet::EMPTY,
        }
    }

    /// Name table matching this CPU's architecture.
    #[must_use]
    pub const fn name_table(&self) -> NameTable {
        match self.architecture {
            Architecture::Arm => NameTable::Arm,
            _ => NameTable::X86,
        }
    }
}

static CPU_INFO: OnceLock<CpuInfo> = OnceLock::new();

/// Queries the running CPU.
///
/// Pure with respect to process lifetime; prefer [`probe`] which caches it.
#[must_use]
pub fn detect() -> CpuInfo {
    let (vendor, microarchitecture, mut features) = detect_arch();
    if std::thread::available_parallelism().map_or(false, |n| n.get() == 1) {
        features.system |= system_bits::SINGLE_THREADED;
    }
    CpuInfo {
        vendor,
        architecture: Architecture::current(),
        microarchitecture,
        features,
    }
}

#[cfg(target_arch = "x86_64")]
fn detect_arch() -> (Vendor, Microarchitecture, FeatureSet) {
    x86::detect()
}

#[cfg(target_arch = "aarch64")]
fn detect_arch() -> (Vendor, Microarchitecture, FeatureSet) {
    arm::detect()
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn detect_arch() -> (Vendor, Microarchitecture, FeatureSet) {
    (Vendor::Unknown, Microarchitecture::Unknown, FeatureSet::EMPTY)
}

/// Returns the cached probe result, detecting on first use.
#[inline]
#[must_use]
pub fn probe() -> &'static CpuInfo {
    CPU_INFO.get_or_init(|| {
        let info = detect();
        tracing::debug!(
            vendor = ?info.vendor,
            microarch = %info.microarchitecture,
            features = %info.features,
            "cpu probed"
        );
        info
    })
}
