//! AArch64 capability detection.
//!
//! AArch64 mandates NEON, VFPv4-class FMA and hardware division, so only the
//! optional half-precision extension is probed at runtime. The core type is
//! read from `/proc/cpuinfo` where available.

use super::features::{arm, system, FeatureSet};
use super::microarch::{parse_arm_cpuinfo, Microarchitecture, Vendor};

pub(crate) fn detect() -> (Vendor, Microarchitecture, FeatureSet) {
    let isa = arm::ISA_V7
        | arm::ISA_V7MP
        | arm::ISA_VFP3
        | arm::ISA_VFP_D32
        | arm::ISA_VFP3_HP
        | arm::ISA_VFP4
        | arm::ISA_DIV;
    let mut simd = arm::SIMD_NEON | arm::SIMD_NEON2;
    if std::arch::is_aarch64_feature_detected!("fp16") {
        simd |= arm::SIMD_NEON_HP;
    }
    let sys = system::CYCLE_COUNTER
        | system::CYCLE_COUNTER_64BIT
        | system::ADDRESS_SPACE_64BIT
        | system::GP_REGISTERS_64BIT
        | system::MISALIGNED_ACCESS
        | arm::SYSTEM_D32;

    let (vendor, microarchitecture) = identify_core();
    (vendor, microarchitecture, FeatureSet::new(isa, simd, sys))
}

fn identify_core() -> (Vendor, Microarchitecture) {
    let cpuinfo = match std::fs::read_to_string("/proc/cpuinfo") {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(error = %err, "cpuinfo unavailable, core type unknown");
            return (Vendor::Unknown, Microarchitecture::Unknown);
        }
    };
    match parse_arm_cpuinfo(&cpuinfo) {
        Some((implementer, part)) => (
            Vendor::from_arm_implementer(implementer),
            Microarchitecture::from_arm(implementer, part),
        ),
        None => (Vendor::Unknown, Microarchitecture::Unknown),
    }
}
