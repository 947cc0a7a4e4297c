//! x86-64 capability detection through CPUID.
//!
//! Scalar ISA bits come straight from CPUID. Vector extensions that need
//! OS-saved register state (AVX and later) go through `is_x86_feature_detected!`,
//! which also checks XCR0.

#![allow(clippy::similar_names)]

use std::arch::x86_64::{CpuidResult, __cpuid, __cpuid_count};

use super::features::{system, x86, FeatureSet};
use super::microarch::{Microarchitecture, Vendor};

#[inline]
#[allow(unused_unsafe)]
fn cpuid(leaf: u32) -> CpuidResult {
    // SAFETY: CPUID is available on every x86-64 processor.
    unsafe {
        __cpuid(leaf)
    }
}

#[inline]
#[allow(unused_unsafe)]
fn cpuid_count(leaf: u32, sub_leaf: u32) -> CpuidResult {
    // SAFETY: CPUID is available on every x86-64 processor.
    unsafe {
        __cpuid_count(leaf, sub_leaf)
    }
}

#[inline]
fn bit(reg: u32, index: u32) -> bool {
    reg & (1 << index) != 0
}

fn vendor_signature(leaf0: CpuidResult) -> String {
    let mut bytes = Vec::with_capacity(12);
    for reg in [leaf0.ebx, leaf0.edx, leaf0.ecx] {
        bytes.extend_from_slice(&reg.to_le_bytes());
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Raw identification read from CPUID leaf 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModelInfo {
    pub family: u32,
    pub model: u32,
    pub ext_model: u32,
}

impl ModelInfo {
    pub(crate) fn from_eax(eax: u32) -> Self {
        let base_model = (eax >> 4) & 0xF;
        let base_family = (eax >> 8) & 0xF;
        let ext_model = (eax >> 16) & 0xF;
        let ext_family = (eax >> 20) & 0xFF;
        Self {
            family: base_family + ext_family,
            model: base_model + ext_model * 16,
            ext_model,
        }
    }
}

pub(crate) fn detect() -> (Vendor, Microarchitecture, FeatureSet) {
    let leaf0 = cpuid(0);
    let max_leaf = leaf0.eax;
    let vendor = Vendor::from_x86_signature(&vendor_signature(leaf0));

    let mut isa = x86::ISA_CPUID | x86::ISA_X64;
    let mut simd = 0u64;
    let mut sys = system::ADDRESS_SPACE_64BIT
        | system::GP_REGISTERS_64BIT
        | system::MISALIGNED_ACCESS
        | x86::SYSTEM_FPU
        | x86::SYSTEM_XMM;

    let mut microarchitecture = Microarchitecture::Unknown;
    if max_leaf >= 1 {
        let leaf1 = cpuid(1);
        let info = ModelInfo::from_eax(leaf1.eax);
        microarchitecture =
            Microarchitecture::from_x86(vendor, info.family, info.model, info.ext_model);

        let (ecx, edx) = (leaf1.ecx, leaf1.edx);
        for (reg, index, flag) in [
            (edx, 0, x86::ISA_FPU),
            (edx, 4, x86::ISA_RDTSC),
            (edx, 8, x86::ISA_CMPXCHG8B),
            (edx, 11, x86::ISA_SYSENTER),
            (edx, 15, x86::ISA_CMOV),
            (edx, 19, x86::ISA_CLFLUSH),
            (edx, 24, x86::ISA_FXSAVE),
            (ecx, 1, x86::ISA_PCLMULQDQ),
            (ecx, 3, x86::ISA_MONITOR),
            (ecx, 13, x86::ISA_CMPXCHG16B),
            (ecx, 22, x86::ISA_MOVBE),
            (ecx, 23, x86::ISA_POPCNT),
            (ecx, 25, x86::ISA_AES),
            (ecx, 26, x86::ISA_XSAVE),
            (ecx, 30, x86::ISA_RDRAND),
        ] {
            if bit(reg, index) {
                isa |= flag;
            }
        }
        for (reg, index, flag) in [
            (edx, 23, x86::SIMD_MMX),
            (edx, 25, x86::SIMD_SSE),
            (edx, 26, x86::SIMD_SSE2),
            (ecx, 0, x86::SIMD_SSE3),
            (ecx, 9, x86::SIMD_SSSE3),
            (ecx, 19, x86::SIMD_SSE4_1),
            (ecx, 20, x86::SIMD_SSE4_2),
        ] {
            if bit(reg, index) {
                simd |= flag;
            }
        }
        if bit(edx, 4) {
            sys |= system::CYCLE_COUNTER | system::CYCLE_COUNTER_64BIT;
        }
    }

    if max_leaf >= 7 {
        let leaf7 = cpuid_count(7, 0);
        for (index, flag) in [
            (0, x86::ISA_FSGSBASE),
            (3, x86::ISA_BMI),
            (4, x86::ISA_HLE),
            (8, x86::ISA_BMI2),
            (11, x86::ISA_RTM),
            (14, x86::ISA_MPX),
            (18, x86::ISA_RDSEED),
            (19, x86::ISA_ADX),
            (29, x86::ISA_SHA),
        ] {
            if bit(leaf7.ebx, index) {
                isa |= flag;
            }
        }
    }

    let max_extended = cpuid(0x8000_0000).eax;
    let mut xop_fma4 = 0u64;
    if max_extended >= 0x8000_0001 {
        let ext = cpuid(0x8000_0001);
        for (reg, index, flag) in [
            (ext.ecx, 0, x86::ISA_LAHF_SAHF64),
            (ext.ecx, 5, x86::ISA_LZCNT),
            (ext.ecx, 15, x86::ISA_LWP),
            (ext.ecx, 21, x86::ISA_TBM),
            (ext.edx, 11, x86::ISA_SYSCALL),
            (ext.edx, 27, x86::ISA_RDTSCP),
        ] {
            if bit(reg, index) {
                isa |= flag;
            }
        }
        if bit(ext.ecx, 6) {
            simd |= x86::SIMD_SSE4A;
        }
        if bit(ext.ecx, 7) {
            sys |= x86::SYSTEM_MISALIGNED_SSE;
        }
        if vendor == Vendor::Amd {
            if bit(ext.edx, 22) {
                simd |= x86::SIMD_MMX_PLUS;
            }
            if bit(ext.edx, 30) {
                simd |= x86::SIMD_3DNOW_PLUS;
            }
            if bit(ext.edx, 31) {
                simd |= x86::SIMD_3DNOW;
            }
        }
        if bit(ext.ecx, 11) {
            xop_fma4 |= x86::SIMD_XOP;
        }
        if bit(ext.ecx, 16) {
            xop_fma4 |= x86::SIMD_FMA4;
        }
    }

    if is_x86_feature_detected!("avx") {
        simd |= x86::SIMD_AVX | xop_fma4;
        sys |= x86::SYSTEM_YMM;
        if is_x86_feature_detected!("avx2") {
            simd |= x86::SIMD_AVX2;
        }
        if is_x86_feature_detected!("fma") {
            simd |= x86::SIMD_FMA3;
        }
        if is_x86_feature_detected!("f16c") {
            simd |= x86::SIMD_F16C;
        }
    }
    if is_x86_feature_detected!("avx512f") {
        simd |= x86::SIMD_AVX512F;
        sys |= x86::SYSTEM_ZMM;
        if is_x86_feature_detected!("avx512cd") {
            simd |= x86::SIMD_AVX512CD;
        }
    }

    (vendor, microarchitecture, FeatureSet::new(isa, simd, sys))
}
