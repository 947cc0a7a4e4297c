//! Capability bitmasks.
//!
//! Bit assignments are stable and shared by every descriptor table, so a
//! requirement written once keeps meaning the same thing across releases.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Three disjoint capability masks: ISA extensions, SIMD extensions and
/// system (OS/platform) capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Scalar instruction set extensions.
    pub isa: u64,
    /// Vector unit extensions.
    pub simd: u64,
    /// Operating system and platform capabilities.
    pub system: u64,
}

impl FeatureSet {
    /// No requirement at all; satisfied by every CPU.
    pub const EMPTY: Self = Self::new(0, 0, 0);

    /// Builds a set from raw masks.
    #[must_use]
    pub const fn new(isa: u64, simd: u64, system: u64) -> Self {
        Self { isa, simd, system }
    }

    /// Set with only ISA bits.
    #[must_use]
    pub const fn isa(bits: u64) -> Self {
        Self::new(bits, 0, 0)
    }

    /// Set with only SIMD bits.
    #[must_use]
    pub const fn simd(bits: u64) -> Self {
        Self::new(0, bits, 0)
    }

    /// Set with only system bits.
    #[must_use]
    pub const fn system(bits: u64) -> Self {
        Self::new(0, 0, bits)
    }

    /// Bitwise union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::new(
            self.isa | other.isa,
            self.simd | other.simd,
            self.system | other.system,
        )
    }

    /// True when no bit is set in any mask.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.isa == 0 && self.simd == 0 && self.system == 0
    }

    /// True when every required bit is present in `detected`.
    ///
    /// `R` is satisfied by `D` iff `R & !D == 0` for all three masks.
    #[must_use]
    pub const fn is_satisfied_by(self, detected: Self) -> bool {
        self.missing_from(detected).is_empty()
    }

    /// Required bits absent from `detected`.
    #[must_use]
    pub const fn missing_from(self, detected: Self) -> Self {
        Self::new(
            self.isa & !detected.isa,
            self.simd & !detected.simd,
            self.system & !detected.system,
        )
    }

    /// Human-readable names of the bits set, interpreted for `arch`.
    #[must_use]
    pub fn names(self, arch: NameTable) -> Vec<&'static str> {
        let (isa, simd, system) = match arch {
            NameTable::X86 => (x86::ISA_NAMES, x86::SIMD_NAMES, x86::SYSTEM_NAMES),
            NameTable::Arm => (arm::ISA_NAMES, arm::SIMD_NAMES, arm::SYSTEM_NAMES),
        };
        let mut out = Vec::new();
        collect_names(self.isa, isa, &mut out);
        collect_names(self.simd, simd, &mut out);
        collect_names(self.system, system::NAMES, &mut out);
        collect_names(self.system, system, &mut out);
        out
    }
}

fn collect_names(mask: u64, table: &[(u64, &'static str)], out: &mut Vec<&'static str>) {
    out.extend(
        table
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|&(_, name)| name),
    );
}

/// Which architecture's bit names to use when printing a [`FeatureSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTable {
    /// x86 and x86-64.
    X86,
    /// ARM and AArch64.
    Arm,
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "isa={:#x} simd={:#x} system={:#x}",
            self.isa, self.simd, self.system
        )
    }
}

/// Architecture-independent system capabilities.
pub mod system {
    /// A cycle counter is readable from user space.
    pub const CYCLE_COUNTER: u64 = 0x0000_0000_0000_0001;
    /// The cycle counter is 64 bits wide.
    pub const CYCLE_COUNTER_64BIT: u64 = 0x0000_0000_0000_0002;
    /// The process runs with a 64-bit address space.
    pub const ADDRESS_SPACE_64BIT: u64 = 0x0000_0000_0000_0004;
    /// General-purpose registers are 64 bits wide.
    pub const GP_REGISTERS_64BIT: u64 = 0x0000_0000_0000_0008;
    /// Misaligned memory accesses are supported.
    pub const MISALIGNED_ACCESS: u64 = 0x0000_0000_0000_0010;
    /// Only one logical core is available.
    pub const SINGLE_THREADED: u64 = 0x0000_0000_0000_0020;

    pub(crate) const NAMES: &[(u64, &str)] = &[
        (CYCLE_COUNTER, "CycleCounter"),
        (CYCLE_COUNTER_64BIT, "CycleCounter64Bit"),
        (ADDRESS_SPACE_64BIT, "AddressSpace64Bit"),
        (GP_REGISTERS_64BIT, "GPRegisters64Bit"),
        (MISALIGNED_ACCESS, "MisalignedAccess"),
        (SINGLE_THREADED, "SingleThreaded"),
    ];
}

/// x86 and x86-64 capability bits.
pub mod x86 {
    /// x87 FPU.
    pub const ISA_FPU: u64 = 0x0000_0000_0000_0001;
    /// CPUID instruction.
    pub const ISA_CPUID: u64 = 0x0000_0000_0000_0002;
    /// RDTSC instruction.
    pub const ISA_RDTSC: u64 = 0x0000_0000_0000_0004;
    /// Conditional moves.
    pub const ISA_CMOV: u64 = 0x0000_0000_0000_0008;
    /// SYSENTER/SYSEXIT.
    pub const ISA_SYSENTER: u64 = 0x0000_0000_0000_0010;
    /// SYSCALL/SYSRET.
    pub const ISA_SYSCALL: u64 = 0x0000_0000_0000_0020;
    /// CLFLUSH.
    pub const ISA_CLFLUSH: u64 = 0x0000_0000_0000_0080;
    /// MONITOR/MWAIT.
    pub const ISA_MONITOR: u64 = 0x0000_0000_0000_0100;
    /// FXSAVE/FXRSTOR.
    pub const ISA_FXSAVE: u64 = 0x0000_0000_0000_0200;
    /// XSAVE/XRSTOR.
    pub const ISA_XSAVE: u64 = 0x0000_0000_0000_0400;
    /// CMPXCHG8B.
    pub const ISA_CMPXCHG8B: u64 = 0x0000_0000_0000_0800;
    /// CMPXCHG16B.
    pub const ISA_CMPXCHG16B: u64 = 0x0000_0000_0000_1000;
    /// x86-64 long mode.
    pub const ISA_X64: u64 = 0x0000_0000_0000_2000;
    /// LAHF/SAHF in 64-bit mode.
    pub const ISA_LAHF_SAHF64: u64 = 0x0000_0000_0000_4000;
    /// RD/WR FS/GS base.
    pub const ISA_FSGSBASE: u64 = 0x0000_0000_0000_8000;
    /// MOVBE.
    pub const ISA_MOVBE: u64 = 0x0000_0000_0001_0000;
    /// POPCNT.
    pub const ISA_POPCNT: u64 = 0x0000_0000_0002_0000;
    /// LZCNT.
    pub const ISA_LZCNT: u64 = 0x0000_0000_0004_0000;
    /// BMI1.
    pub const ISA_BMI: u64 = 0x0000_0000_0008_0000;
    /// BMI2.
    pub const ISA_BMI2: u64 = 0x0000_0000_0010_0000;
    /// AMD TBM.
    pub const ISA_TBM: u64 = 0x0000_0000_0020_0000;
    /// RDRAND.
    pub const ISA_RDRAND: u64 = 0x0000_0000_0040_0000;
    /// AES-NI.
    pub const ISA_AES: u64 = 0x0000_0000_1000_0000;
    /// PCLMULQDQ.
    pub const ISA_PCLMULQDQ: u64 = 0x0000_0000_2000_0000;
    /// RDTSCP.
    pub const ISA_RDTSCP: u64 = 0x0000_0000_4000_0000;
    /// AMD lightweight profiling.
    pub const ISA_LWP: u64 = 0x0000_0000_8000_0000;
    /// Hardware lock elision.
    pub const ISA_HLE: u64 = 0x0000_0001_0000_0000;
    /// Restricted transactional memory.
    pub const ISA_RTM: u64 = 0x0000_0002_0000_0000;
    /// RDSEED.
    pub const ISA_RDSEED: u64 = 0x0000_0008_0000_0000;
    /// ADCX/ADOX.
    pub const ISA_ADX: u64 = 0x0000_0010_0000_0000;
    /// SHA extensions.
    pub const ISA_SHA: u64 = 0x0000_0020_0000_0000;
    /// Memory protection extensions.
    pub const ISA_MPX: u64 = 0x0000_0040_0000_0000;

    /// MMX.
    pub const SIMD_MMX: u64 = 0x0000_0000_0000_0001;
    /// AMD MMX extensions.
    pub const SIMD_MMX_PLUS: u64 = 0x0000_0000_0000_0002;
    /// 3dnow!
    pub const SIMD_3DNOW: u64 = 0x0000_0000_0000_0008;
    /// 3dnow! extensions.
    pub const SIMD_3DNOW_PLUS: u64 = 0x0000_0000_0000_0010;
    /// SSE.
    pub const SIMD_SSE: u64 = 0x0000_0000_0000_0080;
    /// SSE2.
    pub const SIMD_SSE2: u64 = 0x0000_0000_0000_0100;
    /// SSE3.
    pub const SIMD_SSE3: u64 = 0x0000_0000_0000_0200;
    /// SSSE3.
    pub const SIMD_SSSE3: u64 = 0x0000_0000_0000_0400;
    /// SSE4.1.
    pub const SIMD_SSE4_1: u64 = 0x0000_0000_0000_0800;
    /// SSE4.2.
    pub const SIMD_SSE4_2: u64 = 0x0000_0000_0000_1000;
    /// AMD SSE4A.
    pub const SIMD_SSE4A: u64 = 0x0000_0000_0000_2000;
    /// AVX.
    pub const SIMD_AVX: u64 = 0x0000_0000_0000_4000;
    /// AVX2.
    pub const SIMD_AVX2: u64 = 0x0000_0000_0000_8000;
    /// AMD XOP.
    pub const SIMD_XOP: u64 = 0x0000_0000_0001_0000;
    /// Half-precision conversions.
    pub const SIMD_F16C: u64 = 0x0000_0000_0002_0000;
    /// Three-operand FMA.
    pub const SIMD_FMA3: u64 = 0x0000_0000_0004_0000;
    /// AMD four-operand FMA.
    pub const SIMD_FMA4: u64 = 0x0000_0000_0008_0000;
    /// AVX-512 foundation.
    pub const SIMD_AVX512F: u64 = 0x0000_0000_0040_0000;
    /// AVX-512 conflict detection.
    pub const SIMD_AVX512CD: u64 = 0x0000_0000_0080_0000;
    /// AVX-512 exponential and reciprocal.
    pub const SIMD_AVX512ER: u64 = 0x0000_0000_0100_0000;
    /// AVX-512 prefetch.
    pub const SIMD_AVX512PF: u64 = 0x0000_0000_0200_0000;

    /// The OS does not fault on misaligned SSE operands.
    pub const SYSTEM_MISALIGNED_SSE: u64 = 0x0000_0020_0000_0000;
    /// The OS saves x87 state.
    pub const SYSTEM_FPU: u64 = 0x0010_0000_0000_0000;
    /// The OS saves XMM registers.
    pub const SYSTEM_XMM: u64 = 0x0020_0000_0000_0000;
    /// The OS saves YMM registers.
    pub const SYSTEM_YMM: u64 = 0x0040_0000_0000_0000;
    /// The OS saves ZMM and mask registers.
    pub const SYSTEM_ZMM: u64 = 0x0080_0000_0000_0000;

    pub(crate) const ISA_NAMES: &[(u64, &str)] = &[
        (ISA_FPU, "FPU"),
        (ISA_CPUID, "CPUID"),
        (ISA_RDTSC, "RDTSC"),
        (ISA_CMOV, "CMOV"),
        (ISA_SYSENTER, "SYSENTER"),
        (ISA_SYSCALL, "SYSCALL"),
        (ISA_CLFLUSH, "CLFLUSH"),
        (ISA_MONITOR, "MONITOR"),
        (ISA_FXSAVE, "FXSAVE"),
        (ISA_XSAVE, "XSAVE"),
        (ISA_CMPXCHG8B, "CMPXCHG8B"),
        (ISA_CMPXCHG16B, "CMPXCHG16B"),
        (ISA_X64, "x86-64"),
        (ISA_LAHF_SAHF64, "LAHF/SAHF64"),
        (ISA_FSGSBASE, "FSGSBASE"),
        (ISA_MOVBE, "MOVBE"),
        (ISA_POPCNT, "POPCNT"),
        (ISA_LZCNT, "LZCNT"),
        (ISA_BMI, "BMI"),
        (ISA_BMI2, "BMI2"),
        (ISA_TBM, "TBM"),
        (ISA_RDRAND, "RDRAND"),
        (ISA_AES, "AES"),
        (ISA_PCLMULQDQ, "PCLMULQDQ"),
        (ISA_RDTSCP, "RDTSCP"),
        (ISA_LWP, "LWP"),
        (ISA_HLE, "HLE"),
        (ISA_RTM, "RTM"),
        (ISA_RDSEED, "RDSEED"),
        (ISA_ADX, "ADX"),
        (ISA_SHA, "SHA"),
        (ISA_MPX, "MPX"),
    ];

    pub(crate) const SIMD_NAMES: &[(u64, &str)] = &[
        (SIMD_MMX, "MMX"),
        (SIMD_MMX_PLUS, "MMX+"),
        (SIMD_3DNOW, "3dnow!"),
        (SIMD_3DNOW_PLUS, "3dnow!+"),
        (SIMD_SSE, "SSE"),
        (SIMD_SSE2, "SSE2"),
        (SIMD_SSE3, "SSE3"),
        (SIMD_SSSE3, "SSSE3"),
        (SIMD_SSE4_1, "SSE4.1"),
        (SIMD_SSE4_2, "SSE4.2"),
        (SIMD_SSE4A, "SSE4A"),
        (SIMD_AVX, "AVX"),
        (SIMD_AVX2, "AVX2"),
        (SIMD_XOP, "XOP"),
        (SIMD_F16C, "F16C"),
        (SIMD_FMA3, "FMA3"),
        (SIMD_FMA4, "FMA4"),
        (SIMD_AVX512F, "AVX512F"),
        (SIMD_AVX512CD, "AVX512CD"),
        (SIMD_AVX512ER, "AVX512ER"),
        (SIMD_AVX512PF, "AVX512PF"),
    ];

    pub(crate) const SYSTEM_NAMES: &[(u64, &str)] = &[
        (SYSTEM_MISALIGNED_SSE, "MisalignedSSE"),
        (SYSTEM_FPU, "FPU state"),
        (SYSTEM_XMM, "XMM state"),
        (SYSTEM_YMM, "YMM state"),
        (SYSTEM_ZMM, "ZMM state"),
    ];
}

/// ARM and AArch64 capability bits.
pub mod arm {
    /// ARMv7 instruction set.
    pub const ISA_V7: u64 = 0x0000_0000_0000_0020;
    /// ARMv7 multiprocessing extensions.
    pub const ISA_V7MP: u64 = 0x0000_0000_0000_0040;
    /// Thumb-2.
    pub const ISA_THUMB2: u64 = 0x0000_0000_0000_0100;
    /// VFPv3.
    pub const ISA_VFP3: u64 = 0x0000_0000_0000_4000;
    /// VFP with 32 double-precision registers.
    pub const ISA_VFP_D32: u64 = 0x0000_0000_0000_8000;
    /// VFPv3 half-precision conversions.
    pub const ISA_VFP3_HP: u64 = 0x0000_0000_0001_0000;
    /// VFPv4 (fused multiply-add).
    pub const ISA_VFP4: u64 = 0x0000_0000_0002_0000;
    /// Hardware integer division.
    pub const ISA_DIV: u64 = 0x0000_0000_0004_0000;

    /// Advanced SIMD (NEON).
    pub const SIMD_NEON: u64 = 0x0000_0000_0000_0008;
    /// NEON half-precision extension.
    pub const SIMD_NEON_HP: u64 = 0x0000_0000_0000_0010;
    /// NEON v2 (fused multiply-add).
    pub const SIMD_NEON2: u64 = 0x0000_0000_0000_0020;

    /// The OS saves 32 double-precision VFP registers.
    pub const SYSTEM_D32: u64 = 0x0800_0000_0000_0000;

    pub(crate) const ISA_NAMES: &[(u64, &str)] = &[
        (ISA_V7, "ARMv7"),
        (ISA_V7MP, "ARMv7-MP"),
        (ISA_THUMB2, "Thumb-2"),
        (ISA_VFP3, "VFPv3"),
        (ISA_VFP_D32, "VFP-D32"),
        (ISA_VFP3_HP, "VFPv3-HP"),
        (ISA_VFP4, "VFPv4"),
        (ISA_DIV, "DIV"),
    ];

    pub(crate) const SIMD_NAMES: &[(u64, &str)] = &[
        (SIMD_NEON, "NEON"),
        (SIMD_NEON_HP, "NEON-HP"),
        (SIMD_NEON2, "NEONv2"),
    ];

    pub(crate) const SYSTEM_NAMES: &[(u64, &str)] = &[(SYSTEM_D32, "D32 state")];
}
