//! Vendor, architecture and microarchitecture identification.
//!
//! The family/model tables and the dispatch preference lists follow the
//! processor generations the per-target schedules were tuned for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Processor vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Vendor {
    /// Vendor not recognized.
    #[default]
    Unknown,
    /// Intel Corporation.
    Intel,
    /// Advanced Micro Devices.
    Amd,
    /// VIA Technologies (Centaur).
    Via,
    /// ARM Holdings.
    Arm,
    /// Qualcomm.
    Qualcomm,
    /// Apple.
    Apple,
    /// Marvell.
    Marvell,
    /// Nvidia.
    Nvidia,
}

impl Vendor {
    /// Maps an x86 CPUID vendor string.
    #[must_use]
    pub fn from_x86_signature(signature: &str) -> Self {
        match signature {
            "GenuineIntel" => Self::Intel,
            "AuthenticAMD" => Self::Amd,
            "CentaurHauls" | "VIA VIA VIA " => Self::Via,
            _ => Self::Unknown,
        }
    }

    /// Maps an ARM MIDR implementer code.
    #[must_use]
    pub fn from_arm_implementer(implementer: u32) -> Self {
        match implementer {
            0x41 => Self::Arm,
            0x4E => Self::Nvidia,
            0x51 => Self::Qualcomm,
            0x56 => Self::Marvell,
            0x61 => Self::Apple,
            0x69 => Self::Intel,
            _ => Self::Unknown,
        }
    }
}

/// Basic instruction set architecture; always known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    /// Not one of the architectures below.
    Unknown,
    /// x86 or x86-64.
    X86,
    /// ARM or AArch64.
    Arm,
}

impl Architecture {
    /// Architecture this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            Self::X86
        } else if cfg!(any(target_arch = "arm", target_arch = "aarch64")) {
            Self::Arm
        } else {
            Self::Unknown
        }
    }
}

/// Processor microarchitecture, the tag carried by every descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Microarchitecture {
    /// Unknown, or the portable Default implementation.
    #[default]
    Unknown,
    /// Intel Pentium.
    P5,
    /// Intel Pentium Pro, II and III.
    P6,
    /// Intel Pentium 4 (Willamette, Northwood).
    Willamette,
    /// Intel Pentium 4 (Prescott and later).
    Prescott,
    /// Intel Pentium M.
    Dothan,
    /// Intel Core.
    Yonah,
    /// Intel Core 2, 65 nm.
    Conroe,
    /// Intel Core 2, 45 nm.
    Penryn,
    /// Intel Atom, 45 nm.
    Bonnell,
    /// Intel Nehalem and Westmere.
    Nehalem,
    /// Intel Sandy Bridge.
    SandyBridge,
    /// Intel Atom, 32 nm.
    Saltwell,
    /// Intel Ivy Bridge.
    IvyBridge,
    /// Intel Haswell.
    Haswell,
    /// Intel Silvermont.
    Silvermont,
    /// AMD Athlon 64 and Opteron.
    K8,
    /// AMD Barcelona, Istanbul, Magny-Cours.
    K10,
    /// AMD Bobcat.
    Bobcat,
    /// AMD Bulldozer.
    Bulldozer,
    /// AMD Piledriver.
    Piledriver,
    /// AMD Jaguar.
    Jaguar,
    /// AMD Steamroller.
    Steamroller,
    /// ARM Cortex-A5.
    CortexA5,
    /// ARM Cortex-A7.
    CortexA7,
    /// ARM Cortex-A8.
    CortexA8,
    /// ARM Cortex-A9.
    CortexA9,
    /// ARM Cortex-A15.
    CortexA15,
    /// Qualcomm Scorpion.
    Scorpion,
    /// Qualcomm Krait.
    Krait,
    /// Apple Swift.
    Swift,
}

impl Microarchitecture {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 31] = [
        Self::Unknown,
        Self::P5,
        Self::P6,
        Self::Willamette,
        Self::Prescott,
        Self::Dothan,
        Self::Yonah,
        Self::Conroe,
        Self::Penryn,
        Self::Bonnell,
        Self::Nehalem,
        Self::SandyBridge,
        Self::Saltwell,
        Self::IvyBridge,
        Self::Haswell,
        Self::Silvermont,
        Self::K8,
        Self::K10,
        Self::Bobcat,
        Self::Bulldozer,
        Self::Piledriver,
        Self::Jaguar,
        Self::Steamroller,
        Self::CortexA5,
        Self::CortexA7,
        Self::CortexA8,
        Self::CortexA9,
        Self::CortexA15,
        Self::Scorpion,
        Self::Krait,
        Self::Swift,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::P5 => "P5",
            Self::P6 => "P6",
            Self::Willamette => "Willamette",
            Self::Prescott => "Prescott",
            Self::Dothan => "Dothan",
            Self::Yonah => "Yonah",
            Self::Conroe => "Conroe",
            Self::Penryn => "Penryn",
            Self::Bonnell => "Bonnell",
            Self::Nehalem => "Nehalem",
            Self::SandyBridge => "SandyBridge",
            Self::Saltwell => "Saltwell",
            Self::IvyBridge => "IvyBridge",
            Self::Haswell => "Haswell",
            Self::Silvermont => "Silvermont",
            Self::K8 => "K8",
            Self::K10 => "K10",
            Self::Bobcat => "Bobcat",
            Self::Bulldozer => "Bulldozer",
            Self::Piledriver => "Piledriver",
            Self::Jaguar => "Jaguar",
            Self::Steamroller => "Steamroller",
            Self::CortexA5 => "CortexA5",
            Self::CortexA7 => "CortexA7",
            Self::CortexA8 => "CortexA8",
            Self::CortexA9 => "CortexA9",
            Self::CortexA15 => "CortexA15",
            Self::Scorpion => "Scorpion",
            Self::Krait => "Krait",
            Self::Swift => "Swift",
        }
    }

    /// Parses a display name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Architecture this microarchitecture implements.
    #[must_use]
    pub const fn architecture(self) -> Architecture {
        match self {
            Self::Unknown => Architecture::Unknown,
            Self::CortexA5
            | Self::CortexA7
            | Self::CortexA8
            | Self::CortexA9
            | Self::CortexA15
            | Self::Scorpion
            | Self::Krait
            | Self::Swift => Architecture::Arm,
            _ => Architecture::X86,
        }
    }

    /// Identifies an x86 core from its CPUID family and model.
    ///
    /// `family` and `model` are the display values (base plus extended).
    #[must_use]
    pub fn from_x86(vendor: Vendor, family: u32, model: u32, ext_model: u32) -> Self {
        match vendor {
            Vendor::Intel => match family {
                0x05 => Self::P5,
                0x06 => match model {
                    0x01 | 0x03 | 0x05 | 0x06 | 0x07 | 0x08 | 0x0A | 0x0B => Self::P6,
                    0x09 | 0x0D | 0x15 => Self::Dothan,
                    0x0E => Self::Yonah,
                    0x0F | 0x16 => Self::Conroe,
                    0x17 | 0x1D => Self::Penryn,
                    0x1C | 0x26 => Self::Bonnell,
                    0x27 | 0x35 | 0x36 => Self::Saltwell,
                    0x37 | 0x4A | 0x4D => Self::Silvermont,
                    0x1A | 0x1E | 0x1F | 0x2E | 0x25 | 0x2C | 0x2F => Self::Nehalem,
                    0x2A | 0x2D => Self::SandyBridge,
                    0x3A | 0x3E => Self::IvyBridge,
                    0x3C | 0x3F | 0x45 | 0x46 => Self::Haswell,
                    _ => Self::Unknown,
                },
                0x0F => match model {
                    0x00..=0x02 => Self::Willamette,
                    0x03 | 0x04 | 0x06 => Self::Prescott,
                    _ => Self::Unknown,
                },
                _ => Self::Unknown,
            },
            Vendor::Amd => match family {
                0x0F | 0x11 => Self::K8,
                0x10 | 0x12 => Self::K10,
                0x14 => Self::Bobcat,
                0x15 => match model {
                    0x00 | 0x01 => Self::Bulldozer,
                    0x02 | 0x10 | 0x13 => Self::Piledriver,
                    _ => match ext_model {
                        0x0 => Self::Bulldozer,
                        0x1 | 0x2 => Self::Piledriver,
                        0x3 | 0x4 => Self::Steamroller,
                        _ => Self::Unknown,
                    },
                },
                0x16 => Self::Jaguar,
                _ => Self::Unknown,
            },
            _ => Self::Unknown,
        }
    }

    /// Identifies an ARM core from its MIDR implementer and part number.
    #[must_use]
    pub fn from_arm(implementer: u32, part: u32) -> Self {
        match (implementer, part) {
            (0x41, 0xC05) => Self::CortexA5,
            (0x41, 0xC07) => Self::CortexA7,
            (0x41, 0xC08) => Self::CortexA8,
            (0x41, 0xC09) => Self::CortexA9,
            (0x41, 0xC0F) => Self::CortexA15,
            (0x51, 0x00F | 0x02D) => Self::Scorpion,
            (0x51, 0x04D | 0x06F) => Self::Krait,
            _ => Self::Unknown,
        }
    }

    /// Microarchitectures whose routines this one prefers, best first.
    ///
    /// The list always starts with `self` and always ends with
    /// [`Microarchitecture::Unknown`], the Default tag.
    #[must_use]
    #[allow(clippy::enum_glob_use)]
    pub const fn dispatch_preference(self) -> &'static [Self] {
        use Microarchitecture::*;
        match self {
            Unknown => &[Unknown],
            P5 => &[P5, Unknown],
            P6 => &[P6, Dothan, Yonah, Conroe, Penryn, Unknown],
            Willamette => &[Willamette, Prescott, Yonah, Unknown],
            Prescott => &[Prescott, Willamette, Yonah, Unknown],
            Dothan => &[Dothan, P6, Yonah, Conroe, Penryn, Unknown],
            Yonah => &[Yonah, Conroe, Penryn, Dothan, P6, Unknown],
            Conroe => &[Conroe, Penryn, Nehalem, SandyBridge, IvyBridge, Unknown],
            Penryn => &[Penryn, Conroe, Nehalem, SandyBridge, IvyBridge, Unknown],
            Bonnell => &[Bonnell, Saltwell, Unknown],
            Nehalem => &[Nehalem, Penryn, Conroe, SandyBridge, IvyBridge, Unknown],
            SandyBridge => &[SandyBridge, Nehalem, Penryn, Conroe, IvyBridge, Unknown],
            Saltwell => &[Saltwell, Bonnell, Unknown],
            IvyBridge => &[IvyBridge, SandyBridge, Nehalem, Penryn, Conroe, Unknown],
            Haswell => &[
                Haswell,
                IvyBridge,
                SandyBridge,
                Nehalem,
                Penryn,
                Conroe,
                Unknown,
            ],
            Silvermont => &[Silvermont, Bobcat, Nehalem, Unknown],
            K8 => &[K8, Nehalem, Unknown],
            K10 => &[K10, Nehalem, Unknown],
            Bobcat => &[Bobcat, Nehalem, Unknown],
            Bulldozer => &[Bulldozer, Nehalem, Unknown],
            Piledriver => &[Piledriver, Bulldozer, Nehalem, Unknown],
            Jaguar => &[Jaguar, Bobcat, Nehalem, Unknown],
            Steamroller => &[Steamroller, Piledriver, Bulldozer, Nehalem, Unknown],
            CortexA5 => &[CortexA5, CortexA7, CortexA9, Unknown],
            CortexA7 => &[CortexA7, CortexA15, CortexA9, Unknown],
            CortexA8 => &[CortexA8, CortexA9, Unknown],
            CortexA9 => &[CortexA9, CortexA15, Unknown],
            CortexA15 => &[CortexA15, CortexA9, Unknown],
            Scorpion => &[Scorpion, Krait, CortexA8, Unknown],
            Krait => &[Krait, CortexA15, CortexA9, Unknown],
            Swift => &[Swift, CortexA15, CortexA9, Unknown],
        }
    }
}

impl fmt::Display for Microarchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extracts `(implementer, part)` from Linux `/proc/cpuinfo` text.
///
/// Only the first core's values are used; big.LITTLE systems report the
/// core the probe happened to run on first, which is good enough for a
/// preference hint.
#[must_use]
pub fn parse_arm_cpuinfo(cpuinfo: &str) -> Option<(u32, u32)> {
    let mut implementer = None;
    let mut part = None;
    for line in cpuinfo.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "CPU implementer" if implementer.is_none() => implementer = parse_hex(value),
            "CPU part" if part.is_none() => part = parse_hex(value),
            _ => {}
        }
        if implementer.is_some() && part.is_some() {
            break;
        }
    }
    Some((implementer?, part?))
}

fn parse_hex(value: &str) -> Option<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16).ok()
}
