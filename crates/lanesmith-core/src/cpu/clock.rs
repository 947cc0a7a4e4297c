//! Cycle counter and wall-clock timer.
//!
//! Used by the benchmarks and the CLI report to quote per-element costs in
//! cycles where the hardware exposes a counter.

use std::sync::OnceLock;
use std::time::Instant;

static TIMER_ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Reads the raw cycle counter, or nanoseconds when none is exposed.
#[inline]
#[must_use]
pub fn read_cycles() -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: RDTSC is unprivileged on every x86-64 OS we target.
        #[allow(unused_unsafe)]
        let cycles = unsafe { std::arch::x86_64::_rdtsc() };
        cycles
    }

    #[cfg(target_arch = "aarch64")]
    {
        let cycles: u64;
        // SAFETY: CNTVCT_EL0 is readable from EL0 on Linux, macOS and Windows.
        unsafe {
            std::arch::asm!("mrs {}, cntvct_el0", out(reg) cycles, options(nomem, nostack));
        }
        cycles
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        timer_ticks()
    }
}

/// Started cycle measurement.
#[derive(Debug, Clone, Copy)]
pub struct CycleCounter {
    start: u64,
}

impl CycleCounter {
    /// Starts a measurement.
    #[must_use]
    pub fn acquire() -> Self {
        Self {
            start: read_cycles(),
        }
    }

    /// Finishes the measurement and returns elapsed cycles.
    #[must_use]
    pub fn release(self) -> u64 {
        read_cycles().wrapping_sub(self.start)
    }
}

/// Monotonic timer ticks (nanoseconds since the first timer call).
#[must_use]
pub fn timer_ticks() -> u64 {
    let anchor = TIMER_ANCHOR.get_or_init(Instant::now);
    u64::try_from(anchor.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Ticks per second of [`timer_ticks`].
#[must_use]
pub const fn timer_frequency() -> u64 {
    1_000_000_000
}
