//! Runtime selection between the wide and narrow mobility kernels.
//!
//! The wide kernel is used when AVX2 is detected at runtime; otherwise the
//! narrow kernel is the portable fallback. Detection happens once per process.

use std::sync::OnceLock;

use crate::move_generation::{mobility_narrow, mobility_wide};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobilityKernel {
    /// Wide kernel on 256-bit AVX2 registers.
    WideAvx2,
    /// Wide kernel on the portable 4-lane type.
    WidePortable,
    /// Two diagonal lanes plus scalar horizontal/vertical.
    Narrow,
}

impl MobilityKernel {
    pub fn name(self) -> &'static str {
        match self {
            MobilityKernel::WideAvx2 => "wide-avx2",
            MobilityKernel::WidePortable => "wide-portable",
            MobilityKernel::Narrow => "narrow",
        }
    }

    /// Kernels usable on this machine.
    pub fn available() -> Vec<MobilityKernel> {
        let mut kernels = Vec::with_capacity(3);
        if avx2_detected() {
            kernels.push(MobilityKernel::WideAvx2);
        }
        kernels.push(MobilityKernel::WidePortable);
        kernels.push(MobilityKernel::Narrow);
        kernels
    }

    #[inline]
    pub fn mobility(self, p: u64, o: u64) -> u64 {
        match self {
            #[cfg(target_arch = "x86_64")]
            MobilityKernel::WideAvx2 if avx2_detected() => {
                // SAFETY: AVX2 support was confirmed at runtime.
                unsafe { mobility_wide::avx2::mobility(p, o) }
            }
            MobilityKernel::WideAvx2 | MobilityKernel::WidePortable => {
                mobility_wide::mobility(p, o)
            }
            MobilityKernel::Narrow => mobility_narrow::mobility(p, o),
        }
    }

    #[inline]
    pub fn flips(self, p: u64, o: u64, square: u8) -> u64 {
        match self {
            #[cfg(target_arch = "x86_64")]
            MobilityKernel::WideAvx2 if avx2_detected() => {
                // SAFETY: AVX2 support was confirmed at runtime.
                unsafe { mobility_wide::avx2::flips(p, o, square) }
            }
            MobilityKernel::WideAvx2 | MobilityKernel::WidePortable => {
                mobility_wide::flips(p, o, square)
            }
            MobilityKernel::Narrow => mobility_narrow::flips(p, o, square),
        }
    }
}

fn avx2_detected() -> bool {
    static DETECTED: OnceLock<bool> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("avx2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            false
        }
    })
}

/// Kernel used by the board for this process.
pub fn active_kernel() -> MobilityKernel {
    static ACTIVE: OnceLock<MobilityKernel> = OnceLock::new();
    *ACTIVE.get_or_init(|| {
        let kernel = if avx2_detected() {
            MobilityKernel::WideAvx2
        } else {
            MobilityKernel::Narrow
        };
        tracing::debug!(kernel = kernel.name(), "selected mobility kernel");
        kernel
    })
}

#[inline]
pub fn mobility(p: u64, o: u64) -> u64 {
    active_kernel().mobility(p, o)
}

#[inline]
pub fn flips(p: u64, o: u64, square: u8) -> u64 {
    active_kernel().flips(p, o, square)
}
