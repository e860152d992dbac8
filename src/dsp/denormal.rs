//! Scoped flush-to-zero
//!
//! The truncate and bitmask stages can produce subnormal floats, which are
//! very slow on most CPUs. [`ScopedNoDenormals`] switches the current
//! thread's FPU to flush subnormals to zero for its lifetime and restores
//! the previous mode on drop.
//!
//! - x86_64: MXCSR FTZ + DAZ
//! - aarch64: FPCR FZ
//! - elsewhere: no-op

use std::marker::PhantomData;

#[cfg(target_arch = "x86_64")]
mod imp {
    #[allow(deprecated)]
    use std::arch::x86_64::{_mm_getcsr, _mm_setcsr};

    const FLUSH_TO_ZERO: u32 = 0x8000;
    const DENORMALS_ARE_ZERO: u32 = 0x0040;

    pub(super) type State = u32;

    #[allow(deprecated)]
    pub(super) fn enable() -> State {
        // SAFETY: SSE is part of the x86_64 baseline; only the FTZ/DAZ bits change.
        unsafe {
            let previous = _mm_getcsr();
            _mm_setcsr(previous | FLUSH_TO_ZERO | DENORMALS_ARE_ZERO);
            previous
        }
    }

    #[allow(deprecated)]
    pub(super) fn restore(previous: State) {
        // SAFETY: writes back a value read from MXCSR on this thread.
        unsafe { _mm_setcsr(previous) }
    }
}

#[cfg(target_arch = "aarch64")]
mod imp {
    use std::arch::asm;

    const FLUSH_TO_ZERO: u64 = 1 << 24;

    pub(super) type State = u64;

    pub(super) fn enable() -> State {
        let previous: u64;
        // SAFETY: reading and writing FPCR only changes floating-point modes.
        unsafe {
            asm!("mrs {}, fpcr", out(reg) previous, options(nomem, nostack, preserves_flags));
            asm!("msr fpcr, {}", in(reg) previous | FLUSH_TO_ZERO, options(nomem, nostack, preserves_flags));
        }
        previous
    }

    pub(super) fn restore(previous: State) {
        // SAFETY: writes back a value read from FPCR on this thread.
        unsafe {
            asm!("msr fpcr, {}", in(reg) previous, options(nomem, nostack, preserves_flags));
        }
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod imp {
    pub(super) type State = ();

    pub(super) fn enable() -> State {}

    pub(super) fn restore(_previous: State) {}
}

/// Flush-to-zero guard for the current thread
///
/// Not `Send`: floating-point control state is per thread, so the guard
/// must be dropped on the thread that created it.
#[must_use = "denormals are only flushed while the guard is alive"]
pub struct ScopedNoDenormals {
    previous: imp::State,
    _not_send: PhantomData<*const ()>,
}

impl ScopedNoDenormals {
    pub fn new() -> Self {
        Self {
            previous: imp::enable(),
            _not_send: PhantomData,
        }
    }
}

impl Default for ScopedNoDenormals {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopedNoDenormals {
    fn drop(&mut self) {
        imp::restore(self.previous);
    }
}
