//! # CPU Maintenance
//!
//! The handful of CPU operations needed around an off-mode transition:
//! re-initialising the core after wake-up, TLB invalidation, rewriting the
//! system control register and patching a word by physical address.

/// CPU maintenance capability
pub trait CpuOps {
    /// Re-establish the cache/MMU baseline after a low-power exit
    fn cpu_init(&self);

    /// Invalidate the whole unified TLB
    fn flush_tlb_all(&self);

    /// Write the system control register (caches, branch prediction)
    fn write_control_register(&self, value: u32);

    /// Write a word at a physical address
    ///
    /// # Safety
    ///
    /// `phys` must be the physical address of a word owned by the caller
    /// (the stashed MMU table entry) and reachable through the current
    /// mapping.
    unsafe fn write_phys(&self, phys: u32, value: u32);
}

/// ARMv7-A (Cortex-A8) implementation
#[cfg(target_arch = "arm")]
pub mod armv7 {
    use core::arch::asm;

    use super::CpuOps;

    /// Cortex-A8 CPU operations
    #[derive(Debug, Clone, Copy)]
    pub struct ArmV7 {
        /// Physical-to-virtual offset of the linear map
        pub phys_to_virt: usize,
    }

    impl CpuOps for ArmV7 {
        fn cpu_init(&self) {
            // Invalidate the I-cache and branch predictor, then sync
            unsafe {
                asm!(
                    "mcr p15, 0, {zero}, c7, c5, 0",
                    "mcr p15, 0, {zero}, c7, c5, 6",
                    "dsb",
                    "isb",
                    zero = in(reg) 0u32,
                    options(nostack, preserves_flags)
                );
            }
        }

        fn flush_tlb_all(&self) {
            unsafe {
                asm!(
                    "dsb",
                    "mcr p15, 0, {zero}, c8, c7, 0",
                    "mcr p15, 0, {zero}, c7, c5, 6",
                    "dsb",
                    "isb",
                    zero = in(reg) 0u32,
                    options(nostack, preserves_flags)
                );
            }
        }

        fn write_control_register(&self, value: u32) {
            unsafe {
                asm!(
                    "mcr p15, 0, {val}, c1, c0, 0",
                    "isb",
                    val = in(reg) value,
                    options(nostack, preserves_flags)
                );
            }
        }

        unsafe fn write_phys(&self, phys: u32, value: u32) {
            let virt = (phys as usize).wrapping_add(self.phys_to_virt) as *mut u32;
            // SAFETY: the caller owns the word at `phys`
            unsafe { core::ptr::write_volatile(virt, value) };
        }
    }
}
