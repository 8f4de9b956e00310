pub(crate) mod lanes;
pub(crate) mod phased;
pub(crate) mod unphased;
#[cfg(target_arch = "x86_64")]
pub(crate) mod x86;

/**
 * Register width the popcount kernels run at. Detection picks the widest
 * width the executing CPU supports; the 64-bit scalar path is always
 * available and is also the remainder loop for every vectorized width.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimdWidth {
    Avx512,
    Avx2,
    Sse2,
    Scalar,
}

impl SimdWidth {
    /// Bytes per register.
    pub fn bytes(self) -> usize {
        match self {
            SimdWidth::Avx512 => 64,
            SimdWidth::Avx2 => 32,
            SimdWidth::Sse2 => 16,
            SimdWidth::Scalar => 8,
        }
    }

    /// Genotypes covered by one register (four samples per byte).
    pub fn trip_count(self) -> usize {
        self.bytes() * 4
    }

    pub fn detect() -> SimdWidth {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx512f") {
                return SimdWidth::Avx512;
            }
            if is_x86_feature_detected!("avx2") {
                return SimdWidth::Avx2;
            }
            if is_x86_feature_detected!("sse2") {
                return SimdWidth::Sse2;
            }
        }
        SimdWidth::Scalar
    }
}

lazy_static! {
    /// Width selected once per process; engines configured without an
    /// explicit width use this.
    pub static ref DETECTED_WIDTH: SimdWidth = SimdWidth::detect();
}
