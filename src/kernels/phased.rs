//! Phased popcount kernels. Each kernel scans the vectorized span of two
//! packed sites, skipping lanes both sites agree are all-REF and
//! re-attributing their contribution arithmetically, then mops up the
//! unvectorized remainder with a 64-bit unrolled pass and a byte loop.

use crate::engine::params::LdParams;
use crate::genotype::bit_vector::GenotypeVector;
use crate::kernels::lanes::{
    alt_alt, alt_first, alt_second, mask_merge, ref_ref, LaneOps, ScalarLane,
};
use crate::kernels::SimdWidth;

/// Haplotype-level joint counts for one site pair. `alt_first` holds
/// ALT/REF (ALT at the first site), `alt_second` REF/ALT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PhasedBlockCounts {
    pub ref_ref: u64,
    pub alt_first: u64,
    pub alt_second: u64,
    pub alt_alt: u64,
}

/// Lane spans both sites agree are all-zero, plus the one-sided bonus spans
/// where only the short joint cells can occur.
struct PairSkip {
    front_smallest: usize,
    front_bonus: usize,
    tail_smallest: usize,
    tail_bonus: usize,
}

fn pair_skip(va: &GenotypeVector, vb: &GenotypeVector) -> PairSkip {
    let front_smallest = va.front_zero.min(vb.front_zero) as usize;
    let tail_smallest = va.tail_zero.min(vb.tail_zero) as usize;
    PairSkip {
        front_smallest,
        front_bonus: va.front_zero.max(vb.front_zero) as usize,
        tail_smallest,
        tail_bonus: va.tail_zero.max(vb.tail_zero) as usize,
    }
}

/**
 * Full 2×2 kernel honouring per-haplotype missingness. The REF/REF cell is
 * measured directly and corrected for skipped lanes and pad bits.
 */
pub(crate) fn phased_masked(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    match params.width {
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx512 => unsafe { phased_masked_avx512(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx2 => unsafe { phased_masked_avx2(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Sse2 => unsafe { phased_masked_sse2(params, va, vb) },
        _ => unsafe { phased_masked_inner::<ScalarLane>(params, va, vb) },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn phased_masked_avx512(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_masked_inner::<crate::kernels::x86::Avx512Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn phased_masked_avx2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_masked_inner::<crate::kernels::x86::Avx2Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn phased_masked_sse2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_masked_inner::<crate::kernels::x86::Sse2Lane>(params, va, vb)
}

#[inline(always)]
unsafe fn phased_masked_inner<V: LaneOps>(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    debug_assert_eq!(V::BYTES, params.width.bytes());
    let (a, am) = (va.data(), va.mask());
    let (b, bm) = (vb.data(), vb.mask());
    let skip = pair_skip(va, vb);
    let w = V::BYTES;

    let mut c = PhasedBlockCounts::default();
    let mut i = skip.front_smallest;
    // One site is all REF through the bonus spans, so ALT/ALT cannot occur.
    while i < skip.front_bonus {
        let m = mask_merge(V::load(am.as_ptr().add(i * w)), V::load(bm.as_ptr().add(i * w)));
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.ref_ref += V::popcount(V::and(ref_ref(x, y), m));
        c.alt_first += V::popcount(V::and(alt_first(x, y), m));
        c.alt_second += V::popcount(V::and(alt_second(x, y), m));
        i += 1;
    }
    while i < params.vector_cycles - skip.tail_bonus {
        let m = mask_merge(V::load(am.as_ptr().add(i * w)), V::load(bm.as_ptr().add(i * w)));
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.ref_ref += V::popcount(V::and(ref_ref(x, y), m));
        c.alt_first += V::popcount(V::and(alt_first(x, y), m));
        c.alt_second += V::popcount(V::and(alt_second(x, y), m));
        c.alt_alt += V::popcount(V::and(alt_alt(x, y), m));
        i += 1;
    }
    while i < params.vector_cycles - skip.tail_smallest {
        let m = mask_merge(V::load(am.as_ptr().add(i * w)), V::load(bm.as_ptr().add(i * w)));
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.ref_ref += V::popcount(V::and(ref_ref(x, y), m));
        c.alt_first += V::popcount(V::and(alt_first(x, y), m));
        c.alt_second += V::popcount(V::and(alt_second(x, y), m));
        i += 1;
    }

    let mut k = params.byte_aligned_end;
    while k + 8 <= params.byte_width {
        let m = mask_merge(
            ScalarLane::load(am.as_ptr().add(k)),
            ScalarLane::load(bm.as_ptr().add(k)),
        );
        let x = ScalarLane::load(a.as_ptr().add(k));
        let y = ScalarLane::load(b.as_ptr().add(k));
        c.ref_ref += ScalarLane::popcount(ScalarLane::and(ref_ref(x, y), m));
        c.alt_first += ScalarLane::popcount(ScalarLane::and(alt_first(x, y), m));
        c.alt_second += ScalarLane::popcount(ScalarLane::and(alt_second(x, y), m));
        c.alt_alt += ScalarLane::popcount(ScalarLane::and(alt_alt(x, y), m));
        k += 8;
    }
    while k < params.byte_width {
        let m = !(am[k] | bm[k]);
        c.ref_ref += ((!a[k] & !b[k]) & m).count_ones() as u64;
        c.alt_first += (((a[k] ^ b[k]) & a[k]) & m).count_ones() as u64;
        c.alt_second += (((a[k] ^ b[k]) & b[k]) & m).count_ones() as u64;
        c.alt_alt += ((a[k] & b[k]) & m).count_ones() as u64;
        k += 1;
    }

    c.ref_ref += ((skip.front_smallest + skip.tail_smallest) * params.trip_count * 2) as u64;
    c.ref_ref -= params.phased_unbalanced_adjustment;
    c
}

/**
 * 2×2 kernel for sites without missing haplotypes. Only the three ALT-touched
 * cells are measured; the caller recovers REF/REF by subtraction from 2N.
 */
pub(crate) fn phased_no_missing(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    match params.width {
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx512 => unsafe { phased_no_missing_avx512(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx2 => unsafe { phased_no_missing_avx2(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Sse2 => unsafe { phased_no_missing_sse2(params, va, vb) },
        _ => unsafe { phased_no_missing_inner::<ScalarLane>(params, va, vb) },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn phased_no_missing_avx512(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_no_missing_inner::<crate::kernels::x86::Avx512Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn phased_no_missing_avx2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_no_missing_inner::<crate::kernels::x86::Avx2Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn phased_no_missing_sse2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    phased_no_missing_inner::<crate::kernels::x86::Sse2Lane>(params, va, vb)
}

#[inline(always)]
unsafe fn phased_no_missing_inner<V: LaneOps>(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> PhasedBlockCounts {
    debug_assert_eq!(V::BYTES, params.width.bytes());
    let a = va.data();
    let b = vb.data();
    let skip = pair_skip(va, vb);
    let w = V::BYTES;

    let mut c = PhasedBlockCounts::default();
    let mut i = skip.front_smallest;
    while i < skip.front_bonus {
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.alt_first += V::popcount(alt_first(x, y));
        c.alt_second += V::popcount(alt_second(x, y));
        i += 1;
    }
    while i < params.vector_cycles - skip.tail_bonus {
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.alt_first += V::popcount(alt_first(x, y));
        c.alt_second += V::popcount(alt_second(x, y));
        c.alt_alt += V::popcount(alt_alt(x, y));
        i += 1;
    }
    while i < params.vector_cycles - skip.tail_smallest {
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        c.alt_first += V::popcount(alt_first(x, y));
        c.alt_second += V::popcount(alt_second(x, y));
        i += 1;
    }

    let mut k = params.byte_aligned_end;
    while k + 8 <= params.byte_width {
        let x = ScalarLane::load(a.as_ptr().add(k));
        let y = ScalarLane::load(b.as_ptr().add(k));
        c.alt_first += ScalarLane::popcount(alt_first(x, y));
        c.alt_second += ScalarLane::popcount(alt_second(x, y));
        c.alt_alt += ScalarLane::popcount(alt_alt(x, y));
        k += 8;
    }
    while k < params.byte_width {
        c.alt_first += ((a[k] ^ b[k]) & a[k]).count_ones() as u64;
        c.alt_second += ((a[k] ^ b[k]) & b[k]).count_ones() as u64;
        c.alt_alt += (a[k] & b[k]).count_ones() as u64;
        k += 1;
    }
    c
}

/**
 * Cheapest phased kernel: measures only the REF/REF cell, with skipped-lane
 * and pad corrections applied. The remaining cells are recoverable from the
 * two sites' allele counts when neither carries missing data.
 */
pub(crate) fn phased_ref_ref_only(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> u64 {
    match params.width {
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx512 => unsafe { phased_ref_ref_only_avx512(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Avx2 => unsafe { phased_ref_ref_only_avx2(params, va, vb) },
        #[cfg(target_arch = "x86_64")]
        SimdWidth::Sse2 => unsafe { phased_ref_ref_only_sse2(params, va, vb) },
        _ => unsafe { phased_ref_ref_only_inner::<ScalarLane>(params, va, vb) },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f")]
unsafe fn phased_ref_ref_only_avx512(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> u64 {
    phased_ref_ref_only_inner::<crate::kernels::x86::Avx512Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn phased_ref_ref_only_avx2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> u64 {
    phased_ref_ref_only_inner::<crate::kernels::x86::Avx2Lane>(params, va, vb)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn phased_ref_ref_only_sse2(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> u64 {
    phased_ref_ref_only_inner::<crate::kernels::x86::Sse2Lane>(params, va, vb)
}

#[inline(always)]
unsafe fn phased_ref_ref_only_inner<V: LaneOps>(
    params: &LdParams,
    va: &GenotypeVector,
    vb: &GenotypeVector,
) -> u64 {
    debug_assert_eq!(V::BYTES, params.width.bytes());
    let a = va.data();
    let b = vb.data();
    let skip = pair_skip(va, vb);
    let w = V::BYTES;

    let mut ref_ref_count = 0u64;
    let mut i = skip.front_smallest;
    while i < params.vector_cycles - skip.tail_smallest {
        let x = V::load(a.as_ptr().add(i * w));
        let y = V::load(b.as_ptr().add(i * w));
        ref_ref_count += V::popcount(ref_ref(x, y));
        i += 1;
    }

    let mut k = params.byte_aligned_end;
    while k + 8 <= params.byte_width {
        let x = ScalarLane::load(a.as_ptr().add(k));
        let y = ScalarLane::load(b.as_ptr().add(k));
        ref_ref_count += ScalarLane::popcount(ref_ref(x, y));
        k += 8;
    }
    while k < params.byte_width {
        ref_ref_count += (!a[k] & !b[k]).count_ones() as u64;
        k += 1;
    }

    ref_ref_count += ((skip.front_smallest + skip.tail_smallest) * params.trip_count * 2) as u64;
    ref_ref_count - params.phased_unbalanced_adjustment
}
