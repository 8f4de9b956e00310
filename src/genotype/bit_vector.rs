use std::slice;

use crate::engine::params::LdParams;
use crate::genotype::allele::{Allele, DiploidGenotype};

/// Widest register the storage must satisfy. Allocating in whole lanes also
/// guarantees the zero padding the popcount kernels rely on.
pub const LANE_BYTES: usize = 64;

#[repr(C, align(64))]
#[derive(Clone, Copy, Debug)]
struct AlignedLane([u8; LANE_BYTES]);

/**
 * Bit-vector form of one site. Every sample packs two bits into `data`
 * (one per haplotype, 0 = REF, 1 = ALT); the parallel bit in `mask` is set
 * iff that haplotype is missing. Four samples per byte; sample `s` owns
 * bits `2(s mod 4)` and `2(s mod 4) + 1` of byte `s / 4`.
 *
 * Missing haplotypes are written as zero in `data` by the encoder, and pad
 * bits past the last sample are zero in both arrays. The unbalanced
 * adjustments computed at engine configuration depend on that convention.
 */
#[derive(Clone, Debug)]
pub struct GenotypeVector {
    data: Vec<AlignedLane>,
    mask: Vec<AlignedLane>,
    byte_width: usize,
    /// Leading all-zero `data|mask` SIMD lanes, in units of the configured width.
    pub front_zero: u32,
    /// Trailing all-zero lanes, never overlapping the front count.
    pub tail_zero: u32,
}

impl GenotypeVector {
    pub(crate) fn with_byte_width(byte_width: usize) -> GenotypeVector {
        let lanes = (byte_width + LANE_BYTES - 1) / LANE_BYTES;
        GenotypeVector {
            data: vec![AlignedLane([0; LANE_BYTES]); lanes.max(1)],
            mask: vec![AlignedLane([0; LANE_BYTES]); lanes.max(1)],
            byte_width,
            front_zero: 0,
            tail_zero: 0,
        }
    }

    pub fn byte_width(&self) -> usize {
        self.byte_width
    }

    /// Full padded byte view of the genotype bits; the logical prefix of
    /// length `byte_width` holds real samples, the remainder is zero.
    pub fn data(&self) -> &[u8] {
        // Lanes are contiguous plain bytes.
        unsafe { slice::from_raw_parts(self.data.as_ptr() as *const u8, self.data.len() * LANE_BYTES) }
    }

    pub fn mask(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.mask.as_ptr() as *const u8, self.mask.len() * LANE_BYTES) }
    }

    #[inline]
    pub(crate) fn set_data_bit(&mut self, bit: usize) {
        self.data[bit / (8 * LANE_BYTES)].0[(bit / 8) % LANE_BYTES] |= 1 << (bit % 8);
    }

    #[inline]
    pub(crate) fn set_mask_bit(&mut self, bit: usize) {
        self.mask[bit / (8 * LANE_BYTES)].0[(bit / 8) % LANE_BYTES] |= 1 << (bit % 8);
    }

    #[inline]
    pub fn data_bit(&self, bit: usize) -> bool {
        (self.data()[bit / 8] >> (bit % 8)) & 1 == 1
    }

    #[inline]
    pub fn mask_bit(&self, bit: usize) -> bool {
        (self.mask()[bit / 8] >> (bit % 8)) & 1 == 1
    }

    /**
     * Count the leading and trailing all-zero lanes of `data|mask` for the
     * configured SIMD width. The kernels skip these outright and recover
     * the REF/REF contribution arithmetically.
     */
    pub(crate) fn finalise_zero_lanes(&mut self, params: &LdParams) {
        let width = params.width.bytes();
        let data = self.data();
        let mask = self.mask();
        let lane_is_zero = |lane: usize| {
            let start = lane * width;
            (start..start + width).all(|k| (data[k] | mask[k]) == 0)
        };

        let mut front = 0usize;
        while front < params.vector_cycles && lane_is_zero(front) {
            front += 1;
        }
        let mut tail = 0usize;
        while front + tail < params.vector_cycles
            && lane_is_zero(params.vector_cycles - tail - 1)
        {
            tail += 1;
        }
        self.front_zero = front as u32;
        self.tail_zero = tail as u32;
    }

    pub fn decode(&self, n_samples: usize) -> Vec<DiploidGenotype> {
        (0..n_samples)
            .map(|s| {
                let decode_hap = |bit: usize| {
                    if self.mask_bit(bit) {
                        Allele::Missing
                    } else if self.data_bit(bit) {
                        Allele::Alt
                    } else {
                        Allele::Ref
                    }
                };
                DiploidGenotype::new(decode_hap(2 * s), decode_hap(2 * s + 1))
            })
            .collect()
    }
}
