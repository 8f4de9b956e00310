use crate::genotype::allele::{Allele, DiploidGenotype};

/**
 * Sparse form of one site: the ascending positions of every non-missing ALT
 * haplotype in the flattened haplotype stream (sample `s` contributes
 * positions `2s` and `2s + 1`). Near-monomorphic sites make this the
 * cheapest representation to intersect.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AltIndexList {
    indices: Vec<u32>,
}

impl AltIndexList {
    pub(crate) fn from_indices(indices: Vec<u32>) -> AltIndexList {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        AltIndexList { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Rebuild the genotype sequence. Only meaningful for sites without
    /// missing haplotypes; the list cannot represent missingness.
    pub fn decode(&self, n_samples: usize) -> Vec<DiploidGenotype> {
        let mut genotypes = vec![DiploidGenotype::hom_ref(); n_samples];
        for &index in &self.indices {
            let sample = (index / 2) as usize;
            if index % 2 == 0 {
                genotypes[sample].hap_a = Allele::Alt;
            } else {
                genotypes[sample].hap_b = Allele::Alt;
            }
        }
        genotypes
    }
}
