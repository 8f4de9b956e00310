use crate::genotype::allele::{Allele, DiploidGenotype};

/// One run of identical diploid genotypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    pub hap_a: Allele,
    pub hap_b: Allele,
    pub len: u32,
}

/**
 * Run-length form of one site: consecutive identical genotypes coalesced
 * into (alleleA, alleleB, length) records. Run lengths always sum to the
 * sample count of the panel the site was encoded from.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenotypeRuns {
    runs: Vec<Run>,
}

impl GenotypeRuns {
    pub(crate) fn from_runs(runs: Vec<Run>) -> GenotypeRuns {
        GenotypeRuns { runs }
    }

    /// Number of runs.
    pub fn n(&self) -> usize {
        self.runs.len()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Run {
        self.runs[offset]
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn decode(&self) -> Vec<DiploidGenotype> {
        let mut genotypes = Vec::new();
        for run in &self.runs {
            for _ in 0..run.len {
                genotypes.push(DiploidGenotype::new(run.hap_a, run.hap_b));
            }
        }
        genotypes
    }
}
