use anyhow::{ensure, Result};
use itertools::Itertools;

use crate::engine::params::LdParams;
use crate::genotype::allele::{Allele, DiploidGenotype};
use crate::genotype::bit_vector::GenotypeVector;
use crate::genotype::index_list::AltIndexList;
use crate::genotype::run_length::{GenotypeRuns, Run};
use crate::genotype::site::SiteRecord;

/**
 * Builds site records from decoded diploid genotypes. One pass produces the
 * bit-vector, run-length and sparse-index forms together, so the three are
 * guaranteed to describe the same genotype sequence.
 */
#[derive(Clone, Copy, Debug)]
pub struct SiteEncoder {
    params: LdParams,
}

impl SiteEncoder {
    pub fn new(params: LdParams) -> SiteEncoder {
        SiteEncoder { params }
    }

    pub fn params(&self) -> &LdParams {
        &self.params
    }

    pub fn encode(
        &self,
        rid: u32,
        pos: u64,
        genotypes: &[DiploidGenotype],
    ) -> Result<SiteRecord> {
        ensure!(
            genotypes.len() == self.params.n_samples as usize,
            "Site {}:{} encodes {} genotypes but the panel holds {} samples",
            rid,
            pos,
            genotypes.len(),
            self.params.n_samples
        );

        let mut vector = GenotypeVector::with_byte_width(self.params.byte_width);
        let mut indices = Vec::new();
        let mut ac = 0u64;
        let mut gt_missing = false;

        for (sample, genotype) in genotypes.iter().enumerate() {
            for (hap, allele) in [genotype.hap_a, genotype.hap_b].iter().enumerate() {
                let bit = 2 * sample + hap;
                match allele {
                    Allele::Ref => {}
                    Allele::Alt => {
                        vector.set_data_bit(bit);
                        indices.push(bit as u32);
                        ac += 1;
                    }
                    Allele::Missing => {
                        vector.set_mask_bit(bit);
                        gt_missing = true;
                    }
                }
            }
        }
        vector.finalise_zero_lanes(&self.params);

        let runs = genotypes
            .iter()
            .dedup_with_count()
            .map(|(count, genotype)| Run {
                hap_a: genotype.hap_a,
                hap_b: genotype.hap_b,
                len: count as u32,
            })
            .collect::<Vec<Run>>();

        Ok(SiteRecord {
            rid,
            pos,
            runs: GenotypeRuns::from_runs(runs),
            vector,
            list: AltIndexList::from_indices(indices),
            ac,
            gt_missing,
            n_samples: self.params.n_samples,
        })
    }
}
