use crate::genotype::bit_vector::GenotypeVector;
use crate::genotype::index_list::AltIndexList;
use crate::genotype::run_length::GenotypeRuns;

/**
 * One prepared variant site, carrying the same genotype sequence in all
 * three representations the engine can compute from. Records are built
 * once by the encoder and are read-only for the lifetime of every LD call
 * that borrows them.
 */
#[derive(Clone, Debug)]
pub struct SiteRecord {
    /// Contig identifier assigned by the caller.
    pub rid: u32,
    /// Position on the contig.
    pub pos: u64,
    pub runs: GenotypeRuns,
    pub vector: GenotypeVector,
    pub list: AltIndexList,
    /// Non-missing ALT haplotype count.
    pub ac: u64,
    /// True iff any haplotype at this site is missing.
    pub gt_missing: bool,
    pub n_samples: u32,
}
