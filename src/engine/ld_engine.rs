use crate::engine::count_table::{
    CountTable, KEY_AA_AA, KEY_AA_RA, KEY_AA_RR, KEY_ALT_ALT, KEY_ALT_REF, KEY_RA_AA, KEY_RA_RA,
    KEY_RA_RR, KEY_REF_ALT, KEY_REF_REF, KEY_RR_AA, KEY_RR_RA, KEY_RR_RR,
};
use crate::engine::params::LdParams;
use crate::genotype::site::SiteRecord;
use crate::kernels::phased::{phased_masked, phased_no_missing, phased_ref_ref_only};
use crate::kernels::unphased::{unphased_masked, unphased_no_missing};
use crate::math::fisher::FisherMath;
use crate::math::phased::phased_math;
use crate::math::stats::LdStats;
use crate::math::unphased::unphased_math;
use crate::utils::errors::LdError;

/// Below this summed sparse-list length, intersecting the lists beats
/// scanning the packed vectors.
pub const LIST_COUNT_THRESHOLD: usize = 60;
/// Below this summed run count, the two-pointer merge beats the vectors.
pub const RUN_COUNT_THRESHOLD: usize = 40;

/**
 * The accumulation strategies available for one site pair. All of them
 * produce the same count table for the cells they are documented to fill;
 * selection is purely a performance heuristic.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LdStrategy {
    /// Masked bit-vector kernels honouring per-haplotype missingness.
    BitVector,
    /// Bit-vector kernels that ignore the missingness masks.
    BitVectorNoMissing,
    /// REF/REF-only kernel; the other phased cells are recovered from the
    /// two sites' allele counts. Phased pairs without missing data only.
    BitVectorRefRefOnly,
    /// Two-pointer merge over the run-length forms.
    RunLength,
    /// Sorted intersection of the sparse ALT index lists. Phased only.
    IndexList,
}

impl LdStrategy {
    fn name(self) -> &'static str {
        match self {
            LdStrategy::BitVector => "bit-vector",
            LdStrategy::BitVectorNoMissing => "bit-vector-no-missing",
            LdStrategy::BitVectorRefRefOnly => "bit-vector-ref-ref-only",
            LdStrategy::RunLength => "run-length",
            LdStrategy::IndexList => "index-list",
        }
    }
}

/// One informative pair's statistics together with the site coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LdResult {
    pub rid_a: u32,
    pub pos_a: u64,
    pub rid_b: u32,
    pub pos_b: u64,
    pub stats: LdStats,
}

/**
 * Linkage-disequilibrium engine for one genotype panel. Owns all scratch
 * (the contingency table and the Fisher log-factorial table), so engines
 * are independent: clone or construct one per worker and compute pairs in
 * parallel without synchronisation. Site records are borrowed read-only.
 */
#[derive(Clone)]
pub struct LdEngine {
    params: LdParams,
    fisher: FisherMath,
    table: CountTable,
}

impl LdEngine {
    pub fn new(n_samples: u32) -> LdEngine {
        LdEngine::with_params(LdParams::new(n_samples))
    }

    pub fn with_params(params: LdParams) -> LdEngine {
        LdEngine {
            params,
            fisher: FisherMath::new(params.total_haplotypes() as usize),
            table: CountTable::new(),
        }
    }

    pub fn params(&self) -> &LdParams {
        &self.params
    }

    /// The count table left behind by the most recent accumulation.
    pub fn table(&self) -> &CountTable {
        &self.table
    }

    /**
     * Computes LD statistics for one pair, selecting the accumulation
     * strategy heuristically. `None` marks a filtered pair: monomorphic,
     * in perfect equilibrium, or without a biologically admissible
     * haplotype-frequency fit.
     */
    pub fn compute(
        &mut self,
        a: &SiteRecord,
        b: &SiteRecord,
        phased: bool,
    ) -> Result<Option<LdResult>, LdError> {
        let strategy = self.select_strategy(a, b, phased);
        trace!(
            "pair {}:{} x {}:{} -> {}",
            a.rid,
            a.pos,
            b.rid,
            b.pos,
            strategy.name()
        );
        self.compute_with(strategy, a, b, phased)
    }

    pub fn select_strategy(&self, a: &SiteRecord, b: &SiteRecord, phased: bool) -> LdStrategy {
        if phased && a.list.len() + b.list.len() < LIST_COUNT_THRESHOLD {
            return LdStrategy::IndexList;
        }
        if a.runs.n() + b.runs.n() < RUN_COUNT_THRESHOLD {
            return LdStrategy::RunLength;
        }
        let missing = a.gt_missing || b.gt_missing;
        match (phased, missing) {
            (true, false) => LdStrategy::BitVectorRefRefOnly,
            (true, true) => LdStrategy::BitVector,
            (false, false) => LdStrategy::BitVectorNoMissing,
            (false, true) => LdStrategy::BitVector,
        }
    }

    /// As `compute`, but with a caller-chosen strategy.
    pub fn compute_with(
        &mut self,
        strategy: LdStrategy,
        a: &SiteRecord,
        b: &SiteRecord,
        phased: bool,
    ) -> Result<Option<LdResult>, LdError> {
        self.accumulate(strategy, a, b, phased)?;
        let stats = if phased {
            phased_math(&mut self.table, &self.fisher)
        } else {
            unphased_math(&mut self.table, &self.fisher)
        };
        Ok(stats.map(|stats| LdResult {
            rid_a: a.rid,
            pos_a: a.pos,
            rid_b: b.rid,
            pos_b: b.pos,
            stats,
        }))
    }

    /**
     * Runs only the counting stage, leaving the table inspectable through
     * `table()`. Strategies must agree cell-for-cell here, which is the
     * property the equivalence tests pin down.
     */
    pub fn accumulate(
        &mut self,
        strategy: LdStrategy,
        a: &SiteRecord,
        b: &SiteRecord,
        phased: bool,
    ) -> Result<(), LdError> {
        for site in [a, b] {
            if site.n_samples != self.params.n_samples {
                return Err(LdError::SampleCountMismatch {
                    expected: self.params.n_samples,
                    found: site.n_samples,
                });
            }
        }

        match (strategy, phased) {
            (LdStrategy::IndexList, true) => {
                self.accumulate_phased_list(a, b);
                Ok(())
            }
            (LdStrategy::BitVectorRefRefOnly, true) => {
                let n00 = phased_ref_ref_only(&self.params, &a.vector, &b.vector);
                self.table.reset_phased();
                self.fill_phased_from_ref_ref(n00, a, b);
                Ok(())
            }
            (LdStrategy::RunLength, true) => self.accumulate_phased_run_length(a, b),
            (LdStrategy::RunLength, false) => self.accumulate_unphased_run_length(a, b),
            (LdStrategy::BitVector, true) => {
                let counts = phased_masked(&self.params, &a.vector, &b.vector);
                self.table.reset_phased();
                self.table.cells[KEY_REF_REF] = counts.ref_ref;
                self.table.cells[KEY_REF_ALT] = counts.alt_second;
                self.table.cells[KEY_ALT_REF] = counts.alt_first;
                self.table.cells[KEY_ALT_ALT] = counts.alt_alt;
                Ok(())
            }
            (LdStrategy::BitVectorNoMissing, true) => {
                let counts = phased_no_missing(&self.params, &a.vector, &b.vector);
                self.table.reset_phased();
                self.table.cells[KEY_REF_ALT] = counts.alt_second;
                self.table.cells[KEY_ALT_REF] = counts.alt_first;
                self.table.cells[KEY_ALT_ALT] = counts.alt_alt;
                self.table.cells[KEY_REF_REF] = self.params.total_haplotypes()
                    - (counts.alt_second + counts.alt_first + counts.alt_alt);
                Ok(())
            }
            (LdStrategy::BitVector, false) => {
                let counts = unphased_masked(&self.params, &a.vector, &b.vector);
                self.table.reset_unphased();
                self.table.cells[KEY_RR_RR] = counts.rr_rr;
                self.table.cells[KEY_RR_RA] = counts.rr_ra;
                self.table.cells[KEY_RR_AA] = counts.rr_aa;
                self.table.cells[KEY_RA_RR] = counts.ra_rr;
                self.table.cells[KEY_RA_RA] = counts.ra_ra;
                self.table.cells[KEY_RA_AA] = counts.ra_aa;
                self.table.cells[KEY_AA_RR] = counts.aa_rr;
                self.table.cells[KEY_AA_RA] = counts.aa_ra;
                self.table.cells[KEY_AA_AA] = counts.aa_aa;
                Ok(())
            }
            (LdStrategy::BitVectorNoMissing, false) => {
                let counts = unphased_no_missing(&self.params, &a.vector, &b.vector);
                self.table.reset_unphased();
                self.table.cells[KEY_RR_RA] = counts.rr_ra;
                self.table.cells[KEY_RR_AA] = counts.rr_aa;
                self.table.cells[KEY_RA_RR] = counts.ra_rr;
                self.table.cells[KEY_RA_AA] = counts.ra_aa;
                self.table.cells[KEY_AA_RR] = counts.aa_rr;
                self.table.cells[KEY_AA_RA] = counts.aa_ra;
                self.table.cells[KEY_AA_AA] = counts.aa_aa;
                self.table.cells[KEY_RR_RR] = counts.rr_rr;
                // The one cell the kernel cannot see directly.
                self.table.cells[KEY_RA_RA] = self.params.n_samples as u64
                    - (counts.rr_rr
                        + counts.rr_ra
                        + counts.rr_aa
                        + counts.ra_rr
                        + counts.ra_aa
                        + counts.aa_rr
                        + counts.aa_ra
                        + counts.aa_aa);
                Ok(())
            }
            (strategy, phased) => Err(LdError::StrategyUnsupported {
                strategy: strategy.name(),
                phased,
            }),
        }
    }

    fn accumulate_phased_list(&mut self, a: &SiteRecord, b: &SiteRecord) {
        self.table.reset_phased();
        let (short, long) = if a.list.len() <= b.list.len() {
            (&a.list, &b.list)
        } else {
            (&b.list, &a.list)
        };
        let n_same = short
            .indices()
            .iter()
            .filter(|&&index| long.contains(index))
            .count() as u64;
        let n_total = (a.list.len() + b.list.len()) as u64;
        let n00 = self.params.total_haplotypes() - (n_total - n_same);
        self.fill_phased_from_ref_ref(n00, a, b);
    }

    /// Recovers the full 2×2 from the joint REF/REF count and the two
    /// marginal allele counts.
    fn fill_phased_from_ref_ref(&mut self, n00: u64, a: &SiteRecord, b: &SiteRecord) {
        let non_ref = self.params.total_haplotypes() - n00;
        debug_assert!(a.ac + b.ac >= non_ref);
        let n11 = (a.ac + b.ac).saturating_sub(non_ref);
        self.table.cells[KEY_REF_REF] = n00;
        self.table.cells[KEY_REF_ALT] = b.ac.saturating_sub(n11);
        self.table.cells[KEY_ALT_REF] = a.ac.saturating_sub(n11);
        self.table.cells[KEY_ALT_ALT] = n11;
    }

    fn accumulate_phased_run_length(
        &mut self,
        a: &SiteRecord,
        b: &SiteRecord,
    ) -> Result<(), LdError> {
        self.table.reset_phased();
        let runs_a = &a.runs;
        let runs_b = &b.runs;
        let (n_a, n_b) = (runs_a.n(), runs_b.n());
        let mut off_a = 0usize;
        let mut off_b = 0usize;
        let mut len_a = runs_a.get(0).len as u64;
        let mut len_b = runs_b.get(0).len as u64;

        loop {
            let run_a = runs_a.get(off_a);
            let run_b = runs_b.get(off_b);
            let key_left = ((run_a.hap_a.code() as usize) << 2) | run_b.hap_a.code() as usize;
            let key_right = ((run_a.hap_b.code() as usize) << 2) | run_b.hap_b.code() as usize;

            let add = len_a.min(len_b);
            self.table.cells[key_left] += add;
            self.table.cells[key_right] += add;
            len_a -= add;
            len_b -= add;

            if len_a == 0 {
                off_a += 1;
            }
            if len_b == 0 {
                off_b += 1;
            }
            if off_a == n_a || off_b == n_b {
                if off_a != n_a || off_b != n_b {
                    return Err(LdError::RunLengthDesync {
                        offset_a: off_a,
                        runs_a: n_a,
                        offset_b: off_b,
                        runs_b: n_b,
                    });
                }
                return Ok(());
            }
            if len_a == 0 {
                len_a = runs_a.get(off_a).len as u64;
            }
            if len_b == 0 {
                len_b = runs_b.get(off_b).len as u64;
            }
        }
    }

    fn accumulate_unphased_run_length(
        &mut self,
        a: &SiteRecord,
        b: &SiteRecord,
    ) -> Result<(), LdError> {
        self.table.reset_unphased();
        let runs_a = &a.runs;
        let runs_b = &b.runs;
        let (n_a, n_b) = (runs_a.n(), runs_b.n());
        let mut off_a = 0usize;
        let mut off_b = 0usize;
        let mut len_a = runs_a.get(0).len as u64;
        let mut len_b = runs_b.get(0).len as u64;

        loop {
            let run_a = runs_a.get(off_a);
            let run_b = runs_b.get(off_b);
            let key = ((run_a.hap_a.code() as usize) << 6)
                | ((run_a.hap_b.code() as usize) << 4)
                | ((run_b.hap_a.code() as usize) << 2)
                | run_b.hap_b.code() as usize;

            let add = len_a.min(len_b);
            self.table.cells[key] += add;
            len_a -= add;
            len_b -= add;

            if len_a == 0 {
                off_a += 1;
            }
            if len_b == 0 {
                off_b += 1;
            }
            if off_a == n_a || off_b == n_b {
                if off_a != n_a || off_b != n_b {
                    return Err(LdError::RunLengthDesync {
                        offset_a: off_a,
                        runs_a: n_a,
                        offset_b: off_b,
                        runs_b: n_b,
                    });
                }
                return Ok(());
            }
            if len_a == 0 {
                len_a = runs_a.get(off_a).len as u64;
            }
            if len_b == 0 {
                len_b = runs_b.get(off_b).len as u64;
            }
        }
    }
}
