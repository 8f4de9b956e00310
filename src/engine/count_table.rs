/// Slots addressable by a composite genotype key built from 2-bit allele
/// codes; the largest key is four Missing codes packed together.
pub const TABLE_SLOTS: usize = 171;

// Phased 2×2 keys: (allele at site 1) << 2 | (allele at site 2).
pub const KEY_REF_REF: usize = 0;
pub const KEY_REF_ALT: usize = 1;
pub const KEY_ALT_REF: usize = 4;
pub const KEY_ALT_ALT: usize = 5;

// Unphased 3×3 keys: (site1 hapA) << 6 | (site1 hapB) << 4
//                  | (site2 hapA) << 2 | (site2 hapB).
pub const KEY_RR_RR: usize = 0;
pub const KEY_RR_RA: usize = 1;
pub const KEY_RR_AR: usize = 4;
pub const KEY_RR_AA: usize = 5;
pub const KEY_RA_RR: usize = 16;
pub const KEY_RA_RA: usize = 17;
pub const KEY_RA_AR: usize = 20;
pub const KEY_RA_AA: usize = 21;
pub const KEY_AR_RR: usize = 64;
pub const KEY_AR_RA: usize = 65;
pub const KEY_AR_AR: usize = 68;
pub const KEY_AR_AA: usize = 69;
pub const KEY_AA_RR: usize = 80;
pub const KEY_AA_RA: usize = 81;
pub const KEY_AA_AR: usize = 84;
pub const KEY_AA_AA: usize = 85;

pub const PHASED_KEYS: [usize; 4] = [KEY_REF_REF, KEY_REF_ALT, KEY_ALT_REF, KEY_ALT_ALT];

pub const UNPHASED_KEYS: [usize; 16] = [
    KEY_RR_RR, KEY_RR_RA, KEY_RR_AR, KEY_RR_AA, KEY_RA_RR, KEY_RA_RA, KEY_RA_AR, KEY_RA_AA,
    KEY_AR_RR, KEY_AR_RA, KEY_AR_AR, KEY_AR_AA, KEY_AA_RR, KEY_AA_RA, KEY_AA_AR, KEY_AA_AA,
];

/**
 * Per-engine scratch for one site pair. Only the keys of the active mode
 * are cleared on entry; run-length accumulation over records carrying
 * missing alleles lands in slots outside those key sets, which are never
 * read and may legally hold stale counts.
 */
#[derive(Clone)]
pub struct CountTable {
    pub cells: [u64; TABLE_SLOTS],
    pub total_haplotypes: u64,
}

impl CountTable {
    pub fn new() -> CountTable {
        CountTable {
            cells: [0; TABLE_SLOTS],
            total_haplotypes: 0,
        }
    }

    pub fn reset_phased(&mut self) {
        for key in PHASED_KEYS {
            self.cells[key] = 0;
        }
        self.total_haplotypes = 0;
    }

    pub fn reset_unphased(&mut self) {
        for key in UNPHASED_KEYS {
            self.cells[key] = 0;
        }
        self.total_haplotypes = 0;
    }

    /// The four phased cells in key order.
    pub fn phased_cells(&self) -> [u64; 4] {
        PHASED_KEYS.map(|key| self.cells[key])
    }

    pub fn unphased_cells(&self) -> [u64; 16] {
        UNPHASED_KEYS.map(|key| self.cells[key])
    }

    /// The nine biologically distinct unphased cells, with mirror-image
    /// heterozygote orientations folded together. Accumulation strategies
    /// may split the mirrors differently but always agree on this view.
    pub fn unphased_folded(&self) -> [u64; 9] {
        [
            self.cells[KEY_RR_RR],
            self.cells[KEY_RR_RA] + self.cells[KEY_RR_AR],
            self.cells[KEY_RR_AA],
            self.cells[KEY_RA_RR] + self.cells[KEY_AR_RR],
            self.cells[KEY_RA_RA]
                + self.cells[KEY_RA_AR]
                + self.cells[KEY_AR_RA]
                + self.cells[KEY_AR_AR],
            self.cells[KEY_RA_AA] + self.cells[KEY_AR_AA],
            self.cells[KEY_AA_RR],
            self.cells[KEY_AA_RA] + self.cells[KEY_AA_AR],
            self.cells[KEY_AA_AA],
        ]
    }
}

impl Default for CountTable {
    fn default() -> CountTable {
        CountTable::new()
    }
}
