/**
 * Two-bit allele code used across every genotype representation. The code
 * values are shared with the run-length form and the composite cell keys of
 * the contingency table, so they must not be reordered.
 */
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Allele {
    Ref = 0,
    Alt = 1,
    Missing = 2,
}

impl Allele {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Allele {
        match code {
            0 => Allele::Ref,
            1 => Allele::Alt,
            2 => Allele::Missing,
            _ => panic!("Invalid allele code {}", code),
        }
    }

    #[inline]
    pub fn is_alt(self) -> bool {
        self == Allele::Alt
    }

    #[inline]
    pub fn is_missing(self) -> bool {
        self == Allele::Missing
    }
}

/**
 * One sample's genotype at a biallelic site. For phased data the two
 * haplotypes are ordered; for unphased data the order carries no meaning
 * and the math layer treats (Ref, Alt) and (Alt, Ref) identically.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiploidGenotype {
    pub hap_a: Allele,
    pub hap_b: Allele,
}

impl DiploidGenotype {
    pub fn new(hap_a: Allele, hap_b: Allele) -> DiploidGenotype {
        DiploidGenotype { hap_a, hap_b }
    }

    pub fn hom_ref() -> DiploidGenotype {
        DiploidGenotype::new(Allele::Ref, Allele::Ref)
    }

    pub fn hom_alt() -> DiploidGenotype {
        DiploidGenotype::new(Allele::Alt, Allele::Alt)
    }

    pub fn het() -> DiploidGenotype {
        DiploidGenotype::new(Allele::Ref, Allele::Alt)
    }

    pub fn has_missing(&self) -> bool {
        self.hap_a.is_missing() || self.hap_b.is_missing()
    }

    /// Number of non-missing ALT haplotypes carried by this genotype.
    pub fn alt_count(&self) -> u64 {
        self.hap_a.is_alt() as u64 + self.hap_b.is_alt() as u64
    }
}
