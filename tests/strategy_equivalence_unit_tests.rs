#![allow(non_upper_case_globals)]

extern crate currawong;

use currawong::engine::ld_engine::{LdEngine, LdResult, LdStrategy};
use currawong::engine::params::LdParams;
use currawong::genotype::allele::{Allele, DiploidGenotype};
use currawong::genotype::encoder::SiteEncoder;
use currawong::genotype::site::SiteRecord;
use currawong::kernels::SimdWidth;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

fn available_widths() -> Vec<SimdWidth> {
    let mut widths = vec![SimdWidth::Scalar];
    let detected = SimdWidth::detect();
    if detected != SimdWidth::Scalar {
        widths.push(detected);
    }
    widths
}

fn random_panel(rng: &mut StdRng, n: usize, maf: f64, missing_rate: f64) -> Vec<DiploidGenotype> {
    (0..n)
        .map(|_| {
            let hap = |rng: &mut StdRng| {
                if rng.gen_range(0.0, 1.0) < missing_rate {
                    Allele::Missing
                } else if rng.gen_range(0.0, 1.0) < maf {
                    Allele::Alt
                } else {
                    Allele::Ref
                }
            };
            DiploidGenotype::new(hap(rng), hap(rng))
        })
        .collect()
}

fn phased_table(
    engine: &mut LdEngine,
    strategy: LdStrategy,
    a: &SiteRecord,
    b: &SiteRecord,
) -> [u64; 4] {
    engine.accumulate(strategy, a, b, true).unwrap();
    engine.table().phased_cells()
}

fn unphased_table(
    engine: &mut LdEngine,
    strategy: LdStrategy,
    a: &SiteRecord,
    b: &SiteRecord,
) -> [u64; 9] {
    engine.accumulate(strategy, a, b, false).unwrap();
    engine.table().unphased_folded()
}

#[test]
fn every_phased_strategy_produces_the_same_table() {
    let mut rng = StdRng::seed_from_u64(0x0ddba11);
    let sample_counts = [5usize, 7, 12, 33, 64, 100, 129, 1000];

    for width in available_widths() {
        for &n in &sample_counts {
            let params = LdParams::with_width(n as u32, width);
            let encoder = SiteEncoder::new(params);
            let mut engine = LdEngine::with_params(params);

            for round in 0..6 {
                let maf = rng.gen_range(0.02, 0.5);
                let a = encoder
                    .encode(0, round, &random_panel(&mut rng, n, maf, 0.0))
                    .unwrap();
                let b = encoder
                    .encode(0, round + 1000, &random_panel(&mut rng, n, maf, 0.0))
                    .unwrap();

                let reference = phased_table(&mut engine, LdStrategy::RunLength, &a, &b);
                for strategy in [
                    LdStrategy::IndexList,
                    LdStrategy::BitVector,
                    LdStrategy::BitVectorNoMissing,
                    LdStrategy::BitVectorRefRefOnly,
                ] {
                    assert_eq!(
                        phased_table(&mut engine, strategy, &a, &b),
                        reference,
                        "width {:?}, n {}, strategy {:?}",
                        width,
                        n,
                        strategy
                    );
                }
            }
        }
    }
}

#[test]
fn phased_strategies_agree_under_missing_data() {
    let mut rng = StdRng::seed_from_u64(0xfadedba);
    for width in available_widths() {
        for &n in &[6usize, 13, 64, 250, 999] {
            let params = LdParams::with_width(n as u32, width);
            let encoder = SiteEncoder::new(params);
            let mut engine = LdEngine::with_params(params);

            for round in 0..6 {
                let a = encoder
                    .encode(0, round, &random_panel(&mut rng, n, 0.3, 0.07))
                    .unwrap();
                let b = encoder
                    .encode(0, round + 1000, &random_panel(&mut rng, n, 0.3, 0.07))
                    .unwrap();

                assert_eq!(
                    phased_table(&mut engine, LdStrategy::RunLength, &a, &b),
                    phased_table(&mut engine, LdStrategy::BitVector, &a, &b),
                    "width {:?}, n {}",
                    width,
                    n
                );
            }
        }
    }
}

#[test]
fn every_unphased_strategy_produces_the_same_table() {
    let mut rng = StdRng::seed_from_u64(0xc0ffee);
    for width in available_widths() {
        for &n in &[5usize, 9, 40, 64, 128, 1000] {
            let params = LdParams::with_width(n as u32, width);
            let encoder = SiteEncoder::new(params);
            let mut engine = LdEngine::with_params(params);

            for round in 0..6 {
                let maf = rng.gen_range(0.05, 0.5);
                let a = encoder
                    .encode(0, round, &random_panel(&mut rng, n, maf, 0.0))
                    .unwrap();
                let b = encoder
                    .encode(0, round + 1000, &random_panel(&mut rng, n, maf, 0.0))
                    .unwrap();

                let reference = unphased_table(&mut engine, LdStrategy::RunLength, &a, &b);
                for strategy in [LdStrategy::BitVector, LdStrategy::BitVectorNoMissing] {
                    assert_eq!(
                        unphased_table(&mut engine, strategy, &a, &b),
                        reference,
                        "width {:?}, n {}, strategy {:?}",
                        width,
                        n,
                        strategy
                    );
                }
            }
        }
    }
}

#[test]
fn unphased_strategies_agree_under_missing_data() {
    let mut rng = StdRng::seed_from_u64(0xdeafbee);
    for width in available_widths() {
        for &n in &[8usize, 21, 100, 513] {
            let params = LdParams::with_width(n as u32, width);
            let encoder = SiteEncoder::new(params);
            let mut engine = LdEngine::with_params(params);

            for round in 0..6 {
                let a = encoder
                    .encode(0, round, &random_panel(&mut rng, n, 0.25, 0.1))
                    .unwrap();
                let b = encoder
                    .encode(0, round + 1000, &random_panel(&mut rng, n, 0.25, 0.1))
                    .unwrap();

                assert_eq!(
                    unphased_table(&mut engine, LdStrategy::RunLength, &a, &b),
                    unphased_table(&mut engine, LdStrategy::BitVector, &a, &b),
                    "width {:?}, n {}",
                    width,
                    n
                );
            }
        }
    }
}

#[test]
fn tables_agree_across_register_widths() {
    let mut rng = StdRng::seed_from_u64(0xace0fba5);
    let widths = available_widths();
    let n = 517usize;

    for round in 0..6 {
        let genotypes_a = random_panel(&mut rng, n, 0.3, 0.05);
        let genotypes_b = random_panel(&mut rng, n, 0.3, 0.05);

        let tables: Vec<([u64; 4], [u64; 9])> = widths
            .iter()
            .map(|&width| {
                let params = LdParams::with_width(n as u32, width);
                let encoder = SiteEncoder::new(params);
                let mut engine = LdEngine::with_params(params);
                let a = encoder.encode(0, round, &genotypes_a).unwrap();
                let b = encoder.encode(0, round + 1000, &genotypes_b).unwrap();
                (
                    phased_table(&mut engine, LdStrategy::BitVector, &a, &b),
                    unphased_table(&mut engine, LdStrategy::BitVector, &a, &b),
                )
            })
            .collect();

        for pair in tables.windows(2) {
            assert_eq!(pair[0], pair[1], "round {}", round);
        }
    }
}

#[test]
fn parallel_engines_match_serial_computation() {
    let mut rng = StdRng::seed_from_u64(0xf1eece);
    let n = 200usize;
    let params = LdParams::new(n as u32);
    let encoder = SiteEncoder::new(params);

    let sites: Vec<SiteRecord> = (0..24)
        .map(|i| {
            let maf = rng.gen_range(0.05, 0.5);
            encoder
                .encode(0, i as u64, &random_panel(&mut rng, n, maf, 0.02))
                .unwrap()
        })
        .collect();

    let pairs: Vec<(usize, usize)> = (0..sites.len())
        .flat_map(|i| (i + 1..sites.len()).map(move |j| (i, j)))
        .collect();

    let mut serial_engine = LdEngine::with_params(params);
    let serial: Vec<Option<LdResult>> = pairs
        .iter()
        .map(|&(i, j)| serial_engine.compute(&sites[i], &sites[j], true).unwrap())
        .collect();

    let parallel: Vec<Option<LdResult>> = pairs
        .par_iter()
        .map_init(
            || LdEngine::with_params(params),
            |engine, &(i, j)| engine.compute(&sites[i], &sites[j], true).unwrap(),
        )
        .collect();

    assert_eq!(serial, parallel);
}
