#![allow(
    non_upper_case_globals,
    unused_parens,
    non_snake_case
)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod engine;
pub mod genotype;
pub mod io;
pub mod kernels;
pub mod math;
pub mod utils;
