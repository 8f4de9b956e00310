use std::error::Error;
use std::fmt;

/**
 * Fatal conditions raised during an LD computation. Filtered pairs
 * (uninformative sites, infeasible roots) are not errors and are reported
 * as an absent result instead.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LdError {
    /**
     * The two run-length sequences did not terminate on the same genotype
     * offset. This indicates corruption upstream of the engine: the two
     * sites disagree on the number of samples they encode.
     */
    RunLengthDesync {
        offset_a: usize,
        runs_a: usize,
        offset_b: usize,
        runs_b: usize,
    },
    /// The requested strategy cannot fill the table the math path needs.
    StrategyUnsupported {
        strategy: &'static str,
        phased: bool,
    },
    /// The two site records were prepared for different sample counts.
    SampleCountMismatch { expected: u32, found: u32 },
}

impl fmt::Display for LdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LdError::RunLengthDesync {
                offset_a,
                runs_a,
                offset_b,
                runs_b,
            } => write!(
                f,
                "run-length sequences failed to terminate together: {}/{} and {}/{}",
                offset_a, runs_a, offset_b, runs_b
            ),
            LdError::StrategyUnsupported { strategy, phased } => write!(
                f,
                "strategy {} cannot be used for {} pairs",
                strategy,
                if *phased { "phased" } else { "unphased" }
            ),
            LdError::SampleCountMismatch { expected, found } => write!(
                f,
                "site record encodes {} samples but the engine was configured for {}",
                found, expected
            ),
        }
    }
}

impl Error for LdError {}
