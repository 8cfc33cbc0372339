//! Edge-detection filters.
//!
//! - [`kernel`]: the fixed kernels and neighborhood sums
//! - [`convolution`]: pure whole-image filtering, plus batch dispatch
//! - [`job`]: background runs with cooperative cancellation

pub mod convolution;
pub mod job;
pub mod kernel;

pub use convolution::{
    apply_batch, apply_edge_filter, apply_edge_filter_until, EdgeAlgorithm, FilterError,
    NEUTRAL_STRENGTH,
};
pub use job::{CancelToken, EdgeFilterJob, JobHandle, JobId, JobOutcome, JobState};
