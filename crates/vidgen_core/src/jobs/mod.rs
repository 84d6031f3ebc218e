//! Job directories, published output and retention.

mod error;
mod layout;
mod publish;
mod retention;

pub use error::{JobError, JobResult};
pub use layout::{
    new_job_id, output_dir_name, parse_output_dir_name, reserve_output_dir, JobLayout,
    OUTPUT_DIR_PREFIX,
};
pub use publish::{publish, write_metadata, PublishedFiles};
pub use retention::cleanup_old_outputs;
