//! Background jobs
//!
//! - `cover`: builds a book cover from a random meme
//! - `queue`: runs cover jobs on a worker task and reports their outcome

pub mod cover;
pub mod queue;

pub use cover::{CoverError, CoverGenerator, data_uri, image_extension};
pub use queue::{CoverOutcome, CoverQueue, GenerateCover, process_job};
