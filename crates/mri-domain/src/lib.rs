// mri-domain library entry point
pub mod error;
pub mod parser;
pub mod report;
pub mod stats;

pub use error::DomainError;
pub use parser::{parse_fields, parse_full, parse_volume, parse_volume_tolerant, Arity, Parsed};
pub use report::{assemble, MriReport, VOLUME_UNIT};
pub use stats::{FullStatistics, NumericField, VolumeStatistics};
