//! Engine use cases. Orchestrate domain rules via ports.

pub mod coop_validation;
pub mod degree_audit;
pub mod pool_augmenter;
pub mod timeline_builder;

pub use coop_validation::validate_coop_timeline;
pub use degree_audit::DegreeAuditGenerator;
pub use pool_augmenter::{EcpAugmentation, PoolAugmenter, PoolSet};
pub use timeline_builder::TimelineBuilder;
