//! Port traits. API boundaries for the hexagon.
//!
//! - Outbound: engine calls into catalog and document stores
//! - Clock: injected time source

pub mod clock;
pub mod outbound;

pub use clock::Clock;
pub use outbound::{
    CoursePoolRepository, CourseRepository, DegreeRepository, TimelineRepository, UserRepository,
};
