//! Course catalog building blocks: storage ports, the course and media
//! facades, and their HTTP handlers.

pub mod courses;
pub mod error;
pub mod media;
pub mod response;
pub mod store;

pub use error::ServiceError;
