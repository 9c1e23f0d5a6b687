pub mod document;
pub mod http;
pub mod lenient;
pub mod model;
pub mod service;
pub mod validate;

pub use http::*;
pub use model::{Course, CourseFilter, CourseInput, CourseLevel, CoursePatch, CourseStats, CourseStatus};
pub use service::*;
pub use validate::slugify;
