pub mod http;
pub mod model;
pub mod service;

pub use http::*;
pub use model::{BatchUploadReport, UploadFailure, UploadFile, UploadedImage};
pub use service::*;
