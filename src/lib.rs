pub mod actor;
pub mod common;
pub mod landing_engine;
pub mod model;
pub mod sys;
