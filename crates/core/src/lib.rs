#![deny(warnings)]

pub mod config;
pub mod decode;
pub mod emotion;
pub mod engine;
pub mod features;
pub mod preprocess;
pub mod profile;
pub mod synthesis;
pub mod util;
