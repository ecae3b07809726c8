#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod registration;
pub mod schedule;
pub mod sheet;
pub mod time;

pub use error::Error;
pub use time::Clock;
