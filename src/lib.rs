pub mod board;
pub mod calendar;
pub mod context;
pub mod engine;
pub mod hours;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod source;
