pub mod clock;
pub mod event;
pub mod schedule;
pub mod session;
pub mod share;
pub mod step;
