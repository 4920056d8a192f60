//! Collaborators the leave engine talks to but does not own.

pub mod audit;
pub mod notification_sink;
pub mod roster;
