//! Embassy tasks
//!
//! The supervisor runs in thread mode; the frame trigger runs on the
//! interrupt executor and preempts it.

pub mod supervisor;
pub mod trigger;

pub use supervisor::supervisor_task;
pub use trigger::trigger_task;
