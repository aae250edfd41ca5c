//! Supervisor task
//!
//! The supervisor loop is blocking and never returns. It is the only
//! thread-mode task, so it owns the thread executor for the rest of
//! runtime; everything time-critical runs on the interrupt executor.

use defmt::*;

use pctl_core::supervisor::{Hardware, Supervisor};

use crate::board::Rp2040Board;

#[embassy_executor::task]
pub async fn supervisor_task(hw: Hardware<Rp2040Board>) {
    info!("Supervisor task started");

    let mut supervisor = Supervisor::new(hw);
    supervisor.start();
    supervisor.run()
}
