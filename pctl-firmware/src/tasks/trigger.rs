//! Frame trigger task
//!
//! Fires one frame per period while the trigger is enabled. New settings
//! take effect at the next frame boundary; a disabled trigger parks with
//! its outputs low until it is re-enabled.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use pctl_core::trigger::FrameTrigger;

use crate::board::Strobe;
use crate::channels::{IMAGE_COUNTER, TRIGGER_SETTINGS};

#[embassy_executor::task]
pub async fn trigger_task(mut trigger: FrameTrigger<Strobe>) {
    info!("Trigger task started");

    trigger.idle();
    let mut settings = TRIGGER_SETTINGS.wait().await;

    loop {
        let Some(period_us) = settings.period_us() else {
            trigger.idle();
            debug!("Frame trigger idle");
            settings = TRIGGER_SETTINGS.wait().await;
            continue;
        };

        info!(
            "Frame trigger running at {} Hz ({})",
            settings.frame_rate_hz, settings.mode
        );
        let mut ticker = Ticker::every(Duration::from_micros(u64::from(period_us)));

        loop {
            trigger.fire(&settings, &IMAGE_COUNTER);
            match select(ticker.next(), TRIGGER_SETTINGS.wait()).await {
                Either::First(()) => {}
                Either::Second(next) => {
                    settings = next;
                    break;
                }
            }
        }
    }
}
