//! Board collaborators owned by the supervisor

use core::fmt::{self, Write};

use heapless::Vec;

use crate::timing::{CancellableDelay, WaitOutcome};
use crate::traits::{Board, PortWriter, SerialPort, Watchdog, ESCAPE};

/// Most serial ports a board can expose
pub const MAX_PORTS: usize = 4;

/// Serial ports with their roles
///
/// Every port accepts operator commands and receives broadcasts. One port
/// doubles as the debug console and one leads to the host computer.
pub struct PortBank<P> {
    ports: Vec<P, MAX_PORTS>,
    debug: usize,
    host: usize,
}

impl<P: SerialPort> PortBank<P> {
    /// Bank with port 0 in every role
    pub fn new() -> Self {
        Self {
            ports: Vec::new(),
            debug: 0,
            host: 0,
        }
    }

    /// Add a port, returning its index
    pub fn add(&mut self, port: P) -> Result<usize, P> {
        self.ports.push(port)?;
        Ok(self.ports.len() - 1)
    }

    pub fn with_debug(mut self, index: usize) -> Self {
        self.debug = index;
        self
    }

    pub fn with_host(mut self, index: usize) -> Self {
        self.host = index;
        self
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn debug_index(&self) -> usize {
        self.debug
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut P> {
        self.ports.get_mut(index)
    }

    /// Write to one port; unknown indices are ignored
    pub fn write_to(&mut self, index: usize, args: fmt::Arguments<'_>) {
        if let Some(port) = self.ports.get_mut(index) {
            let _ = PortWriter(port).write_fmt(args);
        }
    }

    /// Write to every port
    pub fn broadcast(&mut self, args: fmt::Arguments<'_>) {
        for port in self.ports.iter_mut() {
            let _ = PortWriter(port).write_fmt(args);
        }
    }

    pub fn write_debug(&mut self, args: fmt::Arguments<'_>) {
        self.write_to(self.debug, args);
    }

    pub fn write_host(&mut self, args: fmt::Arguments<'_>) {
        self.write_to(self.host, args);
    }

    /// Drain the operator ports looking for the cancellation byte
    ///
    /// A host port separate from the debug console is not polled, so host
    /// replies stay queued while a sequence runs.
    pub fn escape_received(&mut self) -> bool {
        let host = (self.host != self.debug).then_some(self.host);
        let mut seen = false;
        for (index, port) in self.ports.iter_mut().enumerate() {
            if Some(index) == host {
                continue;
            }
            while let Some(byte) = port.read_byte() {
                if byte == ESCAPE {
                    seen = true;
                    break;
                }
            }
        }
        seen
    }

    /// Borrow two distinct ports at once
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut P, &mut P)> {
        if a == b || a >= self.ports.len() || b >= self.ports.len() {
            return None;
        }
        if a < b {
            let (low, high) = self.ports.split_at_mut(b);
            Some((&mut low[a], &mut high[0]))
        } else {
            let (low, high) = self.ports.split_at_mut(a);
            Some((&mut high[0], &mut low[b]))
        }
    }
}

impl<P: SerialPort> Default for PortBank<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every collaborator of one board
pub struct Hardware<B: Board> {
    pub ports: PortBank<B::Port>,
    pub clock: B::Clock,
    pub strobe: B::Strobe,
    pub lens: B::Lens,
    pub power: B::Power,
    pub rtc: B::Rtc,
    pub sensors: B::Sensors,
    pub watchdog: B::Watchdog,
    pub trigger: B::Trigger,
    pub store: B::Store,
}

impl<B: Board> Hardware<B> {
    /// Run a delay, feeding the watchdog and watching for the escape byte
    pub fn wait(&mut self, delay: CancellableDelay) -> WaitOutcome {
        let Hardware {
            clock,
            watchdog,
            ports,
            ..
        } = self;
        delay.run(clock, || {
            watchdog.feed();
            ports.escape_received()
        })
    }

    /// Uncancellable delay that still keeps the watchdog fed
    pub fn settle_ms(&mut self, ms: u32) {
        let delay = CancellableDelay::millis(&self.clock, ms);
        let Hardware {
            clock, watchdog, ..
        } = self;
        delay.run(clock, || {
            watchdog.feed();
            false
        });
    }

    /// Uncancellable sub-second delay
    pub fn settle_us(&mut self, us: u32) {
        let delay = CancellableDelay::micros(&self.clock, us);
        let Hardware {
            clock, watchdog, ..
        } = self;
        delay.run(clock, || {
            watchdog.feed();
            false
        });
    }
}
