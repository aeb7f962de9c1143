//! Shared test doubles: a panel that records every framed access, a delay
//! and an observer writing to the same timeline.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use epd_g2::{Config, Display, DisplayInterface, DisplayObserver, ErrorCode};

/// One observable step, in the order it happened
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Command { index: u8, value: u8 },
    Data { index: u8, payload: Vec<u8> },
    Read { index: u8 },
    Raw(Vec<u8>),
    Power(bool),
    Reset(bool),
    ChipSelect(bool),
    Discharge(bool),
    Delay(u32),
    Ready,
    Error(ErrorCode),
    StageUpdated { previous: Vec<u8>, next: Vec<u8> },
}

pub type Log = Rc<RefCell<Vec<Event>>>;

/// Error raised by [`FakePanel`] when told to fail
#[derive(Debug, PartialEq)]
pub struct FakeBusError;

/// Controller double answering probes and status reads from a script
#[derive(Debug)]
pub struct FakePanel {
    log: Log,
    /// Byte returned by the ID probe
    pub probe: u8,
    /// Answers to status reads, front first
    pub status: VecDeque<u8>,
    /// Answer once `status` runs dry
    pub idle_status: u8,
    /// BUSY polls that report busy before it clears
    pub busy_polls: usize,
    /// BUSY never clears
    pub stuck_busy: bool,
    /// Fail the n-th register write (0-based), counting commands and data
    pub fail_write: Option<usize>,
    writes: usize,
}

impl FakePanel {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            probe: 0x12,
            status: VecDeque::from([0x80, 0x40]),
            idle_status: 0x00,
            busy_polls: 0,
            stuck_busy: false,
            fail_write: None,
            writes: 0,
        }
    }

    fn record(&self, event: Event) {
        self.log.borrow_mut().push(event);
    }

    fn count_write(&mut self) -> Result<(), FakeBusError> {
        let n = self.writes;
        self.writes += 1;
        if self.fail_write == Some(n) {
            return Err(FakeBusError);
        }
        Ok(())
    }
}

impl DisplayInterface for FakePanel {
    type Error = FakeBusError;

    fn send_command<D: DelayNs>(
        &mut self,
        _delay: &mut D,
        index: u8,
        value: u8,
    ) -> Result<(), Self::Error> {
        self.count_write()?;
        self.record(Event::Command { index, value });
        Ok(())
    }

    fn send_data<D: DelayNs>(
        &mut self,
        _delay: &mut D,
        index: u8,
        payload: &[u8],
    ) -> Result<(), Self::Error> {
        self.count_write()?;
        self.record(Event::Data {
            index,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn read_register<D: DelayNs>(
        &mut self,
        _delay: &mut D,
        index: u8,
    ) -> Result<u8, Self::Error> {
        self.record(Event::Read { index });
        Ok(self.status.pop_front().unwrap_or(self.idle_status))
    }

    fn raw_transfer(&mut self, bytes: &[u8]) -> Result<u8, Self::Error> {
        self.record(Event::Raw(bytes.to_vec()));
        Ok(self.probe)
    }

    fn set_power(&mut self, on: bool) -> Result<(), Self::Error> {
        self.record(Event::Power(on));
        Ok(())
    }

    fn set_reset(&mut self, high: bool) -> Result<(), Self::Error> {
        self.record(Event::Reset(high));
        Ok(())
    }

    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error> {
        self.record(Event::ChipSelect(high));
        Ok(())
    }

    fn set_discharge(&mut self, on: bool) -> Result<(), Self::Error> {
        self.record(Event::Discharge(on));
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        if self.stuck_busy {
            return Ok(true);
        }
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Delay that records instead of sleeping
pub struct RecordingDelay {
    log: Log,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Delay(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(Event::Delay(ms));
    }
}

/// Observer that records notifications
#[derive(Debug)]
pub struct RecordingObserver {
    log: Log,
}

impl DisplayObserver for RecordingObserver {
    fn on_ready(&mut self) {
        self.log.borrow_mut().push(Event::Ready);
    }

    fn on_error(&mut self, code: ErrorCode) {
        self.log.borrow_mut().push(Event::Error(code));
    }

    fn on_stage_updated(&mut self, previous: &[u8], next: &[u8]) {
        self.log.borrow_mut().push(Event::StageUpdated {
            previous: previous.to_vec(),
            next: next.to_vec(),
        });
    }
}

pub type TestDisplay = Display<FakePanel, RecordingObserver>;

/// Display wired to a fake panel; `tune` adjusts the panel's script
pub fn setup(
    config: Config,
    tune: impl FnOnce(&mut FakePanel),
) -> (TestDisplay, RecordingDelay, Log) {
    let log: Log = Rc::default();
    let mut panel = FakePanel::new(log.clone());
    tune(&mut panel);
    let observer = RecordingObserver { log: log.clone() };
    let display = Display::new(panel, config, observer).expect("valid configuration");
    (display, RecordingDelay { log: log.clone() }, log)
}

pub fn events(log: &Log) -> Vec<Event> {
    log.borrow().clone()
}

/// Payloads of every line sent, in order
pub fn lines_sent(events: &[Event]) -> Vec<Vec<u8>> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Data { index: 0x0A, payload } => Some(payload.clone()),
            _ => None,
        })
        .collect()
}

/// Scan row selected by an encoded line
pub fn scan_row(line: &[u8]) -> usize {
    let scan = &line[16..40];
    let (byte, value) = scan
        .iter()
        .enumerate()
        .find(|(_, b)| **b != 0)
        .expect("a scan byte is set");
    let lane = (0..4)
        .find(|l| (value >> (l * 2)) & 0b11 == 0b11)
        .expect("a scan lane is set");
    (23 - byte) * 4 + lane
}

/// Frame whose every line is filled with its own line number
pub fn numbered_frame() -> Vec<u8> {
    (0..96u8).flat_map(|n| [n; 32]).collect()
}
