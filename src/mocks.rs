//! Test doubles for the transport and signal collaborators.

use std::collections::VecDeque;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

/// Serial port with scripted replies; records everything written.
pub(crate) struct MockSerial {
    pub written: Vec<u8>,
    pub replies: VecDeque<u8>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
            replies: VecDeque::new(),
        }
    }

    pub fn reply(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes.iter().copied());
    }

    pub fn pending(&self) -> usize {
        self.replies.len()
    }
}

impl serial::Write<u8> for MockSerial {
    type Error = ();

    fn write(&mut self, word: u8) -> nb::Result<(), ()> {
        self.written.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), ()> {
        Ok(())
    }
}

impl serial::Read<u8> for MockSerial {
    type Error = ();

    fn read(&mut self) -> nb::Result<u8, ()> {
        self.replies.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

/// Output pin recording every level it was driven to.
pub(crate) struct MockPin {
    pub states: Vec<bool>,
}

impl MockPin {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }
}

impl OutputPin for MockPin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.states.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.states.push(true);
        Ok(())
    }
}

pub(crate) struct NoopDelay;

impl DelayMs<u32> for NoopDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}
