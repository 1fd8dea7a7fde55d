use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;
use heapless::{consts::*, String};

use core::fmt;
use core::fmt::Write;

use crate::chip_select::ChipSelect;
use crate::driver::{Error, JoinMode, Uplink};
use crate::line::{LineBuffer, LINE_CAPACITY};
use crate::parser;
use crate::parser::Downlink;
use crate::response;
use crate::response::ResponseCode;
use crate::ticker::Ticker;

macro_rules! command {
    ($size:tt, $($arg:tt)*) => ({
        let mut c = String::<$size>::new();
        write!(c, $($arg)*).map_err(|_| Error::CommandTooLong)?;
        c
    })
}

fn text_of(bytes: &[u8]) -> &str {
    core::str::from_utf8(bytes).unwrap_or("")
}

/// The protocol engine: one outstanding command at a time, driven to
/// completion by the pump loop in `wait`.
pub(crate) struct Engine<'t, Serial, ResetPin, ChipSelectPin, Delay>
    where
        Serial: serial::Read<u8> + serial::Write<u8>,
        ResetPin: OutputPin,
        ChipSelectPin: OutputPin,
        Delay: DelayMs<u32>,
{
    serial: Serial,
    reset: ResetPin,
    cs: ChipSelect<ChipSelectPin>,
    delay: Delay,
    ticker: &'t Ticker,
    line: LineBuffer,
    ready: bool,
    downlink: Option<Downlink>,
}

impl<'t, Serial, ResetPin, ChipSelectPin, Delay> Engine<'t, Serial, ResetPin, ChipSelectPin, Delay>
    where
        Serial: serial::Read<u8> + serial::Write<u8>,
        ResetPin: OutputPin,
        ChipSelectPin: OutputPin,
        Delay: DelayMs<u32>,
{
    pub(crate) fn new(
        serial: Serial,
        reset: ResetPin,
        cs: ChipSelectPin,
        delay: Delay,
        ticker: &'t Ticker,
    ) -> Self {
        Self {
            serial,
            reset,
            cs: ChipSelect::new(cs),
            delay,
            ticker,
            line: LineBuffer::new(),
            ready: true,
            downlink: None,
        }
    }

    pub(crate) fn init(&mut self) {
        self.reset.set_high().ok();
        self.delay.delay_ms(100);
        self.reset.set_low().ok();
        self.delay.delay_ms(300);
        self.reset.set_high().ok();
        self.delay.delay_ms(100);
        self.cs.deselect();

        self.line.clear();
        self.ticker.reset();
        self.ready = true;
        self.downlink = None;

        // let the module boot, then discard its version banner
        self.delay.delay_ms(1000);
        while self.serial.read().is_ok() {}
        log::info!("RN2483 reset complete");
    }

    pub(crate) fn release(self) -> (Serial, ResetPin, ChipSelectPin, Delay) {
        (self.serial, self.reset, self.cs.free(), self.delay)
    }

    pub(crate) fn ticker(&self) -> &'t Ticker {
        self.ticker
    }

    pub(crate) fn configure_timeout(&mut self, limit: u32) {
        self.ticker.configure(limit);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn take_downlink(&mut self) -> Option<Downlink> {
        self.downlink.take()
    }

    /// Feed one received byte into the line assembler.
    pub(crate) fn feed(&mut self, b: u8) -> Result<(), Error> {
        if self.line.push(b).is_err() {
            self.recover();
            return Err(Error::Overflow);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Command lifecycle
    // ------------------------------------------------------------------------

    /// Write `cmd` + CR LF and arm the response wait. Fails fast if a
    /// command is already outstanding.
    fn start(&mut self, cmd: &str) -> Result<(), Error> {
        if !self.ready {
            return Err(Error::Busy);
        }

        log::debug!("uart > {}", cmd);
        for &b in cmd.as_bytes() {
            self.write_byte(b)?;
        }
        self.write_byte(b'\r')?;
        self.write_byte(b'\n')?;
        nb::block!(self.serial.flush()).map_err(|_| Error::Write)?;

        self.line.clear();
        self.ticker.arm();
        self.ready = false;
        Ok(())
    }

    fn write_byte(&mut self, b: u8) -> Result<(), Error> {
        nb::block!(self.serial.write(b)).map_err(|_| Error::Write)
    }

    fn drain(&mut self) -> Result<(), Error> {
        loop {
            // leave bytes in the transport while a line awaits
            // consumption; they belong to the next line
            if self.line.is_ready() {
                return Ok(());
            }
            match self.serial.read() {
                Ok(b) => self.feed(b)?,
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(_)) => {
                    self.recover();
                    return Err(Error::Read);
                }
            }
        }
    }

    /// Pump until a full line arrived or the armed timer fired.
    fn wait(&mut self, response: &mut [u8]) -> Result<usize, Error> {
        loop {
            self.drain()?;
            if self.line.is_ready() {
                return self.take_line(response);
            }
            if self.ticker.take_fired() {
                log::warn!("module did not answer within the tick budget");
                self.recover();
                return Err(Error::Timeout);
            }
        }
    }

    /// Copy the completed line out and return to READY.
    fn take_line(&mut self, response: &mut [u8]) -> Result<usize, Error> {
        let line = self.line.line();
        let len = line.len();
        if response.len() < len {
            self.recover();
            return Err(Error::Overflow);
        }

        log::debug!("uart < {}", text_of(line).trim());
        {
            let _selected = self.cs.select();
            response[..len].copy_from_slice(line);
        }

        self.line.consume();
        self.ticker.disarm();
        self.ready = true;
        Ok(len)
    }

    /// Abandon the outstanding command and return to READY.
    fn recover(&mut self) {
        self.line.clear();
        self.ticker.disarm();
        self.ready = true;
    }

    /// Go back to waiting for a line of the same command (the
    /// asynchronous phase of join/transmit). Re-arms the timer.
    fn expect_line(&mut self, response: &mut [u8]) -> Result<usize, Error> {
        self.ticker.arm();
        self.ready = false;
        self.wait(response)
    }

    pub(crate) fn transact<'a>(
        &mut self,
        cmd: &str,
        response: &'a mut [u8],
    ) -> Result<&'a str, Error> {
        self.start(cmd)?;
        let len = self.wait(response)?;
        core::str::from_utf8(&response[..len]).map_err(|_| Error::Encoding)
    }

    /// Consume terminal-phase lines until one is conclusive, stashing
    /// any downlink notifications seen on the way.
    fn await_outcome(&mut self, response: &mut [u8]) -> Result<ResponseCode, Error> {
        loop {
            let len = self.expect_line(response)?;
            let text = text_of(&response[..len]).trim();
            if let Ok((_, downlink)) = parser::downlink(text) {
                self.downlink = Some(downlink);
            }
            let code = response::classify_terminal(text);
            if code != ResponseCode::DownlinkReceived {
                return Ok(code);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Protocol operations
    // ------------------------------------------------------------------------

    pub(crate) fn join(&mut self, mode: JoinMode) -> Result<ResponseCode, Error> {
        let mut response = [0u8; LINE_CAPACITY];
        let cmd = command!(U384, "mac join {}", mode.as_str());

        let code = {
            let first = self.transact(&cmd, &mut response)?;
            response::classify_immediate(first.trim())
        };
        if code != ResponseCode::Ok {
            return Ok(code);
        }

        let len = self.expect_line(&mut response)?;
        Ok(response::classify_terminal(text_of(&response[..len]).trim()))
    }

    pub(crate) fn mac_transmit(
        &mut self,
        uplink: Uplink,
        port: u8,
        data: &str,
    ) -> Result<ResponseCode, Error> {
        let mut response = [0u8; LINE_CAPACITY];
        let cmd = command!(U384, "mac tx {} {} {}", uplink.as_str(), port, data);

        let code = {
            let first = self.transact(&cmd, &mut response)?;
            response::classify_immediate(first.trim())
        };
        if code != ResponseCode::Ok {
            return Ok(code);
        }

        self.await_outcome(&mut response)
    }

    pub(crate) fn radio_transmit(&mut self, data: &str) -> Result<ResponseCode, Error> {
        let mut response = [0u8; LINE_CAPACITY];
        let cmd = command!(U384, "radio tx {}", data);

        let code = {
            let first = self.transact(&cmd, &mut response)?;
            response::classify_immediate(first.trim())
        };
        if code != ResponseCode::Ok {
            return Ok(code);
        }

        let len = self.expect_line(&mut response)?;
        Ok(response::classify_terminal(text_of(&response[..len]).trim()))
    }

    pub(crate) fn radio_receive(&mut self, window: u32) -> Result<ResponseCode, Error> {
        let mut response = [0u8; LINE_CAPACITY];
        let cmd = command!(U384, "radio rx {}", window);

        let code = {
            let first = self.transact(&cmd, &mut response)?;
            response::classify_immediate(first.trim())
        };
        if code != ResponseCode::Ok {
            return Ok(code);
        }

        self.await_outcome(&mut response)
    }

    /// Pass-through command classified against the immediate table,
    /// for the `mac set`/`mac save` style configuration surface.
    pub(crate) fn config(&mut self, args: fmt::Arguments<'_>) -> Result<ResponseCode, Error> {
        let mut cmd = String::<U384>::new();
        cmd.write_fmt(args).map_err(|_| Error::CommandTooLong)?;

        let mut response = [0u8; LINE_CAPACITY];
        let first = self.transact(&cmd, &mut response)?;
        Ok(response::classify_immediate(first.trim()))
    }
}
