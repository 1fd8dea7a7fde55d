use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

use crate::engine::Engine;
use crate::parser::Downlink;
use crate::response::ResponseCode;
use crate::ticker::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A command was issued while another one is outstanding.
    Busy,
    /// The armed timer expired before a full reply line arrived.
    Timeout,
    /// A reply line exceeded the buffer meant to hold it.
    Overflow,
    /// The command text did not fit the transmit buffer.
    CommandTooLong,
    /// The transport failed while reading.
    Read,
    /// The transport failed while writing.
    Write,
    /// The reply was not valid UTF-8.
    Encoding,
}

/// Network activation procedure for `mac join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    OverTheAir,
    ActivationByPersonalization,
}

impl JoinMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            JoinMode::OverTheAir => "otaa",
            JoinMode::ActivationByPersonalization => "abp",
        }
    }
}

/// Uplink kind for `mac tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uplink {
    Confirmed,
    Unconfirmed,
}

impl Uplink {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Uplink::Confirmed => "cnf",
            Uplink::Unconfirmed => "uncnf",
        }
    }
}

/// Driver for an RN2483 LoRa module on a UART.
///
/// All operations are synchronous: they block the calling thread on a
/// busy-poll pump loop until the module answered or the armed timer
/// fired. Exactly one command may be outstanding at a time.
pub struct Rn2483<'t, Serial, ResetPin, ChipSelectPin, Delay>
    where
        Serial: serial::Read<u8> + serial::Write<u8>,
        ResetPin: OutputPin,
        ChipSelectPin: OutputPin,
        Delay: DelayMs<u32>,
{
    engine: Engine<'t, Serial, ResetPin, ChipSelectPin, Delay>,
}

impl<'t, Serial, ResetPin, ChipSelectPin, Delay> Rn2483<'t, Serial, ResetPin, ChipSelectPin, Delay>
    where
        Serial: serial::Read<u8> + serial::Write<u8>,
        ResetPin: OutputPin,
        ChipSelectPin: OutputPin,
        Delay: DelayMs<u32>,
{
    /// The `ticker` is the timeout flag surface shared with the tick
    /// source; see [`Ticker`].
    pub fn new(
        serial: Serial,
        reset: ResetPin,
        cs: ChipSelectPin,
        delay: Delay,
        ticker: &'t Ticker,
    ) -> Self {
        Self {
            engine: Engine::new(serial, reset, cs, delay, ticker),
        }
    }

    /// Hardware-reset the module and bring the driver to its power-on
    /// state. Blocks for the reset handshake plus a settling second.
    pub fn init(&mut self) {
        self.engine.init();
    }

    /// Release the transport, pins and delay.
    pub fn release(self) -> (Serial, ResetPin, ChipSelectPin, Delay) {
        self.engine.release()
    }

    /// Send an arbitrary command and return the reply line, terminator
    /// retained, copied into `response`.
    pub fn send_command<'a>(
        &mut self,
        cmd: &str,
        response: &'a mut [u8],
    ) -> Result<&'a str, Error> {
        self.engine.transact(cmd, response)
    }

    /// `mac join <mode>`. A nonzero immediate code is returned at once;
    /// otherwise the join outcome line (`accepted`/`denied`) decides.
    pub fn join(&mut self, mode: JoinMode) -> Result<ResponseCode, Error> {
        self.engine.join(mode)
    }

    /// `mac tx <cnf|uncnf> <port> <hex>`. After module acceptance this
    /// waits through any downlink notifications for the terminal
    /// transmission outcome.
    pub fn transmit(&mut self, uplink: Uplink, port: u8, data: &str) -> Result<ResponseCode, Error> {
        self.engine.mac_transmit(uplink, port, data)
    }

    /// `radio tx <hex>`: transparent radio-level transmission.
    pub fn raw_transmit(&mut self, data: &str) -> Result<ResponseCode, Error> {
        self.engine.radio_transmit(data)
    }

    /// `radio rx <window>`: open a radio-level receive window. A window
    /// size of zero keeps the receiver open until the watchdog fires.
    pub fn receive_window(&mut self, window: u32) -> Result<ResponseCode, Error> {
        self.engine.radio_receive(window)
    }

    /// The last downlink captured during `transmit`/`receive_window`.
    pub fn take_downlink(&mut self) -> Option<Downlink> {
        self.engine.take_downlink()
    }

    /// Feed one externally received byte into the line assembler.
    pub fn feed_byte(&mut self, b: u8) -> Result<(), Error> {
        self.engine.feed(b)
    }

    /// Count one timer tick. Equivalent to `Ticker::tick` on the shared
    /// ticker, for integrations that keep the driver in scope instead.
    pub fn tick(&self) {
        self.engine.ticker().tick();
    }

    /// A limit of zero disables timeout policing; a nonzero limit
    /// enables it with that tick budget.
    pub fn configure_timeout(&mut self, limit: u32) {
        self.engine.configure_timeout(limit);
    }

    /// True while no command is outstanding.
    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    // ------------------------------------------------------------------------
    // Configuration conveniences
    // ------------------------------------------------------------------------

    /// `mac reset <band>`: reset the MAC stack to the defaults of the
    /// given band (e.g. 868).
    pub fn factory_reset(&mut self, band: u16) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("mac reset {}", band))
    }

    pub fn set_device_eui(&mut self, eui: &str) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("mac set deveui {}", eui))
    }

    pub fn set_application_eui(&mut self, eui: &str) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("mac set appeui {}", eui))
    }

    pub fn set_application_key(&mut self, key: &str) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("mac set appkey {}", key))
    }

    pub fn set_adaptive_data_rate(&mut self, on: bool) -> Result<ResponseCode, Error> {
        self.engine
            .config(format_args!("mac set adr {}", if on { "on" } else { "off" }))
    }

    pub fn set_automatic_reply(&mut self, on: bool) -> Result<ResponseCode, Error> {
        self.engine
            .config(format_args!("mac set ar {}", if on { "on" } else { "off" }))
    }

    /// `mac save`: persist the MAC configuration to module EEPROM.
    pub fn save_configuration(&mut self) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("mac save"))
    }

    /// `mac pause`: suspend the MAC layer for radio-level access. The
    /// reply (the pause duration in milliseconds) lands in `response`.
    pub fn pause_mac<'a>(&mut self, response: &'a mut [u8]) -> Result<&'a str, Error> {
        self.engine.transact("mac pause", response)
    }

    /// `radio set wdt <ms>`: configure the radio watchdog; zero
    /// disables it, which `receive_window(0)` needs.
    pub fn radio_watchdog(&mut self, ms: u32) -> Result<ResponseCode, Error> {
        self.engine.config(format_args!("radio set wdt {}", ms))
    }

    /// `sys get ver`: firmware identification line.
    pub fn system_version<'a>(&mut self, response: &'a mut [u8]) -> Result<&'a str, Error> {
        self.engine.transact("sys get ver", response)
    }
}
