/// Module reply classification.
///
/// Numeric values are the module driver's closed vocabulary; the same
/// reply text can carry a different code depending on the protocol
/// phase (`invalid_data_len` is 8 before radio activity, 13 after).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseCode {
    /// No error. Also the classification of any reply text outside the
    /// known vocabulary.
    Ok = 0,
    InvalidParam = 1,
    NotJoined = 2,
    NoFreeChannel = 3,
    Silent = 4,
    RejoinNeeded = 5,
    Busy = 6,
    MacPaused = 7,
    InvalidDataLen = 8,
    KeysNotInit = 9,
    MacError = 10,
    /// A downlink arrived while waiting for the uplink outcome. Not
    /// terminal; the engine keeps waiting.
    DownlinkReceived = 12,
    PayloadTooLarge = 13,
    RadioError = 14,
    Denied = 18,
}

impl ResponseCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Replies the module gives before any radio activity, rejecting the
/// command itself.
const IMMEDIATE: &[(&str, ResponseCode)] = &[
    ("invalid_param", ResponseCode::InvalidParam),
    ("not_joined", ResponseCode::NotJoined),
    ("no_free_ch", ResponseCode::NoFreeChannel),
    ("silent", ResponseCode::Silent),
    ("frame_counter_err_rejoin_needed", ResponseCode::RejoinNeeded),
    ("busy", ResponseCode::Busy),
    ("mac_paused", ResponseCode::MacPaused),
    ("invalid_data_len", ResponseCode::InvalidDataLen),
    ("keys_not_init", ResponseCode::KeysNotInit),
];

/// Replies reporting the outcome of radio activity.
const TERMINAL: &[(&str, ResponseCode)] = &[
    ("mac_err", ResponseCode::MacError),
    ("mac_tx_ok", ResponseCode::Ok),
    ("mac_rx", ResponseCode::DownlinkReceived),
    ("invalid_data_len", ResponseCode::PayloadTooLarge),
    ("radio_err", ResponseCode::RadioError),
    ("radio_tx_ok", ResponseCode::Ok),
    ("radio_rx", ResponseCode::Ok),
    ("accepted", ResponseCode::Ok),
    ("denied", ResponseCode::Denied),
];

fn classify(table: &[(&str, ResponseCode)], text: &str) -> ResponseCode {
    table
        .iter()
        .find(|(reply, _)| *reply == text)
        .map(|(_, code)| *code)
        .unwrap_or(ResponseCode::Ok)
}

pub(crate) fn classify_immediate(text: &str) -> ResponseCode {
    classify(IMMEDIATE, text)
}

pub(crate) fn classify_terminal(text: &str) -> ResponseCode {
    classify(TERMINAL, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_vocabulary() {
        assert_eq!(classify_immediate("invalid_param"), ResponseCode::InvalidParam);
        assert_eq!(classify_immediate("not_joined"), ResponseCode::NotJoined);
        assert_eq!(classify_immediate("no_free_ch"), ResponseCode::NoFreeChannel);
        assert_eq!(classify_immediate("silent"), ResponseCode::Silent);
        assert_eq!(
            classify_immediate("frame_counter_err_rejoin_needed"),
            ResponseCode::RejoinNeeded
        );
        assert_eq!(classify_immediate("busy"), ResponseCode::Busy);
        assert_eq!(classify_immediate("mac_paused"), ResponseCode::MacPaused);
        assert_eq!(classify_immediate("invalid_data_len"), ResponseCode::InvalidDataLen);
        assert_eq!(classify_immediate("keys_not_init"), ResponseCode::KeysNotInit);
    }

    #[test]
    fn terminal_vocabulary() {
        assert_eq!(classify_terminal("mac_err"), ResponseCode::MacError);
        assert_eq!(classify_terminal("mac_tx_ok"), ResponseCode::Ok);
        assert_eq!(classify_terminal("mac_rx"), ResponseCode::DownlinkReceived);
        assert_eq!(classify_terminal("invalid_data_len"), ResponseCode::PayloadTooLarge);
        assert_eq!(classify_terminal("radio_err"), ResponseCode::RadioError);
        assert_eq!(classify_terminal("radio_tx_ok"), ResponseCode::Ok);
        assert_eq!(classify_terminal("radio_rx"), ResponseCode::Ok);
        assert_eq!(classify_terminal("accepted"), ResponseCode::Ok);
        assert_eq!(classify_terminal("denied"), ResponseCode::Denied);
    }

    #[test]
    fn unknown_text_is_no_error_by_design() {
        assert_eq!(classify_immediate("ok"), ResponseCode::Ok);
        assert_eq!(classify_terminal("4294967245"), ResponseCode::Ok);
        assert_eq!(classify_terminal(""), ResponseCode::Ok);
        // a downlink with payload does not exact-match the bare notification
        assert_eq!(classify_terminal("mac_rx 1 AABB"), ResponseCode::Ok);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(classify_immediate("Busy"), ResponseCode::Ok);
        assert_eq!(classify_terminal("DENIED"), ResponseCode::Ok);
    }

    #[test]
    fn numeric_values_are_stable() {
        assert_eq!(ResponseCode::Ok.code(), 0);
        assert_eq!(ResponseCode::Busy.code(), 6);
        assert_eq!(ResponseCode::InvalidDataLen.code(), 8);
        assert_eq!(ResponseCode::MacError.code(), 10);
        assert_eq!(ResponseCode::DownlinkReceived.code(), 12);
        assert_eq!(ResponseCode::PayloadTooLarge.code(), 13);
        assert_eq!(ResponseCode::Denied.code(), 18);
    }
}
