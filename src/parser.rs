use heapless::{consts::*, String};
use nom::character::complete::{digit1, space1};
use nom::combinator::rest;
use nom::{alt, call, do_parse, named, tag};

/// A received packet reported by the module while an uplink or a
/// receive window was outstanding.
///
/// `mac_rx <port> <data>` carries the application port; the radio-level
/// `radio_rx <data>` form has none. The payload is kept as the hex text
/// the module printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Downlink {
    pub port: Option<u8>,
    pub data: String<U512>,
}

// mac_rx <port> <hexdata>
named!(
    pub mac_downlink<&str, Downlink>,
    do_parse!(
        tag!("mac_rx") >>
        call!(space1) >>
        port: call!(digit1) >>
        call!(space1) >>
        data: call!(rest) >>
        ( Downlink {
            port: port.parse().ok(),
            data: String::from(data),
        } )
    )
);

// radio_rx  <hexdata>
named!(
    pub radio_downlink<&str, Downlink>,
    do_parse!(
        tag!("radio_rx") >>
        call!(space1) >>
        data: call!(rest) >>
        ( Downlink {
            port: None,
            data: String::from(data),
        } )
    )
);

named!(
    pub downlink<&str, Downlink>,
    alt!(mac_downlink | radio_downlink)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_downlink_carries_the_port() {
        let (_, downlink) = downlink("mac_rx 1 AABBCC").unwrap();
        assert_eq!(downlink.port, Some(1));
        assert_eq!(downlink.data.as_str(), "AABBCC");
    }

    #[test]
    fn radio_downlink_has_no_port() {
        // the module pads radio_rx with a second space
        let (_, downlink) = downlink("radio_rx  48656C6C6F").unwrap();
        assert_eq!(downlink.port, None);
        assert_eq!(downlink.data.as_str(), "48656C6C6F");
    }

    #[test]
    fn status_lines_are_not_downlinks() {
        assert!(downlink("mac_tx_ok").is_err());
        assert!(downlink("mac_rx").is_err());
        assert!(downlink("radio_err").is_err());
        assert!(downlink("accepted").is_err());
    }

    #[test]
    fn out_of_range_port_is_dropped_not_fatal() {
        let (_, downlink) = downlink("mac_rx 4242 00").unwrap();
        assert_eq!(downlink.port, None);
        assert_eq!(downlink.data.as_str(), "00");
    }
}
