use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// A 48-bit Bluetooth device address, stored in display order
/// (`B8:27:EB:C7:5B:1D` is `[0xB8, 0x27, 0xEB, 0xC7, 0x5B, 0x1D]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BdAddr([u8; 6]);

impl BdAddr {
    /// Wildcard address: bind on whichever local adapter accepts the peer.
    pub const ANY: BdAddr = BdAddr([0; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Byte order used by the kernel (`bdaddr_t` is little-endian).
    pub fn to_wire(self) -> [u8; 6] {
        let mut wire = self.0;
        wire.reverse();
        wire
    }

    pub fn from_wire(mut wire: [u8; 6]) -> Self {
        wire.reverse();
        Self(wire)
    }

    pub fn is_any(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl FromStr for BdAddr {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TransportError::InvalidAddress(s.to_string());
        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_colon_form() {
        let addr: BdAddr = "B8:27:EB:C7:5B:1D".parse().unwrap();
        assert_eq!(addr.octets(), [0xB8, 0x27, 0xEB, 0xC7, 0x5B, 0x1D]);
        assert_eq!(addr.to_string(), "B8:27:EB:C7:5B:1D");
    }

    #[test]
    fn accepts_lowercase_hex() {
        let addr: BdAddr = "b8:27:eb:c7:5b:1d".parse().unwrap();
        assert_eq!(addr.to_string(), "B8:27:EB:C7:5B:1D");
    }

    #[test]
    fn wire_order_is_reversed() {
        let addr: BdAddr = "01:02:03:04:05:06".parse().unwrap();
        assert_eq!(addr.to_wire(), [6, 5, 4, 3, 2, 1]);
        assert_eq!(BdAddr::from_wire(addr.to_wire()), addr);
    }

    #[test]
    fn any_is_all_zero() {
        let addr: BdAddr = "00:00:00:00:00:00".parse().unwrap();
        assert!(addr.is_any());
        assert_eq!(addr, BdAddr::ANY);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "B8:27:EB:C7:5B",
            "B8:27:EB:C7:5B:1D:00",
            "B8-27-EB-C7-5B-1D",
            "B8:27:EB:C7:5B:ZZ",
            "B8:27:EB:C7:5B:1",
            "+1:02:03:04:05:06",
            "B8:27:EB:C7:5B:-1",
        ] {
            assert!(
                matches!(bad.parse::<BdAddr>(), Err(TransportError::InvalidAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
