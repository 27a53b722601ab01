use std::fmt;

/// Read-only view of a boot-keyboard style report, for logging.
///
/// Byte 0 is the modifier bitmap, bytes 1.. are key usage codes (0 = empty slot).
#[derive(Clone, Copy)]
pub struct KeyboardReport<'a> {
    bytes: &'a [u8],
}

impl<'a> KeyboardReport<'a> {
    const MODIFIER_NAMES: [&'static str; 8] = [
        "LCtrl", "LShift", "LAlt", "LGui", "RCtrl", "RShift", "RAlt", "RGui",
    ];

    /// `None` for an empty slice.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self { bytes })
        }
    }

    pub fn modifiers(&self) -> u8 {
        self.bytes[0]
    }

    /// Held key usage codes, skipping empty slots.
    pub fn keys(&self) -> impl Iterator<Item = u8> + 'a {
        self.bytes[1..].iter().copied().filter(|k| *k != 0)
    }

    /// No modifiers and no keys held.
    pub fn is_idle(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for KeyboardReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = self.modifiers();
        let names: Vec<&str> = Self::MODIFIER_NAMES
            .iter()
            .enumerate()
            .filter(|(bit, _)| mods & (1 << bit) != 0)
            .map(|(_, name)| *name)
            .collect();
        let keys: Vec<String> = self.keys().map(|k| format!("{k:#04x}")).collect();
        write!(f, "mods=[{}] keys=[{}]", names.join("+"), keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_modifiers_and_keys() {
        let bytes = [0x03, 0x04, 0x00, 0x05, 0x00, 0x00, 0x00];
        let report = KeyboardReport::parse(&bytes).unwrap();
        assert_eq!(report.modifiers(), 0x03);
        assert_eq!(report.keys().collect::<Vec<_>>(), vec![0x04, 0x05]);
        assert_eq!(report.to_string(), "mods=[LCtrl+LShift] keys=[0x04,0x05]");
        assert!(!report.is_idle());
    }

    #[test]
    fn idle_report() {
        let bytes = [0u8; 7];
        let report = KeyboardReport::parse(&bytes).unwrap();
        assert!(report.is_idle());
        assert_eq!(report.to_string(), "mods=[] keys=[]");
    }

    #[test]
    fn empty_slice_is_not_a_report() {
        assert!(KeyboardReport::parse(&[]).is_none());
    }
}
