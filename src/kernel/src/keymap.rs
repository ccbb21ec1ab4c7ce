//! PS/2 keyboard decoding into console input bytes.

use kestrel_common::control::{BACKSPACE, DELETE, RELOCATE_CLOSE, RELOCATE_OPEN};
use pc_keyboard::{layouts, DecodedKey, HandleControl, KeyCode, Keyboard, ScancodeSet1};

/// Decodes scancode set 1 with a US 104-key layout.
pub struct KeyDecoder {
    keyboard: Keyboard<layouts::Us104Key, ScancodeSet1>,
}

impl KeyDecoder {
    /// Creates a decoder with no keys held.
    pub const fn new() -> Self {
        Self {
            keyboard: Keyboard::new(
                ScancodeSet1::new(),
                layouts::Us104Key,
                HandleControl::MapLettersToUnicode,
            ),
        }
    }

    /// Feeds one scancode, returning a console byte once a key is complete.
    pub fn decode(&mut self, scancode: u8) -> Option<u8> {
        let event = self.keyboard.add_byte(scancode).ok().flatten()?;
        self.keyboard.process_keyevent(event).and_then(translate)
    }
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a decoded key to the byte the console expects.
pub fn translate(key: DecodedKey) -> Option<u8> {
    match key {
        DecodedKey::Unicode('\n') => Some(b'\r'),
        DecodedKey::Unicode(c) if c.is_ascii() => Some(c as u8),
        DecodedKey::Unicode(_) => None,
        DecodedKey::RawKey(KeyCode::Home) => Some(RELOCATE_OPEN),
        DecodedKey::RawKey(KeyCode::End) => Some(RELOCATE_CLOSE),
        DecodedKey::RawKey(KeyCode::Backspace) => Some(BACKSPACE),
        DecodedKey::RawKey(KeyCode::Delete) => Some(DELETE),
        DecodedKey::RawKey(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_common::control::{ControlCode, KILL_LINE};

    #[test]
    fn test_translate_printable() {
        assert_eq!(translate(DecodedKey::Unicode('a')), Some(b'a'));
        assert_eq!(translate(DecodedKey::Unicode('é')), None);
    }

    #[test]
    fn test_enter_becomes_carriage_return() {
        let byte = translate(DecodedKey::Unicode('\n')).unwrap();
        assert_eq!(ControlCode::classify(byte), ControlCode::Newline);
    }

    #[test]
    fn test_home_and_end_relocate() {
        assert_eq!(translate(DecodedKey::RawKey(KeyCode::Home)), Some(RELOCATE_OPEN));
        assert_eq!(translate(DecodedKey::RawKey(KeyCode::End)), Some(RELOCATE_CLOSE));
        assert_eq!(translate(DecodedKey::RawKey(KeyCode::F1)), None);
    }

    #[test]
    fn test_decode_scancodes() {
        let mut decoder = KeyDecoder::new();
        // 'a' make then break.
        assert_eq!(decoder.decode(0x1E), Some(b'a'));
        assert_eq!(decoder.decode(0x9E), None);
    }

    #[test]
    fn test_decode_ctrl_u_kills_line() {
        let mut decoder = KeyDecoder::new();
        assert_eq!(decoder.decode(0x1D), None); // left ctrl make
        assert_eq!(decoder.decode(0x16), Some(KILL_LINE)); // 'u'
    }
}
