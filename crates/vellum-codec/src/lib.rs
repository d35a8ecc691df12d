//! Legacy single-byte codepage <-> UTF-8 transcoding.
//!
//! The scripting host speaks Windows-1251; the value tree stores UTF-8.
//! Every string that crosses the boundary goes through a [`Codepage`]:
//! [`encode`](Codepage::encode) on the way in, [`decode`](Codepage::decode)
//! on the way out.
//!
//! # Substitution policy
//!
//! Decoding never fails. A code point with no legacy byte, or a malformed
//! or truncated UTF-8 sequence, becomes a single `?`. For malformed input
//! scanning resumes at the byte after the offending lead byte; a
//! well-formed but unmappable sequence is consumed whole. Encoding drops
//! legacy bytes that have no assigned character.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod table;

use table::WINDOWS_1251_HIGH;

/// Byte emitted by [`Codepage::decode`] for anything it cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// A data-driven single-byte codepage.
///
/// Bytes `0x00..=0x7F` are ASCII. Bytes `0x80..=0xFF` map through a
/// 128-entry table of code points, where `0` means "unassigned".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Codepage {
    name: &'static str,
    high: [u16; 128],
}

impl Codepage {
    /// Windows-1251 (Cyrillic), the encoding used by the scripting host.
    pub const WINDOWS_1251: Codepage = Codepage {
        name: "windows-1251",
        high: WINDOWS_1251_HIGH,
    };

    /// Label of this codepage.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Character for one legacy byte, or `None` if the byte is unassigned.
    pub fn to_char(&self, byte: u8) -> Option<char> {
        if byte < 0x80 {
            return Some(char::from(byte));
        }
        match self.high[usize::from(byte & 0x7F)] {
            0 => None,
            cp => char::from_u32(u32::from(cp)),
        }
    }

    /// Legacy byte for one character, or `None` if it has no mapping.
    pub fn from_char(&self, c: char) -> Option<u8> {
        let cp = u32::from(c);
        if cp < 0x80 {
            return Some(cp as u8);
        }
        // А..я are contiguous in both encodings.
        if (0x0410..=0x044F).contains(&cp) {
            return Some((cp - 0x0350) as u8);
        }
        self.high
            .iter()
            .position(|&entry| entry != 0 && u32::from(entry) == cp)
            .map(|idx| 0x80 | idx as u8)
    }

    /// Transcode legacy bytes into UTF-8.
    ///
    /// Unassigned bytes produce no output.
    pub fn encode(&self, legacy: &[u8]) -> String {
        let mut out = String::with_capacity(legacy.len() * 2);
        for &byte in legacy {
            if let Some(c) = self.to_char(byte) {
                out.push(c);
            }
        }
        out
    }

    /// Transcode UTF-8 bytes into the legacy encoding.
    ///
    /// Zero bytes pass through like any other ASCII byte.
    pub fn decode(&self, utf8: &[u8]) -> Vec<u8> {
        self.decode_inner(utf8, false)
    }

    /// Like [`decode`](Self::decode), but stops at the first zero byte.
    ///
    /// Used when the source is a fixed-size, NUL-padded buffer.
    pub fn decode_until_nul(&self, utf8: &[u8]) -> Vec<u8> {
        self.decode_inner(utf8, true)
    }

    fn decode_inner(&self, utf8: &[u8], stop_at_nul: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(utf8.len());
        let mut i = 0;
        while i < utf8.len() {
            let lead = utf8[i];
            if lead == 0 && stop_at_nul {
                break;
            }
            if lead < 0x80 {
                out.push(lead);
                i += 1;
                continue;
            }
            match decode_scalar(&utf8[i..]) {
                Some((c, width)) => {
                    out.push(self.from_char(c).unwrap_or(REPLACEMENT));
                    i += width;
                }
                None => {
                    out.push(REPLACEMENT);
                    i += 1;
                }
            }
        }
        out
    }
}

impl Default for Codepage {
    fn default() -> Self {
        Self::WINDOWS_1251
    }
}

/// Decode one multi-byte scalar from the front of `bytes`.
///
/// Returns the character and its encoded width, or `None` if the lead byte
/// is invalid or the sequence is truncated, overlong, or a surrogate.
fn decode_scalar(bytes: &[u8]) -> Option<(char, usize)> {
    let width = match bytes.first()? {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };
    let seq = bytes.get(..width)?;
    let c = std::str::from_utf8(seq).ok()?.chars().next()?;
    Some((c, width))
}
