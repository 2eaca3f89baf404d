//! Inbound console commands.
//!
//! A completed console line is classified by substring search, in a fixed
//! precedence: `ENTER`, then `EXIT`, then `CAL:`.  The first keyword found
//! wins regardless of where it sits in the line, so `"EXIT ENTER"` is an
//! `Enter`.  Lines are expected to be uppercased already.

/// Commands the calibration state machine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// No keyword recognised.
    None,
    /// Enter calibration mode.
    Enter,
    /// Submit the buffer solution's known value (text after `CAL:`).
    Calibrate(&'a str),
    /// Leave calibration mode.
    Exit,
}

const ENTER: &[u8] = b"ENTER";
const EXIT: &[u8] = b"EXIT";
const CAL: &[u8] = b"CAL:";

impl<'a> Command<'a> {
    pub fn parse(line: &'a [u8]) -> Self {
        if find(line, ENTER).is_some() {
            Self::Enter
        } else if find(line, EXIT).is_some() {
            Self::Exit
        } else if let Some(pos) = find(line, CAL) {
            Self::Calibrate(utf8_prefix(&line[pos + CAL.len()..]))
        } else {
            Self::None
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Longest valid UTF-8 prefix; console noise must not hide the number.
fn utf8_prefix(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}

/// Parse the leading decimal number of `text`, C `strtod` style.
///
/// Leading whitespace is skipped and trailing garbage (`"707\r"`,
/// `"12.5PPM"`) ignored.  Text with no leading number yields `0.0`.
pub fn parse_leading_f32(text: &str) -> f32 {
    let s = text.trim_start();
    let b = s.as_bytes();

    let mut end = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < b.len() && b[end] == b'.' {
        let frac_start = end + 1;
        let mut j = frac_start;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        end = j;
    }
    if digits == 0 {
        return 0.0;
    }

    if end < b.len() && matches!(b[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}
