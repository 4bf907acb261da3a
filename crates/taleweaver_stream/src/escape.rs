//! Escape-sequence decoding over a partially-received buffer.
//!
//! Model output arrives in arbitrary fragment boundaries, so an escape
//! sequence can be cut anywhere. The decoder therefore distinguishes a
//! *malformed* escape (passed through verbatim) from a *truncated* one
//! (the caller must wait for more input before interpreting it).

/// Result of decoding the escape sequence starting at a given position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// A sequence was consumed; append `text` and skip `advance` bytes.
    Decoded {
        /// Decoded replacement text (raw passthrough for malformed hex)
        text: String,
        /// Bytes consumed from the source, including the backslash
        advance: usize,
    },
    /// The sequence is cut off at the end of the buffer; wait for more.
    Incomplete,
}

fn decoded(text: impl Into<String>, advance: usize) -> EscapeOutcome {
    EscapeOutcome::Decoded {
        text: text.into(),
        advance,
    }
}

/// Decode the escape sequence at byte offset `i` in `src`.
///
/// `src[i]` must be a backslash on a char boundary. Recognizes the
/// single-character escapes, `\xHH`, and `\uHHHH` including UTF-16
/// surrogate pairs spanning two `\u` escapes. Unknown escapes pass
/// through verbatim; hex sequences with invalid digits pass through raw
/// rather than being dropped.
pub fn decode_escape_at(src: &str, i: usize) -> EscapeOutcome {
    let bytes = src.as_bytes();
    debug_assert_eq!(bytes.get(i), Some(&b'\\'));
    let Some(&code) = bytes.get(i + 1) else {
        return EscapeOutcome::Incomplete;
    };
    match code {
        b'"' | b'\'' | b'\\' => decoded(char::from(code), 2),
        b'n' => decoded('\n', 2),
        b'r' => decoded('\r', 2),
        b't' => decoded('\t', 2),
        b'b' => decoded('\u{0008}', 2),
        b'f' => decoded('\u{000C}', 2),
        b'v' => decoded('\u{000B}', 2),
        b'0' => decoded('\0', 2),
        b'x' => {
            if i + 4 > src.len() {
                return EscapeOutcome::Incomplete;
            }
            match src
                .get(i + 2..i + 4)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                Some(byte) => decoded(char::from(byte), 4),
                // Invalid digits: emit the raw text uninterpreted.
                None => match src.get(i..i + 4) {
                    Some(raw) => decoded(raw, 4),
                    None => passthrough_unknown(src, i),
                },
            }
        }
        b'u' => decode_unicode_escape(src, i),
        _ => passthrough_unknown(src, i),
    }
}

fn decode_unicode_escape(src: &str, i: usize) -> EscapeOutcome {
    if i + 6 > src.len() {
        return EscapeOutcome::Incomplete;
    }
    let Some(unit) = src
        .get(i + 2..i + 6)
        .and_then(|h| u16::from_str_radix(h, 16).ok())
    else {
        return match src.get(i..i + 6) {
            Some(raw) => decoded(raw, 6),
            None => passthrough_unknown(src, i),
        };
    };

    if (0xD800..=0xDBFF).contains(&unit) {
        // High surrogate: a valid low surrogate must follow as a second
        // \uHHHH escape before the pair can be decoded.
        if i + 12 <= src.len() {
            let low = src
                .get(i + 6..i + 12)
                .and_then(|tail| tail.strip_prefix("\\u"))
                .and_then(|h| u16::from_str_radix(h, 16).ok())
                .filter(|low| (0xDC00..=0xDFFF).contains(low));
            if let Some(low) = low {
                let cp = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                if let Some(ch) = char::from_u32(cp) {
                    return decoded(ch, 12);
                }
            }
        }
        return EscapeOutcome::Incomplete;
    }

    match char::from_u32(u32::from(unit)) {
        Some(ch) => decoded(ch, 6),
        // Lone low surrogate: not representable, pass through raw.
        None => match src.get(i..i + 6) {
            Some(raw) => decoded(raw, 6),
            None => passthrough_unknown(src, i),
        },
    }
}

// Unknown escape code: keep the backslash and the following char as-is.
fn passthrough_unknown(src: &str, i: usize) -> EscapeOutcome {
    match src[i + 1..].chars().next() {
        Some(ch) => decoded(format!("\\{ch}"), 1 + ch.len_utf8()),
        None => EscapeOutcome::Incomplete,
    }
}
