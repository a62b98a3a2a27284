//! Guesses the text encoding of a file's bytes before it is split into lines.

use chardetng::EncodingDetector;
use encoding_rs::{DecoderResult, Encoding, UTF_8};

/// Returns the most likely encoding of `bytes`.
///
/// A byte-order mark wins outright, valid UTF-8 is taken as UTF-8, and anything
/// else is handed to `chardetng`. Empty input falls back to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.is_empty() {
        return UTF_8;
    }

    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decodes `bytes` with `encoding`, dropping byte sequences that do not
/// decode. Characters present in the text itself, U+FFFD included, are kept.
pub fn decode_lossy(bytes: &[u8], encoding: &'static Encoding) -> String {
    let mut decoder = encoding.new_decoder();
    let mut text = String::with_capacity(bytes.len());
    let mut input = bytes;

    loop {
        let (result, read) = decoder.decode_to_string_without_replacement(input, &mut text, true);
        input = &input[read..];
        match result {
            DecoderResult::InputEmpty => return text,
            // The malformed sequence has been consumed.
            DecoderResult::Malformed(_, _) => {}
            DecoderResult::OutputFull => {
                let needed = decoder
                    .max_utf8_buffer_length_without_replacement(input.len())
                    .unwrap_or(input.len() * 3);
                text.reserve(needed.max(16));
            }
        }
    }
}

/// Splits `text` into lines ending at `\n`, `\r\n` or a lone `\r`.
/// A trailing terminator does not start another line.
pub fn split_lines<'a>(text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\n', '\r']) {
            Some(end) => {
                let line = &rest[..end];
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[end + terminator..];
                Some(line)
            }
            None => Some(std::mem::take(&mut rest)),
        }
    })
}
