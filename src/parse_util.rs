use std::str::FromStr;

use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of file, expected '{exp}'")]
    UnexpectedEof { exp: char },

    #[error("Expected '{exp}', but got '{got}'")]
    UnexpectedToken { exp: char, got: char },

    #[error("Expected \"{exp}\", but got \"{got}\"")]
    UnexpectedSlice { exp: String, got: String },
}

/// Consumes the slice until a non-ascii whitespace character is reached.
pub fn take_ws(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Like `take_ws`, but never crosses a line break.
pub fn take_blank(bytes: &[u8]) -> &[u8] {
    let i = bytes
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(bytes.len());

    &bytes[i..]
}

/// Takes the next character from the slice. If none is found, the slice is left as-is.
pub const fn take_1(bytes: &[u8]) -> (Option<u8>, &[u8]) {
    let [b, bytes @ ..] = bytes else {
        return (None, bytes);
    };

    (Some(*b), bytes)
}

/// Like `take_1`, but doesn't consume the token
pub fn peek_1(bytes: &[u8]) -> Option<u8> {
    let [b, _bytes @ ..] = bytes else { return None };

    Some(*b)
}

/// Expects the next character in `bytes` to be `b`.
pub fn expect(b: u8, bytes: &[u8]) -> ParseResult<&[u8]> {
    let (Some(a), bytes) = take_1(bytes) else {
        return Err(ParseError::UnexpectedEof { exp: b as char });
    };

    if a != b {
        return Err(ParseError::UnexpectedToken {
            exp: b as char,
            got: a as char,
        });
    }

    Ok(bytes)
}

/// Expects `bytes` to start with `bs`.
pub fn expect_slice<'a>(bs: &[u8], bytes: &'a [u8]) -> ParseResult<&'a [u8]> {
    if let Some(rest) = bytes.strip_prefix(bs) {
        return Ok(rest);
    }

    let n = bs.len().min(bytes.len());

    Err(ParseError::UnexpectedSlice {
        exp: String::from_utf8_lossy(bs).to_string(),
        got: String::from_utf8_lossy(&bytes[..n]).to_string(),
    })
}

/// Advance the slice until `P` is satisfied, without consuming the byte that satisfied it.
///
/// If `P` is never satisfied, the whole slice is taken. `None` means nothing was taken.
#[inline]
pub fn take_until_fn<P>(p: P, bytes: &[u8]) -> (Option<&[u8]>, &[u8])
where
    P: Fn(u8) -> bool,
{
    let i = bytes.iter().position(|&b| p(b)).unwrap_or(bytes.len());

    if i == 0 {
        return (None, bytes);
    }

    let (res, bytes) = bytes.split_at(i);

    (Some(res), bytes)
}

/// Advance the slice up to byte `b`, and consume `b` without adding it to the output.
pub fn take_with(b: u8, bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let (res, bytes) = take_until_fn(|a| a == b, bytes);

    match take_1(bytes) {
        (Some(a), rest) if a == b => (res, rest),
        _ => (res, bytes),
    }
}

/// Takes the longest run of ascii digits. The run may be empty.
pub fn take_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
    let (digits, bytes) = take_until_fn(|b| !b.is_ascii_digit(), bytes);

    (digits.unwrap_or_default(), bytes)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Expected a number, found nothing")]
    Empty,

    #[error("Failed to convert \"{str}\"")]
    ParseError { str: String },
}

/// Converts `&[u8]` to `T` if `T: FromStr`.
pub fn convert<T: FromStr>(bytes: &[u8]) -> Result<T, ConvertError> {
    if bytes.is_empty() {
        return Err(ConvertError::Empty);
    }

    let str = String::from_utf8_lossy(bytes);

    str.parse::<T>().map_err(|_| ConvertError::ParseError {
        str: str.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_take_ws_full_ws() {
        let bytes = b"  ";

        let res = super::take_ws(bytes);

        assert_eq!(res, b"")
    }

    #[test]
    fn test_take_blank_stops_at_newline() {
        assert_eq!(super::take_blank(b" \t\nx"), b"\nx");
    }

    #[test]
    fn test_take_with_consumes_delimiter() {
        let (res, rest) = super::take_with(b'\n', b"name\nrest");
        assert_eq!(res, Some(b"name".as_slice()));
        assert_eq!(rest, b"rest");

        let (res, rest) = super::take_with(b'\n', b"no newline");
        assert_eq!(res, Some(b"no newline".as_slice()));
        assert_eq!(rest, b"");

        let (res, rest) = super::take_with(b'\n', b"\nempty");
        assert_eq!(res, None);
        assert_eq!(rest, b"empty");
    }

    #[test]
    fn test_take_digits() {
        assert_eq!(super::take_digits(b"23/3"), (b"23".as_slice(), b"/3".as_slice()));
        assert_eq!(super::take_digits(b"/3"), (b"".as_slice(), b"/3".as_slice()));
    }

    #[test]
    fn test_convert() {
        assert_eq!(super::convert::<u64>(b"42"), Ok(42));
        assert!(super::convert::<u64>(b"4x2").is_err());
        assert!(super::convert::<u64>(b"").is_err());
    }
}
