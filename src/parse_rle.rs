use thiserror::Error;
use tracing::warn;

use crate::Coord;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::rule_set;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,
    pub author: Option<&'a [u8]>,

    /// `(row, column)` of the top-left corner of the pattern, from a `#P` or `#R` line.
    pub offset: Option<(Coord, Coord)>,

    /// `(rows, columns)` from the header line.
    pub size: Option<(Coord, Coord)>,

    pub set: RuleSet,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),

    #[error("Pattern does not fit a grid: {0}")]
    Grid(#[from] GridError),
}

/// Parse the RLE file format, calling `f` with the `(row, column)` of every live cell. Assumes the
/// bytes are valid Ascii.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle<F>(mut bytes: &'_ [u8], f: F) -> Result<RleFile<'_>, RleError>
where
    F: FnMut(Coord, Coord),
{
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        bytes = parse_util::take_ws(bytes);

        let (Some(line), rest) = read_line_comment(bytes)? else {
            break;
        };

        match line {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                file.author = Some(author);
            }
            RleCommentLine::Offset { x, y } => {
                if file.offset.is_some() {
                    warn!("RLE offset already defined. Using latest");
                }

                file.offset = Some((y, x))
            }
            RleCommentLine::RuleSet { set } => {
                file.set = set;
            }
        }

        bytes = rest;
    }

    // Parse header line, if it's present
    if let (Some(header), rest) = read_line_header(bytes)? {
        let RleHeaderLine { x, y, set } = header;

        file.size = Some((y, x));

        if let Some(set) = set {
            file.set = set;
        }

        bytes = rest;
    }

    let (dy, dx) = file.offset.unwrap_or_default();

    // Parse encoding
    read_encoding(bytes, dy, dx, f)?;

    Ok(file)
}

/// Read an RLE pattern into a [`Grid`].
///
/// The grid is sized from the header line, stretched if the pattern spills past it, and its origin
/// is the pattern's offset.
pub fn load_rle(bytes: &[u8]) -> Result<(Grid, RleFile<'_>), RleError> {
    let mut live = Vec::new();
    let file = read_rle(bytes, |row, column| live.push((row, column)))?;

    let (top, left) = file.offset.unwrap_or_default();
    let (mut rows, mut columns) = file.size.unwrap_or_default();

    // Cells never lie above or left of the offset
    let extent =
        |n: Coord, start: Coord| -> Option<Coord> { n.checked_sub(start)?.checked_add(1) };

    for &(row, column) in &live {
        let r = extent(row, top).ok_or(RleEncodingError::TooLarge)?;
        let c = extent(column, left).ok_or(RleEncodingError::TooLarge)?;

        rows = rows.max(r);
        columns = columns.max(c);
    }

    let mut grid = Grid::with_origin(rows, columns, (top, left))?;

    for (row, column) in live {
        grid.set(row, column, true)?;
    }

    Ok((grid, file))
}

enum RleCommentLine<'a> {
    Comment,
    Name { name: &'a [u8] },
    Author { author: &'a [u8] },
    Offset { x: Coord, y: Coord },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid coordinates: {0}")]
    InvalidCoord(#[from] RleCoordError),

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(
    bytes: &'_ [u8],
) -> Result<(Option<RleCommentLine<'_>>, &'_ [u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    match b {
        // Comment line
        b'C' | b'c' => {
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::Comment), bytes))
        }

        // Pattern name
        b'N' => {
            let (name, bytes) = read_text(bytes);
            let name = name.ok_or(RleCommentLineError::EmptyName)?;

            Ok((Some(RleCommentLine::Name { name }), bytes))
        }

        // Pattern author
        b'O' => {
            let (author, bytes) = read_text(bytes);
            let author = author.ok_or(RleCommentLineError::EmptyAuthor)?;

            Ok((Some(RleCommentLine::Author { author }), bytes))
        }

        // Pattern offset
        b'R' | b'P' => {
            let bytes = parse_util::take_blank(bytes);
            let ((x, y), bytes) = read_offset(bytes)?;
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::Offset { x, y }), bytes))
        }

        // Pattern rules
        b'r' => {
            let bytes = parse_util::take_blank(bytes);
            let (set, bytes) = rule_set::parse_nameless_rule(bytes)?;
            let (_, bytes) = parse_util::take_with(b'\n', bytes);

            Ok((Some(RleCommentLine::RuleSet { set }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

/// The rest of a line, without surrounding blanks. `None` if nothing is left.
fn read_text(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let bytes = parse_util::take_blank(bytes);
    let (text, bytes) = parse_util::take_with(b'\n', bytes);

    let text = text.map(<[u8]>::trim_ascii_end).filter(|t| !t.is_empty());

    (text, bytes)
}

struct RleHeaderLine {
    x: Coord,
    y: Coord,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid size: {0}")]
    Size(#[from] RleCoordError),

    #[error("Invalid token: expected ',' or end of line, found '{got}'")]
    InvalidToken { got: char },

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}

/// Attempt to parse a header line, otherwise leaves `bytes` as-is.
fn read_line_header(bytes: &[u8]) -> Result<(Option<RleHeaderLine>, &[u8]), RleHeaderLineError> {
    if parse_util::peek_1(bytes) != Some(b'x') {
        return Ok((None, bytes));
    }

    let ((x, y), bytes) = read_coordinates(bytes)?;
    let bytes = parse_util::take_blank(bytes);

    let (set, bytes) = match parse_util::take_1(bytes) {
        (Some(b','), bytes) => {
            let bytes = parse_util::take_blank(bytes);
            let bytes = parse_util::expect_slice(b"rule", bytes)?;
            let bytes = parse_util::take_blank(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_blank(bytes);

            // Both `B3/S23` and the older `23/3` show up in the wild
            let (set, bytes) = match parse_util::peek_1(bytes) {
                Some(b) if b.is_ascii_digit() => rule_set::parse_nameless_rule(bytes)?,
                _ => rule_set::parse_rule(bytes)?,
            };

            (Some(set), bytes)
        }
        _ => (None, bytes),
    };

    let bytes = parse_util::take_blank(bytes);

    let bytes = match parse_util::take_1(bytes) {
        (None, bytes) | (Some(b'\r' | b'\n'), bytes) => bytes,
        (Some(b), _) => return Err(RleHeaderLineError::InvalidToken { got: b as char }),
    };

    Ok((Some(RleHeaderLine { x, y, set }), bytes))
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF, the pattern must end with '!'")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Run length cannot be cut off by a new line")]
    SplitRunCount,

    #[error("Pattern is too large")]
    TooLarge,

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },
}

fn read_encoding<F>(
    mut bytes: &[u8],
    dy: Coord,
    dx: Coord,
    mut f: F,
) -> Result<(), RleEncodingError>
where
    F: FnMut(Coord, Coord),
{
    let mut rep: Coord = 1;

    let (mut row, mut column): (Coord, Coord) = (0, 0);

    loop {
        let (digits, rest) = parse_util::take_digits(bytes);
        if !digits.is_empty() {
            if let Some(b'\r' | b'\n') = parse_util::peek_1(rest) {
                return Err(RleEncodingError::SplitRunCount);
            }

            rep = parse_util::convert(digits)?;
            bytes = rest;

            continue;
        }

        let (Some(b), rest) = parse_util::take_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };
        bytes = rest;

        match b {
            // End of input
            b'!' => break,

            b if b.is_ascii_whitespace() => {}

            // Dead cell
            b'b' => {
                column = column.checked_add(rep).ok_or(RleEncodingError::TooLarge)?;

                rep = 1;
            }

            // Live cell
            b'o' => {
                let end = column.checked_add(rep).ok_or(RleEncodingError::TooLarge)?;

                let y = dy.checked_add(row).ok_or(RleEncodingError::TooLarge)?;
                let from = dx.checked_add(column).ok_or(RleEncodingError::TooLarge)?;
                let to = dx.checked_add(end).ok_or(RleEncodingError::TooLarge)?;

                for x in from..to {
                    f(y, x)
                }

                column = end;

                rep = 1;
            }

            // End of line
            b'$' => {
                row = row.checked_add(rep).ok_or(RleEncodingError::TooLarge)?;
                column = 0;

                rep = 1;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected x coordinate, found end of input")]
    NoX,

    #[error("Failed to parse x coordinate: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y coordinate, found end of input")]
    NoY,

    #[error("Failed to parse y coordinate: {0}")]
    ParseY(#[source] ConvertError),
}

/// Reads `x = 3, y = 4`
fn read_coordinates(bytes: &[u8]) -> Result<((Coord, Coord), &[u8]), RleCoordError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_blank(bytes);

    let (Some(x), bytes) = take_signed(bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x = parse_util::convert(x).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b',', bytes)?;
    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_blank(bytes);

    let (Some(y), bytes) = take_signed(bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y = parse_util::convert(y).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

/// Reads `-1 3`, as found on `#P` lines
fn read_offset(bytes: &[u8]) -> Result<((Coord, Coord), &[u8]), RleCoordError> {
    let (Some(x), bytes) = take_signed(bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x = parse_util::convert(x).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_blank(bytes);

    let (Some(y), bytes) = take_signed(bytes) else {
        return Err(RleCoordError::NoY);
    };
    let y = parse_util::convert(y).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

/// Takes an optionally negative run of digits.
fn take_signed(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let sign = usize::from(parse_util::peek_1(bytes) == Some(b'-'));
    let (digits, _) = parse_util::take_digits(&bytes[sign..]);

    if digits.is_empty() {
        return (None, bytes);
    }

    let (n, bytes) = bytes.split_at(sign + digits.len());

    (Some(n), bytes)
}
