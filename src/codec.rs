//! # Table Codec
//! Decodes the delimited on-disk format into a [`Table`] and re-encodes a
//! table back to that format, including the quoting and escaping rules for
//! cells that embed delimiters or the special characters `"` and `\`.
use crate::error::SpsError;
use crate::table::{Row, Table};

/// Why a cell's byte run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    /// An unquoted, unescaped delimiter byte ended the cell; more cells
    /// follow in this row.
    Delimiter,
    /// A line feed ended the cell and the row.
    Newline,
    /// End of input ended the cell and the row.
    Eof,
}

/// Decodes one cell starting at `data[*pos]`, advancing `*pos` past the
/// cell and its terminating delimiter/newline (but not past a terminating
/// EOF, which has nothing left to advance past).
///
/// A three-state machine — `CellStart` / `InCell` / `InQuoted` — with `\` as
/// a universal one-byte escape (the following byte is appended literally,
/// whatever it is) and `"` opening quoted mode only as the cell's very
/// first byte. A `"` anywhere else must be immediately followed by a
/// delimiter, newline, or EOF while quoted mode is active, or decoding
/// fails with [`SpsError::MalformedQuoting`] — a stray quote in the middle
/// of an unquoted cell is rejected outright rather than silently discarded.
fn decode_cell(data: &[u8], delimiters: &[u8], pos: &mut usize) -> Result<(Vec<u8>, Terminator), SpsError> {
    let mut out = Vec::new();
    let mut quoted = false;
    let mut first = true;
    let mut escape_pending = false;

    loop {
        let Some(&c) = data.get(*pos) else {
            return if quoted {
                Err(SpsError::MalformedQuoting)
            } else {
                Ok((out, Terminator::Eof))
            };
        };

        if c == b'\n' {
            return if quoted {
                Err(SpsError::MalformedQuoting)
            } else {
                *pos += 1;
                Ok((out, Terminator::Newline))
            };
        }
        if delimiters.contains(&c) && !quoted {
            *pos += 1;
            return Ok((out, Terminator::Delimiter));
        }

        *pos += 1;

        if c == b'"' && !escape_pending {
            if first {
                quoted = true;
            } else {
                let next = data.get(*pos).copied();
                let closes_here =
                    next.is_none() || next == Some(b'\n') || next.is_some_and(|n| delimiters.contains(&n));
                if quoted && closes_here {
                    quoted = false;
                } else {
                    return Err(SpsError::MalformedQuoting);
                }
            }
        } else if c == b'\\' && !escape_pending {
            escape_pending = true;
            first = false;
            continue;
        } else {
            out.push(c);
        }
        escape_pending = false;
        first = false;
    }
}

/// Decodes one full row (every cell up to and including the row's
/// terminating newline or EOF).
fn decode_row(data: &[u8], delimiters: &[u8], pos: &mut usize) -> Result<(Row, Terminator), SpsError> {
    let mut row = Row::new();
    loop {
        let (cell, term) = decode_cell(data, delimiters, pos)?;
        row.push(cell);
        match term {
            Terminator::Delimiter => continue,
            Terminator::Newline | Terminator::Eof => return Ok((row, term)),
        }
    }
}

/// Decodes an entire delimited table from `data`. An empty `data` decodes
/// to a zero-row table. After decoding, [`Table::align_row_sizes`] is
/// applied so the result satisfies the rectangularity invariant.
pub fn decode_table(data: &[u8], delimiters: &[u8]) -> Result<Table, SpsError> {
    let mut pos = 0;
    let mut rows = Vec::new();

    while pos < data.len() {
        let (row, term) = decode_row(data, delimiters, &mut pos)?;
        rows.push(row);
        if term == Terminator::Eof || pos >= data.len() {
            break;
        }
    }

    let mut table = Table::from_rows(rows);
    table.align_row_sizes();
    Ok(table)
}

/// Re-encodes `table` to the delimited text format. Trims trailing empty
/// columns first — a write-time cosmetic step, not part of the data model
/// itself. Each row is terminated by a single LF; there is no trailing
/// blank line.
pub fn encode_table(table: &mut Table, delimiters: &[u8]) -> Vec<u8> {
    table.trim_rows();
    let primary = delimiters[0];
    let mut out = Vec::new();

    for r in 1..=table.rows() {
        let row = table.row(r).expect("r is within 1..=rows()");
        for (j, cell) in row.iter().enumerate() {
            if j > 0 {
                out.push(primary);
            }
            let needs_quotes = cell.iter().any(|b| delimiters.contains(b));
            if needs_quotes {
                out.push(b'"');
            }
            for &b in cell {
                if b == b'"' || b == b'\\' {
                    out.push(b'\\');
                }
                out.push(b);
            }
            if needs_quotes {
                out.push(b'"');
            }
        }
        out.push(b'\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_decodes_to_zero_rows() {
        let t = decode_table(b"", b" ").unwrap();
        assert_eq!(t.rows(), 0);
    }

    #[test]
    fn decodes_quoted_cell_with_embedded_delimiter() {
        let t = decode_table(b"a:\"b:c\":d\n", b":").unwrap();
        assert_eq!(t.rows(), 1);
        assert_eq!(t.get_cell(1, 1), Some(b"a".as_slice()));
        assert_eq!(t.get_cell(1, 2), Some(b"b:c".as_slice()));
        assert_eq!(t.get_cell(1, 3), Some(b"d".as_slice()));
    }

    #[test]
    fn decodes_escapes_inside_and_outside_quotes() {
        let t = decode_table(b"x\\\\y:\"p\\\"q\"\n", b":").unwrap();
        assert_eq!(t.get_cell(1, 1), Some(b"x\\y".as_slice()));
        assert_eq!(t.get_cell(1, 2), Some(b"p\"q".as_slice()));
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let err = decode_table(b"\"abc\n", b" ").unwrap_err();
        assert!(matches!(err, SpsError::MalformedQuoting));
    }

    #[test]
    fn stray_quote_inside_unquoted_cell_is_malformed() {
        let err = decode_table(b"ab\"cd e\n", b" ").unwrap_err();
        assert!(matches!(err, SpsError::MalformedQuoting));
    }

    #[test]
    fn no_trailing_newline_still_forms_a_row() {
        let t = decode_table(b"a b", b" ").unwrap();
        assert_eq!(t.rows(), 1);
        assert_eq!(t.get_cell(1, 1), Some(b"a".as_slice()));
        assert_eq!(t.get_cell(1, 2), Some(b"b".as_slice()));
    }

    #[test]
    fn trailing_newline_does_not_create_an_empty_row() {
        let t = decode_table(b"a b\n", b" ").unwrap();
        assert_eq!(t.rows(), 1);
    }

    #[test]
    fn round_trip_with_no_commands_is_stable() {
        let mut t = decode_table(b"a:b:c\nd:e:f\n", b":").unwrap();
        let out = encode_table(&mut t, b":");
        assert_eq!(out, b"a:b:c\nd:e:f\n");
    }

    #[test]
    fn encode_escapes_specials_without_quoting_when_no_delimiter_present() {
        // Neither cell contains the delimiter `:`, so neither gets quote
        // borders — but `"` and `\` are still backslash-escaped in the
        // body regardless of whether the cell ends up quoted.
        let mut t = Table::new();
        t.insert_row(1).unwrap();
        t.insert_column(1).unwrap();
        t.insert_column(2).unwrap();
        t.set_cell(1, 1, b"x\\y");
        t.set_cell(1, 2, b"p\"q");
        let out = encode_table(&mut t, b":");
        assert_eq!(out, b"x\\\\y:p\\\"q\n".to_vec());
    }

    #[test]
    fn encode_quotes_cell_containing_delimiter() {
        let mut t = Table::new();
        t.insert_row(1).unwrap();
        t.insert_column(1).unwrap();
        t.set_cell(1, 1, b"b:c");
        let out = encode_table(&mut t, b":");
        assert_eq!(out, b"\"b:c\"\n".to_vec());
    }

    #[test]
    fn encode_trims_trailing_empty_columns() {
        let mut t = Table::new();
        t.insert_row(1).unwrap();
        t.insert_column(1).unwrap();
        t.insert_column(2).unwrap();
        t.set_cell(1, 1, b"x");
        let out = encode_table(&mut t, b" ");
        assert_eq!(out, b"x\n".to_vec());
    }
}
