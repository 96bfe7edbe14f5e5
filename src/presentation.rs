use std::fmt::Write;

use crate::chunker::LineRecord;
use crate::config::{DumpConfig, ZeroStyle};

const ADDRESS_WIDTH: usize = 8;
const GROUP_SIZE: usize = 4;

/// Number of chars every formatted line occupies for a given width.
///
/// A group separator precedes every fourth byte starting with the first, so
/// there are `ceil(n / 4)` of them. This deliberately departs from the
/// `8 + 2 + 3n + floor(n / 4) + n + 1` formula the layout is usually quoted
/// with: both agree when `n` is a multiple of four, but the floor version
/// undercounts the last short group and would push every later line off its
/// paint offset. Do not change it back.
pub fn line_len(nbytes_per_row: usize) -> usize {
    let groups = (nbytes_per_row + GROUP_SIZE - 1) / GROUP_SIZE;
    ADDRESS_WIDTH + 2 + nbytes_per_row * 3 + groups + nbytes_per_row + 1
}

fn is_printable(byte: u8) -> bool {
    byte.is_ascii_graphic() || byte == b' '
}

/// Renders one line as `address  hex-groups  ascii\n`.
///
/// Every byte slot of the hex column is always written, so the result is
/// `line_len` chars long whatever `valid_len` is. Zero bytes come out blank;
/// with `ZeroStyle::Strict` only the padding past `valid_len` does.
pub fn format_line(line: &LineRecord, config: &DumpConfig) -> String {
    let nbytes_per_row = config.bytes_per_line();
    let mut output = String::with_capacity(line_len(nbytes_per_row));

    // Writing into a String cannot fail
    let _ = write!(output, "{:08x} ", line.address);

    for i in 0..nbytes_per_row {
        if i % GROUP_SIZE == 0 {
            output.push(' ');
        }

        let byte = line.bytes.get(i).copied().unwrap_or(0);
        let blank = byte == 0
            && (config.zero_style() == ZeroStyle::Blank || i >= line.valid_len);
        if blank {
            output.push_str("  ");
        } else {
            let _ = write!(output, "{:02x}", byte);
        }
        output.push(' ');
    }
    output.push(' ');

    let valid = line.valid_bytes();
    for &byte in valid {
        output.push(if is_printable(byte) { char::from(byte) } else { '.' });
    }
    for _ in valid.len()..nbytes_per_row {
        output.push(' ');
    }
    output.push('\n');

    output
}
