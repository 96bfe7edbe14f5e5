use std::io::{self, ErrorKind, Read};

use thiserror::Error;

use crate::config::DumpConfig;

/// One fixed-capacity slice of the source, tagged with the address of its first byte.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LineRecord {
    pub address: u64,
    /// Always `bytes_per_line` long; everything past `valid_len` is zero.
    pub bytes: Vec<u8>,
    pub valid_len: usize,
}

impl LineRecord {
    pub fn valid_bytes(&self) -> &[u8] {
        &self.bytes[..self.valid_len]
    }

    pub fn is_full(&self) -> bool {
        self.valid_len == self.bytes.len()
    }
}

pub type Dump = Vec<LineRecord>;

/// A read fault part way through the source. `lines` holds what was chunked before it.
#[derive(Debug, Error)]
#[error("read failed after {} lines", .lines.len())]
pub struct ChunkError {
    pub lines: Dump,
    #[source]
    pub source: io::Error,
}

/// Reads `s` to the end, `bytes_per_line` bytes at a time.
pub fn chunk<R: Read>(mut s: R, config: &DumpConfig) -> Result<Dump, ChunkError> {
    let width = config.bytes_per_line();
    let mut lines = Vec::new();
    let mut address = 0u64;

    loop {
        let mut bytes = vec![0u8; width];
        let filled = fill(&mut s, &mut bytes);

        let valid_len = match filled {
            Ok(n) => n,
            Err((n, source)) => {
                if n > 0 {
                    lines.push(LineRecord {
                        address,
                        bytes,
                        valid_len: n,
                    });
                }
                log::warn!("read error at {:#x}: {}", address + n as u64, source);
                return Err(ChunkError { lines, source });
            }
        };

        // End of stream exactly on a line boundary
        if valid_len == 0 {
            break;
        }

        let line = LineRecord {
            address,
            bytes,
            valid_len,
        };
        let full = line.is_full();
        lines.push(line);

        if !full {
            break;
        }
        address += width as u64;
    }

    log::debug!("chunked {} lines of {} bytes", lines.len(), width);
    Ok(lines)
}

/// Like `read_exact`, but a short count at end of stream is not an error.
fn fill<R: Read>(s: &mut R, buf: &mut [u8]) -> Result<usize, (usize, io::Error)> {
    let mut n = 0;
    while n < buf.len() {
        match s.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(read) => n += read,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err((n, e)),
        }
    }
    Ok(n)
}
