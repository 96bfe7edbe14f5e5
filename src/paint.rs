use crate::chunker::LineRecord;
use crate::config::DumpConfig;
use crate::presentation::{format_line, line_len};
use crate::surface::{Surface, SurfaceError};

/// Char offset where the next line goes. Only ever moves forward.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct PaintCursor {
    offset: usize,
}

impl PaintCursor {
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn advance(&mut self, n: usize) {
        self.offset += n;
    }
}

/// Paints `lines` into an empty `surface`, one insertion per line, then marks
/// it clean, moves the selection to the top and shows it.
///
/// Stops at the first surface error. Nothing is retried or rolled back; the
/// caller owns cleanup of the surface.
pub fn paint<S: Surface + ?Sized>(
    surface: &mut S,
    lines: &[LineRecord],
    config: &DumpConfig,
) -> Result<PaintCursor, SurfaceError> {
    let step = line_len(config.bytes_per_line());
    let mut cursor = PaintCursor::default();

    for line in lines {
        surface.select_offset(cursor.offset())?;
        let text = format_line(line, config);
        let written = surface.insert_at_selection(&text)?;
        if written != step {
            log::warn!(
                "line at {:08x}: surface took {} chars, expected {}",
                line.address,
                written,
                step
            );
        }
        cursor.advance(step);
    }
    log::debug!("painted {} lines, {} chars", lines.len(), cursor.offset());

    surface.mark_clean()?;
    surface.select_offset(0)?;
    surface.show()?;

    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk;
    use crate::surface::{SurfaceProvider, WindowService};
    use std::io::Cursor;

    #[derive(Debug, PartialEq, Eq, Clone)]
    enum Call {
        Select(usize),
        Insert(usize, String),
        Clean,
        Show,
    }

    /// Records what the painter asked for and where it landed.
    #[derive(Debug, Default)]
    struct Recorder {
        selection: usize,
        calls: Vec<Call>,
        fail_on_insert: Option<usize>,
    }

    impl Surface for Recorder {
        fn set_name(&mut self, _name: &str) -> Result<(), SurfaceError> {
            Ok(())
        }

        fn select_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
            self.selection = offset;
            self.calls.push(Call::Select(offset));
            Ok(())
        }

        fn insert_at_selection(&mut self, text: &str) -> Result<usize, SurfaceError> {
            let inserts = self
                .calls
                .iter()
                .filter(|c| matches!(c, Call::Insert(..)))
                .count();
            if self.fail_on_insert == Some(inserts) {
                return Err(SurfaceError::Closed(0));
            }
            self.calls.push(Call::Insert(self.selection, text.to_string()));
            Ok(text.chars().count())
        }

        fn mark_clean(&mut self) -> Result<(), SurfaceError> {
            self.calls.push(Call::Clean);
            Ok(())
        }

        fn show(&mut self) -> Result<(), SurfaceError> {
            self.calls.push(Call::Show);
            Ok(())
        }

        fn close(&mut self, _discard: bool) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    fn dump(len: usize, width: usize) -> (Vec<LineRecord>, DumpConfig) {
        let config = DumpConfig::new(width).unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        (chunk(Cursor::new(data), &config).unwrap(), config)
    }

    #[test]
    fn test_lines_land_at_sequential_offsets() {
        let (lines, config) = dump(40, 16);
        let mut surface = Recorder::default();
        let cursor = paint(&mut surface, &lines, &config).unwrap();

        let step = line_len(16);
        let inserts: Vec<usize> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Insert(at, _) => Some(*at),
                _ => None,
            })
            .collect();

        assert_eq!(inserts, vec![0, step, 2 * step]);
        assert_eq!(cursor.offset(), 3 * step);
    }

    #[test]
    fn test_finalizes_once() {
        let (lines, config) = dump(20, 8);
        let mut surface = Recorder::default();
        paint(&mut surface, &lines, &config).unwrap();

        let tail = &surface.calls[surface.calls.len() - 3..];
        assert_eq!(tail, &[Call::Clean, Call::Select(0), Call::Show]);
        assert_eq!(
            surface.calls.iter().filter(|c| **c == Call::Show).count(),
            1
        );
    }

    #[test]
    fn test_surface_error_aborts() {
        let (lines, config) = dump(64, 16);
        let mut surface = Recorder {
            fail_on_insert: Some(2),
            ..Recorder::default()
        };

        assert_eq!(
            paint(&mut surface, &lines, &config),
            Err(SurfaceError::Closed(0))
        );
        assert!(!surface.calls.contains(&Call::Clean));
        assert!(!surface.calls.contains(&Call::Show));
    }

    #[test]
    fn test_empty_dump_only_finalizes() {
        let config = DumpConfig::default();
        let mut surface = Recorder::default();
        let cursor = paint(&mut surface, &[], &config).unwrap();

        assert_eq!(cursor.offset(), 0);
        assert_eq!(surface.calls, vec![Call::Clean, Call::Select(0), Call::Show]);
    }

    #[test]
    fn test_window_body_is_concatenated_lines() {
        let (lines, config) = dump(37, 16);
        let mut window = WindowService::new().open().unwrap();
        let cursor = paint(&mut window, &lines, &config).unwrap();

        let expected: String = lines.iter().map(|l| format_line(l, &config)).collect();
        assert_eq!(window.text(), expected);
        assert_eq!(window.len(), cursor.offset());
        assert_eq!(window.dot(), (0, 0));
        assert!(!window.is_dirty());
        assert!(window.is_visible());
    }

    #[test]
    fn test_painting_twice_overlaps() {
        let (lines, config) = dump(32, 16);
        let mut window = WindowService::new().open().unwrap();
        paint(&mut window, &lines, &config).unwrap();
        let once = window.text();
        paint(&mut window, &lines, &config).unwrap();

        // The second pass restarts at offset 0 and lands in front of the first
        assert_ne!(window.text(), once);
        assert_eq!(window.len(), 2 * once.chars().count());
    }
}
