use super::ctl::{self, CtlCommand};
use super::{SurfaceError, SurfaceProvider};

/// Half open char range `[start, end)` in a window body.
pub type Range = (usize, usize);

/// An editor window driven the way a client drives a file-server window:
/// positions go to `addr`, verbs to `ctl`, text to `data`.
#[derive(Debug)]
pub struct Window {
    id: usize,
    name: String,
    body: Vec<char>,
    addr: Range,
    dot: Range,
    dirty: bool,
    visible: bool,
    deleted: bool,
}

impl Window {
    fn new(id: usize) -> Self {
        Self {
            id,
            name: String::new(),
            body: Vec::new(),
            addr: (0, 0),
            dot: (0, 0),
            dirty: false,
            visible: false,
            deleted: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> String {
        self.body.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn dot(&self) -> Range {
        self.dot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Zero-based line holding char `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.body.len());
        self.body[..end].iter().filter(|&&c| c == '\n').count()
    }

    fn check_open(&self) -> Result<(), SurfaceError> {
        if self.deleted {
            Err(SurfaceError::Closed(self.id))
        } else {
            Ok(())
        }
    }

    fn resolve(&self, offset: usize) -> Result<Range, SurfaceError> {
        let len = self.body.len();
        if offset <= len {
            Ok((offset, offset))
        } else {
            Err(SurfaceError::AddressOutOfRange { offset, len })
        }
    }

    /// Sets the `addr` register from an address expression.
    pub fn write_addr(&mut self, message: &str) -> Result<(), SurfaceError> {
        self.check_open()?;
        let offset = ctl::parse_address(message)?;
        self.addr = self.resolve(offset)?;
        Ok(())
    }

    pub fn ctl(&mut self, message: &str) -> Result<(), SurfaceError> {
        self.check_open()?;
        let command = ctl::parse_ctl(message)?;
        log::debug!("window {}: {:?}", self.id, command);

        match command {
            CtlCommand::Name(name) => self.name = name,
            CtlCommand::Clean => self.dirty = false,
            CtlCommand::Show => self.visible = true,
            CtlCommand::DotEqAddr => self.dot = self.addr,
            CtlCommand::Del if self.dirty => return Err(SurfaceError::UnsavedChanges),
            CtlCommand::Del | CtlCommand::Delete => {
                self.deleted = true;
                self.visible = false;
            }
        }
        Ok(())
    }

    /// Replaces the `addr` range with `text` and leaves `addr` just after it.
    pub fn write_data(&mut self, text: &str) -> Result<usize, SurfaceError> {
        self.check_open()?;
        let (start, end) = self.addr;
        let written = text.chars().count();
        self.body.splice(start..end, text.chars());

        self.addr = (start + written, start + written);
        if written > 0 || end > start {
            self.dirty = true;
        }
        Ok(written)
    }
}

/// Opens numbered windows.
#[derive(Debug, Default)]
pub struct WindowService {
    next_id: usize,
}

impl WindowService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SurfaceProvider for WindowService {
    type Surface = Window;

    fn open(&mut self) -> Result<Window, SurfaceError> {
        self.next_id += 1;
        log::debug!("opening window {}", self.next_id);
        Ok(Window::new(self.next_id))
    }
}
