//! The text surface the painter writes into.
//!
//! [`Surface`] is the only thing the painter knows about a display target.
//! [`Window`] is the in-process editor window behind it, driven through
//! its `addr`, `ctl` and `data` channels.

use thiserror::Error;

mod ctl;
mod window;

pub use window::{Window, WindowService};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("window {0} is closed")]
    Closed(usize),

    #[error("malformed {channel} message {message:?}: {reason}")]
    Protocol {
        channel: &'static str,
        message: String,
        reason: String,
    },

    #[error("address {offset} out of range (window holds {len} chars)")]
    AddressOutOfRange { offset: usize, len: usize },

    #[error("window has unsaved changes")]
    UnsavedChanges,
}

/// Positional text target. Offsets count chars from the start of the body.
pub trait Surface {
    fn set_name(&mut self, name: &str) -> Result<(), SurfaceError>;

    /// Selects the empty range at `offset`.
    fn select_offset(&mut self, offset: usize) -> Result<(), SurfaceError>;

    /// Inserts `text` at the selection and returns how many chars were written.
    fn insert_at_selection(&mut self, text: &str) -> Result<usize, SurfaceError>;

    fn mark_clean(&mut self) -> Result<(), SurfaceError>;

    fn show(&mut self) -> Result<(), SurfaceError>;

    /// Closes the surface. With `discard` any unsaved changes are dropped.
    fn close(&mut self, discard: bool) -> Result<(), SurfaceError>;
}

/// Hands out fresh surfaces, one per session.
pub trait SurfaceProvider {
    type Surface: Surface;

    fn open(&mut self) -> Result<Self::Surface, SurfaceError>;
}

impl Surface for Window {
    fn set_name(&mut self, name: &str) -> Result<(), SurfaceError> {
        self.ctl(&format!("name {}", name))
    }

    fn select_offset(&mut self, offset: usize) -> Result<(), SurfaceError> {
        self.write_addr(&format!("#{}", offset))?;
        self.ctl("dot=addr")
    }

    fn insert_at_selection(&mut self, text: &str) -> Result<usize, SurfaceError> {
        self.write_data(text)
    }

    fn mark_clean(&mut self) -> Result<(), SurfaceError> {
        self.ctl("clean")
    }

    fn show(&mut self) -> Result<(), SurfaceError> {
        self.ctl("show")
    }

    fn close(&mut self, discard: bool) -> Result<(), SurfaceError> {
        if discard {
            self.ctl("delete")
        } else {
            self.ctl("del")
        }
    }
}
