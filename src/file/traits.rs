//! Frame file writer interface.

use std::path::Path;

use super::FileOpenMode;
use crate::ndarray::ArrayFrame;
use crate::util::Result;

/// A file format that stores a stream of array frames.
///
/// One open/write/close cycle produces one file. Calls for a session must be
/// made in sequence from a single thread.
pub trait FrameFileWriter: Send {
    /// Open `path` and define its structure from `frame`.
    ///
    /// The frame's data is not written.
    fn open(&mut self, path: &Path, mode: FileOpenMode, frame: &ArrayFrame) -> Result<()>;

    /// Append one frame as the next record.
    fn write(&mut self, frame: &ArrayFrame) -> Result<()>;

    /// Read the next frame from the open file.
    fn read(&mut self) -> Result<ArrayFrame>;

    /// Finalize and close the open file.
    fn close(&mut self) -> Result<()>;

    /// Whether more than one frame can be stored in one file.
    fn supports_multiple_arrays(&self) -> bool;

    /// Whether a file is currently open.
    fn is_open(&self) -> bool;
}
