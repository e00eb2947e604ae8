//! Walk position tracking for the write path
//!
//! The walker pushes one frame per step down the document and pops it on the
//! way back up. From the frames the stack derives what a new row needs:
//! the index-free [`NestingPath`] of its doc part, its `seq` and the id of
//! its parent row.

use tessera_core::{Error, NestingPath, Result, RowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Field,
    Array { adds_level: bool },
    Index(u32),
    Row(RowId),
}

/// Depth-first position inside one document
#[derive(Debug, Default)]
pub struct PathStack {
    path: NestingPath,
    frames: Vec<Frame>,
}

impl PathStack {
    /// Stack positioned at the root document
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a named field
    pub fn push_field(&mut self, name: &str) {
        self.path.push_field(name);
        self.frames.push(Frame::Field);
    }

    /// Enter an array
    ///
    /// Adds an array level to the path only when the array is itself an
    /// element of another array; under a named field the field segment
    /// already identifies the doc part.
    pub fn push_array(&mut self) {
        let adds_level = matches!(
            self.frames.iter().rev().find(|f| !matches!(f, Frame::Row(_))),
            Some(Frame::Index(_))
        );
        if adds_level {
            self.path.push_array_level();
        }
        self.frames.push(Frame::Array { adds_level });
    }

    /// Enter an array element
    pub fn push_index(&mut self, index: u32) {
        self.frames.push(Frame::Index(index));
    }

    /// Enter the context of an allocated row
    pub fn push_row(&mut self, rid: RowId) {
        self.frames.push(Frame::Row(rid));
    }

    /// Leave the innermost frame
    ///
    /// # Errors
    ///
    /// Popping an empty stack is an `InvariantViolation`: push and pop must
    /// stay balanced with the walk.
    pub fn pop(&mut self) -> Result<()> {
        match self.frames.pop() {
            Some(Frame::Field) | Some(Frame::Array { adds_level: true }) => {
                self.path.pop();
                Ok(())
            }
            Some(_) => Ok(()),
            None => Err(Error::invariant("path stack popped past the root")),
        }
    }

    /// Doc part path at the current position
    pub fn path(&self) -> &NestingPath {
        &self.path
    }

    /// Array index of the innermost frame, if it is an array element
    pub fn seq(&self) -> Option<u32> {
        match self.frames.last() {
            Some(Frame::Index(i)) => Some(*i),
            _ => None,
        }
    }

    /// Id of the nearest enclosing row (None at the root document)
    pub fn parent_rid(&self) -> Option<RowId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Row(rid) => Some(*rid),
            _ => None,
        })
    }

    /// Whether every push has been popped
    pub fn is_balanced(&self) -> bool {
        self.frames.is_empty() && self.path.is_root()
    }

    /// Number of open frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is open
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
