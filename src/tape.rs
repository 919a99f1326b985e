//! The interpreter's byte memory and its data pointer.

use std::fmt;

/// Which end of the tape a pointer move ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Moved left of cell 0.
    Low,
    /// Moved right past the last cell.
    High,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Low => write!(f, "too low"),
            Bound::High => write!(f, "too high"),
        }
    }
}

/// A fixed-length tape of zero-initialised `u8` cells with a single data pointer.
///
/// The pointer never wraps: a move past either end is refused and the
/// pointer stays where it was.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Tape {
    /// Create a tape with `len` zeroed cells and the pointer at cell 0.
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0; len],
            pointer: 0,
        }
    }

    /// Move the pointer one cell right, returning the new position.
    pub fn move_right(&mut self) -> Result<usize, Bound> {
        if self.pointer + 1 >= self.cells.len() {
            return Err(Bound::High);
        }
        self.pointer += 1;
        Ok(self.pointer)
    }

    /// Move the pointer one cell left, returning the new position.
    pub fn move_left(&mut self) -> Result<usize, Bound> {
        if self.pointer == 0 {
            return Err(Bound::Low);
        }
        self.pointer -= 1;
        Ok(self.pointer)
    }

    /// Add one to the current cell, wrapping 255 to 0.
    pub fn increment(&mut self) -> u8 {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
        *cell
    }

    /// Subtract one from the current cell, wrapping 0 to 255.
    pub fn decrement(&mut self) -> u8 {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
        *cell
    }

    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}
