//! Array heap: fixed-length integer arrays addressed by opaque handles.
//!
//! References are `1..=n` (table index + 1), so the zero value of a fresh
//! local slot never denotes a live array. Arrays live until the session
//! ends; there is no collection.

use crate::error::FaultKind;

/// Heap of fixed-length `i32` arrays. All bounds checks happen here.
#[derive(Debug, Clone, Default)]
pub struct ArrayHeap {
    arrays: Vec<Box<[i32]>>,
    cells: usize,
    max_cells: usize,
}

impl ArrayHeap {
    /// Create an empty heap that may hold at most `max_cells` elements.
    pub fn new(max_cells: usize) -> Self {
        Self {
            arrays: Vec::new(),
            cells: 0,
            max_cells,
        }
    }

    /// Allocate a zero-initialized array and return its reference.
    pub fn allocate(&mut self, length: i32) -> Result<i32, FaultKind> {
        if length < 0 {
            return Err(FaultKind::NegativeArraySize { length });
        }
        let length = length as usize;

        let exhausted = FaultKind::HeapExhausted {
            requested: length,
            limit: self.max_cells,
        };
        let Some(cells) = self.cells.checked_add(length).filter(|&n| n <= self.max_cells) else {
            return Err(exhausted);
        };
        let reference = i32::try_from(self.arrays.len() + 1).map_err(|_| exhausted)?;

        self.arrays.push(vec![0; length].into_boxed_slice());
        self.cells = cells;
        Ok(reference)
    }

    /// Read element `index` of the array `reference`.
    pub fn load(&self, reference: i32, index: i32) -> Result<i32, FaultKind> {
        let array = self.array(reference)?;
        let i = check_index(index, array.len())?;
        Ok(array[i])
    }

    /// Write element `index` of the array `reference`.
    pub fn store(&mut self, reference: i32, index: i32, value: i32) -> Result<(), FaultKind> {
        let array = self.array_mut(reference)?;
        let i = check_index(index, array.len())?;
        array[i] = value;
        Ok(())
    }

    /// Length of the array `reference`.
    pub fn length(&self, reference: i32) -> Result<i32, FaultKind> {
        // Lengths originate from an i32 in `allocate`.
        Ok(self.array(reference)?.len() as i32)
    }

    /// Contents of the array `reference`.
    pub fn elements(&self, reference: i32) -> Result<&[i32], FaultKind> {
        self.array(reference)
    }

    /// Number of arrays allocated so far.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Total elements across all arrays.
    pub fn cells(&self) -> usize {
        self.cells
    }

    fn slot(reference: i32) -> Option<usize> {
        usize::try_from(reference).ok()?.checked_sub(1)
    }

    fn array(&self, reference: i32) -> Result<&[i32], FaultKind> {
        Self::slot(reference)
            .and_then(|i| self.arrays.get(i))
            .map(|a| &a[..])
            .ok_or(FaultKind::NullReference { reference })
    }

    fn array_mut(&mut self, reference: i32) -> Result<&mut [i32], FaultKind> {
        Self::slot(reference)
            .and_then(|i| self.arrays.get_mut(i))
            .map(|a| &mut a[..])
            .ok_or(FaultKind::NullReference { reference })
    }
}

fn check_index(index: i32, length: usize) -> Result<usize, FaultKind> {
    match usize::try_from(index) {
        Ok(i) if i < length => Ok(i),
        _ => Err(FaultKind::IndexOutOfBounds { index, length }),
    }
}
