//! Observation stacking.
//!
//! Keeps the last `stacks` frames of a fixed-size observation in a ring
//! and emits them concatenated oldest first, giving a memoryless policy
//! a short history.

use floe_core::SensorError;

/// Ring of the most recent observation frames.
///
/// # Examples
///
/// ```
/// use floe_perception::StackedObservations;
///
/// let mut stack = StackedObservations::new(2, 3);
/// stack.push(&[1.0, 2.0]).unwrap();
/// stack.push(&[3.0, 4.0]).unwrap();
///
/// let mut out = vec![0.0; 6];
/// stack.write_to(&mut out, 0).unwrap();
/// assert_eq!(out, vec![0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StackedObservations {
    frame_len: usize,
    stacks: usize,
    data: Vec<f32>,
    newest: usize,
}

impl StackedObservations {
    /// Zero-filled ring of `stacks` frames of `frame_len` values.
    ///
    /// `stacks` is clamped to at least 1.
    pub fn new(frame_len: usize, stacks: usize) -> Self {
        let stacks = stacks.max(1);
        Self {
            frame_len,
            stacks,
            data: vec![0.0; frame_len * stacks],
            newest: stacks - 1,
        }
    }

    /// Values per frame.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Number of frames kept.
    pub fn stacks(&self) -> usize {
        self.stacks
    }

    /// Length of the stacked output.
    pub fn output_len(&self) -> usize {
        self.data.len()
    }

    /// Appends a frame, evicting the oldest.
    ///
    /// # Errors
    ///
    /// [`SensorError::ShapeMismatch`] if `frame.len() != frame_len()`.
    pub fn push(&mut self, frame: &[f32]) -> Result<(), SensorError> {
        if frame.len() != self.frame_len {
            return Err(SensorError::ShapeMismatch {
                expected: self.frame_len,
                written: frame.len(),
            });
        }
        self.newest = (self.newest + 1) % self.stacks;
        let start = self.newest * self.frame_len;
        self.data[start..start + self.frame_len].copy_from_slice(frame);
        Ok(())
    }

    /// Writes all frames, oldest first, into `buffer[offset..]`.
    ///
    /// # Errors
    ///
    /// [`SensorError::BufferTooSmall`] if the stacked output does not fit.
    pub fn write_to(&self, buffer: &mut [f32], offset: usize) -> Result<usize, SensorError> {
        let required = offset + self.output_len();
        if buffer.len() < required {
            return Err(SensorError::BufferTooSmall {
                required,
                available: buffer.len(),
            });
        }
        let target = &mut buffer[offset..required];
        if self.frame_len == 0 {
            return Ok(0);
        }
        for (i, chunk) in target.chunks_exact_mut(self.frame_len).enumerate() {
            let slot = (self.newest + 1 + i) % self.stacks;
            let start = slot * self.frame_len;
            chunk.copy_from_slice(&self.data[start..start + self.frame_len]);
        }
        Ok(self.output_len())
    }

    /// Zero-fills every frame.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.newest = self.stacks - 1;
    }
}
