//! Stack memory for the cloned child.

/// Fixed-size block used as the child's initial stack.
///
/// Owned by the launcher for the whole life of the child and released when
/// the launcher returns. The child runs on its own copy-on-write view of it,
/// so neither process observes the other's writes.
pub struct ChildStack(Box<[u8]>);

impl ChildStack {
    /// Reserves a zeroed stack of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self(vec![0; size].into_boxed_slice())
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the stack has zero size.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mutable view handed to `clone(2)`.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl std::fmt::Debug for ChildStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildStack").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_has_requested_size() {
        let mut stack = ChildStack::new(nslaunch_common::constants::CHILD_STACK_SIZE);
        assert_eq!(stack.len(), 1024 * 1024);
        assert_eq!(stack.as_mut_slice().len(), 1024 * 1024);
        assert!(!stack.is_empty());
    }
}
