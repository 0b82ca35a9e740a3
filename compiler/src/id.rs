// id.rs — Sequence numbers for definition table entries
//
// Every entry (built-in, user-declared, or synthesized) receives a sequence
// number in creation order. Output order is ascending sequence number, so
// allocation order is what makes expansion deterministic.

/// Creation-order position of a definition table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeqNo(pub u32);

/// Allocator for sequence numbers. Owned by one table; never shared.
#[derive(Debug, Default)]
pub struct SeqAllocator {
    next: u32,
}

impl SeqAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> SeqNo {
        let id = SeqNo(self.next);
        self.next += 1;
        id
    }

    /// Number of sequence numbers handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}
