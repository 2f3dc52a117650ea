/// Allocates and recycles `u32` identifiers inside a half-open range.
///
/// Named render target IDs are handed out from a reserved range so they
/// never collide with the predefined targets. Released IDs are reused
/// before the range is advanced.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::with_range(64, 128);
/// let a = alloc.alloc();  // Some(64)
/// let b = alloc.alloc();  // Some(65)
/// alloc.free(64);
/// let c = alloc.alloc();  // Some(64) (recycled)
/// ```
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    free_list: Vec<u32>,
    start: u32,
    next_id: u32,
    end: u32,
    len: u32,
}

impl SlotAllocator {
    /// Create an allocator over `[start, end)`
    pub fn with_range(start: u32, end: u32) -> Self {
        Self {
            free_list: Vec::new(),
            start,
            next_id: start,
            end: end.max(start),
            len: 0,
        }
    }

    /// Allocate the next available ID, `None` once the range is exhausted
    pub fn alloc(&mut self) -> Option<u32> {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None if self.next_id < self.end => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            None => return None,
        };
        self.len += 1;
        Some(id)
    }

    /// Return an ID to the pool
    ///
    /// IDs never handed out by this allocator are ignored.
    pub fn free(&mut self, id: u32) -> bool {
        if id < self.start || id >= self.next_id || self.free_list.contains(&id) || self.len == 0 {
            return false;
        }
        self.len -= 1;
        self.free_list.push(id);
        true
    }

    /// Number of IDs currently handed out
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
