//! Small building blocks shared by the pipeline modules

mod cached;
mod slot_allocator;

pub use cached::{Cached, Freshness};
pub use slot_allocator::SlotAllocator;
