mod coding;
mod memory;
#[cfg(test)]
mod random;
mod result;

pub use coding::*;
pub use memory::{default_memory, Block, Memory, MemoryRef, StdMemory, TrackingMemory};
#[cfg(test)]
pub use random::Random;
pub use result::{Code, Error, Result};
