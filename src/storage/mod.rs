//! Storage collaborators: the traits the lifecycle engine consumes and two
//! implementations of them.

mod file;
mod memory;
mod repository;

pub use file::FileStorage;
pub use memory::{MemoryStore, Tables};
pub use repository::{DirectoryStore, IdentityResolver, RecordStore, Repository};

#[cfg(test)]
pub use repository::MockIdentityResolver;
