pub mod locator;
pub mod matcher;
pub mod mega;
pub mod store;

pub use locator::DocumentLocator;
pub use mega::MegaStore;
pub use matcher::{document_stem, is_homework_image, is_material, PagePattern};
pub use store::{DirectoryStore, MemoryStore};
