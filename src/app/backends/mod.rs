// Concrete registries. Both validate input before sending or storing anything.

pub mod http_backend;
pub mod memory_backend;

pub use http_backend::HttpRegistry;
pub use memory_backend::InMemoryRegistry;
