// Models module - data structures for completion API communication
pub mod types;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use types::{ChatMessage, Role};
pub use requests::ChatRequest;
pub use responses::{ChatResponse, Choice, ResponseMessage, Usage};
