pub mod okx;
pub mod patterns;
pub mod scanner;
pub mod signal;
pub mod types;

// Re-export for tests
pub use scanner::SignalScanner;
