pub mod dashboard;

// Re-export key components to form the application's public API.
pub use dashboard::Dashboard;
