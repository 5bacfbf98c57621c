//! Plugin System Tests
//!
//! Registry behaviour tests with mock collaborators.

pub mod mock_plugins;
