pub mod network;
pub mod project_manager;
pub mod toast;
pub mod upload;
