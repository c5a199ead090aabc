// Shellmarks state managers
// Managers own the live bookmark tree and its persistence.

pub mod bookmark_manager;
