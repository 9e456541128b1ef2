// Adapters layer: concrete implementations for things outside the process
// (files on disk, network interfaces, the local tunnel agent).

pub mod assets;
pub mod network;
pub mod tunnel;
