//! Persistence module
//!
//! Network definition save/load using serde and JSON.

pub mod network;

pub use network::{
    load_from_file, save_to_file, NetworkFile, NetworkFileError, ParentData, VariableData,
    NETWORK_VERSION,
};
