pub mod backend;
pub mod engine;
pub mod local;
pub mod path;
pub mod remote;
pub mod types;

pub use backend::{Backend, BackendCapabilities, Store, StoreBackend};
pub use local::LocalStore;
pub use remote::FtpStore;
pub use types::*;
