pub mod cli;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod logging;
pub mod metadata;
pub mod protocol;
pub mod signing;

pub use cli::{run, run_with};
pub use dispatch::{Command, Dispatcher, ExitStatus};
pub use error::{ErrorCode, PluginError, RequestError};
pub use keys::{Environment, ProcessEnvironment};
pub use metadata::{CONTRACT_VERSION, PluginMetadata};
pub use signing::{KeySpec, KeyType, PayloadSigner, SigningAlgorithm};
