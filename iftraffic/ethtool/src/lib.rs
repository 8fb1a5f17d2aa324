mod errors;
mod reader;
mod types;


pub use errors::EthtoolError;
pub use nix::errno::Errno;
pub use reader::*;
pub use types::*;

pub type Result<T> = std::result::Result<T, errors::EthtoolError>;
