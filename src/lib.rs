pub mod cli;
pub mod command;
pub mod domain;
pub mod protocol;
pub mod store;

pub use cli::prompt;
pub use command::{Command, CommandError};
pub use domain::{Area, Category, Center, Operator, Parameter};
pub use protocol::{Client, ClientError, Server};
pub use store::{MemoryStore, Store};
