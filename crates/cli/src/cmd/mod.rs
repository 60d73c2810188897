mod bootstrap;
mod build;
mod init;
mod service;

pub use bootstrap::{BootstrapArgs, cmd_bootstrap};
pub use build::{BuildArgs, cmd_build};
pub use init::{InitArgs, cmd_init};
pub use service::{ServiceCommands, cmd_service};
