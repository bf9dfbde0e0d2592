pub mod config_loader;
pub mod constants;
pub mod logging;
pub mod pid_file;
pub mod shutdown;
