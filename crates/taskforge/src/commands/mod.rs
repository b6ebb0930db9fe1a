pub mod init;
pub mod logs;
pub mod status;
pub mod stop;
