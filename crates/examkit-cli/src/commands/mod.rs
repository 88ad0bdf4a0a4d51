pub mod answers;
pub mod extract;
pub mod init;
pub mod patch;
pub mod stats;
pub mod validate;
