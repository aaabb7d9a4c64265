pub mod flash;
pub mod session;
