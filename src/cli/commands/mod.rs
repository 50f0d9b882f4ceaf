pub mod init;
pub mod login;
pub mod logout;
pub mod status;
pub mod switch;
pub mod validate;
