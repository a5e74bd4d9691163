pub mod scope;
pub mod service;
pub mod transfer;
