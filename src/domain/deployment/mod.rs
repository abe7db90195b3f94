pub mod dto;
pub mod saga;
pub mod service;
