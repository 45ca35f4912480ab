/// Command module - per-frame command buffer scheduling

pub mod command_control;

pub use command_control::*;
