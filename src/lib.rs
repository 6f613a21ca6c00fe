pub mod rendering;
pub mod settings;
