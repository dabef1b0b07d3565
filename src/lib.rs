pub mod diagnostics;
pub mod dummy;
pub mod frame;
pub mod overlay;
pub mod pipeline;
pub mod pose;
pub mod settings;
