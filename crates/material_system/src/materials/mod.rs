//! Material instances

mod instance;

pub use instance::MaterialInstance;
