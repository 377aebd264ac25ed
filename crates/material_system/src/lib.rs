//! # Material System
//!
//! A cross-engine material and shader configuration/permutation manager.
//!
//! ## Features
//!
//! - **Property Inheritance**: live parent-chain resolution across a material
//!   hierarchy, plus explicit one-time property snapshots
//! - **Configurations**: named property overlays for render-pass variants
//!   (shadow casting, quality tiers) that retarget many materials at once
//! - **Permutation Caching**: shader sets memoize compiled permutations by a
//!   deterministic fingerprint and recompile only when a dependency changes
//! - **Dependency-Driven Invalidation**: a global-setting change invalidates
//!   exactly the cached permutations that depended on it
//! - **Deferred Texture Aliases**: texture names resolved after material
//!   creation are pushed retroactively into live texture units
//!
//! The core renders nothing and owns no GPU context: everything
//! engine-specific sits behind the [`Platform`](platform::Platform)
//! capability trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use material_system::prelude::*;
//!
//! # struct MyPlatform;
//! # impl Platform for MyPlatform {
//! #     fn create_material(&mut self, _: &str) -> MaterialHandle { MaterialHandle(0) }
//! #     fn create_configuration(&mut self, _: MaterialHandle, _: &str) -> bool { true }
//! #     fn remove_configuration(&mut self, _: MaterialHandle, _: &str) {}
//! #     fn create_pass(&mut self, _: MaterialHandle, _: &str) -> PassHandle { PassHandle(0) }
//! #     fn remove_all(&mut self, _: MaterialHandle) {}
//! #     fn set_shadow_caster_material(&mut self, _: MaterialHandle, _: &str) {}
//! #     fn create_texture_unit(&mut self, _: PassHandle, _: &str) -> TextureUnitHandle { TextureUnitHandle(0) }
//! #     fn bind_texture(&mut self, _: TextureUnitHandle, _: &str) {}
//! #     fn compile_shader(&mut self, _: &ShaderPermutationRequest) -> Result<ShaderHandle, PlatformError> { Ok(ShaderHandle(0)) }
//! #     fn bind_shader(&mut self, _: PassHandle, _: ShaderHandle) {}
//! #     fn update_shared_parameter(&mut self, _: ShaderHandle, _: &str, _: &PropertyValue) {}
//! # }
//! fn main() -> Result<(), FactoryError> {
//!     let mut factory = Factory::new(Box::new(MyPlatform));
//!
//!     factory.create_material_instance("rock", None)?;
//!     factory.set_material_property("rock", "vertex_program", "main_vs")?;
//!
//!     let mut shadow = PropertySet::new();
//!     shadow.set("alpha", 0.0f32);
//!     factory.register_configuration("shadow", shadow);
//!
//!     factory.request_material("rock", "shadow")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod error;
pub mod factory;
pub mod materials;
pub mod platform;
pub mod properties;
pub mod shaders;

pub use error::{FactoryError, FactoryResult, PlatformError};
pub use factory::{Factory, MaterialListener};
pub use materials::MaterialInstance;
pub use properties::{PropertySet, PropertyValue};
pub use shaders::{ShaderLanguage, ShaderSet, ShaderSetDefinition};

/// Common imports for library users
pub mod prelude {
    pub use crate::error::{FactoryError, FactoryResult, PlatformError};
    pub use crate::factory::{Factory, MaterialListener};
    pub use crate::materials::MaterialInstance;
    pub use crate::platform::{
        MaterialHandle, PassHandle, Platform, ShaderHandle, ShaderPermutationRequest,
        TextureUnitHandle,
    };
    pub use crate::properties::{PropertySet, PropertyValue};
    pub use crate::shaders::{ShaderLanguage, ShaderSet, ShaderSetDefinition};
}
