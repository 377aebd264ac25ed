//! Capability boundary to the concrete rendering engine
//!
//! The core never touches GPU objects. Everything engine-specific is reached
//! through the [`Platform`] trait, which deals in opaque handle newtypes the
//! platform implementation maps to its own resources. A stub platform is all
//! the tests need; a real binding (wgpu, Vulkan, a scene-graph engine) lives
//! in its own crate.

use std::collections::BTreeMap;

use crate::error::PlatformError;
use crate::properties::PropertyValue;
use crate::shaders::ShaderLanguage;

/// Handle for a platform-side material object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Handle for a render pass realized under a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassHandle(pub u32);

/// Handle for a texture unit within a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureUnitHandle(pub u32);

/// Handle for a compiled shader permutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Everything the platform needs to realize one shader permutation
///
/// The resolved property snapshot is restricted to the shader set's declared
/// dependency set; the platform typically turns it into preprocessor defines
/// or template parameters for its shader source.
#[derive(Debug, Clone)]
pub struct ShaderPermutationRequest {
    /// Name of the shader set requesting the permutation
    pub shader_set: String,
    /// Active shading language
    pub language: ShaderLanguage,
    /// Configuration the permutation is being built for
    pub configuration: String,
    /// Resolved dependency property values, in deterministic order
    pub properties: BTreeMap<String, PropertyValue>,
    /// Fingerprint identifying this permutation
    pub fingerprint: u64,
}

/// Abstract rendering-engine capability driven by the factory
///
/// All methods take `&mut self`: the factory and platform share the
/// single-threaded cooperative model, and realization mutates platform state.
///
/// Handle lifetimes: handles returned from this trait stay valid until the
/// factory calls [`Platform::remove_all`] for the owning material.
pub trait Platform {
    /// Realize a platform material object for the named instance
    fn create_material(&mut self, name: &str) -> MaterialHandle;

    /// Declare that a configuration exists at the platform level
    ///
    /// Idempotent: returns `false` if the configuration was already declared
    /// for this material.
    fn create_configuration(&mut self, material: MaterialHandle, configuration: &str) -> bool;

    /// Remove a configuration; safe to call if it does not exist
    fn remove_configuration(&mut self, material: MaterialHandle, configuration: &str);

    /// Realize one render pass for a configuration
    fn create_pass(&mut self, material: MaterialHandle, configuration: &str) -> PassHandle;

    /// Release all platform resources owned by the material
    fn remove_all(&mut self, material: MaterialHandle);

    /// Platform-specific shadow-caster override hook
    fn set_shadow_caster_material(&mut self, material: MaterialHandle, name: &str);

    /// Create a texture unit on a pass
    fn create_texture_unit(&mut self, pass: PassHandle, unit_name: &str) -> TextureUnitHandle;

    /// Bind the real texture resource name to a texture unit
    ///
    /// Called both at realization and retroactively when a texture alias is
    /// resolved after the material was already created.
    fn bind_texture(&mut self, unit: TextureUnitHandle, real_name: &str);

    /// Compile (or otherwise realize) one shader permutation
    fn compile_shader(
        &mut self,
        request: &ShaderPermutationRequest,
    ) -> Result<ShaderHandle, PlatformError>;

    /// Bind a compiled shader to a pass
    fn bind_shader(&mut self, pass: PassHandle, shader: ShaderHandle);

    /// Push a new shared-parameter value to an already-compiled shader
    ///
    /// A runtime uniform update; never triggers recompilation.
    fn update_shared_parameter(
        &mut self,
        shader: ShaderHandle,
        name: &str,
        value: &PropertyValue,
    );
}
