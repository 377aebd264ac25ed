//! Error types for the material system

use thiserror::Error;

/// Result alias used throughout the factory API
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors reported by the factory and its components
#[derive(Debug, Error)]
pub enum FactoryError {
    /// A material instance with this name is already registered
    ///
    /// Instance names are unique keys within a factory; pick a different name
    /// or destroy the existing instance first.
    #[error("a material instance named '{0}' already exists")]
    DuplicateName(String),

    /// A required material instance does not exist
    ///
    /// Returned by operations that need an existing instance (such as
    /// property copying); plain lookups return `None` instead.
    #[error("material instance '{0}' was not found")]
    InstanceNotFound(String),

    /// A texture alias was requested for rendering before it was resolved
    ///
    /// The real texture name behind an alias is supplied at runtime via
    /// `Factory::set_texture_alias`. Realizing a material that references a
    /// still-unbound alias cannot proceed; the caller must set the alias
    /// before the first `request_material` that needs it.
    #[error("texture alias '{alias}' on material '{material}' has no real name bound yet")]
    UnresolvedAlias {
        /// Name of the material instance being realized
        material: String,
        /// The unbound alias
        alias: String,
    },

    /// The platform could not realize a shader permutation
    ///
    /// Propagated out of `request_material` so the rendering layer can decide
    /// fallback behavior; the factory never substitutes a shader on its own.
    #[error("shader set '{shader_set}' failed to compile permutation {fingerprint:#018x}: {reason}")]
    ShaderCompilation {
        /// Name of the shader set that owns the failing permutation
        shader_set: String,
        /// Fingerprint identifying the permutation
        fingerprint: u64,
        /// Platform-reported failure reason
        reason: String,
    },

    /// A material instance refers to a parent that no longer exists
    ///
    /// Regular property lookups treat a missing parent as absent (with a
    /// warning); this variant is only produced by the explicit
    /// `Factory::validate_instance` check for callers that want strictness.
    #[error("material instance '{child}' refers to missing parent '{parent}'")]
    OrphanedParent {
        /// The instance holding the dangling parent link
        child: String,
        /// The missing parent name
        parent: String,
    },
}

/// Failure reported by a [`Platform`](crate::platform::Platform) implementation
///
/// Kept deliberately opaque: platforms differ wildly in what can go wrong, so
/// the core only carries the message through.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    /// Create a platform error from any displayable reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
