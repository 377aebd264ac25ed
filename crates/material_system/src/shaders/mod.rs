//! Shader permutation management
//!
//! A [`ShaderSet`] owns every compiled permutation of one named shader across
//! all combinations of properties, configurations, global settings, and the
//! active shading language, keyed by a deterministic fingerprint.

mod shader_set;

pub use shader_set::{ShaderSet, ShaderSetDefinition};

use serde::{Deserialize, Serialize};

/// Supported shading-language dialects
///
/// Switching the active language invalidates every shader-set cache; it is a
/// start-up or explicit-user-action operation, never a per-frame one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderLanguage {
    /// Cg dialect
    Cg,
    /// HLSL dialect
    Hlsl,
    /// GLSL dialect
    #[default]
    Glsl,
}

impl ShaderLanguage {
    /// Stable discriminant fed into permutation fingerprints
    pub(crate) fn fingerprint_tag(self) -> u8 {
        match self {
            Self::Cg => 0,
            Self::Hlsl => 1,
            Self::Glsl => 2,
        }
    }
}
