//! Fingerprint-keyed permutation cache for one named shader

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{FactoryError, FactoryResult};
use crate::platform::{Platform, ShaderHandle, ShaderPermutationRequest};
use crate::properties::PropertyValue;
use crate::shaders::ShaderLanguage;

/// Declares what a shader set reads
///
/// The requirement list is the dependency set: the property and global-setting
/// names whose resolved values select a permutation. Shared parameters are
/// uniforms updated at runtime without recompiling, so they are deliberately
/// *not* part of the fingerprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderSetDefinition {
    /// Property and global-setting names that select permutations
    pub requirements: Vec<String>,
    /// Shared-parameter names the compiled shaders consume as live uniforms
    pub shared_parameters: Vec<String>,
}

/// One cached permutation, with the inputs it was built from
///
/// The snapshot makes invalidation exact: a global-setting change only evicts
/// entries whose recorded value for that setting differs from the new one.
#[derive(Debug, Clone)]
struct CacheEntry {
    shader: ShaderHandle,
    configuration: String,
    snapshot: BTreeMap<String, PropertyValue>,
}

/// The cache and realization logic for one named shader
///
/// This is a correctness cache, not a capacity-bounded one: entries are never
/// evicted by size or LRU, only by explicit invalidation. The key space is
/// bounded by the distinct (material, configuration, language, settings)
/// combinations actually used, so unbounded growth over the process lifetime
/// is accepted.
#[derive(Debug)]
pub struct ShaderSet {
    name: String,
    requirements: BTreeSet<String>,
    shared_parameters: BTreeSet<String>,
    cache: HashMap<u64, CacheEntry>,
}

impl ShaderSet {
    /// Create a shader set from its definition
    pub fn new(name: impl Into<String>, definition: ShaderSetDefinition) -> Self {
        Self {
            name: name.into(),
            requirements: definition.requirements.into_iter().collect(),
            shared_parameters: definition.shared_parameters.into_iter().collect(),
            cache: HashMap::new(),
        }
    }

    /// Name of the shader this set manages
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `name` is in the dependency set
    pub fn depends_on(&self, name: &str) -> bool {
        self.requirements.contains(name)
    }

    /// Whether the compiled shaders consume this shared parameter
    pub fn reads_shared_parameter(&self, name: &str) -> bool {
        self.shared_parameters.contains(name)
    }

    /// Number of cached permutations
    pub fn cached_permutations(&self) -> usize {
        self.cache.len()
    }

    /// Handles of every currently cached permutation
    pub fn cached_shaders(&self) -> impl Iterator<Item = ShaderHandle> + '_ {
        self.cache.values().map(|entry| entry.shader)
    }

    /// Get or compile the permutation for the given inputs
    ///
    /// `resolve` supplies the effective value of a dependency name under the
    /// caller's material/configuration/global-settings context. Equal
    /// fingerprints return the identical cached [`ShaderHandle`] without
    /// touching the platform; a miss asks the platform to compile and caches
    /// the result.
    pub fn permutation<F>(
        &mut self,
        platform: &mut dyn Platform,
        language: ShaderLanguage,
        configuration: &str,
        resolve: F,
    ) -> FactoryResult<ShaderHandle>
    where
        F: Fn(&str) -> Option<PropertyValue>,
    {
        let mut snapshot = BTreeMap::new();
        for requirement in &self.requirements {
            if let Some(value) = resolve(requirement) {
                snapshot.insert(requirement.clone(), value);
            }
        }

        let fingerprint = Self::fingerprint(&self.name, language, configuration, &snapshot);

        if let Some(entry) = self.cache.get(&fingerprint) {
            log::debug!(
                "shader set '{}': cache hit for permutation {:#018x}",
                self.name,
                fingerprint
            );
            return Ok(entry.shader);
        }

        let request = ShaderPermutationRequest {
            shader_set: self.name.clone(),
            language,
            configuration: configuration.to_string(),
            properties: snapshot.clone(),
            fingerprint,
        };

        let shader = platform
            .compile_shader(&request)
            .map_err(|err| FactoryError::ShaderCompilation {
                shader_set: self.name.clone(),
                fingerprint,
                reason: err.to_string(),
            })?;

        log::debug!(
            "shader set '{}': compiled permutation {:#018x} ({} dependency values, configuration '{}')",
            self.name,
            fingerprint,
            snapshot.len(),
            configuration
        );

        self.cache.insert(
            fingerprint,
            CacheEntry {
                shader,
                configuration: configuration.to_string(),
                snapshot,
            },
        );
        Ok(shader)
    }

    /// Evict permutations made stale by a dependency value change
    ///
    /// Entries whose snapshot already recorded exactly `new_value` for `name`
    /// stay valid; everything else that depended on the name goes. Returns
    /// the number of evicted permutations. A name outside the dependency set
    /// evicts nothing.
    pub fn invalidate_setting(&mut self, name: &str, new_value: Option<&PropertyValue>) -> usize {
        if !self.requirements.contains(name) {
            return 0;
        }
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.snapshot.get(name) == new_value);
        let evicted = before - self.cache.len();
        if evicted > 0 {
            log::debug!(
                "shader set '{}': evicted {evicted} permutation(s) after '{name}' changed",
                self.name
            );
        }
        evicted
    }

    /// Evict every permutation built under the named configuration
    pub fn invalidate_configuration(&mut self, configuration: &str) -> usize {
        let before = self.cache.len();
        self.cache.retain(|_, entry| entry.configuration != configuration);
        before - self.cache.len()
    }

    /// Evict every cached permutation (language switch, definition change)
    pub fn invalidate_all(&mut self) -> usize {
        let evicted = self.cache.len();
        self.cache.clear();
        evicted
    }

    /// Deterministic fingerprint of everything that identifies a permutation
    fn fingerprint(
        name: &str,
        language: ShaderLanguage,
        configuration: &str,
        snapshot: &BTreeMap<String, PropertyValue>,
    ) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        language.fingerprint_tag().hash(&mut hasher);
        configuration.hash(&mut hasher);
        snapshot.len().hash(&mut hasher);
        for (key, value) in snapshot {
            key.hash(&mut hasher);
            value.write_fingerprint(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::platform::{MaterialHandle, PassHandle, TextureUnitHandle};

    /// Platform stub that only compiles shaders, handing out sequential handles
    struct CountingPlatform {
        compiles: u32,
    }

    impl CountingPlatform {
        fn new() -> Self {
            Self { compiles: 0 }
        }
    }

    impl Platform for CountingPlatform {
        fn create_material(&mut self, _name: &str) -> MaterialHandle {
            MaterialHandle(0)
        }
        fn create_configuration(&mut self, _material: MaterialHandle, _configuration: &str) -> bool {
            true
        }
        fn remove_configuration(&mut self, _material: MaterialHandle, _configuration: &str) {}
        fn create_pass(&mut self, _material: MaterialHandle, _configuration: &str) -> PassHandle {
            PassHandle(0)
        }
        fn remove_all(&mut self, _material: MaterialHandle) {}
        fn set_shadow_caster_material(&mut self, _material: MaterialHandle, _name: &str) {}
        fn create_texture_unit(&mut self, _pass: PassHandle, _unit_name: &str) -> TextureUnitHandle {
            TextureUnitHandle(0)
        }
        fn bind_texture(&mut self, _unit: TextureUnitHandle, _real_name: &str) {}
        fn compile_shader(
            &mut self,
            _request: &ShaderPermutationRequest,
        ) -> Result<ShaderHandle, PlatformError> {
            let handle = ShaderHandle(self.compiles);
            self.compiles += 1;
            Ok(handle)
        }
        fn bind_shader(&mut self, _pass: PassHandle, _shader: ShaderHandle) {}
        fn update_shared_parameter(
            &mut self,
            _shader: ShaderHandle,
            _name: &str,
            _value: &PropertyValue,
        ) {
        }
    }

    fn fog_set() -> ShaderSet {
        ShaderSet::new(
            "main_vs",
            ShaderSetDefinition {
                requirements: vec!["fog".to_string(), "num_lights".to_string()],
                shared_parameters: vec!["time".to_string()],
            },
        )
    }

    #[test]
    fn test_identical_inputs_hit_the_cache() {
        let mut platform = CountingPlatform::new();
        let mut set = fog_set();
        let resolve = |name: &str| match name {
            "fog" => Some(PropertyValue::Boolean(true)),
            "num_lights" => Some(PropertyValue::Integer(3)),
            _ => None,
        };

        let first = set
            .permutation(&mut platform, ShaderLanguage::Glsl, "", resolve)
            .unwrap();
        let second = set
            .permutation(&mut platform, ShaderLanguage::Glsl, "", resolve)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(platform.compiles, 1);
    }

    #[test]
    fn test_dependency_value_change_is_a_miss() {
        let mut platform = CountingPlatform::new();
        let mut set = fog_set();

        set.permutation(&mut platform, ShaderLanguage::Glsl, "", |name| match name {
            "fog" => Some(PropertyValue::Boolean(true)),
            _ => None,
        })
        .unwrap();
        set.permutation(&mut platform, ShaderLanguage::Glsl, "", |name| match name {
            "fog" => Some(PropertyValue::Boolean(false)),
            _ => None,
        })
        .unwrap();

        assert_eq!(platform.compiles, 2);
        assert_eq!(set.cached_permutations(), 2);
    }

    #[test]
    fn test_language_is_part_of_the_fingerprint() {
        let mut platform = CountingPlatform::new();
        let mut set = fog_set();
        let resolve = |name: &str| match name {
            "fog" => Some(PropertyValue::Boolean(true)),
            _ => None,
        };

        set.permutation(&mut platform, ShaderLanguage::Glsl, "", resolve)
            .unwrap();
        set.permutation(&mut platform, ShaderLanguage::Hlsl, "", resolve)
            .unwrap();

        assert_eq!(platform.compiles, 2);
    }

    #[test]
    fn test_invalidate_setting_is_exact() {
        let mut platform = CountingPlatform::new();
        let mut set = fog_set();

        // Two permutations: fog on and fog off.
        for fog in [true, false] {
            set.permutation(&mut platform, ShaderLanguage::Glsl, "", move |name| match name {
                "fog" => Some(PropertyValue::Boolean(fog)),
                _ => None,
            })
            .unwrap();
        }
        assert_eq!(set.cached_permutations(), 2);

        // Setting fog to true keeps the entry built with fog=true.
        let evicted = set.invalidate_setting("fog", Some(&PropertyValue::Boolean(true)));
        assert_eq!(evicted, 1);
        assert_eq!(set.cached_permutations(), 1);

        // A name outside the dependency set touches nothing.
        assert_eq!(set.invalidate_setting("unrelated", Some(&PropertyValue::Boolean(true))), 0);
        assert_eq!(set.cached_permutations(), 1);
    }

    #[test]
    fn test_invalidate_configuration_only_hits_that_configuration() {
        let mut platform = CountingPlatform::new();
        let mut set = fog_set();
        let resolve = |name: &str| match name {
            "fog" => Some(PropertyValue::Boolean(true)),
            _ => None,
        };

        set.permutation(&mut platform, ShaderLanguage::Glsl, "", resolve)
            .unwrap();
        set.permutation(&mut platform, ShaderLanguage::Glsl, "shadow", resolve)
            .unwrap();
        assert_eq!(set.cached_permutations(), 2);

        assert_eq!(set.invalidate_configuration("shadow"), 1);
        assert_eq!(set.cached_permutations(), 1);
    }

    #[test]
    fn test_compile_failure_carries_the_fingerprint() {
        struct FailingPlatform;
        impl Platform for FailingPlatform {
            fn create_material(&mut self, _name: &str) -> MaterialHandle {
                MaterialHandle(0)
            }
            fn create_configuration(
                &mut self,
                _material: MaterialHandle,
                _configuration: &str,
            ) -> bool {
                true
            }
            fn remove_configuration(&mut self, _material: MaterialHandle, _configuration: &str) {}
            fn create_pass(&mut self, _material: MaterialHandle, _configuration: &str) -> PassHandle {
                PassHandle(0)
            }
            fn remove_all(&mut self, _material: MaterialHandle) {}
            fn set_shadow_caster_material(&mut self, _material: MaterialHandle, _name: &str) {}
            fn create_texture_unit(
                &mut self,
                _pass: PassHandle,
                _unit_name: &str,
            ) -> TextureUnitHandle {
                TextureUnitHandle(0)
            }
            fn bind_texture(&mut self, _unit: TextureUnitHandle, _real_name: &str) {}
            fn compile_shader(
                &mut self,
                _request: &ShaderPermutationRequest,
            ) -> Result<ShaderHandle, PlatformError> {
                Err(PlatformError::new("language not supported"))
            }
            fn bind_shader(&mut self, _pass: PassHandle, _shader: ShaderHandle) {}
            fn update_shared_parameter(
                &mut self,
                _shader: ShaderHandle,
                _name: &str,
                _value: &PropertyValue,
            ) {
            }
        }

        let mut platform = FailingPlatform;
        let mut set = fog_set();
        let err = set
            .permutation(&mut platform, ShaderLanguage::Cg, "", |_| None)
            .unwrap_err();
        match err {
            FactoryError::ShaderCompilation { shader_set, reason, .. } => {
                assert_eq!(shader_set, "main_vs");
                assert!(reason.contains("language not supported"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failed permutation must not be cached.
        assert_eq!(set.cached_permutations(), 0);
    }
}
