//! Walkthrough of the material system against a stub platform
//!
//! Demonstrates the full lifecycle: declaring materials (one from ron data),
//! registering configurations, realizing permutations, late texture-alias
//! binding, a global-setting change, and a language switch.

use material_system::prelude::*;
use slotmap::{DefaultKey, SlotMap};
use std::collections::HashMap;

/// A platform that "realizes" everything as log lines and slotmap entries
///
/// Stands in for a real engine binding; useful for seeing exactly which
/// operations the factory drives and when.
#[derive(Default)]
struct StubPlatform {
    materials: SlotMap<DefaultKey, String>,
    passes: SlotMap<DefaultKey, String>,
    texture_units: SlotMap<DefaultKey, String>,
    shaders: SlotMap<DefaultKey, u64>,
    // Handle values are indices into these lookup tables.
    material_keys: Vec<DefaultKey>,
    pass_keys: Vec<DefaultKey>,
    unit_keys: Vec<DefaultKey>,
    shader_keys: Vec<DefaultKey>,
    bound_textures: HashMap<u32, String>,
}

impl StubPlatform {
    fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Platform for StubPlatform {
    fn create_material(&mut self, name: &str) -> MaterialHandle {
        let key = self.materials.insert(name.to_string());
        self.material_keys.push(key);
        log::info!("[platform] material object for '{name}'");
        MaterialHandle(self.material_keys.len() as u32 - 1)
    }

    fn create_configuration(&mut self, _material: MaterialHandle, configuration: &str) -> bool {
        log::info!("[platform] configuration '{configuration}' declared");
        true
    }

    fn remove_configuration(&mut self, _material: MaterialHandle, configuration: &str) {
        log::info!("[platform] configuration '{configuration}' removed");
    }

    fn create_pass(&mut self, material: MaterialHandle, configuration: &str) -> PassHandle {
        let name = self.material_keys.get(material.0 as usize).map_or_else(
            || "<unknown>".to_string(),
            |key| self.materials[*key].clone(),
        );
        let key = self.passes.insert(format!("{name}/{configuration}"));
        self.pass_keys.push(key);
        log::info!("[platform] pass for '{name}' under '{configuration}'");
        PassHandle(self.pass_keys.len() as u32 - 1)
    }

    fn remove_all(&mut self, material: MaterialHandle) {
        if let Some(key) = self.material_keys.get(material.0 as usize) {
            if let Some(name) = self.materials.remove(*key) {
                log::info!("[platform] released all resources of '{name}'");
            }
        }
    }

    fn set_shadow_caster_material(&mut self, _material: MaterialHandle, name: &str) {
        log::info!("[platform] shadow caster override: '{name}'");
    }

    fn create_texture_unit(&mut self, _pass: PassHandle, unit_name: &str) -> TextureUnitHandle {
        let key = self.texture_units.insert(unit_name.to_string());
        self.unit_keys.push(key);
        TextureUnitHandle(self.unit_keys.len() as u32 - 1)
    }

    fn bind_texture(&mut self, unit: TextureUnitHandle, real_name: &str) {
        self.bound_textures.insert(unit.0, real_name.to_string());
        log::info!("[platform] texture unit {} -> '{real_name}'", unit.0);
    }

    fn compile_shader(
        &mut self,
        request: &ShaderPermutationRequest,
    ) -> Result<ShaderHandle, PlatformError> {
        let key = self.shaders.insert(request.fingerprint);
        self.shader_keys.push(key);
        log::info!(
            "[platform] compiled '{}' permutation {:#018x} ({:?}, {} defines)",
            request.shader_set,
            request.fingerprint,
            request.language,
            request.properties.len()
        );
        Ok(ShaderHandle(self.shader_keys.len() as u32 - 1))
    }

    fn bind_shader(&mut self, pass: PassHandle, shader: ShaderHandle) {
        log::info!("[platform] pass {} uses shader {}", pass.0, shader.0);
    }

    fn update_shared_parameter(&mut self, shader: ShaderHandle, name: &str, value: &PropertyValue) {
        log::info!("[platform] shader {} uniform '{name}' = {value:?}", shader.0);
    }
}

struct LoggingListener;

impl MaterialListener for LoggingListener {
    fn material_created(&mut self, material: &MaterialInstance, configuration: &str) {
        log::info!(
            "[listener] material '{}' finalized for configuration '{configuration}'",
            material.name()
        );
    }
}

fn main() -> Result<(), FactoryError> {
    env_logger::init();

    let mut factory = Factory::new(Box::new(StubPlatform::new()));
    factory.set_material_listener(Box::new(LoggingListener));

    factory.register_shader_set(
        "terrain_vs",
        ShaderSetDefinition {
            requirements: vec!["fog".to_string(), "num_lights".to_string()],
            shared_parameters: vec!["time".to_string()],
        },
    );
    factory.set_global_setting("fog", true);
    factory.set_global_setting("num_lights", 4i64);

    // A material declared in data, the way a host would ship it.
    let declared: PropertySet = ron::from_str(
        r#"{
            "vertex_program": Text("terrain_vs"),
            "diffuse": Vector([0.4, 0.5, 0.3]),
            "texture_alias": Text("ReflectionMap"),
        }"#,
    )
    .expect("demo material should parse");
    factory.create_material_instance("terrain", None)?;
    for (name, value) in declared.iter() {
        factory.set_material_property("terrain", name, value.clone())?;
    }

    // A child inheriting everything, overriding only the diffuse color.
    factory.create_material_instance("terrain_scorched", Some("terrain"))?;
    factory.set_material_property("terrain_scorched", "diffuse", vec![0.2, 0.1, 0.1])?;

    // Shadow pass variant: one overlay retargets every material.
    let mut shadow = PropertySet::new();
    shadow.set("fog", false);
    factory.register_configuration("shadow", shadow);

    // The alias must be bound before the first request that needs it.
    factory.set_texture_alias("ReflectionMap", "rtt_reflection_0");

    factory.request_material("terrain", "")?;
    factory.request_material("terrain_scorched", "")?;
    factory.request_material("terrain", "shadow")?;

    // Retroactive alias re-resolution: live units update, nothing re-realizes.
    factory.set_texture_alias("ReflectionMap", "rtt_reflection_1");

    // Runtime uniform push, no recompilation.
    factory.set_shared_parameter("time", 42.0f32);

    // A global-setting change schedules exactly the dependent permutations.
    factory.set_global_setting("num_lights", 8i64);
    factory.request_material("terrain", "")?;

    // Language switch: everything recompiles lazily.
    factory.set_current_language(ShaderLanguage::Hlsl);
    factory.request_material("terrain", "")?;

    log::info!("demo finished: {factory:?}");
    Ok(())
}
