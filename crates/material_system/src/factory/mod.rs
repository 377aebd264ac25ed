//! The orchestration root: owns every material, shader set, and configuration
//!
//! The factory is an explicit context object — construct one per rendering
//! context, hand it the platform capability, and funnel every lookup through
//! it so the sharing and caching invariants hold globally. There is no
//! process-wide singleton; the integration layer owns the factory and tears
//! it down with its rendering context.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{FactoryError, FactoryResult};
use crate::materials::MaterialInstance;
use crate::platform::{Platform, TextureUnitHandle};
use crate::properties::{PropertySet, PropertyValue, MAX_PARENT_DEPTH};
use crate::shaders::{ShaderLanguage, ShaderSet, ShaderSetDefinition};


/// Property naming the shader set for the vertex stage
pub const PROP_VERTEX_PROGRAM: &str = "vertex_program";
/// Property naming the shader set for the fragment stage
pub const PROP_FRAGMENT_PROGRAM: &str = "fragment_program";
/// Property naming a texture by its real resource name
pub const PROP_TEXTURE: &str = "texture";
/// Property naming a texture by alias, resolved later via
/// [`Factory::set_texture_alias`]
pub const PROP_TEXTURE_ALIAS: &str = "texture_alias";
/// Property forwarding a shadow-caster override to the platform
pub const PROP_SHADOW_CASTER: &str = "shadow_caster_material";

/// Notified when a material is finalized for a configuration
///
/// Fires exactly once per (material, configuration) pair the first time that
/// pair is realized. Consumers use it to apply runtime-only customizations
/// the declarative description cannot express.
pub trait MaterialListener {
    /// A material was just realized under `configuration`
    fn material_created(&mut self, material: &MaterialInstance, configuration: &str);
}

/// The main interface: creation, lookup, and invalidation of materials,
/// shader sets, and configurations
///
/// Single-threaded cooperative model: all operations are synchronous and
/// assume one calling thread; callers supply external synchronization if they
/// need anything else.
pub struct Factory {
    platform: Box<dyn Platform>,
    shaders_enabled: bool,
    materials: HashMap<String, MaterialInstance>,
    shader_sets: HashMap<String, ShaderSet>,
    configurations: HashMap<String, PropertySet>,
    global_settings: PropertySet,
    shared_parameters: PropertySet,
    /// Configuration currently overlaying the global settings, if any
    active_configuration: Option<String>,
    texture_aliases: HashMap<String, String>,
    /// Reverse index: texture unit → the alias it was created for, used to
    /// re-resolve aliases retroactively
    alias_instances: HashMap<TextureUnitHandle, String>,
    language: ShaderLanguage,
    listener: Option<Box<dyn MaterialListener>>,
}

impl Factory {
    /// Create a factory, taking ownership of the platform capability
    pub fn new(platform: Box<dyn Platform>) -> Self {
        Self {
            platform,
            shaders_enabled: true,
            materials: HashMap::new(),
            shader_sets: HashMap::new(),
            configurations: HashMap::new(),
            global_settings: PropertySet::new(),
            shared_parameters: PropertySet::new(),
            active_configuration: None,
            texture_aliases: HashMap::new(),
            alias_instances: HashMap::new(),
            language: ShaderLanguage::default(),
            listener: None,
        }
    }

    // ------------------------------------------------------------------
    // Material instances
    // ------------------------------------------------------------------

    /// Create a material instance, optionally linked to a parent by name
    ///
    /// The parent need not exist yet; the link is resolved lazily at every
    /// property lookup. Fails with [`FactoryError::DuplicateName`] if the
    /// name is taken.
    pub fn create_material_instance(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> FactoryResult<&MaterialInstance> {
        if self.materials.contains_key(name) {
            return Err(FactoryError::DuplicateName(name.to_string()));
        }
        let instance = MaterialInstance::new(name, parent.map(str::to_string));
        log::debug!(
            "created material instance '{name}'{}",
            parent.map(|p| format!(" (parent '{p}')")).unwrap_or_default()
        );
        Ok(self.materials.entry(name.to_string()).or_insert(instance))
    }

    /// Destroy a material instance and its platform resources
    ///
    /// Safe to call if the instance does not exist. Children referencing it
    /// as parent are not destroyed; their inherited lookups simply start
    /// coming back absent.
    pub fn destroy_material_instance(&mut self, name: &str) {
        let Some(mut instance) = self.materials.remove(name) else {
            return;
        };
        let units: Vec<_> = instance.all_texture_units().collect();
        for unit in units {
            self.alias_instances.remove(&unit);
        }
        if let Some(material) = instance.drop_all_realizations() {
            self.platform.remove_all(material);
        }
        log::debug!("destroyed material instance '{name}'");
    }

    /// Non-throwing lookup of a material instance
    pub fn get_material_instance(&self, name: &str) -> Option<&MaterialInstance> {
        self.materials.get(name)
    }

    /// Strict check that an instance exists and its parent chain is intact
    ///
    /// Regular lookups tolerate a missing parent (absent + warning); this is
    /// the opt-in validation for callers that want the
    /// [`FactoryError::OrphanedParent`] report instead.
    pub fn validate_instance(&self, name: &str) -> FactoryResult<()> {
        let mut current = self
            .materials
            .get(name)
            .ok_or_else(|| FactoryError::InstanceNotFound(name.to_string()))?;
        for _ in 0..MAX_PARENT_DEPTH {
            let Some(parent_name) = current.parent_name() else {
                return Ok(());
            };
            current = self.materials.get(parent_name).ok_or_else(|| {
                FactoryError::OrphanedParent {
                    child: current.name().to_string(),
                    parent: parent_name.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// One-time snapshot merge of declared properties between instances
    ///
    /// Copies the source's current values (all, or the listed subset) into
    /// the target. Distinct from the live parent link: later changes to the
    /// source are not reflected. Returns the number of properties copied.
    pub fn copy_declared_properties(
        &mut self,
        source: &str,
        target: &str,
        names: Option<&[&str]>,
    ) -> FactoryResult<usize> {
        if !self.materials.contains_key(target) {
            return Err(FactoryError::InstanceNotFound(target.to_string()));
        }
        let declared = self
            .materials
            .get(source)
            .ok_or_else(|| FactoryError::InstanceNotFound(source.to_string()))?
            .properties()
            .clone();
        let instance = self.materials.get_mut(target).expect("checked above");
        Ok(instance.properties_mut().merge_declared(&declared, names))
    }

    /// Set a property on a material instance
    ///
    /// If the stored value actually changes, every realization of the
    /// instance *and of every descendant that inherits from it* is dropped so
    /// the next request re-realizes against the new value. Returns whether
    /// the value changed.
    pub fn set_material_property(
        &mut self,
        material: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> FactoryResult<bool> {
        let instance = self
            .materials
            .get_mut(material)
            .ok_or_else(|| FactoryError::InstanceNotFound(material.to_string()))?;
        let changed = instance.properties_mut().set(name, value);
        if changed {
            let affected = self.dependents_of(material);
            for dependent in affected {
                self.drop_instance_realizations(&dependent);
            }
        }
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Property resolution
    // ------------------------------------------------------------------

    /// Effective value of a property for a material under a configuration
    ///
    /// Precedence, exactly: configuration overlay first (evaluated once at
    /// the top, so it overrides the entire inheritance chain uniformly), then
    /// the material's local declaration, then the parent chain. An empty
    /// configuration name means "no overlay". Absent is `None`, never a
    /// silent default.
    pub fn effective_property(
        &self,
        material: &str,
        configuration: &str,
        property: &str,
    ) -> Option<&PropertyValue> {
        if !configuration.is_empty() {
            if let Some(value) = self
                .configurations
                .get(configuration)
                .and_then(|overlay| overlay.get(property))
            {
                return Some(value);
            }
        }
        for instance in self.instance_chain(material) {
            if let Some(value) = instance.local_property(property) {
                return Some(value);
            }
        }
        None
    }

    /// Walk the parent chain, leaf first, with the bounded-depth guard
    fn instance_chain(&self, name: &str) -> Vec<&MaterialInstance> {
        let mut chain = Vec::new();
        let mut current = self.materials.get(name);
        while let Some(instance) = current {
            if chain.len() >= MAX_PARENT_DEPTH {
                log::warn!(
                    "material '{name}': parent chain exceeds depth {MAX_PARENT_DEPTH}, \
                     treating as a cycle and stopping"
                );
                break;
            }
            chain.push(instance);
            current = match instance.parent_name() {
                Some(parent) => {
                    let next = self.materials.get(parent);
                    if next.is_none() {
                        log::warn!(
                            "material '{}': parent '{parent}' does not exist, \
                             inherited lookups will come back absent",
                            instance.name()
                        );
                    }
                    next
                }
                None => None,
            };
        }
        chain
    }

    /// Names of every instance whose inheritance chain passes through `name`
    /// (including `name` itself)
    fn dependents_of(&self, name: &str) -> Vec<String> {
        self.materials
            .keys()
            .filter(|candidate| {
                self.instance_chain(candidate)
                    .iter()
                    .any(|instance| instance.name() == name)
            })
            .cloned()
            .collect()
    }

    /// Full effective snapshot for realization and fingerprint resolution
    ///
    /// Layered bottom-up: global settings, the active-configuration overlay
    /// on those settings, the parent chain (root first so the leaf wins), and
    /// the requested configuration overlay on top.
    fn resolved_snapshot(
        &self,
        material: &str,
        configuration: &str,
    ) -> BTreeMap<String, PropertyValue> {
        let mut snapshot = BTreeMap::new();
        let overlay = |set: &PropertySet, snapshot: &mut BTreeMap<String, PropertyValue>| {
            for (name, value) in set.iter() {
                snapshot.insert(name.to_string(), value.clone());
            }
        };

        overlay(&self.global_settings, &mut snapshot);
        if let Some(active) = self
            .active_configuration
            .as_deref()
            .and_then(|name| self.configurations.get(name))
        {
            overlay(active, &mut snapshot);
        }
        for instance in self.instance_chain(material).iter().rev() {
            overlay(instance.properties(), &mut snapshot);
        }
        if !configuration.is_empty() {
            if let Some(requested) = self.configurations.get(configuration) {
                overlay(requested, &mut snapshot);
            }
        }
        snapshot
    }

    // ------------------------------------------------------------------
    // Realization
    // ------------------------------------------------------------------

    /// Resolve a material for rendering under a configuration
    ///
    /// Creates the instance if it does not exist, realizes the platform
    /// material/configuration/pass on first use, compiles or reuses the
    /// shader permutations the effective properties imply, binds textures
    /// (deferring through the alias table), and fires the
    /// [`MaterialListener`] exactly once per (instance, configuration) first
    /// realization. Shader compilation and unresolved-alias failures
    /// propagate; the factory never substitutes fallbacks. A failed request
    /// leaves no partial platform state behind, so retrying after the cause
    /// is fixed starts clean.
    pub fn request_material(
        &mut self,
        name: &str,
        configuration: &str,
    ) -> FactoryResult<&MaterialInstance> {
        if !self.materials.contains_key(name) {
            self.create_material_instance(name, None)?;
        }
        if self.materials[name].is_realized(configuration) {
            return Ok(&self.materials[name]);
        }

        let snapshot = self.resolved_snapshot(name, configuration);

        // An unresolvable alias fails before any platform work happens, so
        // repeated failed requests accumulate nothing: set_texture_alias
        // followed by a fresh request realizes from scratch.
        if let Some(alias) = snapshot.get(PROP_TEXTURE_ALIAS).and_then(PropertyValue::as_text) {
            if !self.texture_aliases.contains_key(alias) {
                return Err(FactoryError::UnresolvedAlias {
                    material: name.to_string(),
                    alias: alias.to_string(),
                });
            }
        }

        // Platform material + configuration + pass.
        let material_handle = match self.materials[name].material_handle() {
            Some(handle) => handle,
            None => {
                let handle = self.platform.create_material(name);
                self.materials
                    .get_mut(name)
                    .expect("instance exists")
                    .set_material_handle(handle);
                handle
            }
        };
        self.platform.create_configuration(material_handle, configuration);
        let pass = self.platform.create_pass(material_handle, configuration);

        if let Some(shadow_caster) = snapshot.get(PROP_SHADOW_CASTER).and_then(PropertyValue::as_text)
        {
            self.platform
                .set_shadow_caster_material(material_handle, shadow_caster);
        }

        // Shader permutations implied by the effective properties.
        if self.shaders_enabled {
            for role in [PROP_VERTEX_PROGRAM, PROP_FRAGMENT_PROGRAM] {
                let Some(set_name) = snapshot.get(role).and_then(PropertyValue::as_text) else {
                    continue;
                };
                let set = self
                    .shader_sets
                    .entry(set_name.to_string())
                    .or_insert_with(|| {
                        log::debug!(
                            "shader set '{set_name}' requested before registration, \
                             creating with an empty dependency set"
                        );
                        ShaderSet::new(set_name, ShaderSetDefinition::default())
                    });
                let shader = match set.permutation(
                    self.platform.as_mut(),
                    self.language,
                    configuration,
                    |dependency| snapshot.get(dependency).cloned(),
                ) {
                    Ok(shader) => shader,
                    Err(err) => {
                        // Release the partially built pass so the failed
                        // attempt is fully rolled back.
                        self.platform.remove_configuration(material_handle, configuration);
                        return Err(err);
                    }
                };
                self.platform.bind_shader(pass, shader);

                // Seed shared parameters the set declared interest in.
                for (param, value) in self.shared_parameters.iter() {
                    if self.shader_sets[set_name].reads_shared_parameter(param) {
                        self.platform.update_shared_parameter(shader, param, value);
                    }
                }
            }
        }

        // Texture units, including alias deferral. Resolvability of the
        // alias was checked up front.
        let mut created_units = Vec::new();

        if let Some(real) = snapshot.get(PROP_TEXTURE).and_then(PropertyValue::as_text) {
            let unit = self.platform.create_texture_unit(pass, real);
            self.platform.bind_texture(unit, real);
            created_units.push(unit);
        }
        if let Some(alias) = snapshot.get(PROP_TEXTURE_ALIAS).and_then(PropertyValue::as_text) {
            if let Some(real) = self.texture_aliases.get(alias) {
                let unit = self.platform.create_texture_unit(pass, alias);
                self.platform.bind_texture(unit, real);
                self.alias_instances.insert(unit, alias.to_string());
                created_units.push(unit);
            }
        }

        {
            let instance = self.materials.get_mut(name).expect("instance exists");
            for unit in &created_units {
                instance.record_texture_unit(configuration, *unit);
            }
        }

        self.materials
            .get_mut(name)
            .expect("instance exists")
            .record_pass(configuration, pass);
        log::debug!("realized material '{name}' under configuration '{configuration}'");

        if let Some(listener) = self.listener.as_deref_mut() {
            let instance = self.materials.get(name).expect("instance exists");
            listener.material_created(instance, configuration);
        }

        Ok(&self.materials[name])
    }

    // ------------------------------------------------------------------
    // Shader sets
    // ------------------------------------------------------------------

    /// Register (or replace) a shader set definition
    ///
    /// Replacing an existing set drops its cache and every realization that
    /// was bound to it.
    pub fn register_shader_set(&mut self, name: &str, definition: ShaderSetDefinition) {
        let replaced = self
            .shader_sets
            .insert(name.to_string(), ShaderSet::new(name, definition))
            .is_some();
        if replaced {
            log::info!("shader set '{name}' re-registered, dropping dependent realizations");
            self.drop_realizations_using_sets(&[name.to_string()]);
        }
    }

    /// Non-throwing lookup of a shader set
    pub fn get_shader_set(&self, name: &str) -> Option<&ShaderSet> {
        self.shader_sets.get(name)
    }

    /// Globally enable or disable shader binding
    ///
    /// Invalidates nothing by itself; future realizations simply skip shader
    /// permutations while disabled (the platform's fixed-function or fallback
    /// path takes over).
    pub fn set_shaders_enabled(&mut self, enabled: bool) {
        if self.shaders_enabled != enabled {
            log::info!("shaders {}", if enabled { "enabled" } else { "disabled" });
        }
        self.shaders_enabled = enabled;
    }

    /// Whether shader binding is currently enabled
    pub fn shaders_enabled(&self) -> bool {
        self.shaders_enabled
    }

    /// Currently active shading language
    pub fn current_language(&self) -> ShaderLanguage {
        self.language
    }

    /// Switch the active shading language
    ///
    /// Every shader-set cache is invalidated and every realization dropped: a
    /// full recompilation under the new language happens lazily as materials
    /// are re-requested. Expected at start-up or on explicit user action,
    /// never per frame.
    pub fn set_current_language(&mut self, language: ShaderLanguage) {
        if self.language == language {
            return;
        }
        self.language = language;
        let mut evicted = 0;
        for set in self.shader_sets.values_mut() {
            evicted += set.invalidate_all();
        }
        let names: Vec<String> = self.materials.keys().cloned().collect();
        for name in names {
            self.drop_instance_realizations(&name);
        }
        log::info!(
            "shading language switched to {language:?}, {evicted} cached permutation(s) invalidated"
        );
    }

    // ------------------------------------------------------------------
    // Global settings and shared parameters
    // ------------------------------------------------------------------

    /// Set a global setting value
    ///
    /// If the stored value actually changes, exactly the shader sets whose
    /// dependency set includes `name` lose the cache entries built against a
    /// different value, and realizations bound to those sets are dropped for
    /// lazy re-realization. Returns whether the value changed.
    pub fn set_global_setting(&mut self, name: &str, value: impl Into<PropertyValue>) -> bool {
        let value = value.into();
        if !self.global_settings.set(name, value.clone()) {
            return false;
        }
        let mut affected_sets = Vec::new();
        let mut evicted = 0;
        for set in self.shader_sets.values_mut() {
            let count = set.invalidate_setting(name, Some(&value));
            if count > 0 {
                evicted += count;
                affected_sets.push(set.name().to_string());
            }
        }
        if !affected_sets.is_empty() {
            log::info!(
                "global setting '{name}' changed, {evicted} permutation(s) across \
                 {} shader set(s) scheduled for recompilation",
                affected_sets.len()
            );
            self.drop_realizations_using_sets(&affected_sets);
        }
        true
    }

    /// Read back a global setting
    pub fn global_setting(&self, name: &str) -> Option<&PropertyValue> {
        self.global_settings.get(name)
    }

    /// Update a shared parameter consumed by compiled shaders
    ///
    /// Never recompiles anything: the new value is pushed as a runtime
    /// uniform update to every already-compiled shader of every set that
    /// declared interest in the parameter.
    pub fn set_shared_parameter(&mut self, name: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        self.shared_parameters.set(name, value.clone());
        let mut pushed = 0;
        for set in self.shader_sets.values() {
            if !set.reads_shared_parameter(name) {
                continue;
            }
            for shader in set.cached_shaders() {
                self.platform.update_shared_parameter(shader, name, &value);
                pushed += 1;
            }
        }
        if pushed > 0 {
            log::debug!("shared parameter '{name}' pushed to {pushed} compiled shader(s)");
        }
    }

    /// Read back a shared parameter
    pub fn shared_parameter(&self, name: &str) -> Option<&PropertyValue> {
        self.shared_parameters.get(name)
    }

    // ------------------------------------------------------------------
    // Configurations
    // ------------------------------------------------------------------

    /// Register (or replace) a named configuration
    ///
    /// Re-registering identical content is a complete no-op (cached
    /// fingerprints stay observably unchanged). Replacing with different
    /// content invalidates every shader permutation and material realization
    /// made under that configuration name; if the name is also the active
    /// global-settings overlay, permutations elsewhere that resolved a
    /// dependency through the old overlay values are invalidated too.
    pub fn register_configuration(&mut self, name: &str, configuration: PropertySet) {
        if self.configurations.get(name) == Some(&configuration) {
            log::debug!("configuration '{name}' re-registered with identical content, no-op");
            return;
        }
        let previous = self.configurations.insert(name.to_string(), configuration);
        let Some(previous) = previous else {
            log::info!("registered configuration '{name}'");
            return;
        };

        log::info!("configuration '{name}' replaced, invalidating dependent state");
        let mut evicted = 0;
        for set in self.shader_sets.values_mut() {
            evicted += set.invalidate_configuration(name);
        }
        if evicted > 0 {
            log::debug!("evicted {evicted} permutation(s) built under configuration '{name}'");
        }

        let realized: Vec<String> = self
            .materials
            .iter()
            .filter(|(_, instance)| instance.is_realized(name))
            .map(|(instance_name, _)| instance_name.clone())
            .collect();
        for instance_name in realized {
            let instance = self.materials.get_mut(&instance_name).expect("collected above");
            let units = instance.drop_configuration(name);
            for unit in units {
                self.alias_instances.remove(&unit);
            }
            if let Some(material) = instance.material_handle() {
                self.platform.remove_configuration(material, name);
            }
        }

        // When the replaced name is the active global-settings overlay, its
        // values were baked into snapshots under *other* requested
        // configuration names as well. Invalidate per differing setting, the
        // same way set_global_setting does.
        if self.active_configuration.as_deref() == Some(name) {
            let changed: Vec<(String, Option<PropertyValue>)> = {
                let current = &self.configurations[name];
                let mut keys: BTreeSet<&str> = previous.iter().map(|(key, _)| key).collect();
                keys.extend(current.iter().map(|(key, _)| key));
                keys.into_iter()
                    .filter(|key| previous.get(key) != current.get(key))
                    .map(|key| {
                        let resolved = current
                            .get(key)
                            .or_else(|| self.global_settings.get(key))
                            .cloned();
                        (key.to_string(), resolved)
                    })
                    .collect()
            };
            let mut affected_sets: Vec<String> = Vec::new();
            let mut overlay_evicted = 0;
            for set in self.shader_sets.values_mut() {
                for (key, resolved) in &changed {
                    let count = set.invalidate_setting(key, resolved.as_ref());
                    if count > 0 {
                        overlay_evicted += count;
                        if !affected_sets.iter().any(|n| n == set.name()) {
                            affected_sets.push(set.name().to_string());
                        }
                    }
                }
            }
            if !affected_sets.is_empty() {
                log::info!(
                    "active overlay '{name}' changed, {overlay_evicted} permutation(s) across \
                     {} shader set(s) scheduled for recompilation",
                    affected_sets.len()
                );
                self.drop_realizations_using_sets(&affected_sets);
            }
        }
    }

    /// Non-throwing lookup of a registered configuration
    pub fn get_configuration(&self, name: &str) -> Option<&PropertySet> {
        self.configurations.get(name)
    }

    /// Select which configuration (if any) overlays the global settings
    ///
    /// Affects fingerprint resolution of future permutation requests only;
    /// nothing already realized is touched.
    pub fn set_active_configuration(&mut self, name: Option<&str>) {
        self.active_configuration = name.map(str::to_string);
        log::debug!("active configuration: {:?}", self.active_configuration);
    }

    // ------------------------------------------------------------------
    // Texture aliases
    // ------------------------------------------------------------------

    /// Bind the real texture name behind an alias
    ///
    /// Updates the alias table and immediately re-pushes the resolved name
    /// into every texture unit previously recorded for that alias — the one
    /// operation that reaches back into already-materialized objects instead
    /// of invalidating lazily. Safe to call as often as needed.
    pub fn set_texture_alias(&mut self, alias: &str, real_name: &str) {
        self.texture_aliases
            .insert(alias.to_string(), real_name.to_string());
        let mut updated = 0;
        for (unit, unit_alias) in &self.alias_instances {
            if unit_alias == alias {
                self.platform.bind_texture(*unit, real_name);
                updated += 1;
            }
        }
        log::debug!("texture alias '{alias}' -> '{real_name}' ({updated} live unit(s) updated)");
    }

    /// Real texture name currently bound to an alias, if any
    pub fn retrieve_texture_alias(&self, alias: &str) -> Option<&str> {
        self.texture_aliases.get(alias).map(String::as_str)
    }

    // ------------------------------------------------------------------
    // Listener
    // ------------------------------------------------------------------

    /// Attach the material-created listener (at most one; last caller wins)
    pub fn set_material_listener(&mut self, listener: Box<dyn MaterialListener>) {
        self.listener = Some(listener);
    }

    // ------------------------------------------------------------------
    // Internal invalidation plumbing
    // ------------------------------------------------------------------

    /// Drop every realization of one instance and release its platform state
    fn drop_instance_realizations(&mut self, name: &str) {
        let Some(instance) = self.materials.get_mut(name) else {
            return;
        };
        let units: Vec<_> = instance.all_texture_units().collect();
        for unit in units {
            self.alias_instances.remove(&unit);
        }
        if let Some(material) = instance.drop_all_realizations() {
            self.platform.remove_all(material);
        }
    }

    /// Drop realizations whose effective programs name one of the given sets
    fn drop_realizations_using_sets(&mut self, set_names: &[String]) {
        let mut affected: Vec<String> = Vec::new();
        for (name, instance) in &self.materials {
            let configurations: Vec<String> = instance
                .realized_configurations()
                .map(str::to_string)
                .collect();
            let uses_affected_set = configurations.iter().any(|configuration| {
                [PROP_VERTEX_PROGRAM, PROP_FRAGMENT_PROGRAM].iter().any(|role| {
                    self.effective_property(name, configuration, role)
                        .and_then(PropertyValue::as_text)
                        .is_some_and(|set| set_names.iter().any(|n| n == set))
                })
            });
            if uses_affected_set {
                affected.push(name.clone());
            }
        }
        for name in affected {
            self.drop_instance_realizations(&name);
        }
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("shaders_enabled", &self.shaders_enabled)
            .field("materials", &self.materials.len())
            .field("shader_sets", &self.shader_sets.len())
            .field("configurations", &self.configurations.len())
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}
