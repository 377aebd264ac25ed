//! A named material with inheritance and lazily realized platform state

use std::collections::HashMap;

use crate::platform::{MaterialHandle, PassHandle, TextureUnitHandle};
use crate::properties::{PropertySet, PropertyValue};

/// A named, optionally-inheriting bundle of properties plus realized platform
/// handles per configuration
///
/// The parent link is a *name*, resolved through the factory at request time:
/// a property not declared locally is looked up in the parent when the lookup
/// happens, not copied at creation. Changes to a parent's properties are
/// therefore visible to children without any propagation step. The one-time
/// property snapshot is a separate operation
/// ([`Factory::copy_declared_properties`](crate::factory::Factory::copy_declared_properties));
/// the two mechanisms coexist and must not be conflated.
#[derive(Debug)]
pub struct MaterialInstance {
    name: String,
    parent: Option<String>,
    properties: PropertySet,
    /// Platform material object, created on first realization
    material: Option<MaterialHandle>,
    /// Realized pass per configuration; key presence doubles as the
    /// exactly-once marker for the `material_created` listener event
    passes: HashMap<String, PassHandle>,
    /// Texture units created per configuration, for reverse-index cleanup
    texture_units: HashMap<String, Vec<TextureUnitHandle>>,
}

impl MaterialInstance {
    pub(crate) fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            properties: PropertySet::new(),
            material: None,
            passes: HashMap::new(),
            texture_units: HashMap::new(),
        }
    }

    /// Unique name of this instance
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent instance, if an inheritance link exists
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Locally declared properties (no parent fallback)
    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// Look up a locally declared property
    pub fn local_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Platform material handle, if the instance has been realized
    pub fn material_handle(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Pass handle realized for a configuration, if any
    pub fn pass_handle(&self, configuration: &str) -> Option<PassHandle> {
        self.passes.get(configuration).copied()
    }

    /// Whether the instance has been realized under the configuration
    pub fn is_realized(&self, configuration: &str) -> bool {
        self.passes.contains_key(configuration)
    }

    /// Configurations this instance is currently realized under
    pub fn realized_configurations(&self) -> impl Iterator<Item = &str> {
        self.passes.keys().map(String::as_str)
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertySet {
        &mut self.properties
    }

    pub(crate) fn set_material_handle(&mut self, handle: MaterialHandle) {
        self.material = Some(handle);
    }

    pub(crate) fn record_pass(&mut self, configuration: &str, pass: PassHandle) {
        self.passes.insert(configuration.to_string(), pass);
    }

    pub(crate) fn record_texture_unit(&mut self, configuration: &str, unit: TextureUnitHandle) {
        self.texture_units
            .entry(configuration.to_string())
            .or_default()
            .push(unit);
    }

    /// All texture units across every realized configuration
    pub(crate) fn all_texture_units(&self) -> impl Iterator<Item = TextureUnitHandle> + '_ {
        self.texture_units.values().flatten().copied()
    }

    /// Forget the realization made under one configuration
    ///
    /// Returns the texture units that belonged to it so the factory can prune
    /// its alias reverse index. The next `request_material` for that
    /// configuration re-realizes from scratch (and fires the listener again).
    pub(crate) fn drop_configuration(&mut self, configuration: &str) -> Vec<TextureUnitHandle> {
        self.passes.remove(configuration);
        self.texture_units.remove(configuration).unwrap_or_default()
    }

    /// Forget every realization; platform resources are released by the caller
    pub(crate) fn drop_all_realizations(&mut self) -> Option<MaterialHandle> {
        self.passes.clear();
        self.texture_units.clear();
        self.material.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realization_marker() {
        let mut instance = MaterialInstance::new("rock", None);
        assert!(!instance.is_realized("shadow"));

        instance.record_pass("shadow", PassHandle(7));
        assert!(instance.is_realized("shadow"));
        assert_eq!(instance.pass_handle("shadow"), Some(PassHandle(7)));

        instance.drop_configuration("shadow");
        assert!(!instance.is_realized("shadow"));
    }

    #[test]
    fn test_drop_configuration_returns_its_units() {
        let mut instance = MaterialInstance::new("rock", None);
        instance.record_pass("", PassHandle(1));
        instance.record_pass("shadow", PassHandle(2));
        instance.record_texture_unit("", TextureUnitHandle(10));
        instance.record_texture_unit("shadow", TextureUnitHandle(11));

        let units = instance.drop_configuration("shadow");
        assert_eq!(units, vec![TextureUnitHandle(11)]);
        // The main configuration is untouched.
        assert!(instance.is_realized(""));
        assert_eq!(instance.all_texture_units().collect::<Vec<_>>(), vec![TextureUnitHandle(10)]);
    }

    #[test]
    fn test_drop_all_realizations_returns_the_material() {
        let mut instance = MaterialInstance::new("rock", Some("stone_base".to_string()));
        instance.set_material_handle(MaterialHandle(3));
        instance.record_pass("", PassHandle(1));
        instance.record_texture_unit("", TextureUnitHandle(9));

        assert_eq!(instance.drop_all_realizations(), Some(MaterialHandle(3)));
        assert!(!instance.is_realized(""));
        assert_eq!(instance.all_texture_units().count(), 0);
        assert_eq!(instance.parent_name(), Some("stone_base"));
    }
}
