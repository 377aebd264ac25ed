//! Typed property storage and precedence resolution
//!
//! A [`PropertySet`] is the leaf data structure of the whole system: an
//! ordered mapping from property name to [`PropertyValue`], used for material
//! properties, configurations, global settings, and shared parameters alike.
//!
//! Parent fallback is deliberately *not* stored inside the set. The live
//! read-through inheritance chain is realized by the factory walking parent
//! names through its registry at request time, so a set stays a plain value
//! type that can be cloned, serialized, and compared.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Maximum depth of a material parent chain walk
///
/// A chain longer than this is treated as a cycle formed through late parent
/// registration; the walk stops and the property is reported absent.
pub const MAX_PARENT_DEPTH: usize = 64;

/// A typed material property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean flag (e.g. `has_vertex_colors`)
    Boolean(bool),
    /// Integral number (e.g. `num_lights`)
    Integer(i64),
    /// Floating-point scalar (e.g. `alpha`)
    Float(f32),
    /// Free-form text (shader names, texture names, enum-like switches)
    Text(String),
    /// Small float vector, typically 2-4 components (colors, offsets)
    Vector(Vec<f32>),
    /// Reference to a factory-owned shared parameter, resolved at bind time
    SharedRef(String),
}

impl PropertyValue {
    /// Interpret the value as a boolean, if it is one
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as an integer, if it is one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Interpret the value as a float, widening from an integer if needed
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Interpret the value as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a vector, if it is one
    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the shared parameter this value references, if any
    pub fn shared_ref(&self) -> Option<&str> {
        match self {
            Self::SharedRef(name) => Some(name),
            _ => None,
        }
    }

    /// Feed a canonical encoding of this value into a hasher
    ///
    /// Floats are hashed by bit pattern, which is exactly what a permutation
    /// fingerprint wants: a value is "the same" when it is bit-identical.
    pub fn write_fingerprint<H: Hasher>(&self, hasher: &mut H) {
        match self {
            Self::Boolean(b) => {
                0u8.hash(hasher);
                b.hash(hasher);
            }
            Self::Integer(i) => {
                1u8.hash(hasher);
                i.hash(hasher);
            }
            Self::Float(f) => {
                2u8.hash(hasher);
                f.to_bits().hash(hasher);
            }
            Self::Text(s) => {
                3u8.hash(hasher);
                s.hash(hasher);
            }
            Self::Vector(v) => {
                4u8.hash(hasher);
                v.len().hash(hasher);
                for component in v {
                    component.to_bits().hash(hasher);
                }
            }
            Self::SharedRef(name) => {
                5u8.hash(hasher);
                name.hash(hasher);
            }
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<f32>> for PropertyValue {
    fn from(value: Vec<f32>) -> Self {
        Self::Vector(value)
    }
}

/// An ordered collection of named property values
///
/// Backed by a `BTreeMap` so iteration order is deterministic, which the
/// shader permutation fingerprint relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: BTreeMap<String, PropertyValue>,
}

impl PropertySet {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a property, returning `true` if the stored value actually changed
    ///
    /// The change report drives downstream shader-cache invalidation: setting
    /// a property to the value it already holds must not invalidate anything.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> bool {
        let name = name.into();
        let value = value.into();
        match self.values.get(&name) {
            Some(existing) if *existing == value => false,
            _ => {
                self.values.insert(name, value);
                true
            }
        }
    }

    /// Look up a locally declared property
    ///
    /// This never consults a parent; chain resolution lives in the factory.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Whether the property is declared locally
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a locally declared property
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.remove(name)
    }

    /// Iterate over `(name, value)` pairs in deterministic (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of locally declared properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no properties are declared locally
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One-time snapshot merge of another set's declared properties
    ///
    /// Copies the source's current values into `self` (restricted to `names`
    /// when given), overwriting local entries. This is the explicit
    /// copy-on-create operation and is distinct from the live parent link:
    /// later changes to `source` are *not* reflected here.
    ///
    /// Returns the number of properties copied.
    pub fn merge_declared(&mut self, source: &Self, names: Option<&[&str]>) -> usize {
        let mut copied = 0;
        match names {
            None => {
                for (name, value) in &source.values {
                    self.values.insert(name.clone(), value.clone());
                    copied += 1;
                }
            }
            Some(names) => {
                for name in names {
                    if let Some(value) = source.values.get(*name) {
                        self.values.insert((*name).to_string(), value.clone());
                        copied += 1;
                    }
                }
            }
        }
        copied
    }
}

impl FromIterator<(String, PropertyValue)> for PropertySet {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_change() {
        let mut set = PropertySet::new();
        assert!(set.set("alpha", 1.0f32));
        assert!(!set.set("alpha", 1.0f32));
        assert!(set.set("alpha", 0.5f32));
    }

    #[test]
    fn test_local_lookup_only() {
        let mut set = PropertySet::new();
        set.set("diffuse", "red");
        assert_eq!(set.get("diffuse").and_then(PropertyValue::as_text), Some("red"));
        assert!(set.get("specular").is_none());
    }

    #[test]
    fn test_merge_declared_is_a_snapshot() {
        let mut source = PropertySet::new();
        source.set("diffuse", "red");
        source.set("alpha", 1.0f32);

        let mut target = PropertySet::new();
        let copied = target.merge_declared(&source, None);
        assert_eq!(copied, 2);

        // Mutating the source afterwards must not affect the copy.
        source.set("diffuse", "blue");
        assert_eq!(target.get("diffuse").and_then(PropertyValue::as_text), Some("red"));
    }

    #[test]
    fn test_merge_declared_subset() {
        let mut source = PropertySet::new();
        source.set("diffuse", "red");
        source.set("alpha", 1.0f32);

        let mut target = PropertySet::new();
        let copied = target.merge_declared(&source, Some(&["alpha", "missing"]));
        assert_eq!(copied, 1);
        assert!(target.get("diffuse").is_none());
        assert_eq!(target.get("alpha").and_then(PropertyValue::as_float), Some(1.0));
    }

    #[test]
    fn test_iteration_order_is_sorted() {
        let mut set = PropertySet::new();
        set.set("zeta", 1i64);
        set.set("alpha", 2i64);
        set.set("mid", 3i64);
        let names: Vec<_> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_fingerprint_distinguishes_variants() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::Hasher;

        let fingerprint = |value: &PropertyValue| {
            let mut hasher = DefaultHasher::new();
            value.write_fingerprint(&mut hasher);
            hasher.finish()
        };

        // Integer 1 and Float 1.0 must not collide via a shared encoding.
        assert_ne!(
            fingerprint(&PropertyValue::Integer(1)),
            fingerprint(&PropertyValue::Float(1.0))
        );
        // Text and SharedRef with the same payload are different values.
        assert_ne!(
            fingerprint(&PropertyValue::Text("fog".into())),
            fingerprint(&PropertyValue::SharedRef("fog".into()))
        );
    }

    #[test]
    fn test_deserialize_from_ron() {
        let declared: PropertySet = ron::from_str(
            r#"{
                "diffuse": Vector([1.0, 0.0, 0.0]),
                "alpha": Float(1.0),
                "vertex_program": Text("main_vs"),
                "fog_color": SharedRef("scene_fog"),
            }"#,
        )
        .expect("property set should deserialize");
        assert_eq!(declared.len(), 4);
        assert_eq!(
            declared.get("vertex_program").and_then(PropertyValue::as_text),
            Some("main_vs")
        );
        assert_eq!(declared.get("fog_color").and_then(PropertyValue::shared_ref), Some("scene_fog"));
    }
}
