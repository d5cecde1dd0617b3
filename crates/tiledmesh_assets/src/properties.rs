//! Custom property collections.
//!
//! Tiled attaches `<properties>` to maps, tilesets, tiles, layers and objects.
//! Keys are matched case-insensitively and values stay string-backed, so every
//! accessor can fall back to a safe default instead of failing the load.

use std::collections::HashMap;
use std::str::FromStr;

/// Declared type of a property (the `type` attribute of `<property>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Color,
    File,
    Object,
    Class,
}

impl PropertyType {
    /// Map a `type` attribute to a property type.
    ///
    /// Unknown or missing types are treated as strings, which is what Tiled
    /// writes for properties created before typed properties existed.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.unwrap_or_default() {
            "int" => PropertyType::Int,
            "float" => PropertyType::Float,
            "bool" => PropertyType::Bool,
            "color" => PropertyType::Color,
            "file" => PropertyType::File,
            "object" => PropertyType::Object,
            "class" => PropertyType::Class,
            _ => PropertyType::String,
        }
    }
}

/// A single property value: the declared type plus the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyValue {
    pub kind: PropertyType,
    pub raw: String,
}

impl PropertyValue {
    pub fn new(kind: PropertyType, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Convert the raw text into `T`, if it parses.
    pub fn parse<T: FromTiledProperty>(&self) -> Option<T> {
        T::from_property(self)
    }
}

/// An 8-bit RGBA color as written by Tiled (`#AARRGGBB` or `RRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiledColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl FromStr for TiledColor {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let value = u32::from_str_radix(hex, 16)?;
        let [a, r, g, b] = value.to_be_bytes();
        if hex.len() <= 6 {
            Ok(TiledColor { r, g, b, a: 255 })
        } else {
            Ok(TiledColor { r, g, b, a })
        }
    }
}

/// Trait for types that can be read out of a property value.
///
/// Implementations return `None` when the raw text does not parse, so callers
/// can decide between a default and an error.
pub trait FromTiledProperty: Sized {
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromTiledProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        let raw = value.raw.trim();
        if raw.eq_ignore_ascii_case("true") || raw == "1" {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
            Some(false)
        } else {
            None
        }
    }
}

macro_rules! from_property_via_parse {
    ($($ty:ty),*) => {
        $(
            impl FromTiledProperty for $ty {
                fn from_property(value: &PropertyValue) -> Option<Self> {
                    value.raw.trim().parse().ok()
                }
            }
        )*
    };
}

from_property_via_parse!(i32, i64, u32, f32, f64, TiledColor);

impl FromTiledProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        Some(value.raw.clone())
    }
}

/// Case-insensitive property collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. The key is stored lower-cased; a later insert with the
    /// same key (in any case) replaces the earlier one.
    pub fn insert(&mut self, key: &str, value: PropertyValue) {
        self.values.insert(key.to_lowercase(), value);
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(&key.to_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(lower-cased key, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Typed lookup. `None` if the key is missing or the value does not parse.
    pub fn get_as<T: FromTiledProperty>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(PropertyValue::parse::<T>)
    }

    /// String value, or `""` if missing.
    pub fn get_string(&self, key: &str) -> String {
        self.get_as(key).unwrap_or_default()
    }

    /// Boolean value, or `false` if missing or unparsable.
    pub fn get_bool(&self, key: &str) -> bool {
        self.get_as(key).unwrap_or_default()
    }

    /// Integer value, or `0` if missing or unparsable.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_as(key).unwrap_or_default()
    }

    /// Float value, or `0.0` if missing or unparsable.
    pub fn get_float(&self, key: &str) -> f32 {
        self.get_as(key).unwrap_or_default()
    }
}
