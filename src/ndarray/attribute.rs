//! Typed frame attributes.

use crate::util::AttrDataType;

/// Value carried by an [`Attribute`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AttrValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    Float64(f64),
    String(String),
    /// Declared but never given a value.
    #[default]
    Undefined,
}

impl AttrValue {
    /// Type of this value.
    pub fn data_type(&self) -> AttrDataType {
        match self {
            Self::Int8(_) => AttrDataType::Int8,
            Self::UInt8(_) => AttrDataType::UInt8,
            Self::Int16(_) => AttrDataType::Int16,
            Self::UInt16(_) => AttrDataType::UInt16,
            Self::Int32(_) => AttrDataType::Int32,
            Self::UInt32(_) => AttrDataType::UInt32,
            Self::Float32(_) => AttrDataType::Float32,
            Self::Float64(_) => AttrDataType::Float64,
            Self::String(_) => AttrDataType::String,
            Self::Undefined => AttrDataType::Undefined,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// A named, described, typed scalar attached to a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    name: String,
    description: String,
    value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    #[inline]
    pub fn data_type(&self) -> AttrDataType {
        self.value.data_type()
    }

    pub fn set_value(&mut self, value: impl Into<AttrValue>) {
        self.value = value.into();
    }
}

/// Ordered attribute collection.
///
/// Iteration follows insertion order. Adding an attribute whose name is
/// already present replaces it in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeList {
    entries: Vec<Attribute>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute.
    pub fn add(&mut self, attr: Attribute) {
        match self.entries.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.entries.push(attr),
        }
    }

    /// Find an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.entries.iter_mut().find(|a| a.name == name)
    }

    /// Remove an attribute and return it.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let pos = self.entries.iter().position(|a| a.name == name)?;
        Some(self.entries.remove(pos))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a AttributeList {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Attribute> for AttributeList {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut list = Self::new();
        for attr in iter {
            list.add(attr);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(AttrValue::from(1u8).data_type(), AttrDataType::UInt8);
        assert_eq!(AttrValue::from(-1i16).data_type(), AttrDataType::Int16);
        assert_eq!(AttrValue::from(2.5f64).data_type(), AttrDataType::Float64);
        assert_eq!(AttrValue::from("abc").data_type(), AttrDataType::String);
        assert_eq!(AttrValue::default().data_type(), AttrDataType::Undefined);
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let mut list = AttributeList::new();
        list.add(Attribute::new("Zeta", "", 1i32));
        list.add(Attribute::new("Alpha", "", 2i32));
        list.add(Attribute::new("Mid", "", 3i32));
        let names: Vec<_> = list.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_add_replaces_in_place() {
        let mut list = AttributeList::new();
        list.add(Attribute::new("A", "first", 1i32));
        list.add(Attribute::new("B", "", 2i32));
        list.add(Attribute::new("A", "second", 10i32));
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().next().map(|a| a.description()), Some("second"));
        assert_eq!(list.get("A").map(|a| a.value().clone()), Some(AttrValue::Int32(10)));
    }

    #[test]
    fn test_remove() {
        let mut list: AttributeList = [
            Attribute::new("A", "", 1u8),
            Attribute::new("B", "", "x"),
        ]
        .into_iter()
        .collect();
        assert!(list.remove("A").is_some());
        assert!(list.remove("A").is_none());
        assert_eq!(list.len(), 1);
    }
}
