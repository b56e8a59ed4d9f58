//! Registration-time field registry.
//!
//! A [`FieldMap`] is declared once per record type and maps public field
//! names to entity columns plus a logical [`FieldKind`] used for operand
//! coercion. Every filter, payload, and order lookup goes through it at
//! O(1); there is no runtime reflection over entity attributes.

use std::collections::HashMap;
use std::fmt;

use sea_orm::EntityTrait;

/// Logical field types used for operand coercion and validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    Time,
    Decimal,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "String",
            FieldKind::I64 => "I64",
            FieldKind::F64 => "F64",
            FieldKind::Bool => "Bool",
            FieldKind::Uuid => "Uuid",
            FieldKind::DateTimeUtc => "DateTimeUtc",
            FieldKind::Date => "Date",
            FieldKind::Time => "Time",
            FieldKind::Decimal => "Decimal",
        };
        f.write_str(name)
    }
}

/// One declared field: its column handle and logical kind.
#[derive(Clone, Debug)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// Name → field registry for one record type.
#[derive(Clone, Debug)]
#[must_use]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map.insert(name.into().to_lowercase(), Field { col, kind });
        self
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.to_lowercase())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
