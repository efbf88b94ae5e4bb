//! Type Descriptor Walker.
//!
//! Turns a [`TypeDescriptor`] into schema fragments. Record types are never
//! expanded inline: the walker emits a `$ref` and hands the record back through
//! the `discovered` list so the caller can queue it for its own definition. This
//! keeps self- and mutually-referential records finite.

use super::types::{Definitions, Schema};
use crate::describe::{FieldDescriptor, Kind, Primitive, TypeDescriptor, TypeIdent};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Walks type descriptors and produces schema fragments and definitions.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    well_known: HashMap<TypeIdent, Schema>,
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGenerator {
    /// Generator with the default well-known value types: `chrono::DateTime`
    /// (string, date-time) and `uuid::Uuid` (string, uuid).
    #[must_use]
    pub fn new() -> Self {
        let mut well_known = HashMap::new();
        well_known.insert(TypeIdent::new("chrono", "DateTime"), Schema::date_time());
        well_known.insert(TypeIdent::new("uuid", "Uuid"), Schema::uuid());
        Self { well_known }
    }

    /// Register another well-known value type.
    #[must_use]
    pub fn with_well_known(mut self, ident: TypeIdent, schema: Schema) -> Self {
        self.well_known.insert(ident, schema);
        self
    }

    /// Specialised schema for a well-known value type.
    ///
    /// Matches the type's own identity, or a record whose only field is an
    /// embedded well-known type. Named aliases carry their own identity and are
    /// therefore not matched.
    #[must_use]
    pub fn well_known(&self, desc: &TypeDescriptor) -> Option<Schema> {
        if let Some(schema) = desc.ident.as_ref().and_then(|id| self.well_known.get(id)) {
            return Some(schema.clone());
        }
        if !desc.is_record() {
            return None;
        }
        match desc.fields().as_slice() {
            [only] if only.embedded => only
                .descriptor()
                .ident
                .and_then(|id| self.well_known.get(&id).cloned()),
            _ => None,
        }
    }

    /// Schema of a primitive, keeping width and signedness as `format`.
    #[must_use]
    pub fn primitive_schema(primitive: Primitive) -> Schema {
        match primitive {
            Primitive::Bool => Schema::boolean(),
            Primitive::Int(bits) => Schema::formatted("integer", int_format(bits)),
            Primitive::Uint(bits) => Schema {
                minimum: Some(0.0),
                ..Schema::formatted("integer", int_format(bits))
            },
            Primitive::Float32 => Schema::formatted("number", "float"),
            Primitive::Float64 => Schema::formatted("number", "double"),
            Primitive::String => Schema::string(),
        }
    }

    /// Schema fragment for a field of type `desc`.
    ///
    /// Returns `None` for types that cannot be expressed (file parts,
    /// unsupported kinds); callers drop such fields. Records that need their own
    /// definition are pushed to `discovered`.
    pub fn field_schema(
        &self,
        desc: &TypeDescriptor,
        discovered: &mut Vec<TypeDescriptor>,
    ) -> Option<Schema> {
        if let Some(schema) = self.well_known(desc) {
            return Some(schema);
        }
        match &desc.kind {
            Kind::Primitive(p) => Some(Self::primitive_schema(*p)),
            Kind::Sequence(element) => self.field_schema(element, discovered).map(Schema::array),
            Kind::Map(value) => self.field_schema(value, discovered).map(Schema::map),
            Kind::Optional(inner) => self.field_schema(inner, discovered),
            Kind::Record(_) => self.record_schema(desc, discovered),
            Kind::Dynamic => Some(Schema::any_value()),
            Kind::FilePart | Kind::Unsupported => None,
        }
    }

    fn record_schema(
        &self,
        desc: &TypeDescriptor,
        discovered: &mut Vec<TypeDescriptor>,
    ) -> Option<Schema> {
        // newtype wrappers serialize as their inner value, unless inlining
        // would lead back to the same newtype
        if let Some(inner) = newtype_inner(desc) {
            let cyclic = desc
                .ident
                .is_some_and(|id| self.reaches_newtype(&inner, id, &mut Vec::new()));
            if !cyclic {
                return self.field_schema(&inner, discovered);
            }
        }
        let ident = desc.ident?;
        discovered.push(desc.clone());
        Some(Schema::reference(&ident.qualified()))
    }

    /// Whether inlining `desc` walks through newtype wrappers back to `target`.
    fn reaches_newtype(
        &self,
        desc: &TypeDescriptor,
        target: TypeIdent,
        visited: &mut Vec<TypeIdent>,
    ) -> bool {
        match &desc.kind {
            Kind::Sequence(inner) | Kind::Map(inner) | Kind::Optional(inner) => {
                self.reaches_newtype(inner, target, visited)
            }
            Kind::Record(_) => {
                if self.well_known(desc).is_some() {
                    return false;
                }
                let Some(ident) = desc.ident else { return false };
                if ident == target {
                    return true;
                }
                if visited.contains(&ident) {
                    return false;
                }
                visited.push(ident);
                newtype_inner(desc)
                    .is_some_and(|inner| self.reaches_newtype(&inner, target, visited))
            }
            _ => false,
        }
    }

    /// Object definition for a record, leaving out fields whose wire name is in
    /// `skip`.
    ///
    /// Flattened record fields contribute their own properties. A newtype gets the
    /// schema of the value it wraps.
    pub fn definition(
        &self,
        desc: &TypeDescriptor,
        skip: &BTreeSet<String>,
        discovered: &mut Vec<TypeDescriptor>,
    ) -> Schema {
        if let Some(inner) = newtype_inner(desc) {
            if let Some(schema) = self.field_schema(&inner, discovered) {
                return schema;
            }
        }
        let mut properties = BTreeMap::new();
        let mut seen = Vec::new();
        self.collect_properties(desc, skip, &mut properties, discovered, &mut seen);
        Schema::object(properties)
    }

    fn collect_properties(
        &self,
        desc: &TypeDescriptor,
        skip: &BTreeSet<String>,
        properties: &mut BTreeMap<String, Schema>,
        discovered: &mut Vec<TypeDescriptor>,
        seen: &mut Vec<TypeIdent>,
    ) {
        if let Some(ident) = desc.ident {
            if seen.contains(&ident) {
                return;
            }
            seen.push(ident);
        }
        for field in desc.fields() {
            if !field.is_exposed() || skip.contains(field.name) {
                continue;
            }
            if let Some(inner) = self.flattened_record(&field) {
                self.collect_properties(&inner, skip, properties, discovered, seen);
                continue;
            }
            match self.field_schema(&field.descriptor(), discovered) {
                Some(schema) => {
                    properties.insert(field.name.to_string(), schema);
                }
                None => debug!(
                    owner = %field.owner,
                    field = field.ident,
                    "dropping field with no schema representation"
                ),
            }
        }
    }

    /// Embedded record whose properties are merged into the owner.
    fn flattened_record(&self, field: &FieldDescriptor) -> Option<TypeDescriptor> {
        if !field.embedded {
            return None;
        }
        let inner = unwrap_optional(field.descriptor());
        (inner.is_record() && self.well_known(&inner).is_none()).then_some(inner)
    }

    /// Definitions for `desc` and every record reachable from it.
    ///
    /// Each distinct qualified name is emitted once; a work queue and a processed
    /// set replace direct recursion.
    #[must_use]
    pub fn derive(&self, desc: &TypeDescriptor) -> Definitions {
        let mut definitions = Definitions::new();
        let mut processed = HashSet::new();
        let mut queue = VecDeque::from([desc.clone()]);
        let no_skip = BTreeSet::new();

        while let Some(next) = queue.pop_front() {
            if !next.is_record() {
                continue;
            }
            let Some(ident) = next.ident else { continue };
            let name = ident.qualified();
            if !processed.insert(name.clone()) {
                continue;
            }
            let mut discovered = Vec::new();
            let schema = self.definition(&next, &no_skip, &mut discovered);
            definitions.insert(name, schema);
            queue.extend(discovered);
        }
        definitions
    }
}

fn int_format(bits: u8) -> &'static str {
    match bits {
        8 => "int8",
        16 => "int16",
        32 => "int32",
        _ => "int64",
    }
}

/// Inner value of a single-field wrapper whose field is not itself a record.
fn newtype_inner(desc: &TypeDescriptor) -> Option<TypeDescriptor> {
    if !desc.is_record() {
        return None;
    }
    match desc.fields().as_slice() {
        [only] if only.embedded && only.is_exposed() => {
            let inner = unwrap_optional(only.descriptor());
            (!inner.is_record()).then_some(inner)
        }
        _ => None,
    }
}

/// Strip pointer/optional wrappers.
pub(crate) fn unwrap_optional(mut desc: TypeDescriptor) -> TypeDescriptor {
    while let Kind::Optional(inner) = desc.kind {
        desc = *inner;
    }
    desc
}
