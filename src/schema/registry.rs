use super::types::{Definitions, Schema};
use super::walker::SchemaGenerator;
use crate::describe::TypeDescriptor;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Accumulates named definitions across every route of a document.
///
/// Types are queued by [`register`](Self::register) and expanded by
/// [`resolve`](Self::resolve), so skip sets contributed by later routes still
/// apply to a type registered earlier.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    generator: SchemaGenerator,
    skip_sets: HashMap<String, BTreeSet<String>>,
    queue: VecDeque<TypeDescriptor>,
    processed: HashSet<String>,
    definitions: Definitions,
}

impl DefinitionRegistry {
    #[must_use]
    pub fn new(generator: SchemaGenerator) -> Self {
        Self {
            generator,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn generator(&self) -> &SchemaGenerator {
        &self.generator
    }

    /// Exclude wire names from the definition of `desc`.
    ///
    /// Skip sets from several routes sharing a type are merged.
    pub fn add_skip_fields<I, S>(&mut self, desc: &TypeDescriptor, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(ident) = desc.ident {
            self.skip_sets
                .entry(ident.qualified())
                .or_default()
                .extend(fields.into_iter().map(Into::into));
        }
    }

    /// Queue `desc` for a definition and return the fragment that refers to it.
    ///
    /// Well-known types resolve to their specialised schema and are not queued.
    /// Registering the same type again is a no-op.
    pub fn register(&mut self, desc: &TypeDescriptor) -> Option<Schema> {
        if let Some(schema) = self.generator.well_known(desc) {
            return Some(schema);
        }
        if !desc.is_record() {
            let mut discovered = Vec::new();
            let schema = self.generator.field_schema(desc, &mut discovered);
            self.queue.extend(discovered);
            return schema;
        }
        let ident = desc.ident?;
        self.queue.push_back(desc.clone());
        Some(Schema::reference(&ident.qualified()))
    }

    /// Expand every queued record, and every record those reference, until the
    /// queue is empty.
    pub fn resolve(&mut self) {
        let empty = BTreeSet::new();
        while let Some(desc) = self.queue.pop_front() {
            if !desc.is_record() {
                continue;
            }
            let Some(ident) = desc.ident else { continue };
            let name = ident.qualified();
            if self.processed.contains(&name) {
                continue;
            }
            let skip = self.skip_sets.get(&name).unwrap_or(&empty);
            let mut discovered = Vec::new();
            let schema = self.generator.definition(&desc, skip, &mut discovered);
            debug!(
                definition = %name,
                discovered = discovered.len(),
                "registered definition"
            );
            self.definitions.insert(name.clone(), schema);
            self.processed.insert(name);
            self.queue.extend(discovered);
        }
    }

    #[must_use]
    pub fn contains(&self, qualified: &str) -> bool {
        self.definitions.contains_key(qualified)
    }

    #[must_use]
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Resolve what is still queued and hand back the definitions.
    #[must_use]
    pub fn into_definitions(mut self) -> Definitions {
        self.resolve();
        self.definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{Describe, FieldDescriptor, TypeIdent};

    const NS: &str = "shop::orders";
    const ORDER: TypeIdent = TypeIdent::new(NS, "Order");
    const LINE: TypeIdent = TypeIdent::new(NS, "Line");

    fn field(owner: TypeIdent, name: &'static str, ty: fn() -> TypeDescriptor) -> FieldDescriptor {
        FieldDescriptor {
            owner,
            ident: name,
            name,
            param: None,
            location: None,
            public: true,
            skip: false,
            embedded: false,
            ty,
        }
    }

    fn line() -> TypeDescriptor {
        TypeDescriptor::record(NS, "Line", || vec![field(LINE, "sku", String::describe)])
    }

    fn order() -> TypeDescriptor {
        TypeDescriptor::record(NS, "Order", || {
            vec![
                field(ORDER, "id", String::describe),
                field(ORDER, "lines", || TypeDescriptor::sequence(line())),
                field(ORDER, "created", chrono::DateTime::<chrono::Utc>::describe),
            ]
        })
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = DefinitionRegistry::default();
        registry.register(&order());
        registry.resolve();
        let first = registry.definitions().clone();
        registry.register(&order());
        registry.resolve();
        assert_eq!(registry.definitions(), &first);
        assert_eq!(first.len(), 2);
        assert!(registry.contains("orders.Line"));
    }

    #[test]
    fn test_skip_sets_are_merged_and_applied() {
        let mut registry = DefinitionRegistry::default();
        registry.register(&order());
        registry.add_skip_fields(&order(), ["id"]);
        registry.add_skip_fields(&order(), vec!["created".to_string()]);
        let defs = registry.into_definitions();
        let props = defs["orders.Order"].properties.clone().unwrap_or_default();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["lines"]);
    }

    #[test]
    fn test_well_known_types_are_not_queued() {
        let mut registry = DefinitionRegistry::default();
        let schema = registry.register(&uuid::Uuid::describe());
        assert_eq!(schema, Some(Schema::uuid()));
        assert!(registry.into_definitions().is_empty());
    }
}
