use std::fmt;

/// Trait implemented by every type that can appear in a route contract.
pub trait Describe {
    /// Return the descriptor for this type.
    fn describe() -> TypeDescriptor;
}

/// Primitive value kinds, tagged with signedness and bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    /// Signed integer of the given bit width (8, 16, 32 or 64)
    Int(u8),
    /// Unsigned integer of the given bit width (8, 16, 32 or 64)
    Uint(u8),
    Float32,
    Float64,
    String,
}

/// Identity of a named type: the module it lives in plus its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIdent {
    /// Rust module path, e.g. `users_api::handlers::users`
    pub namespace: &'static str,
    /// Type name, e.g. `CreateUserReq`
    pub name: &'static str,
}

impl TypeIdent {
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self { namespace, name }
    }

    /// Package-qualified definition name: last namespace segment, a dot, the type name.
    ///
    /// `users_api::handlers::users` + `CreateUserReq` becomes `users.CreateUserReq`.
    #[must_use]
    pub fn qualified(&self) -> String {
        match self.namespace.rsplit("::").next() {
            Some(last) if !last.is_empty() => format!("{}.{}", last, self.name),
            _ => self.name.to_string(),
        }
    }
}

impl fmt::Display for TypeIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.namespace, self.name)
    }
}

/// Shape of a described type.
#[derive(Debug, Clone)]
pub enum Kind {
    Primitive(Primitive),
    /// Sequence of the element type; fixed-size arrays use this too
    Sequence(Box<TypeDescriptor>),
    /// Mapping from string keys to the value type
    Map(Box<TypeDescriptor>),
    /// Pointer / optional wrapper, unwrapped transparently
    Optional(Box<TypeDescriptor>),
    /// Record with named fields, produced lazily
    Record(fn() -> Vec<FieldDescriptor>),
    /// Untyped value
    Dynamic,
    /// Uploaded file part
    FilePart,
    /// Anything the walker cannot express; dropped from definitions
    Unsupported,
}

/// Opaque handle describing a type for schema derivation and binding.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub ident: Option<TypeIdent>,
    pub kind: Kind,
}

impl TypeDescriptor {
    #[must_use]
    pub fn primitive(p: Primitive) -> Self {
        Self {
            ident: None,
            kind: Kind::Primitive(p),
        }
    }

    #[must_use]
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self {
            ident: None,
            kind: Kind::Sequence(Box::new(element)),
        }
    }

    #[must_use]
    pub fn map(value: TypeDescriptor) -> Self {
        Self {
            ident: None,
            kind: Kind::Map(Box::new(value)),
        }
    }

    #[must_use]
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self {
            ident: None,
            kind: Kind::Optional(Box::new(inner)),
        }
    }

    /// Describe a record; `fields` is evaluated only when the record is walked.
    #[must_use]
    pub fn record(
        namespace: &'static str,
        name: &'static str,
        fields: fn() -> Vec<FieldDescriptor>,
    ) -> Self {
        Self {
            ident: Some(TypeIdent::new(namespace, name)),
            kind: Kind::Record(fields),
        }
    }

    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            ident: None,
            kind: Kind::Dynamic,
        }
    }

    #[must_use]
    pub fn file_part() -> Self {
        Self {
            ident: None,
            kind: Kind::FilePart,
        }
    }

    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            ident: None,
            kind: Kind::Unsupported,
        }
    }

    /// Give this shape its own identity, keeping the kind.
    ///
    /// This is how named aliases are described: the alias takes the shape of the
    /// aliased type but is a distinct type for well-known detection.
    #[must_use]
    pub fn named(mut self, namespace: &'static str, name: &'static str) -> Self {
        self.ident = Some(TypeIdent::new(namespace, name));
        self
    }

    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self.kind, Kind::Record(_))
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.kind, Kind::Primitive(Primitive::String))
    }

    /// Fields of a record type, or an empty list for every other kind.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        match self.kind {
            Kind::Record(fields) => fields(),
            _ => Vec::new(),
        }
    }

    /// Human-readable name used in registration errors and logs.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(ident) = &self.ident {
            return ident.qualified();
        }
        match &self.kind {
            Kind::Primitive(p) => format!("{p:?}").to_lowercase(),
            Kind::Sequence(inner) => format!("[]{}", inner.display_name()),
            Kind::Map(inner) => format!("map[string]{}", inner.display_name()),
            Kind::Optional(inner) => format!("*{}", inner.display_name()),
            Kind::Record(_) => "record".to_string(),
            Kind::Dynamic => "any".to_string(),
            Kind::FilePart => "file".to_string(),
            Kind::Unsupported => "unsupported".to_string(),
        }
    }
}

/// Binding location declared on a field with `#[param(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Path,
    Query,
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path => write!(f, "path"),
            Location::Query => write!(f, "query"),
            Location::Body => write!(f, "body"),
        }
    }
}

/// Metadata of one record field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Record that declares the field
    pub owner: TypeIdent,
    /// Rust field identifier (tuple fields use their index)
    pub ident: &'static str,
    /// JSON wire name
    pub name: &'static str,
    /// Explicit parameter name from `#[param(rename = "...")]`
    pub param: Option<&'static str>,
    /// Binding location from `#[param(path|query|body)]`; `None` means infer
    pub location: Option<Location>,
    /// `pub` fields only; others never reach the schema or binding
    pub public: bool,
    /// Skip marker
    pub skip: bool,
    /// Anonymous/embedded field (newtype inner value or `#[serde(flatten)]`)
    pub embedded: bool,
    pub ty: fn() -> TypeDescriptor,
}

impl FieldDescriptor {
    /// Name used for path, query and file-upload parameters.
    #[must_use]
    pub fn param_name(&self) -> &'static str {
        self.param.unwrap_or(self.name)
    }

    /// Whether the field takes part in schema generation and binding at all.
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        self.public && !self.skip
    }

    #[must_use]
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.ty)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_uses_last_namespace_segment() {
        let ident = TypeIdent::new("users_api::handlers::users", "CreateUserReq");
        assert_eq!(ident.qualified(), "users.CreateUserReq");
        assert_eq!(TypeIdent::new("", "Bare").qualified(), "Bare");
    }

    #[test]
    fn test_named_keeps_kind() {
        let d = TypeDescriptor::primitive(Primitive::String).named("app::models", "UserName");
        assert!(d.is_string());
        assert_eq!(d.display_name(), "models.UserName");
    }

    #[test]
    fn test_display_name_of_containers() {
        let d = TypeDescriptor::map(TypeDescriptor::sequence(TypeDescriptor::primitive(
            Primitive::Int(64),
        )));
        assert_eq!(d.display_name(), "map[string][]int(64)");
    }
}
