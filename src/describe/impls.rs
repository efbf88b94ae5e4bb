use super::types::{Describe, Primitive, TypeDescriptor};
use crate::server::FilePart;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

macro_rules! describe_primitive {
    ($($ty:ty => $prim:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::primitive($prim)
                }
            }
        )*
    };
}

describe_primitive! {
    bool => Primitive::Bool,
    i8 => Primitive::Int(8),
    i16 => Primitive::Int(16),
    i32 => Primitive::Int(32),
    i64 => Primitive::Int(64),
    isize => Primitive::Int(64),
    u8 => Primitive::Uint(8),
    u16 => Primitive::Uint(16),
    u32 => Primitive::Uint(32),
    u64 => Primitive::Uint(64),
    usize => Primitive::Uint(64),
    f32 => Primitive::Float32,
    f64 => Primitive::Float64,
    String => Primitive::String,
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(T::describe())
    }
}

impl<T: Describe, S> Describe for HashMap<String, T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(T::describe())
    }
}

impl<T: Describe> Describe for BTreeMap<String, T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::map(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::dynamic()
    }
}

impl Describe for FilePart {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::file_part()
    }
}

// The timestamp's fields are private, so it is an opaque record; the walker
// recognises it by identity.
impl<Tz: chrono::TimeZone> Describe for chrono::DateTime<Tz> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::record("chrono", "DateTime", Vec::new)
    }
}

// Stored as 16 raw bytes; a named alias of it keeps that array shape.
impl Describe for uuid::Uuid {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::sequence(TypeDescriptor::primitive(Primitive::Uint(8))).named("uuid", "Uuid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Kind;

    #[test]
    fn test_references_are_optional_wrappers() {
        match <Option<Box<String>>>::describe().kind {
            Kind::Optional(inner) => match inner.kind {
                Kind::Optional(innermost) => assert!(innermost.is_string()),
                other => panic!("unexpected kind {other:?}"),
            },
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_fixed_arrays_are_sequences() {
        assert!(matches!(<[String; 2]>::describe().kind, Kind::Sequence(_)));
    }

    #[test]
    fn test_well_known_types_carry_identity() {
        let ts = <chrono::DateTime<chrono::Utc>>::describe();
        assert_eq!(ts.ident.map(|i| i.name), Some("DateTime"));
        let id = uuid::Uuid::describe();
        assert_eq!(id.ident.map(|i| i.qualified()), Some("uuid.Uuid".to_string()));
    }
}
