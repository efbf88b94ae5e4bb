//! Derive macros for `routecontract`.
//!
//! `#[derive(Describe)]` implements `routecontract::describe::Describe` and
//! `routecontract::dispatcher::BindFiles` for a struct, reading these attributes:
//!
//! - `#[serde(rename = "..")]`, `#[serde(rename_all = "..")]`: wire names
//! - `#[serde(skip)]` (and `skip_serializing` / `skip_deserializing`), `#[param(skip)]`: skip marker
//! - `#[serde(flatten)]`: embedded field
//! - `#[param(path)]`, `#[param(query)]`, `#[param(body)]`: binding location
//! - `#[param(rename = "..")]`: parameter name differing from the wire name
//! - `#[describe(alias)]` on a single-field tuple struct: named alias of the inner type
//!
//! Enums whose variants are all unit variants are described as named strings.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, GenericArgument,
    Generics, Index, LitStr, PathArguments, Type, Visibility,
};

#[proc_macro_derive(Describe, attributes(param, describe))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let container = ContainerAttrs::parse(&input.attrs)?;
    let name = &input.ident;
    let name_str = LitStr::new(&name.to_string(), Span::call_site());
    let generics = add_describe_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let (describe_body, file_arms) = match &input.data {
        Data::Struct(data) => {
            if container.alias {
                (alias_body(&data.fields, &name_str, name)?, Vec::new())
            } else {
                let fields = collect_fields(&data.fields, &container)?;
                (record_body(&fields, &name_str), file_arms(&fields))
            }
        }
        Data::Enum(data) => {
            if let Some(variant) = data.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
                return Err(syn::Error::new_spanned(
                    variant,
                    "Describe supports enums with unit variants only",
                ));
            }
            (
                quote! {
                    ::routecontract::describe::TypeDescriptor::primitive(
                        ::routecontract::describe::Primitive::String,
                    )
                    .named(::core::module_path!(), #name_str)
                },
                Vec::new(),
            )
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Describe cannot be derived for unions",
            ))
        }
    };

    let bind_body = if file_arms.is_empty() {
        quote! {
            let _ = (ident, parts);
            false
        }
    } else {
        quote! {
            match ident {
                #(#file_arms)*
                _ => false,
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::routecontract::describe::Describe for #name #ty_generics #where_clause {
            fn describe() -> ::routecontract::describe::TypeDescriptor {
                #describe_body
            }
        }

        impl #impl_generics ::routecontract::dispatcher::BindFiles for #name #ty_generics #where_clause {
            fn bind_files(
                &mut self,
                ident: &str,
                parts: ::std::vec::Vec<::routecontract::server::FilePart>,
            ) -> bool {
                #bind_body
            }
        }
    })
}

fn add_describe_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::routecontract::describe::Describe));
    }
    generics
}

/// Container-level attributes.
#[derive(Default)]
struct ContainerAttrs {
    alias: bool,
    rename_all: Option<String>,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if attr.path().is_ident("describe") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("alias") {
                        out.alias = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown describe attribute, expected `alias`"))
                    }
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename_all") {
                        if let Some(rule) = serialize_name(&meta)? {
                            out.rename_all = Some(rule);
                        }
                    } else {
                        skip_meta_value(&meta)?;
                    }
                    Ok(())
                })?;
            }
        }
        Ok(out)
    }
}

/// Value of `rename = ".."` / `rename_all = ".."`, or the `serialize` half of
/// the `(serialize = "..", deserialize = "..")` form.
fn serialize_name(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let value: LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }
    let mut name = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("serialize") {
                let value: LitStr = inner.value()?.parse()?;
                name = Some(value.value());
            } else {
                skip_meta_value(&inner)?;
            }
            Ok(())
        })?;
    }
    Ok(name)
}

/// Consume the `= value` or `(...)` part of a serde attribute we do not read.
fn skip_meta_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream2 = content.parse()?;
    }
    Ok(())
}

enum Location {
    Path,
    Query,
    Body,
}

enum FileKind {
    Single,
    Multiple,
}

struct FieldInfo {
    /// `self.<member>` accessor
    member: TokenStream2,
    ident: String,
    name: String,
    param: Option<String>,
    location: Option<Location>,
    public: bool,
    skip: bool,
    embedded: bool,
    ty: Type,
    file: Option<FileKind>,
}

fn collect_fields(fields: &Fields, container: &ContainerAttrs) -> syn::Result<Vec<FieldInfo>> {
    let newtype = matches!(fields, Fields::Unnamed(u) if u.unnamed.len() == 1);
    let mut out = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let (member, ident) = match &field.ident {
            Some(ident) => (quote!(#ident), ident.to_string().trim_start_matches("r#").to_string()),
            None => {
                let index = Index::from(i);
                (quote!(#index), i.to_string())
            }
        };
        let mut info = FieldInfo {
            member,
            name: match (&field.ident, &container.rename_all) {
                (Some(_), Some(rule)) => apply_rename_rule(&ident, rule),
                _ => ident.clone(),
            },
            ident,
            param: None,
            location: None,
            public: matches!(field.vis, Visibility::Public(_)),
            skip: false,
            embedded: newtype,
            ty: field.ty.clone(),
            file: file_kind(&field.ty),
        };
        for attr in &field.attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        if let Some(name) = serialize_name(&meta)? {
                            info.name = name;
                        }
                    } else if meta.path.is_ident("skip")
                        || meta.path.is_ident("skip_serializing")
                        || meta.path.is_ident("skip_deserializing")
                    {
                        info.skip = true;
                    } else if meta.path.is_ident("flatten") {
                        info.embedded = true;
                    } else {
                        skip_meta_value(&meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("param") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("path") {
                        info.location = Some(Location::Path);
                    } else if meta.path.is_ident("query") {
                        info.location = Some(Location::Query);
                    } else if meta.path.is_ident("body") {
                        info.location = Some(Location::Body);
                    } else if meta.path.is_ident("skip") {
                        info.skip = true;
                    } else if meta.path.is_ident("rename") || meta.path.is_ident("name") {
                        let value: LitStr = meta.value()?.parse()?;
                        info.param = Some(value.value());
                    } else {
                        return Err(meta.error(
                            "unknown param attribute, expected `path`, `query`, `body`, `skip` or `rename = \"..\"`",
                        ));
                    }
                    Ok(())
                })?;
            }
        }
        out.push(info);
    }
    Ok(out)
}

fn record_body(fields: &[FieldInfo], name_str: &LitStr) -> TokenStream2 {
    let descriptors = fields.iter().map(|f| {
        let ident = &f.ident;
        let name = &f.name;
        let param = match &f.param {
            Some(p) => quote!(::core::option::Option::Some(#p)),
            None => quote!(::core::option::Option::None),
        };
        let location = match &f.location {
            Some(Location::Path) => {
                quote!(::core::option::Option::Some(::routecontract::describe::Location::Path))
            }
            Some(Location::Query) => {
                quote!(::core::option::Option::Some(::routecontract::describe::Location::Query))
            }
            Some(Location::Body) => {
                quote!(::core::option::Option::Some(::routecontract::describe::Location::Body))
            }
            None => quote!(::core::option::Option::None),
        };
        let public = f.public;
        let skip = f.skip;
        let embedded = f.embedded;
        let ty = &f.ty;
        // hidden fields may hold types without a description
        let describe = if f.public && !f.skip {
            quote!(<#ty as ::routecontract::describe::Describe>::describe)
        } else {
            quote!(::routecontract::describe::TypeDescriptor::unsupported)
        };
        quote! {
            ::routecontract::describe::FieldDescriptor {
                owner,
                ident: #ident,
                name: #name,
                param: #param,
                location: #location,
                public: #public,
                skip: #skip,
                embedded: #embedded,
                ty: #describe,
            }
        }
    });
    quote! {
        ::routecontract::describe::TypeDescriptor::record(
            ::core::module_path!(),
            #name_str,
            || {
                #[allow(unused_variables)]
                let owner = ::routecontract::describe::TypeIdent::new(
                    ::core::module_path!(),
                    #name_str,
                );
                ::std::vec![#(#descriptors),*]
            },
        )
    }
}

fn alias_body(fields: &Fields, name_str: &LitStr, name: &syn::Ident) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unnamed(u) if u.unnamed.len() == 1 => {
            let inner = &u.unnamed[0].ty;
            Ok(quote! {
                <#inner as ::routecontract::describe::Describe>::describe()
                    .named(::core::module_path!(), #name_str)
            })
        }
        _ => Err(syn::Error::new_spanned(
            name,
            "#[describe(alias)] requires a tuple struct with exactly one field",
        )),
    }
}

fn file_arms(fields: &[FieldInfo]) -> Vec<TokenStream2> {
    fields
        .iter()
        .filter(|f| f.public && !f.skip && f.file.is_some())
        .map(|f| {
            let ident = &f.ident;
            let member = &f.member;
            quote! {
                #ident => {
                    ::routecontract::dispatcher::FileSlot::fill(&mut self.#member, parts);
                    true
                }
            }
        })
        .collect()
}

/// `FilePart`, `Option<FilePart>` or `Vec<FilePart>`.
fn file_kind(ty: &Type) -> Option<FileKind> {
    let segment = last_segment(ty)?;
    if segment.ident == "FilePart" {
        return Some(FileKind::Single);
    }
    let wrapper = segment.ident.to_string();
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let inner = args.args.iter().find_map(|a| match a {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })?;
    if last_segment(inner)?.ident != "FilePart" {
        return None;
    }
    match wrapper.as_str() {
        "Option" => Some(FileKind::Single),
        "Vec" => Some(FileKind::Multiple),
        _ => None,
    }
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) => p.path.segments.last(),
        _ => None,
    }
}

fn apply_rename_rule(field: &str, rule: &str) -> String {
    let words: Vec<&str> = field.split('_').filter(|w| !w.is_empty()).collect();
    match rule {
        "lowercase" => field.to_lowercase(),
        "UPPERCASE" => field.to_uppercase(),
        "camelCase" => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.to_string() } else { capitalize(w) })
            .collect(),
        "PascalCase" => words.iter().map(|w| capitalize(w)).collect(),
        "SCREAMING_SNAKE_CASE" => field.to_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.replace('_', "-").to_uppercase(),
        _ => field.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_rules() {
        assert_eq!(apply_rename_rule("created_at", "camelCase"), "createdAt");
        assert_eq!(apply_rename_rule("created_at", "PascalCase"), "CreatedAt");
        assert_eq!(apply_rename_rule("created_at", "kebab-case"), "created-at");
        assert_eq!(apply_rename_rule("id", "UPPERCASE"), "ID");
    }

    #[test]
    fn test_file_kind_detection() {
        let single: Type = parse_quote!(Option<routecontract::FilePart>);
        let many: Type = parse_quote!(Vec<FilePart>);
        let other: Type = parse_quote!(Vec<String>);
        assert!(matches!(file_kind(&single), Some(FileKind::Single)));
        assert!(matches!(file_kind(&many), Some(FileKind::Multiple)));
        assert!(file_kind(&other).is_none());
    }
}
