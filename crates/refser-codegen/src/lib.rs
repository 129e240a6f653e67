// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DataEnum, DataStruct, DeriveInput, Field, Fields, GenericParam,
    LitInt, LitStr, Type, Visibility,
};

/// Type-level selection policy requested by `#[refser(object ...)]`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ObjectMode {
    OptOut,
    OptIn,
}

/// Parsed container attributes.
struct ContainerAttrs {
    mode: ObjectMode,
    /// `#[refser(object ...)]` present: the shape needs no registration.
    auto_permit: bool,
}

/// Parsed field attributes.
#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    include: bool,
    rename: Option<LitStr>,
    order: Option<u16>,
}

impl FieldAttrs {
    fn is_marked(&self) -> bool {
        self.include || self.rename.is_some() || self.order.is_some()
    }
}

/// `#[derive(Reflect)]`: generates `Reflect` plus the member table.
///
/// Structs with named fields get `Reflect` and `Composite`; the member table
/// holds one entry per field with compiled get/set accessors. Unit-only enums
/// get `Reflect` and `ReflectEnum`.
///
/// Container attributes:
/// - `#[refser(object)]`: opt-out selection, permitted without registration
/// - `#[refser(object = "opt_in")]` / `#[refser(object = "opt_out")]`
///
/// Field attributes (combinable):
/// - `#[refser(skip)]`, `#[refser(include)]`
/// - `#[refser(rename = "wire_name")]`, `#[refser(order = 3)]`
///
/// Fields named `_*` or typed `PhantomData<_>` are never serialized.
///
/// Example:
/// ```ignore
/// use refser::Reflect;
///
/// #[derive(Reflect, Default)]
/// #[refser(object)]
/// pub struct Player {
///     pub name: String,
///     #[refser(order = 4)]
///     pub score: u32,
///     #[refser(skip)]
///     pub session: u64,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(refser))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data) => expand_struct(&input, data),
        Data::Enum(data) => expand_enum(&input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input,
            "Reflect cannot be derived for unions",
        )),
    };

    expanded
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn expand_struct(input: &DeriveInput, data: &DataStruct) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let container = parse_container_attrs(input)?;

    let fields = match &data.fields {
        Fields::Named(f) => &f.named,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Only structs with named fields are supported",
            ))
        }
    };

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Reflect types must be 'static; lifetime parameters are not supported",
        ));
    }

    let mut members = Vec::new();
    for field in fields {
        members.push(expand_member(field, container.mode)?);
    }

    // Every type parameter must itself be reflectable and defaultable.
    let mut generics = input.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(tp) = param {
            tp.bounds.push(syn::parse_quote!(::refser::Reflect));
            tp.bounds.push(syn::parse_quote!(::core::default::Default));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let template = if input.generics.type_params().next().is_some() {
        let template = name.to_string();
        quote! { ::core::option::Option::Some(#template) }
    } else {
        quote! { ::core::option::Option::None }
    };
    let auto_permit = container.auto_permit;
    let mode = match container.mode {
        ObjectMode::OptOut => quote! { ::refser::reflect::ObjectMode::OptOut },
        ObjectMode::OptIn => quote! { ::refser::reflect::ObjectMode::OptIn },
    };

    Ok(quote! {
        impl #impl_generics ::refser::reflect::Reflect for #name #ty_generics #where_clause {
            fn shape() -> ::refser::reflect::Shape {
                ::refser::reflect::Shape::composite::<Self>(#template, #auto_permit)
            }

            fn build_codec(
                registry: &::refser::registry::CodecRegistry,
            ) -> ::refser::Result<::std::sync::Arc<dyn ::refser::codec::Codec>> {
                ::core::result::Result::Ok(::std::sync::Arc::new(
                    ::refser::structural::StructuralCodec::<Self>::derive(registry)?,
                ))
            }
        }

        impl #impl_generics ::refser::reflect::Composite for #name #ty_generics #where_clause {
            const OBJECT_MODE: ::refser::reflect::ObjectMode = #mode;

            fn members() -> ::std::vec::Vec<::refser::reflect::Member<Self>> {
                ::std::vec![
                    #(#members),*
                ]
            }
        }
    })
}

/// One member table entry.
///
/// Fields that can never be selected get an accessor-less entry, so their
/// types need not implement `Reflect`.
fn expand_member(field: &Field, mode: ObjectMode) -> syn::Result<proc_macro2::TokenStream> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(syn::Error::new_spanned(field, "Field must have a name"));
    };
    let ident_str = ident.to_string();
    let ty = &field.ty;
    let attrs = parse_field_attrs(field)?;

    let public = matches!(field.vis, Visibility::Public(_));
    let synthetic = ident_str.starts_with('_') || is_phantom(ty);
    let selected = !attrs.skip
        && !synthetic
        && match mode {
            ObjectMode::OptIn => attrs.is_marked(),
            ObjectMode::OptOut => public || attrs.is_marked(),
        };

    let base = if selected {
        quote! {
            ::refser::reflect::Member::<Self>::field::<#ty>(
                #ident_str,
                |target| &target.#ident,
                |target, value| {
                    target.#ident = *value.downcast::<#ty>()?;
                    ::core::result::Result::Ok(())
                },
            )
        }
    } else {
        quote! { ::refser::reflect::Member::<Self>::opaque(#ident_str) }
    };

    let mut builders = Vec::new();
    if let Some(rename) = &attrs.rename {
        builders.push(quote! { .rename(#rename) });
    }
    if let Some(order) = attrs.order {
        builders.push(quote! { .order(#order) });
    }
    if attrs.skip {
        builders.push(quote! { .skip() });
    }
    if attrs.include {
        builders.push(quote! { .include() });
    }
    if !public {
        builders.push(quote! { .private() });
    }
    if synthetic {
        builders.push(quote! { .synthetic() });
    }

    Ok(quote! { #base #(#builders)* })
}

fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Generic enums are not supported",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "Reflect enums need at least one variant",
        ));
    }

    let mut names = Vec::new();
    let mut paths = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Only fieldless enum variants are supported",
            ));
        }
        let ident = &variant.ident;
        names.push(ident.to_string());
        paths.push(quote! { #name::#ident });
    }

    Ok(quote! {
        impl ::refser::reflect::Reflect for #name {
            fn shape() -> ::refser::reflect::Shape {
                ::refser::reflect::Shape::enumeration::<Self>()
            }

            fn build_codec(
                _registry: &::refser::registry::CodecRegistry,
            ) -> ::refser::Result<::std::sync::Arc<dyn ::refser::codec::Codec>> {
                ::core::result::Result::Ok(::std::sync::Arc::new(
                    ::refser::codec::EnumCodec::<Self>::new(),
                ))
            }
        }

        impl ::refser::reflect::ReflectEnum for #name {
            fn variants() -> ::std::vec::Vec<(&'static str, i64)> {
                ::std::vec![
                    #((#names, #paths as i64)),*
                ]
            }

            fn to_discriminant(&self) -> i64 {
                match self {
                    #(#paths => #paths as i64,)*
                }
            }

            fn from_discriminant(value: i64) -> ::core::option::Option<Self> {
                #(
                    if value == #paths as i64 {
                        return ::core::option::Option::Some(#paths);
                    }
                )*
                ::core::option::Option::None
            }
        }
    })
}

fn parse_container_attrs(input: &DeriveInput) -> syn::Result<ContainerAttrs> {
    let mut attrs = ContainerAttrs {
        mode: ObjectMode::OptOut,
        auto_permit: false,
    };
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("refser")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("object") {
                attrs.auto_permit = true;
                if meta.input.peek(syn::Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    attrs.mode = match value.value().as_str() {
                        "opt_out" => ObjectMode::OptOut,
                        "opt_in" => ObjectMode::OptIn,
                        _ => {
                            return Err(syn::Error::new_spanned(
                                value,
                                "expected \"opt_in\" or \"opt_out\"",
                            ))
                        }
                    };
                }
                Ok(())
            } else {
                Err(meta.error("unsupported refser container attribute"))
            }
        })?;
    }
    Ok(attrs)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("refser")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else if meta.path.is_ident("include") {
                attrs.include = true;
            } else if meta.path.is_ident("rename") {
                attrs.rename = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("order") {
                let lit: LitInt = meta.value()?.parse()?;
                attrs.order = Some(lit.base10_parse::<u16>()?);
            } else {
                return Err(meta.error("unsupported refser field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// `PhantomData<_>` under any path prefix.
fn is_phantom(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData"),
        _ => false,
    }
}
