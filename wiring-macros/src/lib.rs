//! Procedural macros for wiring.
//!
//! `#[derive(Injectable)]` writes the dependency manifest and the
//! constructor from the struct's fields:
//!
//! - a field of type `Arc<D>` is a dependency on `D`, in field order
//! - `#[inject(default)]` fields are filled with `Default::default()`
//! - `#[injectable(supports_only)]` makes the type constructible but not
//!   injectable into other types
//!
//! Non-generic types are also declared to the process-wide metadata, so
//! containers know them before they are registered.

use darling::{FromDeriveInput, FromField, ast};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, GenericArgument, PathArguments, Type, parse_macro_input};

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_any))]
struct InjectableInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), InjectField>,
    #[darling(default)]
    supports_only: bool,
}

#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<syn::Ident>,
    ty: Type,
    #[darling(default)]
    default: bool,
}

/// How one field is initialised.
enum FieldInit {
    Dependency(Type),
    Default,
}

#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match InjectableInput::from_derive_input(&input).and_then(expand) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: InjectableInput) -> darling::Result<TokenStream2> {
    let InjectableInput {
        ident,
        generics,
        data,
        supports_only,
    } = input;

    let fields = data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum").with_span(&ident))?;
    let style = fields.style;

    let mut errors = darling::Error::accumulator();
    let mut names = Vec::new();
    let mut inits = Vec::new();
    let mut dependencies = Vec::new();

    for field in fields.fields {
        let Some(init) = errors.handle(classify(&field)) else {
            continue;
        };

        let value = match init {
            FieldInit::Dependency(dependency) => {
                let value = quote! { __args.next::<#dependency>()? };
                dependencies.push(quote! { ::wiring::TypeKey::of::<#dependency>() });
                value
            }
            FieldInit::Default => quote! { ::core::default::Default::default() },
        };

        names.push(field.ident);
        inits.push(value);
    }
    errors.finish()?;

    let construct = match style {
        ast::Style::Unit => quote! { #ident },
        ast::Style::Tuple => quote! { #ident( #(#inits),* ) },
        ast::Style::Struct => quote! { #ident { #(#names: #inits),* } },
    };

    let injectable = !supports_only;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Generic types have no single TypeId to declare.
    let declaration = generics.params.is_empty().then(|| {
        quote! {
            ::wiring::__private::inventory::submit! {
                ::wiring::metadata::Declaration::of::<#ident>()
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::wiring::Injectable for #ident #ty_generics #where_clause {
            const INJECTABLE: bool = #injectable;

            fn dependencies() -> ::std::vec::Vec<::wiring::TypeKey> {
                ::std::vec![ #(#dependencies),* ]
            }

            fn construct(__args: &mut ::wiring::Arguments) -> ::wiring::Result<Self> {
                ::core::result::Result::Ok(#construct)
            }
        }

        #declaration
    })
}

fn classify(field: &InjectField) -> darling::Result<FieldInit> {
    if field.default {
        return Ok(FieldInit::Default);
    }

    arc_inner(&field.ty).map(FieldInit::Dependency).ok_or_else(|| {
        darling::Error::custom(
            "injectable fields must be `Arc<T>`; mark other fields with #[inject(default)]",
        )
        .with_span(&field.ty)
    })
}

/// `D` for a type spelled `Arc<D>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner.clone()),
        _ => None,
    }
}
