//! Procedural macros for the docmodel project.
//!
//! `#[derive(Model)]` implements `docmodel::model::Model` and `Default` for a
//! struct holding a `docmodel::entity::Entity`:
//!
//! ```ignore
//! #[derive(Debug, Clone, Model)]
//! #[model(database = "polls", collection = "languages")]
//! pub struct Language {
//!     #[entity]
//!     entity: Entity,
//!     cache_hits: u64,
//! }
//! ```
//!
//! The entity field is the one marked `#[entity]`, or the field named
//! `entity` when none is marked. Every other field is default-constructed.

#[allow(unused_extern_crates)]
extern crate self as docmodel_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

/// Derive macro implementing `Model` and `Default` for an entity type.
#[proc_macro_derive(Model, attributes(model, entity))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    generate_model_impl(&input).unwrap_or_else(|err| err.to_compile_error().into())
}

/// Namespace declared by `#[model(database = "...", collection = "...")]`.
struct ModelAttrs {
    database: LitStr,
    collection: LitStr,
}

fn parse_model_attrs(input: &DeriveInput) -> Result<ModelAttrs, syn::Error> {
    let mut database = None;
    let mut collection = None;

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("database") {
                database = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else if meta.path.is_ident("collection") {
                collection = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `database` or `collection`"))
            }
        })?;
    }

    let missing = |key: &str| {
        syn::Error::new_spanned(
            &input.ident,
            format!("missing `#[model({key} = \"...\")]` attribute"),
        )
    };

    let database = database.ok_or_else(|| missing("database"))?;
    let collection = collection.ok_or_else(|| missing("collection"))?;

    for name in [&database, &collection] {
        if name.value().is_empty() {
            return Err(syn::Error::new_spanned(name, "namespace names must not be empty"));
        }
    }

    Ok(ModelAttrs { database, collection })
}

/// Picks the field holding the entity.
fn entity_field(input: &DeriveInput, fields: &syn::FieldsNamed) -> Result<Ident, syn::Error> {
    let marked = fields
        .named
        .iter()
        .filter(|field| field.attrs.iter().any(|attr| attr.path().is_ident("entity")))
        .collect::<Vec<_>>();

    let field = match marked.as_slice() {
        [field] => *field,
        [] => fields
            .named
            .iter()
            .find(|field| field.ident.as_ref().is_some_and(|ident| ident == "entity"))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    &input.ident,
                    "Model requires a field marked `#[entity]` or named `entity`",
                )
            })?,
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(second, "only one field may be marked `#[entity]`"));
        }
    };

    field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "entity field must be named"))
}

fn generate_model_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Model can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Model can only be derived for structs",
            ));
        }
    };

    let ModelAttrs { database, collection } = parse_model_attrs(input)?;
    let entity = entity_field(input, fields)?;

    let initializers = fields.named.iter().filter_map(|field| {
        let ident = field.ident.as_ref()?;

        Some(if *ident == entity {
            quote! { #ident: ::docmodel::entity::Entity::new(#database, #collection) }
        } else {
            quote! { #ident: ::core::default::Default::default() }
        })
    });

    let expanded = quote! {
        impl #impl_generics ::core::default::Default for #name #ty_generics #where_clause {
            fn default() -> Self {
                Self {
                    #(#initializers),*
                }
            }
        }

        impl #impl_generics ::docmodel::model::Model for #name #ty_generics #where_clause {
            fn database_name() -> &'static str {
                #database
            }

            fn collection_name() -> &'static str {
                #collection
            }

            fn entity(&self) -> &::docmodel::entity::Entity {
                &self.#entity
            }

            fn entity_mut(&mut self) -> &mut ::docmodel::entity::Entity {
                &mut self.#entity
            }
        }
    };

    Ok(expanded.into())
}
