//! Derive macro describing persistable entities.
//!
//! This crate provides `#[derive(Entity)]`, which implements
//! `oxide_persist::Entity` by emitting the struct's field descriptors in
//! declaration order. The descriptor list is built once per type and cached.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Field, Fields, Ident, Lit, Meta, Type,
};

/// Derives `oxide_persist::Entity` for a struct with named fields (or a unit
/// struct, which has no fields).
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to the pluralized snake_case of the struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to the field name)
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[transient]` - The field is never stored
/// - `#[generated_value]` - The database generates the value (`auto`
///   strategy); the field is left out of INSERT statements
/// - `#[generated_value(strategy = "...")]` - One of `auto`, `identity`,
///   `sequence`, `table`, `uuid`. Only `sequence` fields are inserted, with
///   the value the record holds.
///
/// Every inserted field must implement `oxide_persist::ToSqlValue`.
#[proc_macro_derive(Entity, attributes(table, column, transient, generated_value))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity derive does not support generic structs",
        ));
    }

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let attrs = parse_field_attrs(&field.attrs)?;

        field_infos.push(FieldInfo {
            column_name: attrs.column.unwrap_or_else(|| field_name.to_string()),
            field_name,
            field_type: field.ty.clone(),
            is_primary_key: attrs.primary_key,
            is_transient: attrs.transient,
            strategy: attrs.strategy,
        });
    }

    let mut primary_keys = field_infos.iter().filter(|f| f.is_primary_key);
    if let (Some(_), Some(second)) = (primary_keys.next(), primary_keys.next()) {
        return Err(syn::Error::new_spanned(
            &second.field_name,
            "composite primary keys are not supported",
        ));
    }

    let table_expr = match get_table_name(&input.attrs)? {
        Some(name) => quote! { #name },
        None => quote! { ::oxide_persist::naming::table_name_for(#type_name) },
    };

    let descriptors: Vec<TokenStream2> = field_infos
        .iter()
        .map(|info| field_descriptor(struct_name, info))
        .collect();

    let expanded = quote! {
        impl ::oxide_persist::schema::Entity for #struct_name {
            fn schema() -> &'static ::oxide_persist::schema::EntitySchema<Self> {
                static SCHEMA: ::std::sync::OnceLock<
                    ::oxide_persist::schema::EntitySchema<#struct_name>,
                > = ::std::sync::OnceLock::new();

                SCHEMA.get_or_init(|| {
                    ::oxide_persist::schema::EntitySchema::new(
                        #type_name,
                        #table_expr,
                        ::std::vec![#(#descriptors),*],
                    )
                })
            }
        }
    };

    Ok(expanded)
}

fn field_descriptor(struct_name: &Ident, info: &FieldInfo) -> TokenStream2 {
    let field_name = &info.field_name;
    let field_str = field_name.to_string();
    let field_type = &info.field_type;
    let rust_type_str = quote!(#field_type).to_string().replace(' ', "");
    let column_name = &info.column_name;
    let is_transient = info.is_transient;
    let is_primary_key = info.is_primary_key;

    let generated = match &info.strategy {
        Some(strategy) => {
            let variant = Ident::new(strategy.variant(), Span::call_site());
            quote! { ::std::option::Option::Some(::oxide_persist::schema::GenerationType::#variant) }
        }
        None => quote! { ::std::option::Option::None },
    };

    // Fields an INSERT never reads get no accessor, so their type does not
    // need to implement `ToSqlValue`.
    let reader = if info.is_readable() {
        quote! {
            .reader(|record: &#struct_name, _| {
                ::std::result::Result::Ok(
                    ::oxide_persist::builder::ToSqlValue::to_sql_value(&record.#field_name),
                )
            })
        }
    } else {
        quote! {}
    };

    quote! {
        ::oxide_persist::schema::FieldDescriptor::new(#field_str, #rust_type_str)
            .column(#column_name)
            .persistence(::oxide_persist::schema::Persistence {
                transient: #is_transient,
                generated: #generated,
                primary_key: #is_primary_key,
            })
            #reader
    }
}

struct FieldInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    is_primary_key: bool,
    is_transient: bool,
    strategy: Option<Strategy>,
}

impl FieldInfo {
    const fn is_readable(&self) -> bool {
        !self.is_transient && matches!(self.strategy, None | Some(Strategy::Sequence))
    }
}

#[derive(Clone, Copy)]
enum Strategy {
    Auto,
    Identity,
    Sequence,
    Table,
    Uuid,
}

impl Strategy {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "identity" => Some(Self::Identity),
            "sequence" => Some(Self::Sequence),
            "table" => Some(Self::Table),
            "uuid" => Some(Self::Uuid),
            _ => None,
        }
    }

    const fn variant(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Identity => "Identity",
            Self::Sequence => "Sequence",
            Self::Table => "Table",
            Self::Uuid => "Uuid",
        }
    }
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    primary_key: bool,
    transient: bool,
    strategy: Option<Strategy>,
}

fn string_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn get_table_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut table_name = None;
    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = Some(string_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
        }
    }
    Ok(table_name)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("transient") {
            result.transient = true;
        } else if attr.path().is_ident("generated_value") {
            // Bare `#[generated_value]` uses the `auto` strategy.
            if matches!(attr.meta, Meta::Path(_)) {
                result.strategy = Some(Strategy::Auto);
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("strategy") {
                    let name = string_value(&meta)?;
                    let strategy = Strategy::parse(&name).ok_or_else(|| {
                        meta.error(format!(
                            "unknown generation strategy `{name}`, expected one of \
                             auto, identity, sequence, table, uuid"
                        ))
                    })?;
                    result.strategy = Some(strategy);
                    Ok(())
                } else {
                    Err(meta.error("unsupported generated_value attribute"))
                }
            })?;
            if result.strategy.is_none() {
                result.strategy = Some(Strategy::Auto);
            }
        } else if attr.path().is_ident("column") {
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("name") {
                    result.column = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}
