//! Derive macro describing record structs for tagsql statement generation.
//!
//! This crate provides the `#[derive(Record)]` macro, which implements
//! `tagsql_core::Record` from the struct definition.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `tagsql_core::Record` for a struct with named fields.
///
/// # Attributes
///
/// - `#[record(table = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(auto_increment)]` - The database generates the key; only valid
///   together with `primary_key`
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(skip)]` - Leaves the field out of every statement
///
/// Every mapped field type must implement `tagsql_core::ToSqlValue`, and no
/// two mapped fields may resolve to the same column name.
#[proc_macro_derive(Record, attributes(record, column))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record derive only supports structs",
            ));
        }
    };

    let mut primary_key: Option<ColumnInfo> = None;
    let mut auto_increment = false;
    let mut columns: Vec<ColumnInfo> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "field must be named"));
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        if attrs.auto_increment && !attrs.primary_key {
            return Err(syn::Error::new_spanned(
                field,
                "`auto_increment` requires `primary_key`",
            ));
        }

        let info = ColumnInfo {
            column_name: attrs.name.unwrap_or_else(|| field_name.to_string()),
            field_name,
        };
        if !seen.insert(info.column_name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate column name `{}`", info.column_name),
            ));
        }
        if attrs.primary_key {
            if primary_key.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "Record derive supports a single primary key",
                ));
            }
            auto_increment = attrs.auto_increment;
            primary_key = Some(info);
        } else {
            columns.push(info);
        }
    }

    let (primary_key_const, primary_key_value) = match &primary_key {
        Some(pk) => {
            let column_name = &pk.column_name;
            let field_name = &pk.field_name;
            (
                quote! { Some(#column_name) },
                quote! { Some(::tagsql_core::ToSqlValue::to_sql_value(&self.#field_name)) },
            )
        }
        None => (quote! { None }, quote! { None }),
    };

    let column_names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();
    let column_fields: Vec<&Ident> = columns.iter().map(|c| &c.field_name).collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::tagsql_core::Record for #struct_name #ty_generics #where_clause {
            const TABLE: &'static str = #table_name;
            const PRIMARY_KEY: Option<&'static str> = #primary_key_const;
            const AUTO_INCREMENT: bool = #auto_increment;
            const COLUMNS: &'static [&'static str] = &[#(#column_names),*];

            fn primary_key_value(&self) -> Option<::tagsql_core::SqlValue> {
                #primary_key_value
            }

            fn column_values(&self) -> Vec<::tagsql_core::SqlValue> {
                vec![#(::tagsql_core::ToSqlValue::to_sql_value(&self.#column_fields)),*]
            }
        }
    };

    Ok(expanded)
}

struct ColumnInfo {
    field_name: Ident,
    column_name: String,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    auto_increment: bool,
    skip: bool,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    table_name = Some(parse_str_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute"))
                }
            })?;
            if let Some(name) = table_name {
                if name.is_empty() {
                    return Err(syn::Error::new_spanned(attr, "table name can not be empty"));
                }
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("auto_increment") {
                    result.auto_increment = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(parse_str_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn parse_str_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = value {
        if let Lit::Str(s) = lit.lit {
            return Ok(s.value());
        }
    }
    Err(meta.error("expected a string literal"))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
