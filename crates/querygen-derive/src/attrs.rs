//! `#[orm(...)]` attribute parsing shared by the derives.

use heck::ToSnakeCase;
use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Result};

use crate::sql_ident::{parse_sql_ident, parse_table_ident};

/// Options from one field's `#[orm(...)]` attributes.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub skip: bool,
    pub skip_insert: bool,
    pub skip_update: bool,
    pub nil_on_empty: bool,
    pub id: bool,
    pub flatten: bool,
}

impl FieldAttr {
    fn merge(&mut self, other: FieldAttr) {
        if other.column.is_some() {
            self.column = other.column;
        }
        self.skip |= other.skip;
        self.skip_insert |= other.skip_insert;
        self.skip_update |= other.skip_update;
        self.nil_on_empty |= other.nil_on_empty;
        self.id |= other.id;
        self.flatten |= other.flatten;
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(parse_sql_ident(&value.value(), value.span(), "column")?);
                }
                "skip" => attr.skip = true,
                "skip_insert" => attr.skip_insert = true,
                "skip_update" => attr.skip_update = true,
                "nil_on_empty" => attr.nil_on_empty = true,
                "id" => attr.id = true,
                "flatten" => attr.flatten = true,
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown orm field attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// A named field with its merged attributes.
pub(crate) struct FieldSpec<'a> {
    pub ident: &'a syn::Ident,
    pub ty: &'a syn::Type,
    pub attr: FieldAttr,
}

impl FieldSpec<'_> {
    /// The database column (explicit `column = "..."` or the field name).
    pub fn column(&self) -> String {
        self.attr
            .column
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

pub(crate) fn parse_field(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if attr.path().is_ident("orm") {
            merged.merge(attr.parse_args::<FieldAttr>()?);
        }
    }

    if merged.skip && (merged.flatten || merged.id || merged.column.is_some()) {
        return Err(syn::Error::new(
            field.span(),
            "`skip` cannot be combined with other orm attributes",
        ));
    }
    if merged.flatten
        && (merged.column.is_some()
            || merged.skip_insert
            || merged.skip_update
            || merged.nil_on_empty)
    {
        return Err(syn::Error::new(
            field.span(),
            "`flatten` can only be combined with `id`",
        ));
    }
    Ok(merged)
}

/// Fields of a plain named struct, rejecting everything else.
pub(crate) fn struct_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<Vec<FieldSpec<'a>>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            format!("{derive} cannot be derived for generic structs"),
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    format!("{derive} can only be derived for structs with named fields"),
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs"),
            ));
        }
    };

    fields
        .iter()
        .map(|field| {
            Ok(FieldSpec {
                // Named fields always carry an ident.
                ident: field
                    .ident
                    .as_ref()
                    .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?,
                ty: &field.ty,
                attr: parse_field(field)?,
            })
        })
        .collect()
}

/// Table from `#[orm(table = "...")]`, or the pluralized snake_case struct name.
pub(crate) fn table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "unknown orm struct attribute (expected `table = \"...\"`)",
            ));
        }
        if let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nested.value
        {
            return parse_table_ident(&lit.value(), lit.span());
        }
        return Err(syn::Error::new_spanned(
            &nested.value,
            "table must be a string literal",
        ));
    }

    let default = format!("{}s", input.ident.to_string().to_snake_case());
    parse_table_ident(&default, Span::call_site())
}
