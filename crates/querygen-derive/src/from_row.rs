//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::struct_fields;

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let fields = struct_fields(&input, "FromRow")?;

    let field_extracts: Vec<_> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident;
            let ty = field.ty;

            if field.attr.skip {
                quote! { #field_name: ::core::default::Default::default() }
            } else if field.attr.flatten {
                quote! { #field_name: <#ty as ::querygen::FromRow>::from_row(row)? }
            } else {
                let column_name = field.column();
                quote! { #field_name: row.try_get_column(#column_name)? }
            }
        })
        .collect();

    Ok(quote! {
        impl ::querygen::FromRow for #name {
            fn from_row(row: &::querygen::tokio_postgres::Row) -> ::querygen::QueryResult<Self> {
                use ::querygen::RowExt;
                ::core::result::Result::Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
