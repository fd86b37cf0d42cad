//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{FieldSpec, struct_fields, table_name};

/// Where the identity lives.
enum Identity<'a> {
    /// A plain `i64` field with this column name.
    Field { ident: &'a syn::Ident, column: String },
    /// Delegated to a flattened entity.
    Flattened { ident: &'a syn::Ident, ty: &'a syn::Type },
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let table = table_name(&input)?;
    let fields = struct_fields(&input, "Entity")?;
    let identity = find_identity(&fields)?;

    let mut column_pushes = Vec::with_capacity(fields.len());
    let mut value_pushes = Vec::with_capacity(fields.len());

    for field in fields.iter().filter(|f| !f.attr.skip) {
        let ident = field.ident;
        let ty = field.ty;

        if field.attr.flatten {
            column_pushes.push(quote! {
                columns.extend_from_slice(<#ty as ::querygen::Entity>::columns());
            });
            value_pushes.push(quote! {
                values.extend(::querygen::Entity::values(&self.#ident));
            });
            continue;
        }

        let column_name = field.column();
        let field_name = ident.to_string();
        let mut column = quote! { ::querygen::Column::new(#column_name, #field_name) };
        if field.attr.skip_insert {
            column = quote! { #column.skip_insert() };
        }
        if field.attr.skip_update {
            column = quote! { #column.skip_update() };
        }
        if field.attr.nil_on_empty {
            column = quote! { #column.nil_on_empty() };
        }

        column_pushes.push(quote! { columns.push(#column); });
        value_pushes.push(quote! {
            values.push(::querygen::ToSqlValue::to_sql_value(&self.#ident));
        });
    }

    let identity_items = match &identity {
        Some(Identity::Field { ident, column }) => quote! {
            const ID_COLUMN: ::core::option::Option<&'static str> =
                ::core::option::Option::Some(#column);

            fn id_slot(&mut self) -> ::core::option::Option<&mut i64> {
                ::core::option::Option::Some(&mut self.#ident)
            }
        },
        Some(Identity::Flattened { ident, ty }) => quote! {
            const ID_COLUMN: ::core::option::Option<&'static str> =
                <#ty as ::querygen::Entity>::ID_COLUMN;

            fn id_slot(&mut self) -> ::core::option::Option<&mut i64> {
                ::querygen::Entity::id_slot(&mut self.#ident)
            }
        },
        None => quote! {},
    };

    let identified_impl = match &identity {
        Some(Identity::Field { ident, .. }) => quote! {
            impl ::querygen::Identified for #name {
                fn id(&self) -> i64 {
                    self.#ident
                }
            }
        },
        Some(Identity::Flattened { ident, .. }) => quote! {
            impl ::querygen::Identified for #name {
                fn id(&self) -> i64 {
                    ::querygen::Identified::id(&self.#ident)
                }
            }
        },
        None => quote! {},
    };

    Ok(quote! {
        impl ::querygen::Entity for #name {
            const TABLE: &'static str = #table;

            #identity_items

            fn columns() -> &'static [::querygen::Column] {
                static COLUMNS: ::std::sync::OnceLock<::std::vec::Vec<::querygen::Column>> =
                    ::std::sync::OnceLock::new();
                COLUMNS.get_or_init(|| {
                    let mut columns = ::std::vec::Vec::new();
                    #(#column_pushes)*
                    columns
                })
            }

            fn values(&self) -> ::std::vec::Vec<::querygen::SqlValue> {
                let mut values = ::std::vec::Vec::new();
                #(#value_pushes)*
                values
            }
        }

        #identified_impl
    })
}

/// An explicit `#[orm(id)]` wins over a field named `id`; two explicit ids are an error.
fn find_identity<'a>(fields: &'a [FieldSpec<'a>]) -> Result<Option<Identity<'a>>> {
    let mut explicit = fields.iter().filter(|f| f.attr.id);
    let chosen = match (explicit.next(), explicit.next()) {
        (Some(_), Some(second)) => {
            return Err(syn::Error::new_spanned(
                second.ident,
                "only one field can be marked #[orm(id)]",
            ));
        }
        (Some(field), None) => Some(field),
        (None, _) => fields.iter().find(|f| !f.attr.skip && f.ident == "id"),
    };

    Ok(chosen.map(|field| {
        if field.attr.flatten {
            Identity::Flattened {
                ident: field.ident,
                ty: field.ty,
            }
        } else {
            Identity::Field {
                ident: field.ident,
                column: field.column(),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: DeriveInput) -> String {
        expand(input).unwrap().to_string()
    }

    #[test]
    fn field_named_id_is_identity() {
        let out = expand_str(syn::parse_quote! {
            #[orm(table = "users")]
            struct User {
                #[orm(skip_insert)]
                id: i64,
                phone: String,
            }
        });
        assert!(out.contains("impl :: querygen :: Identified for User"));
        assert!(out.contains("Some (\"id\")"));
        assert!(out.contains("skip_insert ()"));
    }

    #[test]
    fn no_identity_means_no_identified_impl() {
        let out = expand_str(syn::parse_quote! {
            struct AuditLine {
                message: String,
            }
        });
        assert!(!out.contains("Identified"));
        assert!(out.contains("\"audit_lines\""));
    }

    #[test]
    fn skipped_fields_are_not_mapped() {
        let out = expand_str(syn::parse_quote! {
            struct Session {
                id: i64,
                #[orm(skip)]
                cache: Option<String>,
            }
        });
        assert!(!out.contains("\"cache\""));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair {
                #[orm(id)]
                left: i64,
                #[orm(id)]
                right: i64,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn flattened_identity_delegates() {
        let out = expand_str(syn::parse_quote! {
            struct Admin {
                #[orm(flatten, id)]
                user: User,
                level: i32,
            }
        });
        assert!(out.contains(":: querygen :: Identified :: id (& self . user)"));
        assert!(out.contains("< User as :: querygen :: Entity > :: columns ()"));
    }
}
