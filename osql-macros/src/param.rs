use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

pub fn derive_param_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Param only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Param only supports structs")),
    };

    let mut inserts = Vec::with_capacity(fields.len());
    for field in fields {
        let (key, ignore) = parse_field_attrs(field)?;
        if ignore {
            continue;
        }
        let ident = &field.ident;
        inserts.push(quote! {
            map.insert(#key.to_string(), osql::value::ToValue::to_value(&self.#ident));
        });
    }

    Ok(quote! {
        impl #impl_generics osql::value::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> osql::value::Value {
                let mut map = std::collections::HashMap::new();
                #(#inserts)*
                osql::value::Value::Map(map)
            }
        }
    })
}

/// Reads `#[param(...)]` on a field: the map key and whether to skip it.
fn parse_field_attrs(field: &Field) -> syn::Result<(String, bool)> {
    let mut key = field
        .ident
        .as_ref()
        .map(|i| i.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default();
    let mut ignore = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("param") {
            continue;
        }

        // #[param("custom_name")]
        if let Ok(s) = attr.parse_args::<LitStr>() {
            key = s.value();
            continue;
        }

        // #[param(ignore)], #[param(rename = "custom_name")]
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                ignore = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let s: LitStr = meta.value()?.parse()?;
                key = s.value();
                Ok(())
            } else {
                Err(meta.error("expected `ignore` or `rename = \"...\"`"))
            }
        })?;
    }
    Ok((key, ignore))
}
