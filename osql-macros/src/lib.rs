mod assets;
mod param;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Embeds every `.sql` file matching a glob pattern (relative to the crate
/// root) and registers its queries with `osql::loader` at startup.
///
/// ```ignore
/// osql::query_assets!("resources/queries/**/*.sql");
/// ```
#[proc_macro]
pub fn query_assets(input: TokenStream) -> TokenStream {
    assets::query_assets_impl(input)
}

/// Implements `osql::value::ToValue` for a struct with named fields, turning
/// it into a value-mapping keyed by field name.
///
/// Field attributes: `#[param("name")]` or `#[param(rename = "name")]` to
/// change the key, `#[param(ignore)]` to leave the field out.
#[proc_macro_derive(Param, attributes(param))]
pub fn derive_param(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    param::derive_param_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
