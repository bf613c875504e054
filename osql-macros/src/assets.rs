use glob::glob;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::hash_map::DefaultHasher;
use std::env;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use syn::{LitStr, parse_macro_input};

pub fn query_assets_impl(input: TokenStream) -> TokenStream {
    // 1) Parse the input string literal (glob pattern).
    let pattern = parse_macro_input!(input as LitStr);
    let pattern_str = pattern.value();

    // 2) Resolve the pattern against the crate root so matching does not
    // depend on the compiler's working directory.
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => dir,
        Err(_) => {
            return syn::Error::new(pattern.span(), "CARGO_MANIFEST_DIR is not set")
                .to_compile_error()
                .into();
        }
    };
    let full_pattern = PathBuf::from(manifest_dir).join(&pattern_str);
    let full_pattern_str = full_pattern.to_string_lossy();

    // 3) Find matching files.
    let files: Vec<String> = match glob(&full_pattern_str) {
        Ok(paths) => paths
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .map(|path| path.to_string_lossy().to_string())
            .collect(),
        Err(e) => {
            return syn::Error::new(pattern.span(), format!("Invalid glob pattern: {}", e))
                .to_compile_error()
                .into();
        }
    };

    // 4) `include_str!` embeds each file, so the runtime never touches the filesystem.
    let assets: Vec<_> = files
        .iter()
        .map(|f| {
            quote! {
                (#f, include_str!(#f))
            }
        })
        .collect();

    // 5) One registration function per pattern, so several invocations can
    // share a scope.
    let mut hasher = DefaultHasher::new();
    pattern_str.hash(&mut hasher);
    let fn_name = format_ident!("__osql_register_query_assets_{}", hasher.finish());

    // 6) Register at startup, before `main`. Failures are logged by the loader.
    let output = quote! {
        #[osql::ctor::ctor]
        fn #fn_name() {
            let assets = vec![
                #(#assets),*
            ];
            let _ = osql::loader::load_assets(assets);
        }
    };

    output.into()
}
