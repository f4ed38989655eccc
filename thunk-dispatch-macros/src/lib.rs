//! Procedural macros for thunk-dispatch

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(IntoAction)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(struct_any))]
struct IntoActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,

    /// Explicit action type; defaults to the struct name in SCREAMING_SNAKE_CASE
    #[darling(default)]
    name: Option<String>,
}

/// Convert PascalCase to SCREAMING_SNAKE_CASE
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;
    for ch in s.chars() {
        if ch.is_uppercase() && prev_lower {
            result.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        result.extend(ch.to_uppercase());
    }
    result
}

/// Derive macro for the IntoAction trait
///
/// Turns a `Serialize` struct into an object action. The struct's fields
/// become the action's fields and the action type comes from
/// `#[action(name = "...")]`, or from the struct name in
/// SCREAMING_SNAKE_CASE (`FetchUser` -> `FETCH_USER`).
///
/// # Example
/// ```ignore
/// #[derive(IntoAction, Serialize)]
/// #[action(name = "FETCH")]
/// struct Fetch {
///     payload: u64,
/// }
///
/// let action = Fetch { payload: 5 }.into_action()?;
/// assert_eq!(action.type_name(), "FETCH");
/// ```
#[proc_macro_derive(IntoAction, attributes(action))]
pub fn derive_into_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match IntoActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let kind = opts
        .name
        .clone()
        .unwrap_or_else(|| to_screaming_snake_case(&name.to_string()));

    if kind.is_empty() {
        return syn::Error::new_spanned(&input, "action name must not be empty")
            .to_compile_error()
            .into();
    }

    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics thunk_dispatch::IntoAction for #name #ty_generics #where_clause {
            fn into_action(
                self,
            ) -> ::core::result::Result<thunk_dispatch::Action, thunk_dispatch::InvalidActionError> {
                thunk_dispatch::ObjectAction::from_serialize(#kind, &self)
                    .map(thunk_dispatch::Action::Object)
            }
        }
    };

    TokenStream::from(expanded)
}
