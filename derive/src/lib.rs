#![forbid(unsafe_code)]
use proc_macro::TokenStream;
use syn::DeriveInput;


mod common;
mod derive_cli;

#[path = "../../src/pattern.rs"]
#[allow(dead_code, reason = "used by runtime, but not all by proc-macro itself")]
mod pattern;

#[proc_macro_derive(Cli, attributes(cli))]
pub fn derive_cli(tts: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(tts as DeriveInput);
    derive_cli::expand(&input).into()
}
