//! Procedural macros for `autoconfig`.
//!
//! All macros in this crate are re-exported from the `autoconfig` crate. See its docs for more details
//! and the examples of usage.

// General settings
#![recursion_limit = "128"]
// Linter settings
#![allow(missing_docs)] // Adding docs here would interfere with docs in the main crate

extern crate proc_macro;

use proc_macro::TokenStream;

mod configurable;
mod utils;

#[proc_macro_derive(Configurable, attributes(config))]
pub fn configurable(input: TokenStream) -> TokenStream {
    configurable::impl_configurable(input)
}
