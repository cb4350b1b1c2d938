//! Procedural macros for the Vesper JavaScript engine.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Index};

/// Derives the `Trace` trait.
///
/// Every field is visited unless it carries the `#[ignore_trace]` attribute,
/// in which case it must not contain any `Gc` handle.
#[proc_macro_derive(Trace, attributes(ignore_trace))]
pub fn derive_trace(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    for param in input.generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(::vesper_gc::Trace));
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let marks = trace_fields(&data.fields, quote!(self), true);
            quote! { #(#marks)* }
        }
        Data::Enum(data) => {
            let arms = data.variants.iter().map(|variant| {
                let ident = &variant.ident;
                match &variant.fields {
                    Fields::Named(fields) => {
                        let names: Vec<_> = fields
                            .named
                            .iter()
                            .map(|f| f.ident.clone().expect("named field"))
                            .collect();
                        let marks: Vec<_> = fields
                            .named
                            .iter()
                            .filter(|f| !is_ignored(f))
                            .map(|f| {
                                let id = f.ident.clone().expect("named field");
                                quote! { ::vesper_gc::Trace::trace(#id, tracer); }
                            })
                            .collect();
                        quote! { Self::#ident { #(#names),* } => { #(#marks)* let _ = (#(&#names,)*); } }
                    }
                    Fields::Unnamed(fields) => {
                        let names: Vec<_> = (0..fields.unnamed.len())
                            .map(|i| quote::format_ident!("field_{i}"))
                            .collect();
                        let marks: Vec<_> = fields
                            .unnamed
                            .iter()
                            .enumerate()
                            .filter(|(_, f)| !is_ignored(f))
                            .map(|(i, _)| {
                                let id = quote::format_ident!("field_{i}");
                                quote! { ::vesper_gc::Trace::trace(#id, tracer); }
                            })
                            .collect();
                        quote! { Self::#ident(#(#names),*) => { #(#marks)* let _ = (#(&#names,)*); } }
                    }
                    Fields::Unit => quote! { Self::#ident => {} },
                }
            });
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Union(_) => {
            return syn::Error::new_spanned(name, "cannot derive `Trace` for a union")
                .to_compile_error()
                .into();
        }
    };

    let expanded = quote! {
        impl #impl_generics ::vesper_gc::Trace for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn trace(&self, tracer: &mut ::vesper_gc::Tracer) {
                #body
            }
        }
    };
    expanded.into()
}

fn trace_fields(fields: &Fields, this: TokenStream2, deref: bool) -> Vec<TokenStream2> {
    let _ = deref;
    match fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter(|f| !is_ignored(f))
            .map(|f| {
                let id = f.ident.clone().expect("named field");
                quote! { ::vesper_gc::Trace::trace(&#this.#id, tracer); }
            })
            .collect(),
        Fields::Unnamed(fields) => fields
            .unnamed
            .iter()
            .enumerate()
            .filter(|(_, f)| !is_ignored(f))
            .map(|(i, _)| {
                let idx = Index::from(i);
                quote! { ::vesper_gc::Trace::trace(&#this.#idx, tracer); }
            })
            .collect(),
        Fields::Unit => Vec::new(),
    }
}

fn is_ignored(field: &Field) -> bool {
    field
        .attrs
        .iter()
        .any(|attr| attr.path().is_ident("ignore_trace"))
}

/// Derives the `Finalize` trait with an empty implementation.
#[proc_macro_derive(Finalize)]
pub fn derive_finalize(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::vesper_gc::Finalize for #name #ty_generics #where_clause {}
    };
    expanded.into()
}
