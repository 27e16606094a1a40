use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{DeriveInput, Error, Ident, LitStr};

use crate::common::{ArgTyKind, CliMeta, ErrorCollector, FieldMeta, wrap_anon_item};
use crate::pattern::{ElementDecl, ElementKind, Template, rust_ident};

pub fn expand(input: &DeriveInput) -> TokenStream {
    let mut tts = match expand_cli_impl(input) {
        Ok(out) => return wrap_anon_item(out),
        Err(err) => err.into_compile_error(),
    };

    // Error fallback impl.
    let name = &input.ident;
    tts.extend(wrap_anon_item(quote! {
        #[automatically_derived]
        impl __rt::Cli for #name {
            const USAGE: &'static __rt::str = "";
            fn from_matches(_: &__rt::Matches) -> __rt::Result<Self> {
                ::core::unimplemented!()
            }
        }
    }));
    tts
}

/// For `derive(Cli)`.
pub struct CliImpl<'i> {
    struct_name: &'i Ident,
    usage: LitStr,
    fields: Vec<FieldImpl<'i>>,
}

struct FieldImpl<'i> {
    ident: &'i Ident,
    source: FieldSource<'i>,
}

enum FieldSource<'i> {
    /// `-h` or `--help` was given.
    Help,
    Flag(String),
    Optional(String, &'i syn::Type),
    Required(String, &'i syn::Type),
    Many(String, &'i syn::Type),
}

fn expand_cli_impl(def: &DeriveInput) -> syn::Result<CliImpl<'_>> {
    let syn::Data::Struct(syn::DataStruct { fields: syn::Fields::Named(fields), .. }) = &def.data
    else {
        return Err(syn::Error::new(
            Span::call_site(),
            "derive(Cli) can only be used on named structs",
        ));
    };

    if !def.generics.params.is_empty() || def.generics.where_clause.is_some() {
        return Err(Error::new(def.ident.span(), "generics are not supported"));
    }

    let meta = CliMeta::parse_attrs(&def.attrs)?;
    let Some(usage) = meta.usage else {
        return Err(Error::new(def.ident.span(), "missing #[cli(usage = \"..\")]"));
    };

    let elements = Template::parse(&usage.value())
        .and_then(|template| template.elements())
        .map_err(|err| Error::new(usage.span(), format!("invalid usage pattern {err}")))?;

    let mut errs = ErrorCollector::default();
    let mut bound = vec![false; elements.len()];
    let mut out = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let Some(ident) = &field.ident else { continue };
        let Some(meta) = errs.collect(FieldMeta::parse_attrs(&field.attrs)) else { continue };

        let pos = match &meta.name {
            Some(name) => {
                let name_str = name.value();
                match elements.iter().position(|e| e.field == name_str) {
                    Some(pos) => Some(pos),
                    None => {
                        errs.push(Error::new(
                            name.span(),
                            format!("no element named `{name_str}` in usage"),
                        ));
                        continue;
                    }
                }
            }
            None => {
                // An exact field name wins over a snake-cased one (`-n` over `-N` for `n`).
                let name = ident.unraw().to_string();
                elements
                    .iter()
                    .position(|e| e.field == name)
                    .or_else(|| elements.iter().position(|e| rust_ident(&e.field) == name))
            }
        };

        let source = match pos {
            Some(pos) => {
                if std::mem::replace(&mut bound[pos], true) {
                    errs.push(Error::new(
                        ident.span(),
                        format!("element `{}` is already bound to another field", elements[pos]),
                    ));
                    continue;
                }
                errs.collect(field_source(&elements[pos], field))
            }
            None if ident.unraw() == "help" => match ArgTyKind::of(&field.ty) {
                ArgTyKind::Bool => Some(FieldSource::Help),
                _ => {
                    errs.push(Error::new(field.ty.span(), "help field must be bool"));
                    None
                }
            },
            None => {
                errs.push(Error::new(
                    ident.span(),
                    format!("no element for field `{}` in usage", ident.unraw()),
                ));
                None
            }
        };
        if let Some(source) = source {
            out.push(FieldImpl { ident, source });
        }
    }

    errs.finish_then(CliImpl { struct_name: &def.ident, usage, fields: out })
}

fn field_source<'i>(elem: &ElementDecl, field: &'i syn::Field) -> syn::Result<FieldSource<'i>> {
    let name = elem.field.clone();
    let ty = &field.ty;
    let mismatch = |expect: &str| {
        Err(Error::new(ty.span(), format!("`{elem}` must be bound to a field of type {expect}")))
    };
    match (elem.kind, ArgTyKind::of(ty)) {
        (ElementKind::Flag | ElementKind::Word, ArgTyKind::Bool) => Ok(FieldSource::Flag(name)),
        (ElementKind::Flag | ElementKind::Word, _) => mismatch("`bool`"),

        (ElementKind::Positional { variadic: true }, ArgTyKind::Vec(subty)) => {
            Ok(FieldSource::Many(name, subty))
        }
        (ElementKind::Positional { variadic: true }, _) => mismatch("`Vec<T>`"),

        (
            ElementKind::Value { .. } | ElementKind::Positional { variadic: false },
            ArgTyKind::Option(subty),
        ) => Ok(FieldSource::Optional(name, subty)),
        (
            ElementKind::Value { .. } | ElementKind::Positional { variadic: false },
            ArgTyKind::Bool | ArgTyKind::Vec(_),
        ) => mismatch("`Option<T>` or `T`"),
        (
            ElementKind::Value { .. } | ElementKind::Positional { variadic: false },
            ArgTyKind::Other,
        ) => Ok(FieldSource::Required(name, ty)),
    }
}

impl ToTokens for CliImpl<'_> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let struct_name = self.struct_name;
        let usage = &self.usage;
        let fields = self.fields.iter().map(|FieldImpl { ident, source }| {
            let expr = match source {
                FieldSource::Help => quote! { __m.help() },
                FieldSource::Flag(name) => quote! { __rt::flag(__m, #name) },
                FieldSource::Optional(name, ty) => quote_spanned! {ty.span()=>
                    __rt::optional_value(__m, #name, __rt::arg_value_info!(#ty))?
                },
                FieldSource::Required(name, ty) => quote_spanned! {ty.span()=>
                    __rt::required_value(__m, #name, __rt::arg_value_info!(#ty))?
                },
                FieldSource::Many(name, ty) => quote_spanned! {ty.span()=>
                    __rt::many_values(__m, #name, __rt::arg_value_info!(#ty))?
                },
            };
            quote! { #ident: #expr }
        });

        tokens.extend(quote! {
            #[automatically_derived]
            impl __rt::Cli for #struct_name {
                const USAGE: &'static __rt::str = #usage;

                fn from_matches(__m: &__rt::Matches) -> __rt::Result<Self> {
                    __rt::Ok(Self {
                        #(#fields,)*
                    })
                }
            }
        });
    }
}
