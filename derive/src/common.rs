use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, GenericArgument, LitStr, PathArguments, Type};

pub const TY_BOOL: &str = "bool";
pub const TY_OPTION: &str = "Option";
pub const TY_VEC: &str = "Vec";

#[derive(Default)]
pub(crate) struct ErrorCollector {
    err: Option<syn::Error>,
    defused: bool,
}

impl ErrorCollector {
    pub fn collect<T>(&mut self, ret: syn::Result<T>) -> Option<T> {
        match ret {
            Ok(v) => Some(v),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    pub fn push(&mut self, e: syn::Error) {
        match &mut self.err {
            Some(prev) => prev.combine(e),
            p @ None => *p = Some(e),
        }
    }

    pub fn finish(mut self) -> syn::Result<()> {
        self.defused = true;
        match self.err.take() {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    pub fn finish_then<T>(self, v: T) -> syn::Result<T> {
        self.finish().map(|()| v)
    }
}

impl Drop for ErrorCollector {
    fn drop(&mut self) {
        if !self.defused && !std::thread::panicking() {
            assert!(self.err.is_none(), "error not finished");
        }
    }
}

/// `TyCtor<ArgTy>` => `ArgTy`. `ty_ctor` must be a single-identifier path.
pub fn strip_ty_ctor<'i>(mut ty: &'i Type, ty_ctor: &str) -> Option<&'i Type> {
    let ty = loop {
        match ty {
            Type::Group(inner) => ty = &inner.elem,
            Type::Paren(inner) => ty = &inner.elem,
            Type::Path(inner) => break inner,
            _ => return None,
        }
    };
    if ty.path.leading_colon.is_none() && ty.path.segments.len() == 1 {
        let seg = &ty.path.segments[0];
        if seg.ident == ty_ctor {
            if let PathArguments::AngleBracketed(args) = &seg.arguments {
                if args.args.len() == 1 {
                    if let GenericArgument::Type(arg_ty) = &args.args[0] {
                        return Some(arg_ty);
                    }
                }
            }
        }
    }
    None
}

pub fn wrap_anon_item(tts: impl ToTokens) -> TokenStream {
    quote! {
        const _: () = {
            use ::genopts::__private as __rt;
            #tts
        };
    }
}

pub enum ArgTyKind<'a> {
    Bool,
    Option(&'a Type),
    Vec(&'a Type),
    Other,
}

impl ArgTyKind<'_> {
    pub fn of(ty: &syn::Type) -> ArgTyKind<'_> {
        if let Type::Path(p) = ty {
            if p.qself.is_none() && p.path.is_ident(TY_BOOL) {
                return ArgTyKind::Bool;
            }
        }
        if let Some(subty) = strip_ty_ctor(ty, TY_OPTION) {
            return ArgTyKind::Option(subty);
        }
        if let Some(subty) = strip_ty_ctor(ty, TY_VEC) {
            return ArgTyKind::Vec(subty);
        }
        ArgTyKind::Other
    }
}

/// `cli(..)` on the struct.
#[derive(Default)]
pub struct CliMeta {
    pub usage: Option<LitStr>,
}

impl CliMeta {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut errs = ErrorCollector::default();
        let mut this = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("cli")) {
            errs.collect(attr.parse_nested_meta(|meta| this.parse_update(&meta)));
        }
        errs.finish_then(this)
    }

    fn parse_update(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        let path = &meta.path;
        if path.is_ident("usage") {
            if self.usage.is_some() {
                return Err(syn::Error::new(path.span(), "duplicated cli(usage)"));
            }
            self.usage = Some(meta.value()?.parse()?);
        } else if path.is_ident("name") {
            return Err(syn::Error::new(path.span(), "cli(name) is only allowed on fields"));
        } else {
            return Err(syn::Error::new(path.span(), "unknown attribute"));
        }
        Ok(())
    }
}

/// `cli(..)` on a field.
#[derive(Default)]
pub struct FieldMeta {
    /// Explicit field name of the element this field binds to.
    pub name: Option<LitStr>,
}

impl FieldMeta {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut errs = ErrorCollector::default();
        let mut this = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("cli")) {
            errs.collect(attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("name") {
                    if this.name.is_some() {
                        return Err(syn::Error::new(path.span(), "duplicated cli(name)"));
                    }
                    this.name = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(syn::Error::new(path.span(), "unknown attribute"))
                }
            }));
        }
        errs.finish_then(this)
    }
}
