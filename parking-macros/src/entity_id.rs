use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Item, ItemStruct, Lit, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[entity_id] 宏实现
///
/// 仅支持单字段 tuple struct，分两种形态：
/// - 不带参数：不透明标识（如 `struct PassId(String);`），`Display`/`FromStr` 直接委托内部类型；
/// - `prefix = "TKT"`：序号型标识（如 `struct TicketId(u32);`），
///   文本形式为 `TKT-0001`，序列化为该文本，并提供 `first/next/sequence` 等序号操作。
///
/// 两种形态都会合并派生 Clone, Debug（可用 `debug = false` 关闭）, PartialEq, Eq, Hash, PartialOrd, Ord。
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityIdAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[entity_id] only on struct")
                .to_compile_error()
                .into();
        }
    };

    let inner_ty = match &st.fields {
        syn::Fields::Unnamed(f) if f.unnamed.len() == 1 => f.unnamed[0].ty.clone(),
        syn::Fields::Unnamed(f) => {
            return syn::Error::new(
                f.span(),
                "#[entity_id] requires a tuple struct with exactly one field",
            )
            .to_compile_error()
            .into();
        }
        _ => {
            return syn::Error::new(
                st.span(),
                "#[entity_id] supports only tuple struct, e.g., struct X(String);",
            )
            .to_compile_error()
            .into();
        }
    };

    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(Eq),
        syn::parse_quote!(Hash),
        syn::parse_quote!(PartialOrd),
        syn::parse_quote!(Ord),
    ];
    if cfg.derive_debug.unwrap_or(true) {
        required.insert(1, syn::parse_quote!(Debug));
    }

    match cfg.prefix {
        Some(prefix) => {
            required.insert(1, syn::parse_quote!(Copy));
            apply_derives(&mut st.attrs, required);
            expand_sequenced(&st, &inner_ty, &prefix)
        }
        None => {
            required.push(syn::parse_quote!(serde::Serialize));
            required.push(syn::parse_quote!(serde::Deserialize));
            apply_derives(&mut st.attrs, required);
            expand_opaque(&st, &inner_ty)
        }
    }
}

fn expand_opaque(st: &ItemStruct, inner_ty: &Type) -> TokenStream {
    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let out = quote! {
        #st

        impl #impl_generics #ident #ty_generics #where_clause {
            pub fn new(value: impl ::core::convert::Into<#inner_ty>) -> Self { Self(value.into()) }
        }

        impl #impl_generics ::std::str::FromStr for #ident #ty_generics #where_clause
        where #inner_ty: ::std::str::FromStr
        {
            type Err = <#inner_ty as ::std::str::FromStr>::Err;
            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let inner: #inner_ty = s.parse()?;
                ::std::result::Result::Ok(Self(inner))
            }
        }

        impl #impl_generics ::std::fmt::Display for #ident #ty_generics #where_clause
        where #inner_ty: ::std::fmt::Display
        {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl #impl_generics ::core::convert::AsRef<#inner_ty> for #ident #ty_generics #where_clause {
            fn as_ref(&self) -> &#inner_ty { &self.0 }
        }

        impl #impl_generics ::core::convert::From<#inner_ty> for #ident #ty_generics #where_clause {
            fn from(value: #inner_ty) -> Self { Self(value) }
        }

        impl #impl_generics ::core::convert::From<&str> for #ident #ty_generics #where_clause
        where #inner_ty: for<'a> ::core::convert::From<&'a str>
        {
            fn from(value: &str) -> Self { Self(<#inner_ty>::from(value)) }
        }
    };

    TokenStream::from(out)
}

fn expand_sequenced(st: &ItemStruct, inner_ty: &Type, prefix: &syn::LitStr) -> TokenStream {
    let ident = &st.ident;
    let ident_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    let out = quote! {
        #st

        impl #impl_generics #ident #ty_generics #where_clause {
            /// 文本形式的前缀
            pub const PREFIX: &'static str = #prefix;

            /// 序列中的第一个标识
            pub const fn first() -> Self { Self(1) }

            pub const fn from_sequence(sequence: #inner_ty) -> Self { Self(sequence) }

            pub const fn sequence(&self) -> #inner_ty { self.0 }

            /// 紧随其后的标识；序号溢出属于编程缺陷
            pub fn next(&self) -> Self {
                match self.0.checked_add(1) {
                    ::core::option::Option::Some(n) => Self(n),
                    ::core::option::Option::None => {
                        ::core::panic!("{} sequence exhausted", #ident_name)
                    }
                }
            }
        }

        impl #impl_generics ::std::fmt::Display for #ident #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}-{:04}", #prefix, self.0)
            }
        }

        impl #impl_generics ::std::str::FromStr for #ident #ty_generics #where_clause {
            type Err = ::parking_domain::error::ParkingError;
            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let digits = s
                    .strip_prefix(#prefix)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .ok_or_else(|| ::parking_domain::error::ParkingError::Parse {
                        reason: ::std::format!("{} must start with '{}-': {}", #ident_name, #prefix, s),
                    })?;
                let sequence: #inner_ty = digits.parse()?;
                ::std::result::Result::Ok(Self(sequence))
            }
        }

        impl #impl_generics ::serde::Serialize for #ident #ty_generics #where_clause {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for #ident {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let text = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(::serde::de::Error::custom)
            }
        }
    };

    TokenStream::from(out)
}

// 解析参数：prefix = "..."、debug = true|false
struct EntityIdAttrConfig {
    prefix: Option<syn::LitStr>,
    derive_debug: Option<bool>,
}

impl Parse for EntityIdAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            prefix: None,
            derive_debug: None,
        };
        if input.is_empty() {
            return Ok(cfg);
        }

        let pairs: Punctuated<syn::MetaNameValue, Token![,]> =
            Punctuated::parse_terminated(input)?;
        for kv in pairs {
            let Some(key) = kv.path.get_ident().map(|i| i.to_string()) else {
                return Err(syn::Error::new(kv.path.span(), "invalid attribute key"));
            };
            let lit = match &kv.value {
                syn::Expr::Lit(syn::ExprLit { lit, .. }) => lit.clone(),
                other => {
                    return Err(syn::Error::new(other.span(), "expected literal value"));
                }
            };
            match (key.as_str(), lit) {
                ("prefix", Lit::Str(s)) => {
                    if cfg.prefix.is_some() {
                        return Err(syn::Error::new(s.span(), "duplicate key 'prefix' in attribute"));
                    }
                    if s.value().is_empty() {
                        return Err(syn::Error::new(s.span(), "'prefix' must not be empty"));
                    }
                    cfg.prefix = Some(s);
                }
                ("debug", Lit::Bool(b)) => {
                    if cfg.derive_debug.is_some() {
                        return Err(syn::Error::new(b.span(), "duplicate key 'debug' in attribute"));
                    }
                    cfg.derive_debug = Some(b.value);
                }
                ("prefix", other) => {
                    return Err(syn::Error::new(other.span(), "expected string literal for 'prefix'"));
                }
                ("debug", other) => {
                    return Err(syn::Error::new(other.span(), "expected bool literal for 'debug'"));
                }
                _ => {
                    return Err(syn::Error::new(
                        kv.path.span(),
                        "unknown key; expected 'prefix' | 'debug'",
                    ));
                }
            }
        }
        Ok(cfg)
    }
}
