use quote::ToTokens;
use syn::{Attribute, Token};

// 拆出已有的 derive 列表，保留其余属性
pub(crate) fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("derive") {
            retained.push(attr.clone());
            continue;
        }
        if let Ok(list) = attr
            .parse_args_with(syn::punctuated::Punctuated::<syn::Path, Token![,]>::parse_terminated)
        {
            existing.extend(list);
        }
    }
    (retained, existing)
}

// 合并宏要求的 derive 与用户手写的 derive，按归一化名称去重
pub(crate) fn merge_derives(existing: Vec<syn::Path>, required: Vec<syn::Path>) -> Attribute {
    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();
    syn::parse_quote!(#[derive(#(#merged),*)])
}

// `Serialize` 与 `serde::Serialize` 视为同一个 derive
pub(crate) fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let name = last.ident.to_string();
            match name.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{name}"),
                _ => name,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);
    let merged = merge_derives(existing, required);
    *attrs = std::iter::once(merged).chain(retained).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_normalizes_serde_paths() {
        let short: syn::Path = syn::parse_quote!(Serialize);
        let long: syn::Path = syn::parse_quote!(serde::Serialize);
        assert_eq!(derive_key(&short), derive_key(&long));

        let other: syn::Path = syn::parse_quote!(Hash);
        assert_eq!(derive_key(&other), "Hash");
    }

    #[test]
    fn apply_derives_deduplicates_and_keeps_other_attrs() {
        let mut attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[derive(Clone, Copy)]),
            syn::parse_quote!(#[serde(transparent)]),
        ];
        apply_derives(
            &mut attrs,
            vec![syn::parse_quote!(Clone), syn::parse_quote!(Debug)],
        );

        assert_eq!(attrs.len(), 2);
        let (_, derives) = split_derives(&attrs);
        let names: Vec<String> = derives.iter().map(derive_key).collect();
        assert_eq!(names, vec!["Clone", "Debug", "Copy"]);
        assert!(attrs[1].path().is_ident("serde"));
    }
}
