//! Derive macros for `probe_core::Introspectable` and `probe_core::ToValue`.
//!
//! # Usage
//!
//! ```ignore
//! use probe_core::{Introspectable, ToValue};
//!
//! #[derive(Introspectable)]
//! #[introspect(property(health_percentage: f32))]
//! pub struct Character {
//!     #[introspect(rename = "m_health")]
//!     health: f32,
//!     pub max_health: f32,
//!     #[introspect(skip)]
//!     scratch: Vec<u8>,
//! }
//!
//! impl Character {
//!     fn health_percentage(&self) -> f32 {
//!         self.health / self.max_health
//!     }
//! }
//!
//! #[derive(Clone, Copy, Debug, ToValue)]
//! pub enum Faction { Players, ForestMonsters }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, Index, LitStr, Token, Type, parse_macro_input};

/// Derive macro for the `Introspectable` trait.
///
/// Every field is a member unless marked `#[introspect(skip)]`; field types
/// must implement `ToValue`. Computed members are declared on the struct with
/// `#[introspect(property(method: Type))]`, where `method(&self) -> Type`
/// returns an owned value.
///
/// # Attributes
///
/// - `#[introspect(skip)]` on a field - leave it out of dumps.
/// - `#[introspect(rename = "name")]` on a field - dump it under `name`.
/// - `#[introspect(property(method: Type))]` on the struct - add a property.
#[proc_macro_derive(Introspectable, attributes(introspect))]
pub fn derive_introspectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_introspectable(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for the `ToValue` trait.
///
/// Enums serialize as the symbolic name of the active variant. Structs
/// serialize as an opaque `{type, value}` node from their `Debug` output.
#[proc_macro_derive(ToValue)]
pub fn derive_to_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_to_value(&input).into()
}

struct Member {
    name: String,
    type_tag: String,
    is_property: bool,
    public: bool,
    read: TokenStream2,
}

fn expand_introspectable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Introspectable can only be derived for structs",
        ));
    };

    let mut members = Vec::new();

    for (index, field) in data.fields.iter().enumerate() {
        let mut skip = false;
        let mut rename = None;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("introspect")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    rename = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename = \"...\"`"))
                }
            })?;
        }
        if skip {
            continue;
        }

        let (default_name, access) = match &field.ident {
            Some(ident) => (ident.unraw().to_string(), quote!(self.#ident)),
            None => {
                let idx = Index::from(index);
                (index.to_string(), quote!(self.#idx))
            }
        };

        members.push(Member {
            name: rename.unwrap_or(default_name),
            type_tag: type_tag(&field.ty),
            is_property: false,
            public: matches!(field.vis, syn::Visibility::Public(_)),
            read: quote!(::probe_core::ToValue::to_value(&#access)),
        });
    }

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("introspect")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("property") {
                return Err(meta.error("expected `property(method: Type)`"));
            }
            let content;
            syn::parenthesized!(content in meta.input);
            let method: Ident = content.parse()?;
            content.parse::<Token![:]>()?;
            let ty: Type = content.parse()?;

            members.push(Member {
                name: method.unraw().to_string(),
                type_tag: type_tag(&ty),
                is_property: true,
                public: true,
                read: quote!(::probe_core::Value::owned::<#ty>(self.#method())),
            });
            Ok(())
        })?;
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let infos = members.iter().map(|m| {
        let member_name = &m.name;
        let tag = &m.type_tag;
        let public = m.public;
        let kind = if m.is_property {
            quote!(::probe_core::MemberKind::Property)
        } else {
            quote!(::probe_core::MemberKind::Field)
        };
        quote! {
            ::probe_core::MemberInfo {
                name: #member_name,
                type_tag: #tag,
                kind: #kind,
                public: #public,
            }
        }
    });

    let arms = members.iter().map(|m| {
        let member_name = &m.name;
        let read = &m.read;
        quote!(#member_name => ::core::result::Result::Ok(#read),)
    });

    Ok(quote! {
        impl #impl_generics ::probe_core::Introspectable for #name #ty_generics #where_clause {
            fn members(&self) -> &'static [::probe_core::MemberInfo] {
                const MEMBERS: &[::probe_core::MemberInfo] = &[#(#infos),*];
                MEMBERS
            }

            fn read_member(
                &self,
                name: &str,
            ) -> ::core::result::Result<::probe_core::Value<'_>, ::probe_core::BridgeError> {
                match name {
                    #(#arms)*
                    _ => ::core::result::Result::Err(
                        ::probe_core::BridgeError::MemberNotFound(name.to_owned()),
                    ),
                }
            }
        }
    })
}

fn expand_to_value(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data.variants.iter().map(|variant| {
                let ident = &variant.ident;
                let variant_name = ident.unraw().to_string();
                let pattern = match &variant.fields {
                    Fields::Named(_) => quote!(Self::#ident { .. }),
                    Fields::Unnamed(_) => quote!(Self::#ident(..)),
                    Fields::Unit => quote!(Self::#ident),
                };
                quote!(#pattern => #variant_name,)
            });
            quote! {
                let variant = match self {
                    #(#arms)*
                };
                ::probe_core::Value::Enum {
                    type_name: #type_name,
                    variant,
                }
            }
        }
        Data::Struct(_) | Data::Union(_) => quote! {
            ::probe_core::Value::Opaque {
                type_name: #type_name.to_owned(),
                display: ::std::format!("{:?}", self),
            }
        },
    };

    quote! {
        impl #impl_generics ::probe_core::ToValue for #name #ty_generics #where_clause {
            fn to_value(&self) -> ::probe_core::Value<'_> {
                #body
            }
        }
    }
}

/// Render a type as source-like text: `Vec < i32 >` becomes `Vec<i32>`.
fn type_tag(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ' ' {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p));
            let next = chars.get(i + 1);
            let is_word = |c: Option<&char>| c.is_some_and(|c| c.is_alphanumeric() || *c == '_');
            if is_word(prev) && is_word(next) {
                out.push(' ');
            }
            continue;
        }
        out.push(ch);
    }
    out
}
