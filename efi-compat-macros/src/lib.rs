// SPDX-License-Identifier: MIT OR Apache-2.0

#![recursion_limit = "128"]

extern crate proc_macro;

use proc_macro::TokenStream;

use proc_macro2::{Literal, TokenStream as TokenStream2, TokenTree};
use quote::{quote, ToTokens};
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, parse_quote, Error, Expr, ExprLit, Field, Fields, ItemStruct, Lit, LitStr,
};

macro_rules! err {
    ($span:expr, $message:expr $(,)?) => {
        Error::new($span.span(), $message).to_compile_error()
    };
    ($span:expr, $message:expr, $($args:expr),*) => {
        Error::new($span.span(), format!($message, $($args),*)).to_compile_error()
    };
}

/// Attribute macro for marking structs as protocols.
///
/// The macro takes one argument, either a GUID string literal or an
/// expression evaluating to a `Guid` (typically the `GUID` constant of the
/// matching raw table, e.g. `RngProtocol::GUID`).
///
/// The struct may have named fields or be a tuple struct wrapping the raw
/// table. The macro implements the [`Protocol`] trait and the `unsafe`
/// [`Identify`] trait for it, and adds a zero-sized `PhantomData<*const u8>`
/// field that makes the struct [`!Send` and `!Sync`][send-and-sync]. A
/// named-field struct gets the marker first, a tuple struct gets it last,
/// so `.0` keeps pointing at the wrapped table.
///
/// # Safety
///
/// The caller must ensure that the correct GUID is attached to the
/// type. An incorrect GUID could lead to invalid casts and other
/// unsound behavior.
///
/// # Example
///
/// ```
/// use efi_compat::{guid, Identify};
/// use efi_compat::proto::unsafe_protocol;
///
/// #[unsafe_protocol("12345678-9abc-def0-1234-56789abcdef0")]
/// struct ExampleProtocol {}
///
/// assert_eq!(ExampleProtocol::GUID, guid!("12345678-9abc-def0-1234-56789abcdef0"));
/// ```
///
/// [`Identify`]: https://docs.rs/efi-compat/latest/efi_compat/trait.Identify.html
/// [`Protocol`]: https://docs.rs/efi-compat/latest/efi_compat/proto/trait.Protocol.html
/// [send-and-sync]: https://doc.rust-lang.org/nomicon/send-and-sync.html
#[proc_macro_attribute]
pub fn unsafe_protocol(args: TokenStream, input: TokenStream) -> TokenStream {
    let expr = parse_macro_input!(args as Expr);

    let guid_val = match &expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => match parse_guid(lit.clone()) {
            Ok(bytes) => quote!(::efi_compat::Guid::from_bytes([#(#bytes),*])),
            Err(tokens) => return tokens.into(),
        },
        Expr::Path(_) | Expr::Field(_) | Expr::Call(_) | Expr::Block(_) => {
            expr.to_token_stream()
        }
        _ => {
            return err!(
                expr,
                "macro input must be either a string literal or a path to a Guid constant"
            )
            .into()
        }
    };

    let mut item_struct = parse_macro_input!(input as ItemStruct);

    if matches!(item_struct.fields, Fields::Unit) {
        return err!(
            item_struct,
            "protocol struct must have named fields or be a tuple struct"
        )
        .into();
    }

    match &mut item_struct.fields {
        Fields::Named(fields) => {
            // Raw pointer marker: makes the struct !Send and !Sync.
            let marker: Field = parse_quote! {
                _no_send_or_sync: ::core::marker::PhantomData<*const u8>
            };
            fields.named.insert(0, marker);
        }
        Fields::Unnamed(fields) => {
            let marker: Field = parse_quote!(::core::marker::PhantomData<*const u8>);
            fields.unnamed.push(marker);
        }
        Fields::Unit => {}
    }

    let ident = &item_struct.ident;
    let (impl_generics, ty_generics, where_clause) = item_struct.generics.split_for_impl();

    quote! {
        #item_struct

        unsafe impl #impl_generics ::efi_compat::Identify for #ident #ty_generics #where_clause {
            const GUID: ::efi_compat::Guid = #guid_val;
        }

        impl #impl_generics ::efi_compat::proto::Protocol for #ident #ty_generics #where_clause {}
    }
    .into()
}

/// Validate a canonical GUID string and return it in wire byte order.
///
/// The first three groups are little-endian on the wire, the last two are
/// stored as written.
fn parse_guid(guid_lit: LitStr) -> Result<[u8; 16], TokenStream2> {
    let guid_str = guid_lit.value();

    // Canonical form: "12345678-9abc-def0-fedc-ba9876543210".
    if guid_str.len() != 36 {
        return Err(err!(
            guid_lit,
            "\"{}\" is not a canonical GUID string (expected 36 bytes, found {})",
            guid_str,
            guid_str.len()
        ));
    }

    // The literal as a token so errors can point at the offending group.
    let lit = match guid_lit.to_token_stream().into_iter().next() {
        Some(TokenTree::Literal(lit)) => lit,
        _ => Literal::string(&guid_str),
    };

    let mut offset = 1; // Skip the opening quote.
    let mut groups = guid_str.split('-');
    let mut next_group = |len: usize| -> Result<u64, TokenStream2> {
        let group = groups.next().unwrap_or("");
        let span = lit
            .subspan(offset..offset + group.len())
            .unwrap_or_else(|| lit.span());

        if group.len() != len * 2 {
            return Err(err!(
                span,
                "GUID component \"{}\" is not a {}-bit hexadecimal string",
                group,
                len * 8
            ));
        }
        offset += group.len() + 1;
        u64::from_str_radix(group, 16).map_err(|_| {
            err!(
                span,
                "GUID component \"{}\" is not a hexadecimal number",
                group
            )
        })
    };

    let time_low = next_group(4)? as u32;
    let time_mid = next_group(2)? as u16;
    let time_high = next_group(2)? as u16;
    let clock_seq = next_group(2)? as u16;
    let node = next_group(6)?;

    let mut bytes = [0; 16];
    bytes[0..4].copy_from_slice(&time_low.to_le_bytes());
    bytes[4..6].copy_from_slice(&time_mid.to_le_bytes());
    bytes[6..8].copy_from_slice(&time_high.to_le_bytes());
    bytes[8..10].copy_from_slice(&clock_seq.to_be_bytes());
    bytes[10..16].copy_from_slice(&node.to_be_bytes()[2..]);
    Ok(bytes)
}
