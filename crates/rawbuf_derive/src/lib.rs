use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, parse_macro_input, parse_quote};

/// Derives `rawbuf::Blittable` for a fixed-layout struct.
///
/// Accepted layouts are conservative: the struct must be `#[repr(C)]` or
/// `#[repr(transparent)]`, every field must itself be `Blittable`, and the
/// struct size must equal the sum of its field sizes (no padding). The last
/// condition is checked at compile time when the type is used.
#[proc_macro_derive(Blittable)]
pub fn derive_blittable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(DataStruct { fields, .. }) => fields,
        _ => {
            return syn::Error::new_spanned(
                &input.ident,
                "Blittable can only be derived for structs",
            )
            .to_compile_error()
            .into();
        }
    };

    match has_fixed_repr(&input) {
        Ok(true) => {}
        Ok(false) => {
            return syn::Error::new_spanned(
                &input.ident,
                "Blittable requires #[repr(C)] or #[repr(transparent)]",
            )
            .to_compile_error()
            .into();
        }
        Err(e) => return e.to_compile_error().into(),
    }

    let field_types: Vec<_> = match fields {
        Fields::Named(named) => named.named.iter().map(|f| &f.ty).collect(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().map(|f| &f.ty).collect(),
        Fields::Unit => Vec::new(),
    };

    let mut generics = input.generics.clone();
    {
        let where_clause = generics.make_where_clause();
        for ty in &field_types {
            where_clause
                .predicates
                .push(parse_quote!(#ty: ::rawbuf::Blittable));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        unsafe impl #impl_generics ::rawbuf::Blittable for #struct_name #ty_generics #where_clause {
            const LAYOUT_CHECK: () = {
                #( let () = <#field_types as ::rawbuf::Blittable>::LAYOUT_CHECK; )*
                assert!(
                    ::core::mem::size_of::<Self>() == 0 #( + ::core::mem::size_of::<#field_types>() )*,
                    "Blittable types must not contain padding bytes"
                );
            };
        }
    };

    TokenStream::from(expanded)
}

fn has_fixed_repr(input: &DeriveInput) -> syn::Result<bool> {
    let mut fixed = false;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("C") || meta.path.is_ident("transparent") {
                fixed = true;
            } else if meta.input.peek(syn::token::Paren) {
                // packed(N), align(N)
                let content;
                syn::parenthesized!(content in meta.input);
                content.parse::<syn::LitInt>()?;
            }
            Ok(())
        })?;
    }
    Ok(fixed)
}
