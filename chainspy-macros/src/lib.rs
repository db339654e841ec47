use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Derive macro for implementing `Instrumented`.
///
/// Reads every `#[spy(...)]` attribute on the type:
///
/// - `id = "literal"`: static identifier used when the property is absent
/// - `prop = "name"`: property the identifier is read from (default `spyId`)
/// - `host`: stop chain resolution at this component
/// - `listen("mount", "click", ...)`: locally listened event names
///
/// ```rust,ignore
/// #[derive(Instrumented)]
/// #[spy(id = "login-form", host, listen("mount", "submit"))]
/// struct LoginForm;
/// ```
#[proc_macro_derive(Instrumented, attributes(spy))]
pub fn derive_instrumented(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut args = SpyArgs::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("spy")) {
        match attr.parse_args::<SpyArgs>() {
            Ok(parsed) => args.merge(parsed),
            Err(err) => return err.to_compile_error().into(),
        }
    }

    let id_call = args.id.map(|id| quote! { .with_id(#id) });
    let prop_call = args.prop.map(|prop| quote! { .with_prop_name(#prop) });
    let host = args.host;
    let listen = &args.listen;
    let listen_len = listen.len();

    let expanded = quote! {
        impl #impl_generics ::chainspy::Instrumented for #name #ty_generics #where_clause {
            fn descriptor() -> ::chainspy::Descriptor {
                ::chainspy::Descriptor::new()
                    #id_call
                    #prop_call
                    .with_host(#host)
                    .with_listen::<[&str; #listen_len], &str>([#(#listen),*])
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SpyArgs {
    id: Option<LitStr>,
    prop: Option<LitStr>,
    host: bool,
    listen: Vec<LitStr>,
}

impl SpyArgs {
    fn merge(&mut self, other: SpyArgs) {
        if other.id.is_some() {
            self.id = other.id;
        }
        if other.prop.is_some() {
            self.prop = other.prop;
        }
        self.host |= other.host;
        self.listen.extend(other.listen);
    }
}

impl Parse for SpyArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = SpyArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "id" => {
                    input.parse::<Token![=]>()?;
                    args.id = Some(input.parse()?);
                }
                "prop" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "`prop` must not be empty"));
                    }
                    args.prop = Some(lit);
                }
                "host" => args.host = true,
                "listen" => {
                    let content;
                    syn::parenthesized!(content in input);
                    let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                    args.listen.extend(names);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown spy attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        if args.listen.iter().any(|name| name.value().is_empty()) {
            return Err(syn::Error::new(
                Span::call_site(),
                "listened event names must not be empty",
            ));
        }

        Ok(args)
    }
}
