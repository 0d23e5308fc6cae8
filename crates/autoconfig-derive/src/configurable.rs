//! `Configurable` derive macro implementation.

use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{quote, quote_spanned};
use syn::{Attribute, Data, DeriveInput, Field, Fields, LitStr, Path, Type, spanned::Spanned};

use crate::utils::{parse_docs, type_name};

#[derive(Default)]
struct ConfigFieldAttrs {
    key: Option<String>,
    rules: Option<String>,
    skip: bool,
}

impl ConfigFieldAttrs {
    fn new(attrs: &[Attribute]) -> syn::Result<Self> {
        let config_attrs = attrs.iter().filter(|attr| attr.path().is_ident("config"));

        let mut this = Self::default();
        let mut skip_span = None;
        for attr in config_attrs {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    let s: LitStr = meta.value()?.parse()?;
                    this.key = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("rules") {
                    let s: LitStr = meta.value()?.parse()?;
                    this.rules = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    this.skip = true;
                    skip_span = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error(
                        "Unsupported attribute; only `key`, `rules` and `skip` are supported",
                    ))
                }
            })?;
        }

        if let Some(skip_span) = skip_span {
            if this.key.is_some() || this.rules.is_some() {
                let message = "`skip` cannot be combined with `key` or `rules`";
                return Err(syn::Error::new(skip_span, message));
            }
        }
        Ok(this)
    }
}

struct ConfigField {
    attrs: ConfigFieldAttrs,
    name: Ident,
    ty: Type,
    docs: String,
}

impl ConfigField {
    fn new(raw: &Field) -> syn::Result<Self> {
        let name = raw.ident.clone().ok_or_else(|| {
            let message = "Only named fields are supported";
            syn::Error::new_spanned(raw, message)
        })?;

        Ok(Self {
            attrs: ConfigFieldAttrs::new(&raw.attrs)?,
            name,
            ty: raw.ty.clone(),
            docs: parse_docs(&raw.attrs),
        })
    }

    fn describe(&self, cr: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
        let name = &self.name;
        let name_str = name.to_string();
        let ty = &self.ty;
        let ty_name = type_name(ty);
        let docs = &self.docs;
        let key = wrap_in_option(self.attrs.key.as_deref());
        let rules = wrap_in_option(self.attrs.rules.as_deref());

        quote_spanned! {name.span()=>
            #cr::metadata::FieldDescriptor {
                name: #name_str,
                key: #key,
                rules: #rules,
                kind: <#ty as #cr::de::WellKnown>::KIND,
                rust_type: #cr::metadata::RustType::of::<#ty>(#ty_name),
                help: #docs,
                describe_nested: <#ty as #cr::de::WellKnown>::DESCRIBE_NESTED,
            }
        }
    }
}

fn wrap_in_option(value: Option<&str>) -> proc_macro2::TokenStream {
    if let Some(value) = value {
        quote!(::core::option::Option::Some(#value))
    } else {
        quote!(::core::option::Option::None)
    }
}

struct ConfigurableAttrs {
    cr: Option<Path>,
}

impl ConfigurableAttrs {
    fn new(attrs: &[Attribute]) -> syn::Result<Self> {
        let config_attrs = attrs.iter().filter(|attr| attr.path().is_ident("config"));

        let mut cr = None;
        for attr in config_attrs {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    cr = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("Unsupported attribute; only `crate` is supported"))
                }
            })?;
        }
        Ok(Self { cr })
    }
}

struct ConfigurableImpl {
    attrs: ConfigurableAttrs,
    name: Ident,
    help: String,
    fields: Vec<ConfigField>,
}

impl ConfigurableImpl {
    fn new(raw: &DeriveInput) -> syn::Result<Self> {
        let Data::Struct(data) = &raw.data else {
            let message = "#[derive(Configurable)] can only be placed on structs";
            return Err(syn::Error::new_spanned(raw, message));
        };
        let Fields::Named(fields) = &data.fields else {
            let message = "#[derive(Configurable)] can only be placed on structs with named fields";
            return Err(syn::Error::new_spanned(&data.fields, message));
        };
        if raw.generics.type_params().count() != 0
            || raw.generics.const_params().count() != 0
            || raw.generics.lifetimes().count() != 0
        {
            let message = "generics are not supported";
            return Err(syn::Error::new_spanned(&raw.generics, message));
        }

        let fields = fields
            .named
            .iter()
            .map(ConfigField::new)
            .collect::<syn::Result<_>>()?;
        Ok(Self {
            attrs: ConfigurableAttrs::new(&raw.attrs)?,
            name: raw.ident.clone(),
            help: parse_docs(&raw.attrs),
            fields,
        })
    }

    fn cr(&self) -> proc_macro2::TokenStream {
        if let Some(cr) = &self.attrs.cr {
            quote!(#cr)
        } else {
            let name = &self.name;
            quote_spanned!(name.span()=> ::autoconfig)
        }
    }

    fn visible_fields(&self) -> impl Iterator<Item = &ConfigField> + '_ {
        self.fields.iter().filter(|field| !field.attrs.skip)
    }

    fn derive_configurable(&self) -> proc_macro2::TokenStream {
        let cr = self.cr();
        let name = &self.name;
        let name_str = name.to_string();
        let help = &self.help;

        let descriptors = self.visible_fields().map(|field| field.describe(&cr));
        let field_names: Vec<_> = self.visible_fields().map(|field| &field.name).collect();
        let indices = 0..field_names.len();
        let indices_mut = indices.clone();

        quote! {
            impl #cr::Configurable for #name {
                fn describe() -> &'static #cr::metadata::RecordDescriptor {
                    static DESCRIPTOR: #cr::metadata::RecordDescriptor = #cr::metadata::RecordDescriptor {
                        ty: #cr::metadata::RustType::of::<#name>(#name_str),
                        help: #help,
                        fields: &[#(#descriptors,)*],
                    };
                    &DESCRIPTOR
                }

                fn descriptor(&self) -> &'static #cr::metadata::RecordDescriptor {
                    <Self as #cr::Configurable>::describe()
                }

                fn field(&self, index: usize) -> ::core::option::Option<&dyn #cr::de::ConfigValue> {
                    match index {
                        #(#indices => ::core::option::Option::Some(&self.#field_names),)*
                        _ => ::core::option::Option::None,
                    }
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<&mut dyn #cr::de::ConfigValue> {
                    match index {
                        #(#indices_mut => ::core::option::Option::Some(&mut self.#field_names),)*
                        _ => ::core::option::Option::None,
                    }
                }
            }

            impl #cr::de::ConfigValue for #name {
                fn kind(&self) -> #cr::metadata::FieldKind {
                    #cr::metadata::FieldKind::Record
                }

                fn is_zero(&self) -> bool {
                    #cr::de::_private::record_is_zero(self)
                }

                fn assign(
                    &mut self,
                    value: &#cr::value::WithOrigin,
                ) -> ::core::result::Result<(), #cr::ValueError> {
                    #cr::de::_private::assign_record(self, value)
                }

                fn to_value(&self) -> #cr::value::Value {
                    #cr::de::_private::record_to_value(self)
                }

                fn as_record_mut(
                    &mut self,
                ) -> ::core::result::Result<&mut dyn #cr::Configurable, #cr::ShapeError> {
                    ::core::result::Result::Ok(self)
                }
            }

            impl #cr::de::WellKnown for #name {
                const KIND: #cr::metadata::FieldKind = #cr::metadata::FieldKind::Record;
                const DESCRIBE_NESTED: ::core::option::Option<fn() -> &'static #cr::metadata::RecordDescriptor> =
                    ::core::option::Option::Some(<Self as #cr::Configurable>::describe);
            }
        }
    }
}

pub(crate) fn impl_configurable(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse(input) {
        Ok(input) => input,
        Err(err) => return err.into_compile_error().into(),
    };
    let trait_impl = match ConfigurableImpl::new(&input) {
        Ok(trait_impl) => trait_impl,
        Err(err) => return err.into_compile_error().into(),
    };
    trait_impl.derive_configurable().into()
}
