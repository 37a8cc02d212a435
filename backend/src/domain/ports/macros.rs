//! Declarative builder for port error enums.
//!
//! Port errors carry only human-readable context, so every field is a
//! `String` and each variant gets a snake-case constructor accepting
//! `impl Into<String>` per field.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : String),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: String),+ },
            )+
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = "Construct a [`" $name "::" $variant "`] error."]
                    pub fn [<$variant:snake>]($($field: impl Into<String>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                }
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum ShelterStoreError {
            Connection { message: String } => "shelter store unreachable: {message}",
            Conflict { slug: String, owner: String } => "{slug} already belongs to {owner}",
        }
    }

    #[test]
    fn constructors_accept_borrowed_and_owned_text() {
        let borrowed = ShelterStoreError::connection("timeout");
        let owned = ShelterStoreError::connection(String::from("timeout"));
        assert_eq!(borrowed, owned);
        assert_eq!(borrowed.to_string(), "shelter store unreachable: timeout");
    }

    #[test]
    fn multi_field_variants_keep_argument_order() {
        let err = ShelterStoreError::conflict("campana-2025", "ana");
        assert_eq!(err.to_string(), "campana-2025 already belongs to ana");
    }
}
