macro_rules! runtime_type_impls {
    (
        simple_types: {
            $( $variant:ident => $name:literal ),* $(,)?
        },
        complex_types: {
            $(
                $complex_variant:ident
                $( ( $($tuple_arg:tt)* ) )?
                $( { $($struct_arg:tt)* } )?
            ),* $(,)?
        },
        get_name: {
            $( $name_pat:pat => $name_expr:expr ),* $(,)?
        },
        erase: {
            $( $erase_pat:pat => $erase_expr:expr ),* $(,)?
        }
    ) => {
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub enum RuntimeType {
            $( $variant, )*
            $(
                $complex_variant
                $( ( $($tuple_arg)* ) )?
                $( { $($struct_arg)* } )?,
            )*
        }

        impl RuntimeType {
            /// Whether this is one of the built-in types that needs no registry definition
            /// to be named.
            pub fn is_simple(&self) -> bool {
                matches!(self, $( RuntimeType::$variant )|*)
            }

            pub fn get_name(&self) -> std::string::String {
                use RuntimeType::*;
                match self {
                    $( $variant => $name.to_string(), )*
                    $( $name_pat => $name_expr, )*
                }
            }

            /// The runtime class of this type: generic arguments are dropped and
            /// type parameters become `Object`.
            pub fn erase(&self) -> RuntimeType {
                use RuntimeType::*;
                match self {
                    $( $variant => $variant, )*
                    $( $erase_pat => $erase_expr, )*
                }
            }
        }
    };
}
