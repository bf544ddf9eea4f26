// SPDX-License-Identifier: MIT OR Apache-2.0

//! C-style enums modelled as integer newtypes.
//!
//! Firmware is free to hand back values that were not known when this crate
//! was written. Storing such a value in a Rust `enum` is undefined behavior,
//! so the enums here are newtypes over their base type with a set of
//! associated constants.

/// Define a C-style enum as a newtype with one associated constant per
/// variant.
///
/// The generated `Debug` implementation prints the variant name for known
/// values and `Type(value)` otherwise.
macro_rules! newtype_enum {
    (
        $(#[$type_attrs:meta])*
        $visibility:vis enum $type:ident : $base:ty => $(#[$impl_attrs:meta])* {
            $(
                $(#[$variant_attrs:meta])*
                $variant:ident = $value:expr,
            )*
        }
    ) => {
        $(#[$type_attrs])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        $visibility struct $type(pub $base);

        $(#[$impl_attrs])*
        #[allow(unused)]
        impl $type {
            $(
                $(#[$variant_attrs])*
                pub const $variant: $type = $type($value);
            )*
        }

        impl core::fmt::Debug for $type {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match *self {
                    $(
                        $type::$variant => f.write_str(stringify!($variant)),
                    )*
                    $type(unknown) => {
                        write!(f, "{}({})", stringify!($type), unknown)
                    }
                }
            }
        }
    }
}
