//! Closed and open string enumerations
//!
//! [`closed_enum!`](crate::closed_enum) declares a catalog whose wire and tree
//! values must be one of the listed strings; anything else fails to
//! deserialize. Use it for values the code branches on.
//!
//! [`open_enum!`](crate::open_enum) declares a catalog that tolerates values
//! it does not know: they are kept verbatim in an `Other` variant and written
//! back unchanged. Use it for identity or context values that the remote side
//! may extend.

/// Error returned when parsing a value outside a closed catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {catalog} value {value:?}, expected one of: {}", .expected.join(", "))]
pub struct UnknownVariant {
    pub catalog: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Declare a closed string enumeration.
///
/// ```
/// cfgmap_core::closed_enum! {
///     /// Comparison operator
///     pub enum Operator {
///         Above => "ABOVE",
///         Below => "BELOW",
///     }
/// }
///
/// assert_eq!(Operator::Above.as_str(), "ABOVE");
/// assert_eq!("BELOW".parse::<Operator>().unwrap(), Operator::Below);
/// assert!(serde_json::from_str::<Operator>(r#""SIDEWAYS""#).is_err());
/// ```
#[macro_export]
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::catalog::UnknownVariant;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                match value {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::catalog::UnknownVariant {
                        catalog: stringify!($name),
                        value: other.to_string(),
                        expected: Self::VALUES,
                    }),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                use $crate::__serde::de::Error as _;
                let value = <::std::string::String as $crate::__serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                value.parse().map_err(D::Error::custom)
            }
        }
    };
}

/// Declare an open string enumeration.
///
/// ```
/// cfgmap_core::open_enum! {
///     pub enum Context {
///         Contextless => "CONTEXTLESS",
///         Aws => "AWS",
///     }
/// }
///
/// assert_eq!(Context::from("AWS"), Context::Aws);
/// let future = Context::from("KUBERNETES");
/// assert_eq!(future, Context::Other("KUBERNETES".to_string()));
/// assert_eq!(serde_json::to_string(&future).unwrap(), r#""KUBERNETES""#);
/// ```
#[macro_export]
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this catalog does not know, kept verbatim
            Other(::std::string::String),
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Other(value) => value.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl ::std::convert::From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $( $wire => $name::$variant, )+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                let value = <::std::string::String as $crate::__serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                Ok($name::from(value.as_str()))
            }
        }
    };
}
