//! Wire JSON codec with unknown-field preservation
//!
//! Decoding hands the raw object to [`WireEntity::from_wire`] through a
//! consuming [`PropertyDecoder`]. Whatever the entity did not consume is kept
//! as its [`Unknowns`]. Encoding writes the modeled fields first and then
//! merges the unknowns back in without overwriting any modeled key.
//!
//! ```
//! use cfgmap_core::wire::{self, Unknowns, WireEntity};
//! use cfgmap_core::{Properties, PropertyDecoder, Result};
//!
//! #[derive(Debug, Default)]
//! struct Zone {
//!     name: String,
//!     unknowns: Unknowns,
//! }
//!
//! impl WireEntity for Zone {
//!     fn to_wire(&self, props: &mut Properties) -> Result<()> {
//!         props.encode("name", &self.name)?;
//!         Ok(())
//!     }
//!     fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
//!         Ok(Zone { name: fields.take_required("name")?, ..Default::default() })
//!     }
//!     fn unknowns(&self) -> &Unknowns { &self.unknowns }
//!     fn set_unknowns(&mut self, unknowns: Unknowns) { self.unknowns = unknowns; }
//! }
//!
//! let zone: Zone = wire::from_str(r#"{"name": "prod", "rules": []}"#).unwrap();
//! assert!(zone.unknowns.contains_key("rules"));
//! assert_eq!(wire::to_string(&zone).unwrap(), r#"{"name":"prod","rules":[]}"#);
//! ```

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result, type_name};
use crate::props::{Properties, PropertyDecoder};

/// Wire fields with no modeled counterpart, keyed by JSON field name
pub type Unknowns = Map<String, Value>;

/// Conversion between a typed entity and its wire JSON object
pub trait WireEntity: Sized {
    /// Write modeled fields. Absent optional fields must be skipped.
    fn to_wire(&self, props: &mut Properties) -> Result<()>;

    /// Consume modeled fields from the raw object.
    fn from_wire(fields: &mut PropertyDecoder) -> Result<Self>;

    fn unknowns(&self) -> &Unknowns;

    fn set_unknowns(&mut self, unknowns: Unknowns);
}

/// Entity carrying a server-assigned identifier
pub trait Identified {
    fn remote_id(&self) -> Option<&str>;

    fn set_remote_id(&mut self, id: Option<String>);

    /// Human-readable name used in list stubs.
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// Encode an entity into a wire JSON value.
pub fn to_value<T: WireEntity>(entity: &T) -> Result<Value> {
    let mut props = Properties::new();
    entity.to_wire(&mut props)?;
    let mut object = props.into_map();
    for (key, value) in entity.unknowns() {
        if object.contains_key(key) {
            debug!(field = %key, "modeled field shadows stale unknown");
            continue;
        }
        object.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(object))
}

pub fn to_string<T: WireEntity>(entity: &T) -> Result<String> {
    Ok(serde_json::to_string(&to_value(entity)?)?)
}

pub fn to_string_pretty<T: WireEntity>(entity: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_value(entity)?)?)
}

/// Decode an entity from a wire JSON value.
pub fn from_value<T: WireEntity>(value: Value) -> Result<T> {
    let Value::Object(object) = value else {
        return Err(Error::NotAnObject {
            found: type_name(&value).to_string(),
        });
    };
    let mut fields = PropertyDecoder::new(object);
    let mut entity = T::from_wire(&mut fields)?;
    let unknowns = fields.into_remaining();
    if !unknowns.is_empty() {
        debug!(
            entity = std::any::type_name::<T>(),
            fields = ?unknowns.keys().collect::<Vec<_>>(),
            "preserving unmodeled wire fields"
        );
    }
    entity.set_unknowns(unknowns);
    Ok(entity)
}

/// Decode an entity from wire JSON text.
pub fn from_str<T: WireEntity>(text: &str) -> Result<T> {
    let value: Value = serde_json::from_str(text).map_err(|e| Error::Malformed(e.to_string()))?;
    from_value(value)
}

pub fn from_slice<T: WireEntity>(bytes: &[u8]) -> Result<T> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| Error::Malformed(e.to_string()))?;
    from_value(value)
}

/// Implement `serde::Serialize` and `serde::Deserialize` for a [`WireEntity`].
///
/// ```ignore
/// cfgmap_core::impl_wire_serde!(AlertingProfile);
/// ```
#[macro_export]
macro_rules! impl_wire_serde {
    ($ty:ty) => {
        impl $crate::__serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__serde::Serializer,
            {
                use $crate::__serde::ser::Error as _;
                let value = $crate::wire::to_value(self).map_err(S::Error::custom)?;
                $crate::__serde::Serialize::serialize(&value, serializer)
            }
        }

        impl<'de> $crate::__serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__serde::Deserializer<'de>,
            {
                use $crate::__serde::de::Error as _;
                let value = <$crate::__serde_json::Value as $crate::__serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                $crate::wire::from_value(value).map_err(D::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Profile {
        name: String,
        zone: Option<String>,
        enabled: Option<bool>,
        unknowns: Unknowns,
    }

    impl WireEntity for Profile {
        fn to_wire(&self, props: &mut Properties) -> Result<()> {
            props
                .encode("name", &self.name)?
                .encode("zone", &self.zone)?
                .encode("enabled", &self.enabled)?;
            Ok(())
        }

        fn from_wire(fields: &mut PropertyDecoder) -> Result<Self> {
            Ok(Self {
                name: fields.take_required("name")?,
                zone: fields.take("zone")?,
                enabled: fields.take("enabled")?,
                unknowns: Unknowns::new(),
            })
        }

        fn unknowns(&self) -> &Unknowns {
            &self.unknowns
        }

        fn set_unknowns(&mut self, unknowns: Unknowns) {
            self.unknowns = unknowns;
        }
    }

    crate::impl_wire_serde!(Profile);

    #[test]
    fn test_unknown_field_survives_roundtrip() {
        let original = json!({"name": "prod", "enabled": false, "futureField": {"a": [1, 2]}});
        let profile: Profile = from_value(original.clone()).unwrap();

        assert_eq!(profile.enabled, Some(false));
        assert_eq!(profile.unknowns.get("futureField"), Some(&json!({"a": [1, 2]})));
        assert_eq!(to_value(&profile).unwrap(), original);
    }

    #[test]
    fn test_modeled_field_wins_over_stale_unknown() {
        let mut profile = Profile {
            name: "live".into(),
            ..Default::default()
        };
        profile.unknowns.insert("name".into(), json!("stale"));
        profile.unknowns.insert("extra".into(), json!(1));

        assert_eq!(
            to_value(&profile).unwrap(),
            json!({"name": "live", "extra": 1})
        );
    }

    #[test]
    fn test_absent_optional_never_emitted_as_null() {
        let profile = Profile {
            name: "a".into(),
            ..Default::default()
        };
        insta::assert_snapshot!(to_string_pretty(&profile).unwrap(), @r###"
        {
          "name": "a"
        }
        "###);
    }

    #[test]
    fn test_malformed_json() {
        let err = from_str::<Profile>("{not json").unwrap_err();
        assert!(err.is_malformed_wire());
    }

    #[test]
    fn test_non_object_document() {
        let err = from_str::<Profile>("[1]").unwrap_err();
        assert!(matches!(err, Error::NotAnObject { ref found } if found == "list"));
    }

    #[test]
    fn test_serde_bridge() {
        let profile: Profile =
            serde_json::from_str(r#"{"name": "x", "zone": "eu", "v2": true}"#).unwrap();
        assert_eq!(profile.zone.as_deref(), Some("eu"));
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"name": "x", "zone": "eu", "v2": true})
        );
    }
}
