//! Object encoding and decoding with version negotiation

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::document::{ShapeError, join, type_name};
use crate::error::{CodecError, Error, Result};
use crate::format::{Codec, resolve};
use crate::model::{Kind, Object, RawObject};
use crate::normalize::normalize_format;
use crate::scheme::{GroupVersion, Scheme};

const LIST_KIND: &str = "List";
const LIST_VERSION: &str = "v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    api_version: &'a str,
    kind: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

/// An object paired with the version it is written as.
struct Versioned<'a> {
    api_version: String,
    object: &'a Object,
}

impl Serialize for Versioned<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let api_version = self.api_version.as_str();
        let kind = self.object.kind();
        match self.object {
            Object::Service(body) => Envelope { api_version, kind, body }.serialize(serializer),
            Object::Deployment(body) => Envelope { api_version, kind, body }.serialize(serializer),
            Object::ReplicaSet(body) => Envelope { api_version, kind, body }.serialize(serializer),
            Object::DaemonSet(body) => Envelope { api_version, kind, body }.serialize(serializer),
            Object::StatefulSet(body) => Envelope { api_version, kind, body }.serialize(serializer),
            Object::Other(raw) => Envelope {
                api_version,
                kind,
                body: &raw.fields,
            }
            .serialize(serializer),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct List<'a> {
    api_version: &'a str,
    kind: &'a str,
    metadata: Mapping,
    items: Vec<Versioned<'a>>,
}

fn describe(object: &Object) -> String {
    format!("{} {:?}", object.kind(), object.name())
}

impl Codec<'_> {
    /// Pick the version an object is written as: the first version in
    /// priority order that serves its kind. Objects outside the closed set
    /// keep the version they were decoded with.
    fn negotiate<'o>(&self, object: &'o Object) -> Result<Versioned<'o>> {
        let api_version = if let Object::Other(raw) = object {
            raw.api_version.clone()
        } else {
            let kind = object.known_kind();
            self.versions()
                .iter()
                .find(|version| kind.is_some_and(|kind| self.scheme.recognizes(version, kind)))
                .map(ToString::to_string)
                .ok_or_else(|| {
                    Error::encode(
                        "encode",
                        describe(object),
                        self.media_type(),
                        CodecError::Version(format!(
                            "no eligible version serves kind {}",
                            object.kind()
                        )),
                    )
                })?
        };

        debug!(kind = object.kind(), name = object.name(), %api_version, "negotiated version");
        Ok(Versioned {
            api_version,
            object,
        })
    }

    /// Encode one object. The output is not normalized.
    pub fn encode(&self, object: &Object) -> Result<Vec<u8>> {
        let versioned = self.negotiate(object)?;
        self.serialize(&versioned)
            .map_err(|e| Error::encode("encode", describe(object), self.media_type(), e))
    }

    /// Encode objects as a single `List` document, keeping their order.
    /// The output is not normalized.
    pub fn encode_list(&self, items: &[Object]) -> Result<Vec<u8>> {
        let items = items
            .iter()
            .map(|object| self.negotiate(object))
            .collect::<Result<Vec<_>>>()?;

        let list = List {
            api_version: LIST_VERSION,
            kind: LIST_KIND,
            metadata: Mapping::new(),
            items,
        };

        self.serialize(&list)
            .map_err(|e| Error::encode("encode", "list", self.media_type(), e))
    }

    /// Decode a single object.
    pub fn decode(&self, data: &[u8]) -> Result<Object> {
        let value: Value = self
            .deserialize(data)
            .map_err(|e| Error::decode("decode", self.media_type(), e))?;
        self.object_from_value(value, "")
    }

    /// Decode a `List` document into its items, or a single object into a
    /// one-element vector.
    pub fn decode_list(&self, data: &[u8]) -> Result<Vec<Object>> {
        let value: Value = self
            .deserialize(data)
            .map_err(|e| Error::decode("decode", self.media_type(), e))?;

        if value.get("kind").and_then(Value::as_str) != Some(LIST_KIND) {
            return Ok(vec![self.object_from_value(value, "")?]);
        }

        let items = match value.get("items") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(items)) => items,
            Some(other) => {
                return Err(self.shape(ShapeError::new("items", "sequence", type_name(other))));
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.object_from_value(item.clone(), &format!("items[{i}]")))
            .collect()
    }

    fn object_from_value(&self, value: Value, at: &str) -> Result<Object> {
        let mut fields = match value {
            Value::Mapping(fields) => fields,
            other => {
                let path = if at.is_empty() { "document" } else { at };
                return Err(self.shape(ShapeError::new(path, "mapping", type_name(&other))));
            }
        };

        let api_version = self.take_string(&mut fields, "apiVersion", at)?;
        let kind = self.take_string(&mut fields, "kind", at)?;

        let Some(known) = Kind::parse(&kind) else {
            debug!(%kind, %api_version, "decoded object of unknown kind");
            return Ok(Object::Other(RawObject {
                api_version,
                kind,
                fields,
            }));
        };

        if !self.scheme.recognizes(&GroupVersion::parse(&api_version), known) {
            return Err(Error::decode(
                "decode",
                self.media_type(),
                CodecError::Version(format!(
                    "kind {kind} is not registered for version {api_version}"
                )),
            ));
        }

        let value = Value::Mapping(fields);
        Ok(match known {
            Kind::Service => Object::Service(self.typed(value)?),
            Kind::Deployment => Object::Deployment(self.typed(value)?),
            Kind::ReplicaSet => Object::ReplicaSet(self.typed(value)?),
            Kind::DaemonSet => Object::DaemonSet(self.typed(value)?),
            Kind::StatefulSet => Object::StatefulSet(self.typed(value)?),
        })
    }

    fn typed<T: DeserializeOwned>(&self, value: Value) -> Result<T> {
        serde_yaml::from_value(value).map_err(|e| Error::decode("decode", self.media_type(), e))
    }

    fn take_string(&self, fields: &mut Mapping, key: &str, at: &str) -> Result<String> {
        let found = match fields.shift_remove(key) {
            Some(Value::String(s)) if !s.is_empty() => return Ok(s),
            Some(Value::String(_)) => "empty string",
            Some(other) => type_name(&other),
            None => "nothing",
        };
        Err(self.shape(ShapeError::new(join(at, key), "string", found)))
    }

    fn shape(&self, error: ShapeError) -> Error {
        Error::shape("decode", self.media_type(), error)
    }
}

/// Encode one object and normalize the result.
pub fn encode(scheme: &Scheme, object: &Object, content_type: &str, pretty: bool) -> Result<Vec<u8>> {
    let codec = resolve(scheme, content_type, pretty)?;
    let data = codec.encode(object)?;
    normalize_format(codec.format(), codec.media_type(), &data)
}

/// Encode objects as one `List` document and normalize the result.
pub fn encode_list(
    scheme: &Scheme,
    items: &[Object],
    content_type: &str,
    pretty: bool,
) -> Result<Vec<u8>> {
    let codec = resolve(scheme, content_type, pretty)?;
    let data = codec.encode_list(items)?;
    debug!(items = items.len(), bytes = data.len(), "encoded list");
    normalize_format(codec.format(), codec.media_type(), &data)
}

/// Decode a manifest holding a `List` or a single object.
pub fn decode_list(scheme: &Scheme, data: &[u8], content_type: &str) -> Result<Vec<Object>> {
    resolve(scheme, content_type, false)?.decode_list(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
    use crate::model::{ObjectMeta, Service, StatefulSet};

    fn service(name: &str) -> Object {
        Service {
            metadata: ObjectMeta::named(name),
            ..Service::default()
        }
        .into()
    }

    #[test]
    fn test_encode_sets_negotiated_version() {
        let scheme = Scheme::new();
        let codec = resolve(&scheme, YAML_CONTENT_TYPE, false).unwrap();

        let data = String::from_utf8(codec.encode(&service("api")).unwrap()).unwrap();
        assert!(data.starts_with("apiVersion: v1\nkind: Service\n"));

        let ss: Object = StatefulSet {
            metadata: ObjectMeta::named("db"),
            ..StatefulSet::default()
        }
        .into();
        let data = String::from_utf8(codec.encode(&ss).unwrap()).unwrap();
        assert!(data.starts_with("apiVersion: apps/v1beta1\nkind: StatefulSet\n"));
    }

    #[test]
    fn test_encode_without_eligible_version() {
        let mut scheme = Scheme::new();
        scheme.set_version_priority(vec![GroupVersion::parse("v1")]);
        let codec = resolve(&scheme, JSON_CONTENT_TYPE, false).unwrap();

        let ss: Object = StatefulSet::default().into();
        let err = codec.encode(&ss).unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                source: CodecError::Version(_),
                ..
            }
        ));
    }

    #[test]
    fn test_decode_rejects_unregistered_version() {
        let scheme = Scheme::new();
        let codec = resolve(&scheme, YAML_CONTENT_TYPE, false).unwrap();
        let err = codec
            .decode(b"apiVersion: apps/v1beta1\nkind: Service\nmetadata:\n  name: api\n")
            .unwrap_err();
        assert!(err.to_string().contains("not registered for version apps/v1beta1"));
    }

    #[test]
    fn test_decode_requires_kind() {
        let scheme = Scheme::new();
        let codec = resolve(&scheme, YAML_CONTENT_TYPE, false).unwrap();
        let err = codec.decode(b"apiVersion: v1\nmetadata: {}\n").unwrap_err();
        assert!(err.to_string().ends_with("kind: expected string, found nothing"));
    }

    #[test]
    fn test_decode_single_object_as_list() {
        let scheme = Scheme::new();
        let items = decode_list(
            &scheme,
            b"{\"apiVersion\":\"v1\",\"kind\":\"Service\",\"metadata\":{\"name\":\"api\"}}",
            JSON_CONTENT_TYPE,
        )
        .unwrap();
        assert_eq!(items, vec![service("api")]);
    }
}
