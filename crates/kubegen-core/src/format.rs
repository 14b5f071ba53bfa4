//! Format selection: content types, serializers and codecs

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{CodecError, Error, Result};
use crate::scheme::{GroupVersion, Scheme};

pub const YAML_CONTENT_TYPE: &str = "application/yaml";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Supported wire formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable structured format; the only one that is normalized.
    Yaml,
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from a content type, ignoring parameters and case.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        [Self::Yaml, Self::Json]
            .into_iter()
            .find(|format| format.content_type().eq_ignore_ascii_case(essence))
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Yaml => YAML_CONTENT_TYPE,
            Self::Json => JSON_CONTENT_TYPE,
        }
    }

    /// Extension used for generated files
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    pub fn comment_style(&self) -> CommentStyle {
        match self {
            Self::Yaml => CommentStyle::Hash,
            Self::Json => CommentStyle::None,
        }
    }
}

/// Comment syntax available for the generated-file banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Hash: `# comment`
    Hash,
    /// No comment support; files carry no banner
    None,
}

impl CommentStyle {
    /// Banner naming the generator and the file it was written to.
    pub fn banner(&self, generator: &str, filename: &str) -> Option<String> {
        match self {
            Self::Hash => Some(format!("# generated by {generator}\n# => {filename}\n---\n")),
            Self::None => None,
        }
    }
}

/// A registered media type and its serializers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerInfo {
    pub media_type: String,
    pub format: Format,
    /// Whether a pretty-printing variant of the serializer exists.
    pub pretty: bool,
}

impl SerializerInfo {
    pub fn yaml() -> Self {
        Self {
            media_type: YAML_CONTENT_TYPE.to_string(),
            format: Format::Yaml,
            pretty: false,
        }
    }

    pub fn json() -> Self {
        Self {
            media_type: JSON_CONTENT_TYPE.to_string(),
            format: Format::Json,
            pretty: true,
        }
    }
}

/// Serializer/deserializer pair bound to a scheme's version priority list.
#[derive(Debug, Clone, Copy)]
pub struct Codec<'s> {
    pub(crate) scheme: &'s Scheme,
    info: &'s SerializerInfo,
    pretty: bool,
}

impl<'s> Codec<'s> {
    pub fn format(&self) -> Format {
        self.info.format
    }

    pub fn media_type(&self) -> &str {
        &self.info.media_type
    }

    /// Whether output is pretty-printed. False when pretty output was
    /// requested but the serializer has no pretty variant.
    pub fn pretty_applied(&self) -> bool {
        self.pretty
    }

    /// Versions eligible for encoding, highest priority first.
    pub fn versions(&self) -> &'s [GroupVersion] {
        self.scheme.version_priority()
    }

    pub(crate) fn serialize<T: Serialize + ?Sized>(
        &self,
        value: &T,
    ) -> std::result::Result<Vec<u8>, CodecError> {
        match self.info.format {
            Format::Yaml => Ok(serde_yaml::to_string(value)?.into_bytes()),
            Format::Json => {
                let mut data = if self.pretty {
                    serde_json::to_vec_pretty(value)?
                } else {
                    serde_json::to_vec(value)?
                };
                data.push(b'\n');
                Ok(data)
            }
        }
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> std::result::Result<T, CodecError> {
        match self.info.format {
            Format::Yaml => Ok(serde_yaml::from_slice(data)?),
            Format::Json => Ok(serde_json::from_slice(data)?),
        }
    }
}

/// Resolve the codec for `content_type`.
///
/// Pretty printing is best effort: if the serializer has no pretty variant
/// the compact one is used and [`Codec::pretty_applied`] reports it.
pub fn resolve<'s>(scheme: &'s Scheme, content_type: &str, pretty: bool) -> Result<Codec<'s>> {
    let info = scheme
        .serializer_info(content_type)
        .ok_or_else(|| Error::unsupported(content_type))?;

    if pretty && !info.pretty {
        debug!(media_type = %info.media_type, "no pretty serializer, using compact output");
    }

    Ok(Codec {
        scheme,
        info,
        pretty: pretty && info.pretty,
    })
}
