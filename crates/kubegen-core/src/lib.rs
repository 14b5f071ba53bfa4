//! Encoding, normalization and partitioning of Kubernetes manifests
//!
//! Typed objects are encoded through a [`Codec`] resolved from a [`Scheme`],
//! cleaned of encoder noise by [`normalize`], and optionally split into one
//! artifact per object by a [`Partitioner`].

pub mod document;
pub mod encode;
pub mod error;
pub mod format;
pub mod io;
pub mod model;
pub mod normalize;
pub mod partition;
pub mod scheme;

pub use encode::{decode_list, encode, encode_list};
pub use error::{CodecError, Error, Result};
pub use format::{Codec, CommentStyle, Format, SerializerInfo, resolve};
pub use model::{Kind, Object, ObjectMeta};
pub use normalize::{normalize, normalize_format};
pub use partition::{
    Artifact, DumpReport, ExtensionPolicy, Partition, PartitionOptions, Partitioner, Rejected,
    write_artifacts,
};
pub use scheme::{GroupVersion, Scheme};

/// Name written into the banner of generated files.
pub const GENERATOR: &str = "kubegen";
