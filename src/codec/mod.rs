//! Pluggable persistence codecs for state data.
//!
//! A node may carry a codec for its data type, letting long-running machines
//! persist the data of their active states and restore it after a restart.
//! Codecs are never used for in-memory dispatch.

use crate::core::StateData;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub mod error;

pub use error::CodecError;

/// Serializer/deserializer for one node's data type.
pub trait DataCodec: Send + Sync {
    /// Name of the data type this codec handles.
    fn type_name(&self) -> &'static str;

    fn encode(&self, data: &StateData) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<StateData, CodecError>;
}

impl fmt::Debug for dyn DataCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataCodec({})", self.type_name())
    }
}

fn typed<D: Send + Sync + 'static>(data: &StateData) -> Result<&D, CodecError> {
    data.downcast_ref::<D>().ok_or(CodecError::TypeMismatch {
        expected: std::any::type_name::<D>(),
    })
}

/// Human-readable JSON codec.
///
/// # Example
///
/// ```rust
/// use statetree::codec::{DataCodec, JsonCodec};
/// use statetree::core::StateData;
/// use std::sync::Arc;
///
/// let codec = JsonCodec::<Vec<u32>>::new();
/// let data: StateData = Arc::new(vec![1u32, 2, 3]);
///
/// let bytes = codec.encode(&data).unwrap();
/// assert_eq!(bytes, b"[1,2,3]");
///
/// let restored = codec.decode(&bytes).unwrap();
/// assert_eq!(restored.downcast_ref::<Vec<u32>>(), Some(&vec![1, 2, 3]));
/// ```
pub struct JsonCodec<D> {
    _phantom: PhantomData<fn() -> D>,
}

impl<D> JsonCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// JSON codec for data of type `D`.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Wrap into the shared form stored on nodes.
    pub fn shared() -> Arc<dyn DataCodec> {
        Arc::new(Self::new())
    }
}

impl<D> Default for JsonCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DataCodec for JsonCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }

    fn encode(&self, data: &StateData) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(typed::<D>(data)?)
            .map_err(|e| CodecError::SerializationFailed(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<StateData, CodecError> {
        let value: D = serde_json::from_slice(bytes)
            .map_err(|e| CodecError::DeserializationFailed(e.to_string()))?;
        Ok(Arc::new(value))
    }
}

/// Compact binary codec.
pub struct BincodeCodec<D> {
    _phantom: PhantomData<fn() -> D>,
}

impl<D> BincodeCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Bincode codec for data of type `D`.
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Wrap into the shared form stored on nodes.
    pub fn shared() -> Arc<dyn DataCodec> {
        Arc::new(Self::new())
    }
}

impl<D> Default for BincodeCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DataCodec for BincodeCodec<D>
where
    D: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }

    fn encode(&self, data: &StateData) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(typed::<D>(data)?)
            .map_err(|e| CodecError::SerializationFailed(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<StateData, CodecError> {
        let value: D = bincode::deserialize(bytes)
            .map_err(|e| CodecError::DeserializationFailed(e.to_string()))?;
        Ok(Arc::new(value))
    }
}
