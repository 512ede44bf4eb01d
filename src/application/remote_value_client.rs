// Port for the remote time-series service
use crate::domain::binding::{DataBinding, DataPoint, TimeWindow, ValueKind};
use crate::domain::error::{FetchError, TypeResolutionError};
use async_trait::async_trait;

#[async_trait]
pub trait RemoteValueClient: Send + Sync {
    /// Look up the declared value kind of the binding's property.
    async fn resolve_value_kind(
        &self,
        binding: &DataBinding,
    ) -> Result<ValueKind, TypeResolutionError>;

    /// Newest sample of the binding's property within `window`, decoded per
    /// `kind` and stamped with the window end. `None` if the window is empty.
    async fn fetch_latest(
        &self,
        binding: &DataBinding,
        kind: ValueKind,
        window: TimeWindow,
    ) -> Result<Option<DataPoint>, FetchError>;
}
