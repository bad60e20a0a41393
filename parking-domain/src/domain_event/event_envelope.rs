use crate::aggregate::Aggregate;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::metadata::Metadata;

/// 事件信封，包含事件载荷与元数据
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "A::Event: Serialize"))]
pub struct EventEnvelope<A>
where
    A: Aggregate,
{
    pub metadata: Metadata,
    pub payload: A::Event,
}

impl<A> EventEnvelope<A>
where
    A: Aggregate,
{
    pub fn new(aggregate_id: &A::Id, payload: A::Event, occurred_at: DateTime<Utc>) -> Self {
        let metadata = Metadata::builder()
            .aggregate_id(aggregate_id.to_string())
            .aggregate_type(A::TYPE.to_string())
            .occurred_at(occurred_at)
            .build();

        Self { metadata, payload }
    }
}
