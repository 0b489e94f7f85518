// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! adx-core: domain types for the Action Dispatch & Execution Engine.

pub mod clock;
pub mod error;
pub mod id;
pub mod param;
pub mod queue;
pub mod target;
pub mod work_unit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::EngineError;
pub use id::{rand8, IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use param::{decode_params, encode_params, ParamMap, ParamValue};
pub use queue::{DequeueStrategy, QueueFamily, QueueName};
pub use target::{ChunkCollection, ChunkPlan, TargetDescriptor, TargetShape, TargetType, TrackInfo};
pub use work_unit::{
    ContainerSpec, UnitEvent, UnitMeta, UnitState, VolumeBind, WorkUnit, WorkUnitId,
};
