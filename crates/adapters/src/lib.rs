// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the container runtime and the media library.

pub mod container;
pub mod library;
pub mod subprocess;

pub use container::{ContainerError, ContainerHandle, ContainerRuntime, ContainerStatus, DockerCliRuntime};
pub use library::{CollectionInfo, CollectionKind, LibraryError, MediaLibrary};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use container::{ContainerCall, FakeContainerRuntime};
#[cfg(any(test, feature = "test-support"))]
pub use library::{FakeMediaLibrary, LibraryCall};
