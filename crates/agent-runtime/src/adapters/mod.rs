//! # Adapters
//!
//! Port implementations against the real collaborators:
//!
//! - `DockerRuntime` - Docker Engine API (bollard) for `ContainerRuntime`,
//!   `ContainerLister` and `LifecycleEventSource`
//! - `HttpMetadataClient` - metadata service JSON API for `MetadataSource`

pub mod docker;
pub mod metadata;

pub use docker::DockerRuntime;
pub use metadata::HttpMetadataClient;
