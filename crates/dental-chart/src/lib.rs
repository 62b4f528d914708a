//! Procedural dental arch scene: tooth meshes, arch layout, clinical
//! appearance, hover/selection animation and the per-frame draw list.

pub mod appearance;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod geometry_cache;
pub mod gum;
pub mod layout;
pub mod messages;
pub mod profile;
pub mod scene;
pub mod visual_state;

pub use appearance::{MarkerShape, MarkerStyle, MaterialAttributes, Rgb, VisualAttributes};
pub use config::{AnimationConfig, GumConfig, MeshDetail, SceneConfig};
pub use dispatch::dispatch;
pub use error::SceneError;
pub use geometry_cache::{GeometryCache, ToothGeometry};
pub use layout::{ArchLayout, ArchPosition};
pub use messages::{DrawCommand, HostToScene, SceneToHost};
pub use scene::{
    build_scene, ArchScene, DrawEntry, DrawKind, DrawTransform, GeometryHandle, GeometryKey,
    PointerEvent, SceneStats,
};
pub use visual_state::{Interaction, VisualState};
