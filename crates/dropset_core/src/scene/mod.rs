//! Scene containers shared by placement, physics and annotation.

pub mod world;

pub use world::{base_name, Element, Instance, InstanceBuilder, SceneContext, Template};
