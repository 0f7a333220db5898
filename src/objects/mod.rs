//! Concrete scene object types.
//!
//! Each type knows how to construct itself from bound [`Args`] and how to
//! serialize itself back into a description the builder accepts. Geometry
//! math stays on the viewer side; these are typed records.
//!
//! [`Args`]: crate::scene::Args

/// Implements the boilerplate half of `SceneObject`.
macro_rules! scene_object_common {
    ($name:literal) => {
        fn type_name(&self) -> &'static str {
            $name
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

mod light;
mod line;
mod plot;
mod polyhedron;
mod shapes;
mod transform;
mod volume;

pub use light::PointLight;
pub use line::Line;
pub use plot::PlotImage;
pub use polyhedron::Polyhedron;
pub use shapes::{BoxShape, Cylinder, Plane, Sphere};
pub use transform::Transform;
pub use volume::Volume;

use crate::scene::{Args, BuildError};

/// Reject non-positive sizes.
fn positive(args: &Args<'_>, name: &str, value: f64) -> Result<f64, BuildError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(BuildError::InvalidArgument {
            type_name: args.type_name().to_string(),
            name: name.to_string(),
            expected: "a positive number",
            fragment: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests;
