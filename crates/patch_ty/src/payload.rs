use std::fmt;

use crate::Axis;

/// Camera projection flavor carried by `PayloadKind::CameraProjection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// The concrete value shapes a wire can carry. Closed set; polymorphism lives
/// in `Payload` (= `Axis<PayloadKind>`), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
    Color,
    CameraProjection(ProjectionMode),
}

impl PayloadKind {
    /// Number of scalar lanes per element. Derived, never stored — keeping a
    /// size field alongside the kind is how the two drift apart.
    pub fn stride(self) -> usize {
        match self {
            PayloadKind::Float => 1,
            PayloadKind::Int => 1,
            PayloadKind::Bool => 1,
            PayloadKind::Vec2 => 2,
            PayloadKind::Vec3 => 3,
            PayloadKind::Color => 4,
            PayloadKind::CameraProjection(_) => 1,
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Float => "float",
            PayloadKind::Int => "int",
            PayloadKind::Bool => "bool",
            PayloadKind::Vec2 => "vec2",
            PayloadKind::Vec3 => "vec3",
            PayloadKind::Color => "color",
            PayloadKind::CameraProjection(ProjectionMode::Perspective) => "cameraProjection",
            PayloadKind::CameraProjection(ProjectionMode::Orthographic) => {
                "cameraProjection(ortho)"
            }
        };
        f.write_str(name)
    }
}

/// A possibly-unresolved payload.
pub type Payload = Axis<PayloadKind>;

impl Payload {
    /// Stride of a resolved payload. A variable reaching this point means the
    /// solver's construction-time invariants were bypassed.
    pub fn stride(&self) -> usize {
        match self {
            Axis::Inst(kind) => kind.stride(),
            Axis::Var(v) => panic!("stride of unresolved payload variable {v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides() {
        assert_eq!(PayloadKind::Float.stride(), 1);
        assert_eq!(PayloadKind::Vec2.stride(), 2);
        assert_eq!(PayloadKind::Vec3.stride(), 3);
        assert_eq!(PayloadKind::Color.stride(), 4);
        assert_eq!(
            PayloadKind::CameraProjection(ProjectionMode::Perspective).stride(),
            1
        );
    }

    #[test]
    #[should_panic(expected = "unresolved payload variable")]
    fn stride_of_variable_is_fatal() {
        let p: Payload = Axis::var("p");
        let _ = p.stride();
    }
}
