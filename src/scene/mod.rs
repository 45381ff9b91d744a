//! Flat scene description: objects, materials, lights, planar shadows.
//!
//! A `SceneObject` is a thin draw wrapper (world matrix + material + mesh
//! handle); meshes themselves are owned by the renderer and referenced by
//! `MeshKind`. There is no scene graph beyond this flat list; the only
//! hierarchy in the demo lives inside `CarModel`.

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector4};

/// Handle naming one of the renderer's prebuilt meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Box,
    Cylinder,
    Plane,
    House,
}

/// Phong material. The specular alpha channel carries the shininess power,
/// matching the packed layout the shader reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Material {
    /// Default lit material for solid objects.
    pub fn normal() -> Self {
        Self {
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.2, 0.2, 0.2, 16.0],
        }
    }

    /// Translucent black used for projected shadow geometry.
    pub fn shadow() -> Self {
        Self {
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.0, 0.0, 0.0, 0.5],
            specular: [0.0, 0.0, 0.0, 16.0],
        }
    }

    /// Normal material with a tinted diffuse color.
    pub fn tinted(r: f32, g: f32, b: f32) -> Self {
        Self {
            diffuse: [r, g, b, 1.0],
            ..Self::normal()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub direction: [f32; 3],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl DirectionalLight {
    /// The fixed overhead light of the demo scene.
    pub fn overhead() -> Self {
        Self {
            direction: [0.0, -1.0, 0.0],
            ambient: [0.5, 0.5, 0.5, 1.0],
            diffuse: [0.8, 0.8, 0.8, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: [f32; 3],
    pub range: f32,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// Constant/linear/quadratic attenuation coefficients.
    pub attenuation: [f32; 3],
}

impl PointLight {
    /// The fixed fill light that also casts the planar shadows.
    pub fn fill() -> Self {
        Self {
            position: [0.0, 10.0, -10.0],
            range: 2500.0,
            ambient: [0.3, 0.3, 0.3, 1.0],
            diffuse: [0.6, 0.6, 0.6, 1.0],
            specular: [0.2, 0.2, 0.2, 1.0],
            attenuation: [0.0, 0.1, 0.0],
        }
    }
}

/// World matrix + material + mesh reference; mutated by the scene driver
/// once per frame before draw submission.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: MeshKind,
    pub world: Matrix4<f32>,
    pub material: Material,
}

impl SceneObject {
    pub fn new(mesh: MeshKind, material: Material) -> Self {
        Self {
            mesh,
            world: Matrix4::identity(),
            material,
        }
    }

    pub fn with_world(mesh: MeshKind, material: Material, world: Matrix4<f32>) -> Self {
        Self {
            mesh,
            world,
            material,
        }
    }
}

/// Matrix flattening geometry onto `plane` as seen from `light`
/// (w = 0 directional, w = 1 positional): `dot(plane, light) * I - outer(light, plane)`.
///
/// The plane is normalized first, so callers can pass unnormalized
/// coefficients the way the original scene does.
pub fn shadow_matrix(plane: Vector4<f32>, light: Vector4<f32>) -> Matrix4<f32> {
    let normal_len = Vector4::new(plane.x, plane.y, plane.z, 0.0).magnitude();
    let p = plane / normal_len;
    let dot = p.dot(light);

    Matrix4::new(
        dot - light.x * p.x, -light.y * p.x, -light.z * p.x, -light.w * p.x,
        -light.x * p.y, dot - light.y * p.y, -light.z * p.y, -light.w * p.y,
        -light.x * p.z, -light.y * p.z, dot - light.z * p.z, -light.w * p.z,
        -light.x * p.w, -light.y * p.w, -light.z * p.w, dot - light.w * p.w,
    )
}
