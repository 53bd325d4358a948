use crate::coordinate::to_host_matrix;
use crate::error::DeviceErrorLog;
use rust_hmdbridge_api::{VREye, VRHeadset, VRProjectionFrustum};

/// Host-convention projection matrix, row-vector layout `m[row][col]`.
/// Rows 0 to 2 multiply view-space right, up and forward. Depth is reversed:
/// the near plane maps to 1 and the far plane (or infinity) to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionMatrix {
    pub m: [[f32; 4]; 4],
}

impl Default for ProjectionMatrix {
    fn default() -> ProjectionMatrix {
        ProjectionMatrix {
            m: identity_matrix!(),
        }
    }
}

impl ProjectionMatrix {
    /// Multiplies the view-space point `[x, y, z, 1]` by the matrix, returning clip coordinates.
    pub fn project(&self, point: [f32; 3]) -> [f32; 4] {
        let mut clip = [0.0; 4];
        for (col, value) in clip.iter_mut().enumerate() {
            *value = point[0] * self.m[0][col]
                + point[1] * self.m[1][col]
                + point[2] * self.m[2][col]
                + self.m[3][col];
        }
        clip
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().flat_map(|row| row.iter()).all(|v| v.is_finite())
    }

    // Depth terms for the host's reversed-Z convention.
    // Equal planes select the infinite far plane form.
    fn overwrite_depth(&mut self, near: f32, far: f32) {
        self.m[3][3] = 0.0;
        self.m[2][3] = 1.0;
        if near == far {
            self.m[2][2] = 0.0;
            self.m[3][2] = near;
        } else {
            self.m[2][2] = near / (near - far);
            self.m[3][2] = -far * near / (near - far);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedProjection {
    frustum: VRProjectionFrustum,
    near: f32,
    far: f32,
    matrix: ProjectionMatrix,
}

/// Builds stereo projection matrices and keeps the last one computed for each eye.
pub struct ProjectionBuilder {
    near: f32,
    far: f32,
    cache: [Option<CachedProjection>; 2],
    errors: DeviceErrorLog,
}

impl ProjectionBuilder {
    pub fn new(near: f32, far: f32) -> ProjectionBuilder {
        ProjectionBuilder {
            near,
            far,
            cache: [None, None],
            errors: DeviceErrorLog::new(),
        }
    }

    /// Off-center perspective from the four half-angle tangents of `frustum`.
    pub fn build(frustum: &VRProjectionFrustum, near: f32, far: f32) -> ProjectionMatrix {
        let l = frustum.left;
        let r = frustum.right;
        let t = frustum.top;
        let b = frustum.bottom;

        let mut matrix = ProjectionMatrix { m: [[0.0; 4]; 4] };
        matrix.m[0][0] = 2.0 / (l + r);
        matrix.m[1][1] = 2.0 / (t + b);
        matrix.m[2][0] = (l - r) / (l + r);
        matrix.m[2][1] = (b - t) / (t + b);
        matrix.overwrite_depth(near, far);
        matrix
    }

    /// Converts a projection matrix computed by the device and replaces its depth terms.
    pub fn from_device_matrix(device: &[[f32; 4]; 4], near: f32, far: f32) -> ProjectionMatrix {
        let mut matrix = ProjectionMatrix {
            m: to_host_matrix(device),
        };
        matrix.overwrite_depth(near, far);
        matrix
    }

    pub fn set_clipping_planes(&mut self, near: f32, far: f32) {
        if near != self.near || far != self.far {
            debug!("Clipping planes changed to {} / {}", near, far);
            self.near = near;
            self.far = far;
        }
    }

    pub fn clipping_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    /// Projection for `eye`, recomputed only when the frustum or the clip planes changed.
    pub fn projection(&mut self, eye: VREye, frustum: &VRProjectionFrustum) -> ProjectionMatrix {
        let (near, far) = (self.near, self.far);
        if let Some(cached) = self.cache[eye.index()] {
            if cached.frustum == *frustum && cached.near == near && cached.far == far {
                return cached.matrix;
            }
        }

        let matrix = ProjectionBuilder::build(frustum, near, far);
        self.cache[eye.index()] = Some(CachedProjection {
            frustum: *frustum,
            near,
            far,
            matrix,
        });
        matrix
    }

    /// Queries the headset for the frustum of `eye` and returns its projection.
    /// When the query fails the last matrix built for this eye is reused.
    pub fn stereo_projection(&mut self, headset: &dyn VRHeadset, eye: VREye) -> ProjectionMatrix {
        let frustums = headset.projection_frustums(self.near, self.far);
        match self.errors.check("VRHeadset::projection_frustums", frustums) {
            Ok((left, right)) => {
                let frustum = match eye {
                    VREye::Left => left,
                    VREye::Right => right,
                };
                self.projection(eye, &frustum)
            }
            Err(_) => match self.cache[eye.index()] {
                Some(cached) => cached.matrix,
                None => ProjectionBuilder::build(&VRProjectionFrustum::symmetric(1.0), self.near, self.far),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockHeadset;
    use rust_hmdbridge_api::mock::{MockVRControlMsg, MockVRQuery};
    use rust_hmdbridge_api::VRErrorCode;

    #[test]
    fn equal_planes_take_flat_depth_form() {
        for &near in &[0.01, 1.0, 10.0, 1000.0] {
            let matrix = ProjectionBuilder::build(&VRProjectionFrustum::symmetric(1.0), near, near);
            assert!(matrix.is_finite());
            assert_eq!(matrix.m[2][2], 0.0);
            assert_eq!(matrix.m[3][2], near);
            assert_eq!(matrix.m[2][3], 1.0);
            assert_eq!(matrix.m[3][3], 0.0);
        }
    }

    #[test]
    fn finite_far_plane_depth_terms() {
        let matrix = ProjectionBuilder::build(&VRProjectionFrustum::symmetric(1.0), 0.01, 1000.0);
        assert!((matrix.m[2][2] - (-0.00001)).abs() < 1e-7);
        assert!((matrix.m[3][2] - 0.0100001).abs() < 1e-6);
        assert_eq!(matrix.m[0][0], 1.0);
        assert_eq!(matrix.m[1][1], 1.0);
        assert_eq!(matrix.m[2][0], 0.0);
    }

    #[test]
    fn reversed_depth_maps_near_to_one_and_far_to_zero() {
        let (near, far) = (0.5, 100.0);
        let matrix = ProjectionBuilder::build(&VRProjectionFrustum::symmetric(1.0), near, far);
        let at_near = matrix.project([0.0, 0.0, near]);
        let at_far = matrix.project([0.0, 0.0, far]);
        assert!((at_near[2] / at_near[3] - 1.0).abs() < 1e-5);
        assert!((at_far[2] / at_far[3]).abs() < 1e-5);
    }

    #[test]
    fn asymmetric_frustum_edges_map_to_clip_bounds() {
        let frustum = VRProjectionFrustum {
            left: 1.2,
            right: 0.8,
            top: 0.9,
            bottom: 1.1,
        };
        let matrix = ProjectionBuilder::build(&frustum, 0.1, 100.0);
        let right = matrix.project([0.8, 0.0, 1.0]);
        let left = matrix.project([-1.2, 0.0, 1.0]);
        let top = matrix.project([0.0, 0.9, 1.0]);
        let bottom = matrix.project([0.0, -1.1, 1.0]);
        assert!((right[0] / right[3] - 1.0).abs() < 1e-5);
        assert!((left[0] / left[3] + 1.0).abs() < 1e-5);
        assert!((top[1] / top[3] - 1.0).abs() < 1e-5);
        assert!((bottom[1] / bottom[3] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn device_matrix_gets_host_depth() {
        let mut device = [[0.0; 4]; 4];
        device[0][0] = 1.5;
        device[0][2] = 0.25;
        let matrix = ProjectionBuilder::from_device_matrix(&device, 2.0, 2.0);
        assert_eq!(matrix.m[0][0], 1.5);
        assert_eq!(matrix.m[2][0], 0.25);
        assert_eq!(matrix.m[2][2], 0.0);
        assert_eq!(matrix.m[3][2], 2.0);
    }

    #[test]
    fn cache_follows_clip_planes() {
        let mut builder = ProjectionBuilder::new(10.0, 10.0);
        let frustum = VRProjectionFrustum::symmetric(1.0);
        let flat = builder.projection(VREye::Left, &frustum);
        assert_eq!(flat.m[2][2], 0.0);

        builder.set_clipping_planes(1.0, 100.0);
        let finite = builder.projection(VREye::Left, &frustum);
        assert!(finite.m[2][2] < 0.0);
    }

    #[test]
    fn failed_frustum_query_reuses_last_matrix() {
        let headset = MockHeadset::new();
        let mut builder = ProjectionBuilder::new(1.0, 100.0);
        let wide = VRProjectionFrustum::symmetric(2.0);
        headset.handle_msg(MockVRControlMsg::SetProjectionFrustums(wide, wide));
        let good = builder.stereo_projection(&headset, VREye::Right);
        assert_eq!(good.m[0][0], 0.5);

        headset.handle_msg(MockVRControlMsg::Fail(MockVRQuery::Projection, VRErrorCode::DataNoUpdate));
        assert_eq!(builder.stereo_projection(&headset, VREye::Right), good);
        // Nothing cached yet for this eye
        let fallback = builder.stereo_projection(&headset, VREye::Left);
        assert_eq!(fallback.m[0][0], 1.0);
    }
}
