use nalgebra::{Matrix3, Point3, Unit, Vector3};
use std::cmp::Ordering;
use thiserror::Error;

/// Variances below this (in Å²) are treated as zero when judging the rank of a point cloud.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    #[error("At least {required} points are required for the fit, but {found} were given")]
    InsufficientPoints { required: usize, found: usize },

    #[error("Points do not span the {required_rank} dimension(s) needed for the fit")]
    Degenerate { required_rank: usize },

    #[error("Got {weights} weights for {points} points")]
    WeightCountMismatch { points: usize, weights: usize },

    #[error("Weights must be finite and non-negative with a positive sum")]
    InvalidWeights,
}

/// Centroid, covariance spectrum and principal axes of a point cloud.
struct PrincipalAxes {
    centroid: Point3<f64>,
    /// Eigenvalues in ascending order.
    variances: [f64; 3],
    /// Unit eigenvectors matching `variances`.
    axes: [Unit<Vector3<f64>>; 3],
}

impl PrincipalAxes {
    fn compute(
        points: &[Point3<f64>],
        weights: Option<&[f64]>,
        required: usize,
    ) -> Result<Self, FitError> {
        if points.len() < required {
            return Err(FitError::InsufficientPoints {
                required,
                found: points.len(),
            });
        }
        if let Some(weights) = weights {
            if weights.len() != points.len() {
                return Err(FitError::WeightCountMismatch {
                    points: points.len(),
                    weights: weights.len(),
                });
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(FitError::InvalidWeights);
            }
        }

        let weight_of = |i: usize| weights.map_or(1.0, |w| w[i]);
        let total: f64 = (0..points.len()).map(weight_of).sum();
        if total <= 0.0 {
            return Err(FitError::InvalidWeights);
        }

        let weighted_sum = points
            .iter()
            .enumerate()
            .fold(Vector3::zeros(), |acc, (i, p)| acc + p.coords * weight_of(i));
        let centroid = Point3::from(weighted_sum / total);

        let covariance = points
            .iter()
            .enumerate()
            .fold(Matrix3::zeros(), |acc, (i, p)| {
                let d = p - centroid;
                acc + d * d.transpose() * weight_of(i)
            })
            / total;

        let eigen = covariance.symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(Ordering::Equal)
        });

        let axis = |i: usize| Unit::new_normalize(eigen.eigenvectors.column(i).into_owned());
        Ok(Self {
            centroid,
            variances: order.map(|i| eigen.eigenvalues[i].max(0.0)),
            axes: order.map(axis),
        })
    }

    /// Number of directions with non-negligible spread.
    fn rank(&self) -> usize {
        self.variances.iter().filter(|&&v| v > RANK_TOLERANCE).count()
    }
}

/// Point of the plane through `through` with normal `axis` that lies nearest the global origin.
fn foot_of_origin(through: &Point3<f64>, axis: &Unit<Vector3<f64>>) -> Point3<f64> {
    Point3::from(axis.as_ref() * through.coords.dot(axis.as_ref()))
}

/// An infinite plane, stored as a unit normal and the plane point nearest the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3D {
    normal: Unit<Vector3<f64>>,
    origin: Point3<f64>,
}

impl Plane3D {
    /// Builds the plane through `point` with the given normal direction.
    ///
    /// Returns `None` if `normal` is (numerically) the zero vector.
    pub fn new(normal: Vector3<f64>, point: Point3<f64>) -> Option<Self> {
        let normal = Unit::try_new(normal, RANK_TOLERANCE)?;
        Some(Self {
            normal,
            origin: foot_of_origin(&point, &normal),
        })
    }

    /// Least-squares plane through `points`.
    pub fn best_fit(points: &[Point3<f64>]) -> Result<Self, FitError> {
        Self::best_fit_weighted(points, None)
    }

    /// Least-squares plane through `points`, each point weighted by the matching
    /// entry of `weights` (uniform when `None`).
    ///
    /// The normal is the covariance eigenvector with the smallest eigenvalue; the
    /// plane passes through the weighted centroid.
    ///
    /// # Errors
    ///
    /// Fails with [`FitError::InsufficientPoints`] for fewer than three points and
    /// with [`FitError::Degenerate`] when the points are collinear or coincident.
    pub fn best_fit_weighted(
        points: &[Point3<f64>],
        weights: Option<&[f64]>,
    ) -> Result<Self, FitError> {
        let pca = PrincipalAxes::compute(points, weights, 3)?;
        if pca.rank() < 2 {
            return Err(FitError::Degenerate { required_rank: 2 });
        }
        let normal = pca.axes[0];
        Ok(Self {
            normal,
            origin: foot_of_origin(&pca.centroid, &normal),
        })
    }

    pub fn normal(&self) -> &Unit<Vector3<f64>> {
        &self.normal
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Signed distance of `point` along the normal.
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(self.normal.as_ref())
    }

    /// Perpendicular distance of `point` from the plane.
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }

    /// Orthogonal projection of `point` onto the plane.
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal.as_ref() * self.signed_distance(point)
    }

    /// `|cos θ|` of the angle between the two normals; 1.0 means parallel planes.
    pub fn normal_alignment(&self, other: &Plane3D) -> f64 {
        self.normal.dot(other.normal.as_ref()).abs().min(1.0)
    }
}

/// An infinite line, stored as a unit direction and the line point nearest the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3D {
    direction: Unit<Vector3<f64>>,
    origin: Point3<f64>,
}

impl Line3D {
    /// Builds the line through `point` along `direction`.
    ///
    /// Returns `None` if `direction` is (numerically) the zero vector.
    pub fn new(direction: Vector3<f64>, point: Point3<f64>) -> Option<Self> {
        let direction = Unit::try_new(direction, RANK_TOLERANCE)?;
        Some(Self {
            direction,
            origin: point - direction.as_ref() * point.coords.dot(direction.as_ref()),
        })
    }

    pub fn best_fit(points: &[Point3<f64>]) -> Result<Self, FitError> {
        Self::best_fit_weighted(points, None)
    }

    /// Least-squares line through `points`: the covariance eigenvector with the
    /// largest eigenvalue, anchored at the weighted centroid.
    ///
    /// # Errors
    ///
    /// Fails with [`FitError::InsufficientPoints`] for fewer than two points and
    /// with [`FitError::Degenerate`] when all points coincide.
    pub fn best_fit_weighted(
        points: &[Point3<f64>],
        weights: Option<&[f64]>,
    ) -> Result<Self, FitError> {
        let pca = PrincipalAxes::compute(points, weights, 2)?;
        if pca.rank() < 1 {
            return Err(FitError::Degenerate { required_rank: 1 });
        }
        let direction = pca.axes[2];
        let centroid = pca.centroid;
        Ok(Self {
            direction,
            origin: centroid - direction.as_ref() * centroid.coords.dot(direction.as_ref()),
        })
    }

    pub fn direction(&self) -> &Unit<Vector3<f64>> {
        &self.direction
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Point on the line nearest to `point`.
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.origin + self.direction.as_ref() * point.coords.dot(self.direction.as_ref())
    }

    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.closest_point(point)).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn square_at_height(z: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
            Point3::new(1.0, 1.0, z),
        ]
    }

    mod plane {
        use super::*;

        #[test]
        fn fits_horizontal_square() {
            let plane = Plane3D::best_fit(&square_at_height(2.5)).unwrap();
            assert!((plane.normal().z.abs() - 1.0).abs() < EPS);
            assert!((plane.origin() - Point3::new(0.0, 0.0, 2.5)).norm() < EPS);
            assert!(plane.distance(&Point3::new(7.0, -3.0, 2.5)) < EPS);
            assert!((plane.distance(&Point3::new(0.0, 0.0, 0.0)) - 2.5).abs() < EPS);
        }

        #[test]
        fn origin_is_plane_point_nearest_global_origin() {
            let points = vec![
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ];
            let plane = Plane3D::best_fit(&points).unwrap();
            let expected = Point3::new(1.0, 1.0, 1.0) / 3.0;
            assert!((plane.origin() - expected).norm() < EPS);
            for p in &points {
                assert!(plane.distance(p) < EPS);
            }
        }

        #[test]
        fn recovers_tilted_plane_from_noisy_samples() {
            let mut rng = StdRng::seed_from_u64(7);
            let normal = Vector3::new(1.0, -2.0, 0.5).normalize();
            let u = normal.cross(&Vector3::z()).normalize();
            let v = normal.cross(&u);
            let anchor = Point3::new(3.0, 1.0, -4.0);
            let points: Vec<_> = (0..200)
                .map(|_| {
                    anchor
                        + u * rng.gen_range(-5.0..5.0)
                        + v * rng.gen_range(-5.0..5.0)
                        + normal * rng.gen_range(-0.01..0.01)
                })
                .collect();

            let plane = Plane3D::best_fit(&points).unwrap();
            assert!(plane.normal().dot(&normal).abs() > 0.9999);
            assert!(plane.distance(&anchor) < 0.01);
        }

        #[test]
        fn weights_shift_the_anchor_toward_heavy_points() {
            let mut points = square_at_height(0.0);
            points.extend(square_at_height(1.0));
            let mut weights = vec![1.0; 4];
            weights.extend([0.0; 4]);

            let plane = Plane3D::best_fit_weighted(&points, Some(&weights)).unwrap();
            assert!((plane.normal().z.abs() - 1.0).abs() < EPS);
            assert!(plane.origin().z.abs() < EPS);
        }

        #[test]
        fn too_few_points_is_an_error() {
            let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
            assert_eq!(
                Plane3D::best_fit(&points),
                Err(FitError::InsufficientPoints {
                    required: 3,
                    found: 2
                })
            );
        }

        #[test]
        fn collinear_points_are_degenerate() {
            let points: Vec<_> = (0..5)
                .map(|i| Point3::new(i as f64, 2.0 * i as f64, 0.0))
                .collect();
            assert_eq!(
                Plane3D::best_fit(&points),
                Err(FitError::Degenerate { required_rank: 2 })
            );
        }

        #[test]
        fn weight_validation() {
            let points = square_at_height(0.0);
            assert_eq!(
                Plane3D::best_fit_weighted(&points, Some(&[1.0, 1.0])),
                Err(FitError::WeightCountMismatch {
                    points: 4,
                    weights: 2
                })
            );
            assert_eq!(
                Plane3D::best_fit_weighted(&points, Some(&[0.0; 4])),
                Err(FitError::InvalidWeights)
            );
            assert_eq!(
                Plane3D::best_fit_weighted(&points, Some(&[1.0, -1.0, 1.0, 1.0])),
                Err(FitError::InvalidWeights)
            );
        }

        #[test]
        fn explicit_plane_and_projection() {
            let plane =
                Plane3D::new(Vector3::new(0.0, 0.0, 3.0), Point3::new(5.0, 5.0, 1.0)).unwrap();
            assert!((plane.signed_distance(&Point3::new(0.0, 0.0, 4.0)) - 3.0).abs() < EPS);
            let projected = plane.project(&Point3::new(2.0, -1.0, 9.0));
            assert!((projected - Point3::new(2.0, -1.0, 1.0)).norm() < EPS);
            assert!(Plane3D::new(Vector3::zeros(), Point3::origin()).is_none());
        }

        #[test]
        fn normal_alignment_ignores_normal_sign() {
            let up = Plane3D::new(Vector3::z(), Point3::origin()).unwrap();
            let down = Plane3D::new(-Vector3::z(), Point3::new(0.0, 0.0, 3.4)).unwrap();
            let tilted = Plane3D::new(Vector3::new(0.0, 1.0, 1.0), Point3::origin()).unwrap();
            assert!((up.normal_alignment(&down) - 1.0).abs() < EPS);
            assert!((up.normal_alignment(&tilted) - 45f64.to_radians().cos()).abs() < EPS);
        }
    }

    mod line {
        use super::*;

        #[test]
        fn fits_points_along_an_axis() {
            let points: Vec<_> = (0..6).map(|i| Point3::new(i as f64, 1.0, 2.0)).collect();
            let line = Line3D::best_fit(&points).unwrap();
            assert!((line.direction().x.abs() - 1.0).abs() < EPS);
            assert!((line.origin() - Point3::new(0.0, 1.0, 2.0)).norm() < EPS);
            assert!(line.distance(&Point3::new(42.0, 1.0, 2.0)) < EPS);
        }

        #[test]
        fn closest_point_is_orthogonal_foot() {
            let line =
                Line3D::new(Vector3::new(1.0, 1.0, 0.0), Point3::new(0.0, 0.0, 5.0)).unwrap();
            let foot = line.closest_point(&Point3::new(2.0, 0.0, 0.0));
            assert!((foot - Point3::new(1.0, 1.0, 5.0)).norm() < EPS);
            let expected = (2.0f64 + 25.0).sqrt();
            assert!((line.distance(&Point3::new(2.0, 0.0, 0.0)) - expected).abs() < EPS);
        }

        #[test]
        fn coincident_points_are_degenerate() {
            let points = vec![Point3::new(1.0, 1.0, 1.0); 4];
            assert_eq!(
                Line3D::best_fit(&points),
                Err(FitError::Degenerate { required_rank: 1 })
            );
        }

        #[test]
        fn single_point_is_insufficient() {
            assert_eq!(
                Line3D::best_fit(&[Point3::origin()]),
                Err(FitError::InsufficientPoints {
                    required: 2,
                    found: 1
                })
            );
        }
    }
}
