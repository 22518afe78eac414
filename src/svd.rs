//! Singular value decompositions with truncation.
//!
//! Used to recompress separable approximations and to compute null spaces of
//! boundary condition matrices.

use crate::types::{Result, ScalarType};
use ndarray::{s, Array1, Array2, ArrayView2};
use ndarray_linalg::{JobSvd, SVDDCInto};

pub enum CompressionType {
    /// Adaptive compression with a specified relative tolerance
    ADAPTIVE(f64),
    /// Rank based compression with specified rank
    RANK(usize),
}

pub struct SVDData<A: ScalarType> {
    /// The U matrix
    pub u: Array2<A>,
    /// The array of singular values
    pub s: Array1<f64>,
    /// The vt matrix
    pub vt: Array2<A>,
}

pub trait ComputeSVD {
    type A: ScalarType;

    /// Reduced SVD, `u` is `(m, k)` and `vt` is `(k, n)` with `k = min(m, n)`.
    fn compute_svd(&self) -> Result<SVDData<Self::A>>;

    /// Full SVD, `u` is `(m, m)` and `vt` is `(n, n)`.
    fn compute_full_svd(&self) -> Result<SVDData<Self::A>>;
}

impl<A: ScalarType> ComputeSVD for ArrayView2<'_, A> {
    type A = A;

    fn compute_svd(&self) -> Result<SVDData<A>> {
        svd_with(self, JobSvd::Some)
    }

    fn compute_full_svd(&self) -> Result<SVDData<A>> {
        svd_with(self, JobSvd::All)
    }
}

impl<A: ScalarType> ComputeSVD for Array2<A> {
    type A = A;

    fn compute_svd(&self) -> Result<SVDData<A>> {
        svd_with(&self.view(), JobSvd::Some)
    }

    fn compute_full_svd(&self) -> Result<SVDData<A>> {
        svd_with(&self.view(), JobSvd::All)
    }
}

fn svd_with<A: ScalarType>(arr: &ArrayView2<A>, job: JobSvd) -> Result<SVDData<A>> {
    let (m, n) = arr.dim();
    let (u, s, vt) = arr.to_owned().svddc_into(job)?;
    // Lapack returns no vectors for empty input.
    let u = u.unwrap_or_else(|| Array2::zeros((m, 0)));
    let vt = vt.unwrap_or_else(|| Array2::zeros((0, n)));
    Ok(SVDData { u, s, vt })
}

impl<A: ScalarType> SVDData<A> {
    /// Numerical rank: number of singular values above `tol` times the largest.
    pub fn rank(&self, tol: f64) -> usize {
        match self.s.get(0) {
            Some(&s0) if s0 > 0.0 => self.rank_above(tol * s0),
            _ => 0,
        }
    }

    /// Number of singular values strictly above `threshold`.
    pub fn rank_above(&self, threshold: f64) -> usize {
        self.s.iter().filter(|&&item| item > threshold).count()
    }

    pub fn compress(self, compression_type: CompressionType) -> SVDData<A> {
        match compression_type {
            CompressionType::ADAPTIVE(tol) => {
                let rank = self.rank(tol);
                self.compress_rank(rank)
            }
            CompressionType::RANK(rank) => self.compress_rank(rank),
        }
    }

    fn compress_rank(self, mut max_rank: usize) -> SVDData<A> {
        let (u, s, vt) = (self.u, self.s, self.vt);

        if max_rank > s.len() {
            max_rank = s.len()
        }

        let u = u.slice_move(s![.., 0..max_rank]);
        let s = s.slice_move(s![0..max_rank]);
        let vt = vt.slice_move(s![0..max_rank, ..]);

        SVDData { u, s, vt }
    }

    pub fn to_mat(&self) -> Array2<A> {
        let sigma = Array2::from_diag(&self.s.mapv(A::from_real));
        self.u.dot(&sigma.dot(&self.vt))
    }
}
