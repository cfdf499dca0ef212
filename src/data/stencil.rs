//! 27-point stencil matrices on a [`Geometry`].
//!
//! Every grid point couples to itself and to each of its (up to) 26 neighbors
//! in the global grid. The pattern is structurally symmetric, which makes these
//! matrices the reference input for halo setup.

use crate::data::sparse_matrix::SparseMatrix;
use crate::halo_error::HaloError;
use crate::topology::geometry::Geometry;
use crate::GlobalIndex;

/// Build this rank's slice of the 27-point stencil matrix.
///
/// Local rows are ordered `iz*nx*ny + iy*nx + ix` over the rank's box; columns
/// within a row are ascending global ids.
pub fn generate_stencil_matrix(geom: &Geometry) -> Result<SparseMatrix, HaloError> {
    let (nx, ny, nz) = geom.local_dims();
    let (ipx, ipy, ipz) = geom.process_coords();
    let (gnx, gny, gnz) = (geom.gnx() as i64, geom.gny() as i64, geom.gnz() as i64);

    let mut local_to_global = Vec::with_capacity(geom.local_rows());
    let mut rows = Vec::with_capacity(geom.local_rows());
    for iz in 0..nz {
        let giz = (ipz * nz + iz) as i64;
        for iy in 0..ny {
            let giy = (ipy * ny + iy) as i64;
            for ix in 0..nx {
                let gix = (ipx * nx + ix) as i64;
                local_to_global.push(geom.global_id(gix as u64, giy as u64, giz as u64));

                let mut cols: Vec<GlobalIndex> = Vec::with_capacity(27);
                for sz in -1..=1i64 {
                    if !(0..gnz).contains(&(giz + sz)) {
                        continue;
                    }
                    for sy in -1..=1i64 {
                        if !(0..gny).contains(&(giy + sy)) {
                            continue;
                        }
                        for sx in -1..=1i64 {
                            if !(0..gnx).contains(&(gix + sx)) {
                                continue;
                            }
                            cols.push(geom.global_id(
                                (gix + sx) as u64,
                                (giy + sy) as u64,
                                (giz + sz) as u64,
                            ));
                        }
                    }
                }
                rows.push(cols);
            }
        }
    }
    log::trace!(
        "rank {}: generated {} stencil rows",
        geom.rank(),
        local_to_global.len()
    );
    SparseMatrix::from_rows(local_to_global, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_box_nonzero_counts() {
        let geom = Geometry::new(1, 0, (3, 3, 3), (1, 1, 1)).unwrap();
        let m = generate_stencil_matrix(&geom).unwrap();
        assert_eq!(m.local_number_of_rows(), 27);
        // corner, edge, face, interior
        assert_eq!(m.nonzeros_in_row(0), 8);
        assert_eq!(m.nonzeros_in_row(1), 12);
        assert_eq!(m.nonzeros_in_row(4), 18);
        assert_eq!(m.nonzeros_in_row(13), 27);
    }

    #[test]
    fn columns_are_sorted_and_include_diagonal() {
        let geom = Geometry::new(2, 1, (2, 2, 2), (2, 1, 1)).unwrap();
        let m = generate_stencil_matrix(&geom).unwrap();
        for i in 0..m.local_number_of_rows() {
            let row = m.global_row(i);
            assert!(row.windows(2).all(|w| w[0] < w[1]));
            assert!(row.contains(&m.local_to_global()[i]));
        }
    }
}
