//! 3-D process-grid geometry for structured-grid problems.
//!
//! The global `gnx × gny × gnz` grid is split into an `npx × npy × npz` grid of
//! equally sized `nx × ny × nz` boxes, one per rank. Global identifiers number the
//! grid points lexicographically with `x` fastest:
//! `g = giz*gnx*gny + giy*gnx + gix`.

use crate::halo_error::HaloError;
use crate::topology::ownership::OwnershipResolver;
use crate::{GlobalIndex, Rank};

/// Problem geometry for one rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    size: usize,
    rank: Rank,
    nx: usize,
    ny: usize,
    nz: usize,
    npx: usize,
    npy: usize,
    npz: usize,
}

impl Geometry {
    /// Geometry for `rank` with local box `local` and process grid `procs`.
    ///
    /// # Errors
    /// [`HaloError::InvalidGeometry`] if a dimension is zero, the process grid
    /// does not multiply to `size`, or `rank >= size`.
    pub fn new(
        size: usize,
        rank: Rank,
        local: (usize, usize, usize),
        procs: (usize, usize, usize),
    ) -> Result<Self, HaloError> {
        let (nx, ny, nz) = local;
        let (npx, npy, npz) = procs;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(HaloError::InvalidGeometry(format!(
                "local box {nx}x{ny}x{nz} has an empty dimension"
            )));
        }
        let procs_total = npx.checked_mul(npy).and_then(|p| p.checked_mul(npz));
        if procs_total != Some(size) {
            return Err(HaloError::InvalidGeometry(format!(
                "process grid {npx}x{npy}x{npz} does not cover {size} ranks"
            )));
        }
        if rank >= size {
            return Err(HaloError::InvalidGeometry(format!(
                "rank {rank} out of range for {size} ranks"
            )));
        }
        // Every global id and every local row count must fit its type; the
        // accessors below multiply without checks.
        let overflow = || HaloError::InvalidGeometry("global grid overflows".into());
        let global_dim = |np: usize, n: usize| {
            np.checked_mul(n)
                .and_then(|d| GlobalIndex::try_from(d).ok())
                .ok_or_else(overflow)
        };
        let (gnx, gny, gnz) = (global_dim(npx, nx)?, global_dim(npy, ny)?, global_dim(npz, nz)?);
        gnx.checked_mul(gny)
            .and_then(|p| p.checked_mul(gnz))
            .ok_or_else(overflow)?;
        nx.checked_mul(ny)
            .and_then(|p| p.checked_mul(nz))
            .ok_or_else(overflow)?;
        Ok(Self {
            size,
            rank,
            nx,
            ny,
            nz,
            npx,
            npy,
            npz,
        })
    }

    /// Like [`Geometry::new`], choosing the process grid with
    /// [`process_grid_for`].
    pub fn with_auto_grid(
        size: usize,
        rank: Rank,
        local: (usize, usize, usize),
    ) -> Result<Self, HaloError> {
        if size == 0 {
            return Err(HaloError::InvalidGeometry("size must be positive".into()));
        }
        Self::new(size, rank, local, process_grid_for(size))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Local box dimensions `(nx, ny, nz)`.
    pub fn local_dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Process grid dimensions `(npx, npy, npz)`.
    pub fn process_dims(&self) -> (usize, usize, usize) {
        (self.npx, self.npy, self.npz)
    }

    /// This rank's coordinates `(ipx, ipy, ipz)` in the process grid.
    pub fn process_coords(&self) -> (usize, usize, usize) {
        let ipz = self.rank / (self.npx * self.npy);
        let rem = self.rank % (self.npx * self.npy);
        (rem % self.npx, rem / self.npx, ipz)
    }

    pub fn gnx(&self) -> GlobalIndex {
        (self.npx * self.nx) as GlobalIndex
    }

    pub fn gny(&self) -> GlobalIndex {
        (self.npy * self.ny) as GlobalIndex
    }

    pub fn gnz(&self) -> GlobalIndex {
        (self.npz * self.nz) as GlobalIndex
    }

    /// Total number of global rows.
    pub fn global_rows(&self) -> GlobalIndex {
        self.gnx() * self.gny() * self.gnz()
    }

    /// Number of rows owned by each rank.
    pub fn local_rows(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Global id of grid point `(gix, giy, giz)`.
    #[inline]
    pub fn global_id(&self, gix: GlobalIndex, giy: GlobalIndex, giz: GlobalIndex) -> GlobalIndex {
        giz * self.gnx() * self.gny() + giy * self.gnx() + gix
    }

    /// Grid coordinates `(gix, giy, giz)` of a global id.
    #[inline]
    pub fn global_coords(&self, global: GlobalIndex) -> (GlobalIndex, GlobalIndex, GlobalIndex) {
        let plane = self.gnx() * self.gny();
        let giz = global / plane;
        let rem = global % plane;
        (rem % self.gnx(), rem / self.gnx(), giz)
    }
}

impl OwnershipResolver for Geometry {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn owner_of(&self, global: GlobalIndex) -> Result<Rank, HaloError> {
        if global >= self.global_rows() {
            return Err(HaloError::UnresolvedOwner {
                global,
                size: self.size,
            });
        }
        let (gix, giy, giz) = self.global_coords(global);
        let ipx = (gix / self.nx as GlobalIndex) as usize;
        let ipy = (giy / self.ny as GlobalIndex) as usize;
        let ipz = (giz / self.nz as GlobalIndex) as usize;
        Ok(ipx + ipy * self.npx + ipz * self.npy * self.npx)
    }
}

/// Factor `size` into a process grid `(npx, npy, npz)` with
/// `npx <= npy <= npz`, minimising the surface `npx*npy + npy*npz + npx*npz`.
pub fn process_grid_for(size: usize) -> (usize, usize, usize) {
    let mut best = (1, 1, size);
    let mut best_surface = usize::MAX;
    let mut x = 1;
    while x * x * x <= size {
        if size % x == 0 {
            let rest = size / x;
            let mut y = x;
            while y * y <= rest {
                if rest % y == 0 {
                    let z = rest / y;
                    let surface = x * y + y * z + x * z;
                    if surface < best_surface {
                        best_surface = surface;
                        best = (x, y, z);
                    }
                }
                y += 1;
            }
        }
        x += 1;
    }
    best
}
