//! Data module: the partitioned matrix and the buffers that travel with it.

pub mod send_buffer;
pub mod sparse_matrix;
pub mod stencil;

pub use send_buffer::SendBuffer;
pub use sparse_matrix::SparseMatrix;
pub use stencil::generate_stencil_matrix;
