use mosaic_scene::Mesh;

use crate::error::ProcessError;

/// Run `f` over every mesh and collect the results in mesh order.
///
/// With the `parallel` feature the meshes are processed on the rayon pool.
/// The first error in mesh order is not guaranteed; any error aborts.
pub(crate) fn map_meshes<T, F>(meshes: &[Mesh], f: F) -> Result<Vec<T>, ProcessError>
where
    T: Send,
    F: Fn(usize, &Mesh) -> Result<T, ProcessError> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
        meshes
            .par_iter()
            .enumerate()
            .map(|(index, mesh)| f(index, mesh))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| f(index, mesh))
            .collect()
    }
}
