use std::{collections::HashMap, path::Path};

/**
 * This module contains all logic for loading textures from disk and building
 * the primitive meshes on the GPU.
 */
pub mod mesh;
pub mod texture;

pub async fn load_binary(dir: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = dir.join(file_name);
    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| anyhow::anyhow!("could not read {}: {e}", path.display()))?;
    Ok(data)
}

/// Read every file concurrently. Failures are kept per file so that one
/// missing image does not stop the others from loading.
pub async fn load_binaries(
    dir: &Path,
    file_names: &[&str],
) -> HashMap<String, anyhow::Result<Vec<u8>>> {
    let reads = file_names.iter().map(|name| async move {
        (name.to_string(), load_binary(dir, name).await)
    });
    futures::future::join_all(reads).await.into_iter().collect()
}
