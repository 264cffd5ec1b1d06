// [libs/infra/worker-client/src/hydrator.rs]
/*!
 * =================================================================
 * APARATO: RESOURCE HYDRATOR (ESTRATO L3)
 * RESPONSABILIDAD: DESCARGA Y CERTIFICACIÓN DE RECURSOS DE ATAQUE
 *
 * Garantiza que cada recurso (wordlist, rulelist, masklist, hash list)
 * llega íntegro antes de ser entregado a hashcat: descarga desde su
 * URL firmada y compara el MD5 resultante contra el checksum declarado
 * por el servidor (§6.2).
 * =================================================================
 */

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cipherswarm_domain_models::wire::AttackResourceFileDto;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub struct ResourceHydrator;

impl ResourceHydrator {
    /// Downloads one resource and verifies its MD5 against `checksum`
    /// (base64-encoded, per §6.2). Returns the local path on success.
    #[instrument(skip(network_client, resource), fields(file = %resource.file_name))]
    pub async fn hydrate_resource(
        network_client: &Client,
        resource: &AttackResourceFileDto,
        cache_dir: &Path,
    ) -> Result<PathBuf> {
        let destination = cache_dir.join(&resource.file_name);

        let response = network_client
            .get(&resource.download_url)
            .send()
            .await
            .context("RESOURCE_FETCH_FAULT: download request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("RESOURCE_FETCH_FAULT: server returned {}", response.status()));
        }

        let bytes = response.bytes().await.context("RESOURCE_FETCH_FAULT: body read failed")?;

        let digest = md5::compute(&bytes);
        let actual_checksum = STANDARD.encode(digest.0);
        if actual_checksum != resource.checksum {
            warn!(
                "❌ [CHECKSUM_MISMATCH]: {} expected {} got {}",
                resource.file_name, resource.checksum, actual_checksum
            );
            return Err(anyhow!("CHECKSUM_MISMATCH: {}", resource.file_name));
        }

        tokio::fs::create_dir_all(cache_dir).await.context("RESOURCE_FETCH_FAULT: cache dir creation failed")?;
        tokio::fs::write(&destination, &bytes).await.context("RESOURCE_FETCH_FAULT: write failed")?;

        info!("📦 [RESOURCE]: {} hydrated and certified ({} bytes)", resource.file_name, bytes.len());
        Ok(destination)
    }

    /// Downloads and verifies the hash list (itself not an `AttackResourceFileDto`
    /// — it is addressed by `hash_list_url`/`hash_list_checksum` directly on the
    /// Attack DTO) into `cache_dir/hash_list.txt`.
    #[instrument(skip(network_client))]
    pub async fn hydrate_hash_list(
        network_client: &Client,
        hash_list_url: &str,
        hash_list_checksum: &str,
        cache_dir: &Path,
    ) -> Result<PathBuf> {
        let resource = AttackResourceFileDto {
            id: "hash_list".to_string(),
            download_url: hash_list_url.to_string(),
            checksum: hash_list_checksum.to_string(),
            file_name: "hash_list.txt".to_string(),
        };
        Self::hydrate_resource(network_client, &resource, cache_dir).await
    }
}
