use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::fs::File;
use std::io::BufReader;
use tokio_postgres::NoTls;
use tracing::{debug, info};

/// Connection pool type alias
pub type DbPool = Pool;

/// Translate database settings into a deadpool configuration.
fn pool_config(config: &config::DatabaseConfig) -> Config {
    let mut cfg = Config::new();
    cfg.host = config.host.clone();
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.database.clone());
    cfg.user = Some(config.username.clone());
    cfg.password = Some(config.password.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_connections as usize));
    cfg
}

/// Create a connection pool, using rustls when TLS is enabled.
pub fn create_pool(config: &config::DatabaseConfig) -> anyhow::Result<DbPool> {
    let cfg = pool_config(config);

    info!(
        "Creating database pool: host={}, port={}, database={}, max_connections={}, tls={}",
        config.host.as_deref().unwrap_or("localhost"),
        config.port,
        config.database,
        config.max_connections,
        config.tls_enabled
    );

    if config.tls_enabled {
        create_pool_with_rustls(cfg, config.tls_ca_cert_path.as_deref())
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))
    }
}

/// Create pool using rustls with either custom certificate or platform verifier
pub fn create_pool_with_rustls(cfg: Config, cert_path: Option<&str>) -> anyhow::Result<Pool> {
    use tokio_postgres_rustls::MakeRustlsConnect;

    // Install the default crypto provider (ring) if not already installed
    let _ = rustls::crypto::ring::default_provider().install_default();

    let client_config = if let Some(cert_path) = cert_path {
        info!(
            "Using rustls with custom CA certificate from: {}",
            cert_path
        );

        let cert_file = File::open(cert_path)
            .map_err(|e| anyhow::anyhow!("Failed to open certificate file {}: {}", cert_path, e))?;
        let mut reader = BufReader::new(cert_file);

        let certs = rustls_pemfile::certs(&mut reader)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Failed to parse certificate: {}", e))?;

        if certs.is_empty() {
            return Err(anyhow::anyhow!("No certificates found in {}", cert_path));
        }

        debug!("Found {} certificate(s) in {}", certs.len(), cert_path);

        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs {
            root_store
                .add(cert)
                .map_err(|e| anyhow::anyhow!("Failed to add certificate to root store: {}", e))?;
        }

        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth()
    } else {
        info!("Using rustls with platform verifier (OS certificate store)");

        use rustls_platform_verifier::ConfigVerifierExt;
        rustls::ClientConfig::with_platform_verifier()
            .map_err(|e| anyhow::anyhow!("Failed to create platform verifier: {}", e))?
    };

    let tls = MakeRustlsConnect::new(client_config);

    cfg.create_pool(Some(Runtime::Tokio1), tls)
        .map_err(|e| anyhow::anyhow!("Failed to create TLS pool: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_config(tls_enabled: bool, tls_ca_cert_path: Option<String>) -> config::DatabaseConfig {
        config::DatabaseConfig {
            host: Some("localhost".to_string()),
            port: 5433,
            database: "documents_test".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            max_connections: 4,
            tls_enabled,
            tls_ca_cert_path,
            mock: false,
        }
    }

    #[test]
    fn test_pool_config_carries_connection_settings() {
        let cfg = pool_config(&database_config(false, None));

        assert_eq!(cfg.host.as_deref(), Some("localhost"));
        assert_eq!(cfg.port, Some(5433));
        assert_eq!(cfg.dbname.as_deref(), Some("documents_test"));
        assert_eq!(cfg.user.as_deref(), Some("postgres"));
        assert_eq!(cfg.pool.map(|p| p.max_size), Some(4));
    }

    #[tokio::test]
    async fn test_plain_pool_is_created_lazily() {
        // deadpool connects on first checkout, so no server is needed here
        let pool = create_pool(&database_config(false, None)).unwrap();
        assert_eq!(pool.status().max_size, 4);
    }

    #[test]
    fn test_missing_ca_certificate_is_an_error() {
        let result = create_pool(&database_config(
            true,
            Some("/nonexistent/ca-cert.pem".to_string()),
        ));

        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("Failed to open certificate file"));
    }

    #[test]
    fn test_empty_ca_certificate_is_an_error() {
        let path = std::env::temp_dir().join(format!("empty_ca_{}.pem", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let result = create_pool(&database_config(
            true,
            Some(path.to_string_lossy().into_owned()),
        ));
        std::fs::remove_file(&path).unwrap();

        let err = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("No certificates found"));
    }
}
