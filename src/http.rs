use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::{
    environment::{environment_routes, Environment},
    monitoring::health_routes,
};

pub(crate) fn socket_addr() -> Result<SocketAddr> {
    let port_str = dotenvy::var("CAFENV_BIND_PORT").unwrap_or_else(|_| String::from("3000"));
    let port_parsed = port_str
        .parse::<u16>()
        .context("CAFENV_BIND_PORT must be a number between 1 and 65535")?;

    let interface_addr = dotenvy::var("CAFENV_BIND_ADDRESS").unwrap_or_else(|_| String::from("::"));
    let ip = IpAddr::from_str(interface_addr.as_str())
        .with_context(|| format!("Invalid address {}", interface_addr))?;
    Ok(SocketAddr::new(ip, port_parsed))
}

fn walk_dir(path: &Path) -> Result<Vec<PathBuf>> {
    let files = std::fs::read_dir(path)
        .with_context(|| format!("Reading `{}` directory", path.display()))?;
    let mut paths = Vec::new();
    for entry in files {
        match entry {
            Ok(entry) => {
                if entry.file_type()?.is_dir() {
                    let mut subresult = walk_dir(&entry.path())?;
                    paths.append(&mut subresult);
                }

                if entry.file_name() == "index.html" {
                    paths.push(
                        entry
                            .path()
                            .parent()
                            .expect("Parent path is accessible")
                            .to_owned(),
                    );
                }
            }
            Err(e) => warn!("File system error: {:?}", e),
        }
    }

    Ok(paths)
}

pub(crate) fn app(record: Arc<Environment>, files_dir: &str) -> Result<Router> {
    let spa_apps = walk_dir(Path::new(files_dir))?;
    let mut app = Router::new()
        .nest("/app", health_routes(record.clone()))
        .nest("/environment", environment_routes(record));

    for spa_app in spa_apps {
        let relative = spa_app.strip_prefix(files_dir).unwrap_or(spa_app.as_path());
        let uri_path = if relative.as_os_str().is_empty() {
            "/".to_string()
        } else {
            format!("/{}", relative.to_string_lossy())
        };
        let fs_path = spa_app.as_path();
        debug!("Serving route {uri_path} from folder {:?}", fs_path);
        let mut fallback = spa_app.clone();
        fallback.push("index.html");
        let serve_dir = ServeDir::new(fs_path).not_found_service(ServeFile::new(fallback));

        // Nesting at the root is not supported, the top level app becomes
        // the fallback for everything no other route claims.
        if uri_path == "/" {
            app = app.fallback_service(serve_dir);
        } else {
            app = app.nest_service(&uri_path, serve_dir);
        }
    }

    Ok(app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
