use actix_cors::Cors;

/// Browsers may call the API from the configured frontend, or any localhost
/// port during development.
pub fn create_cors(frontend_url: &str) -> Cors {
    let frontend = frontend_url.trim_end_matches('/').to_string();
    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| {
            origin
                .to_str()
                .map(|o| o == frontend || is_local_origin(o))
                .unwrap_or(false)
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}

fn is_local_origin(origin: &str) -> bool {
    ["http://localhost", "http://127.0.0.1"]
        .iter()
        .any(|prefix| origin == *prefix || origin.starts_with(&format!("{prefix}:")))
}
