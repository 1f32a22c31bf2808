use crate::config::SiteConfig;
use actix_cors::Cors;

/// 结算页与联系表单由同站前端调用：只放行 site.base_url 这一个来源，只开放 GET / POST
pub fn create_cors(site: &SiteConfig) -> Cors {
    let allowed = site.base_url.trim_end_matches('/').to_string();

    Cors::default()
        .allowed_origin_fn(move |origin, _req_head| origin.as_bytes() == allowed.as_bytes())
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
