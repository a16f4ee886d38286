// src/routes.rs

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

/// Monta a camada de CORS a partir de `CORS_ORIGINS` (`*` libera qualquer origem).
pub fn cors_layer(origens: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    if origens.is_empty() || origens.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let permitidas: Vec<HeaderValue> = origens
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("⚠️ Origem CORS inválida ignorada: {}", o);
                None
            }
        })
        .collect();

    base.allow_origin(permitidas)
}

pub fn build_app(app_state: AppState) -> Router {
    let autorizacoes_routes = Router::new()
        .route(
            "/",
            post(handlers::autorizacoes_compra::create_autorizacao)
                .get(handlers::autorizacoes_compra::list_autorizacoes),
        )
        .route(
            "/{id}",
            get(handlers::autorizacoes_compra::get_autorizacao)
                .put(handlers::autorizacoes_compra::update_autorizacao)
                .patch(handlers::autorizacoes_compra::update_autorizacao)
                .delete(handlers::autorizacoes_compra::delete_autorizacao),
        )
        .route(
            "/{id}/autorizar-controladoria",
            patch(handlers::autorizacoes_compra::autorizar_controladoria),
        )
        .route(
            "/{id}/reverter-controladoria",
            patch(handlers::autorizacoes_compra::reverter_controladoria),
        )
        .route(
            "/{id}/autorizar-diretoria",
            patch(handlers::autorizacoes_compra::autorizar_diretoria),
        );

    let acesso_routes = Router::new()
        .route("/minhas-permissoes", get(handlers::controle_acesso::minhas_permissoes))
        .route(
            "/verificar/{modulo}/{acao}",
            get(handlers::controle_acesso::verificar_permissao),
        )
        .route(
            "/niveis",
            get(handlers::controle_acesso::list_niveis).post(handlers::controle_acesso::save_nivel),
        )
        .route(
            "/modulos",
            get(handlers::controle_acesso::list_modulos)
                .post(handlers::controle_acesso::create_modulo),
        )
        .route(
            "/modulos/{id}",
            put(handlers::controle_acesso::update_modulo)
                .delete(handlers::controle_acesso::delete_modulo),
        )
        .route(
            "/permissoes/{nivel}",
            get(handlers::controle_acesso::list_permissoes)
                .put(handlers::controle_acesso::save_permissoes),
        )
        .route(
            "/permissoes/{nivel}/{modulo_id}",
            delete(handlers::controle_acesso::delete_permissao),
        );

    let produtos_routes = Router::new()
        .route("/catalogo", get(handlers::produtos::search_catalog))
        .route(
            "/labels",
            get(handlers::produtos::list_etiquetas).post(handlers::produtos::create_etiqueta),
        )
        .route("/labels/importar", post(handlers::produtos::importar_etiquetas))
        .route(
            "/labels/{id}",
            get(handlers::produtos::get_etiqueta)
                .put(handlers::produtos::update_etiqueta)
                .delete(handlers::produtos::delete_etiqueta),
        );

    let promocoes_routes = Router::new()
        .route(
            "/",
            get(handlers::promocoes::list_promocoes).post(handlers::promocoes::create_promocao),
        )
        .route("/importar", post(handlers::promocoes::importar_promocoes))
        .route(
            "/{id}",
            get(handlers::promocoes::get_promocao)
                .put(handlers::promocoes::update_promocao)
                .delete(handlers::promocoes::delete_promocao),
        );

    let comissoes_routes = Router::new()
        .route(
            "/",
            get(handlers::comissoes::list_faixas).post(handlers::comissoes::create_faixa),
        )
        .route(
            "/{id}",
            get(handlers::comissoes::get_faixa)
                .put(handlers::comissoes::update_faixa)
                .delete(handlers::comissoes::delete_faixa),
        );

    let comissoes_vendedores_routes = Router::new()
        .route(
            "/",
            get(handlers::comissoes::list_comissoes_vendedores)
                .post(handlers::comissoes::save_comissao_vendedor),
        )
        .route(
            "/{id}",
            delete(handlers::comissoes::delete_comissao_vendedor),
        );

    let metas_routes = Router::new()
        .route(
            "/",
            get(handlers::vendedor_metas::list_metas).post(handlers::vendedor_metas::create_meta),
        )
        .route("/importar", post(handlers::vendedor_metas::importar_metas))
        .route("/acompanhamento", get(handlers::vendedor_metas::acompanhamento))
        .route(
            "/{id}",
            get(handlers::vendedor_metas::get_meta)
                .put(handlers::vendedor_metas::update_meta)
                .delete(handlers::vendedor_metas::delete_meta),
        );

    // Tudo abaixo exige token válido
    let protegidas = Router::new()
        .route("/api/auth/verificar", get(handlers::auth::verificar))
        .nest("/api/autorizacoes-compra", autorizacoes_routes)
        .nest("/api/controle-acesso", acesso_routes)
        .nest("/api/produtos", produtos_routes)
        .nest("/api/promocoes", promocoes_routes)
        .nest("/api/comissoes", comissoes_routes)
        .nest("/api/comissoes-vendedores", comissoes_vendedores_routes)
        .nest("/api/vendedor-metas", metas_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .merge(protegidas)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::*;

    async fn preflight(origens: &[&str], origem: &str) -> Option<String> {
        let origens: Vec<String> = origens.iter().map(|o| o.to_string()).collect();
        let app: Router = Router::new()
            .route("/api/health", get(|| async { "OK" }))
            .layer(cors_layer(&origens));

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/health")
            .header(header::ORIGIN, origem)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn wildcard_or_empty_list_allows_any_origin() {
        assert_eq!(preflight(&["*"], "http://qualquer.local").await.as_deref(), Some("*"));
        assert_eq!(preflight(&[], "http://qualquer.local").await.as_deref(), Some("*"));
    }

    #[tokio::test]
    async fn explicit_list_echoes_only_known_origins() {
        // a entrada inválida é descartada sem derrubar a montagem
        let origens = ["http://localhost:5173", "inválida\n"];

        assert_eq!(
            preflight(&origens, "http://localhost:5173").await.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(preflight(&origens, "http://intruso.local").await, None);
    }
}
