// src/config.rs

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::{
    db::{
        AcessoRepository, AutorizacaoCompraRepository, ComissaoRepository, MetaRepository,
        ProdutoRepository, PromocaoRepository, UserRepository,
    },
    services::{
        acesso_service::AcessoService, auth::AuthService,
        autorizacao_compra_service::AutorizacaoCompraService, comissao_service::ComissaoService,
        meta_service::MetaService, produto_service::ProdutoService,
        promocao_service::PromocaoService,
    },
};

#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        match self {
            DatabaseConfig::Url(url) => {
                PgConnectOptions::from_str(url).context("DATABASE_URL inválida")
            }
            DatabaseConfig::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

/// Configuração carregada do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub password_hash_key: String,
    pub cors_origins: Vec<String>,
    pub port: u16,
    /// Níveis autorizados a fazer login.
    pub niveis_login: Vec<String>,
    pub niveis_controladoria: Vec<String>,
    pub niveis_diretoria: Vec<String>,
    /// Níveis que administram o controle de acesso.
    pub niveis_admin: Vec<String>,
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| get(key).with_context(|| format!("{} deve ser definida", key));
        let list_or = |key: &str, default: &str| parse_list(&get(key).unwrap_or_else(|| default.into()));

        let database = match get("DATABASE_URL") {
            Some(url) => DatabaseConfig::Url(url),
            None => DatabaseConfig::Parts {
                host: required("DB_HOST")?,
                port: get("DB_PORT")
                    .map(|p| p.parse().context("DB_PORT inválida"))
                    .transpose()?
                    .unwrap_or(5432),
                user: required("DB_USER")?,
                password: required("DB_PASSWORD")?,
                database: required("DB_NAME")?,
            },
        };

        let port = get("PORT")
            .map(|p| p.parse().context("PORT inválida"))
            .transpose()?
            .unwrap_or(3000);

        let db_max_connections = get("DB_MAX_CONNECTIONS")
            .map(|p| p.parse().context("DB_MAX_CONNECTIONS inválida"))
            .transpose()?
            .unwrap_or(5);

        Ok(Self {
            database,
            db_max_connections,
            jwt_secret: required("JWT_SECRET")?,
            password_hash_key: required("PASSWORD_HASH_KEY")?,
            cors_origins: list_or("CORS_ORIGINS", "*"),
            port,
            niveis_login: list_or("NIVEIS_LOGIN", "00,01,02,03,04,05"),
            niveis_controladoria: list_or("NIVEIS_CONTROLADORIA", "02"),
            niveis_diretoria: list_or("NIVEIS_DIRETORIA", "01"),
            niveis_admin: list_or("NIVEIS_ADMIN", "00"),
        })
    }

    /// Controladoria e diretoria enxergam todas as autorizações de compra.
    pub fn nivel_privilegiado(&self, nivel: &str) -> bool {
        self.niveis_controladoria.iter().any(|n| n == nivel)
            || self.niveis_diretoria.iter().any(|n| n == nivel)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub acesso_service: AcessoService,
    pub autorizacao_service: AutorizacaoCompraService,
    pub produto_service: ProdutoService,
    pub promocao_service: PromocaoService,
    pub comissao_service: ComissaoService,
    pub meta_service: MetaService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(config.database.connect_options()?)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(config, db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(config: AppConfig, db_pool: PgPool) -> Self {
        let config = Arc::new(config);

        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            &config.jwt_secret,
            config.password_hash_key.clone(),
            config.niveis_login.clone(),
        );
        let acesso_service = AcessoService::new(AcessoRepository::new(db_pool.clone()), db_pool.clone());
        let autorizacao_service = AutorizacaoCompraService::new(
            AutorizacaoCompraRepository::new(db_pool.clone()),
            db_pool.clone(),
            config.clone(),
        );
        let produto_service = ProdutoService::new(ProdutoRepository::new(db_pool.clone()), db_pool.clone());
        let promocao_service = PromocaoService::new(
            PromocaoRepository::new(db_pool.clone()),
            ProdutoRepository::new(db_pool.clone()),
            db_pool.clone(),
        );
        let comissao_service = ComissaoService::new(ComissaoRepository::new(db_pool.clone()), db_pool.clone());
        let meta_service = MetaService::new(
            MetaRepository::new(db_pool.clone()),
            ComissaoRepository::new(db_pool.clone()),
            db_pool.clone(),
        );

        Self {
            db_pool,
            config,
            auth_service,
            acesso_service,
            autorizacao_service,
            produto_service,
            promocao_service,
            comissao_service,
            meta_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_and_lists() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u:p@localhost/db"),
            ("JWT_SECRET", "s"),
            ("PASSWORD_HASH_KEY", "k"),
            ("CORS_ORIGINS", "http://a.local, http://b.local,"),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.cors_origins, vec!["http://a.local", "http://b.local"]);
        assert_eq!(cfg.niveis_controladoria, vec!["02"]);
        assert!(cfg.nivel_privilegiado("01"));
        assert!(cfg.nivel_privilegiado("02"));
        assert!(!cfg.nivel_privilegiado("00"));
        assert!(!cfg.nivel_privilegiado("04"));
    }

    #[test]
    fn database_from_parts() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "5433"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "p@ss"),
            ("DB_NAME", "retaguarda"),
            ("JWT_SECRET", "s"),
            ("PASSWORD_HASH_KEY", "k"),
        ]))
        .unwrap();

        match cfg.database {
            DatabaseConfig::Parts { ref host, port, .. } => {
                assert_eq!(host, "db");
                assert_eq!(port, 5433);
            }
            _ => panic!("esperava configuração por partes"),
        }
        assert!(cfg.database.connect_options().is_ok());
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/db")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }
}
