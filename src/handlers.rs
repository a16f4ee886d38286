pub mod auth;
pub mod autorizacoes_compra;
pub mod comissoes;
pub mod controle_acesso;
pub mod produtos;
pub mod promocoes;
pub mod vendedor_metas;
