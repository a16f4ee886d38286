pub mod acesso;
pub mod auth;
pub mod autorizacao_compra;
pub mod comissao;
pub mod meta;
pub mod produto;
pub mod promocao;
