pub mod acesso_service;
pub mod auth;
pub mod autorizacao_compra_service;
pub mod comissao_service;
pub mod meta_service;
pub mod produto_service;
pub mod promocao_service;
