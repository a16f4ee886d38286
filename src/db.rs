pub mod user_repo;
pub use user_repo::UserRepository;
pub mod acesso_repo;
pub use acesso_repo::AcessoRepository;
pub mod autorizacao_compra_repo;
pub use autorizacao_compra_repo::AutorizacaoCompraRepository;
pub mod produto_repo;
pub use produto_repo::ProdutoRepository;
pub mod promocao_repo;
pub use promocao_repo::PromocaoRepository;
pub mod comissao_repo;
pub use comissao_repo::ComissaoRepository;
pub mod meta_repo;
pub use meta_repo::MetaRepository;
