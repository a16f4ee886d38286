// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Retaguarda API", description = "Backend da retaguarda das lojas"),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::verificar,

        // --- Autorizações de compra ---
        handlers::autorizacoes_compra::create_autorizacao,
        handlers::autorizacoes_compra::list_autorizacoes,
        handlers::autorizacoes_compra::get_autorizacao,
        handlers::autorizacoes_compra::update_autorizacao,
        handlers::autorizacoes_compra::delete_autorizacao,
        handlers::autorizacoes_compra::autorizar_controladoria,
        handlers::autorizacoes_compra::reverter_controladoria,
        handlers::autorizacoes_compra::autorizar_diretoria,

        // --- Controle de acesso ---
        handlers::controle_acesso::minhas_permissoes,
        handlers::controle_acesso::verificar_permissao,
        handlers::controle_acesso::list_niveis,
        handlers::controle_acesso::save_nivel,
        handlers::controle_acesso::list_modulos,
        handlers::controle_acesso::create_modulo,
        handlers::controle_acesso::update_modulo,
        handlers::controle_acesso::delete_modulo,
        handlers::controle_acesso::list_permissoes,
        handlers::controle_acesso::save_permissoes,
        handlers::controle_acesso::delete_permissao,

        // --- Produtos ---
        handlers::produtos::search_catalog,
        handlers::produtos::list_etiquetas,
        handlers::produtos::get_etiqueta,
        handlers::produtos::create_etiqueta,
        handlers::produtos::update_etiqueta,
        handlers::produtos::delete_etiqueta,
        handlers::produtos::importar_etiquetas,

        // --- Promoções ---
        handlers::promocoes::list_promocoes,
        handlers::promocoes::get_promocao,
        handlers::promocoes::create_promocao,
        handlers::promocoes::update_promocao,
        handlers::promocoes::delete_promocao,
        handlers::promocoes::importar_promocoes,

        // --- Comissões ---
        handlers::comissoes::list_faixas,
        handlers::comissoes::get_faixa,
        handlers::comissoes::create_faixa,
        handlers::comissoes::update_faixa,
        handlers::comissoes::delete_faixa,
        handlers::comissoes::list_comissoes_vendedores,
        handlers::comissoes::save_comissao_vendedor,
        handlers::comissoes::delete_comissao_vendedor,

        // --- Metas ---
        handlers::vendedor_metas::list_metas,
        handlers::vendedor_metas::get_meta,
        handlers::vendedor_metas::create_meta,
        handlers::vendedor_metas::update_meta,
        handlers::vendedor_metas::delete_meta,
        handlers::vendedor_metas::importar_metas,
        handlers::vendedor_metas::acompanhamento,
    ),
    components(
        schemas(
            common::import::ImportErro,

            // --- Auth ---
            models::auth::Identidade,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::VerificarResponse,

            // --- Autorizações ---
            models::autorizacao_compra::AutorizacaoCompra,
            models::autorizacao_compra::SituacaoAutorizacao,
            models::autorizacao_compra::AutorizacaoCompraResponse,
            models::autorizacao_compra::CreateAutorizacaoPayload,
            models::autorizacao_compra::AtualizarAutorizacaoPayload,

            // --- Controle de acesso ---
            models::acesso::Acao,
            models::acesso::NivelAcesso,
            models::acesso::Modulo,
            models::acesso::Permissao,
            models::acesso::PermissaoModulo,
            models::acesso::PermissaoItem,
            models::acesso::SalvarNivelPayload,
            models::acesso::CreateModuloPayload,
            models::acesso::UpdateModuloPayload,
            models::acesso::SalvarPermissoesPayload,
            models::acesso::VerificacaoPermissao,

            // --- Produtos ---
            models::produto::Bandeira,
            models::produto::ProdutoCatalogo,
            models::produto::EtiquetaProduto,
            models::produto::CreateEtiquetaPayload,
            models::produto::UpdateEtiquetaPayload,
            models::produto::ImportarEtiquetasPayload,

            // --- Promoções ---
            models::promocao::Promocao,
            models::promocao::CreatePromocaoPayload,
            models::promocao::UpdatePromocaoPayload,
            models::promocao::ItemImportacaoPromocao,
            models::promocao::ImportarPromocoesPayload,

            // --- Comissões ---
            models::comissao::FaixaComissao,
            models::comissao::PercentualComissao,
            models::comissao::FaixaComissaoDetalhe,
            models::comissao::PercentualPayload,
            models::comissao::SalvarFaixaPayload,
            models::comissao::ComissaoVendedor,
            models::comissao::SalvarComissaoVendedorPayload,

            // --- Metas ---
            models::meta::MetaVendedor,
            models::meta::CreateMetaPayload,
            models::meta::UpdateMetaPayload,
            models::meta::ItemImportacaoMeta,
            models::meta::ImportarMetasPayload,
            models::meta::AcompanhamentoMeta,
        )
    ),
    tags(
        (name = "Auth", description = "Login e verificação de token"),
        (name = "Autorizações de Compra", description = "Fluxo controladoria → diretoria"),
        (name = "Controle de Acesso", description = "Níveis, módulos e permissões"),
        (name = "Produtos", description = "Cadastro e etiquetas por competência"),
        (name = "Promoções", description = "Preços promocionais por competência"),
        (name = "Comissões", description = "Esquemas de comissão e vínculos com vendedores"),
        (name = "Metas de Vendedores", description = "Metas, importação e acompanhamento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
