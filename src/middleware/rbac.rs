// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{acesso::Acao, auth::Identidade},
};

/// 1. O Trait que define o que é uma Permissão (módulo + ação)
pub trait PermissionDef: Send + Sync + 'static {
    fn modulo() -> &'static str;
    fn acao() -> Acao;
}

/// 2. O Extractor (Guardião). Carrega a identidade já validada.
pub struct RequirePermission<T>(pub Identidade, pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário
        let AuthenticatedUser(identidade) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Verifica no Banco
        let permitido = app_state
            .acesso_service
            .get_module_permission(&identidade.nivel, T::modulo(), T::acao())
            .await
            .map_err(|e| {
                tracing::error!("🔥 Falha ao verificar permissões: {}", e);
                AppError::InternalServerError(anyhow::anyhow!("Falha ao verificar permissões"))
            })?;

        if !permitido {
            return Err(AppError::PermissionDenied {
                modulo: T::modulo().to_string(),
                acao: T::acao().to_string(),
            });
        }

        Ok(RequirePermission(identidade, PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permissoes {
    ($modulo:literal => { $($tipo:ident: $acao:ident),+ $(,)? }) => {
        $(
            pub struct $tipo;
            impl PermissionDef for $tipo {
                fn modulo() -> &'static str { $modulo }
                fn acao() -> Acao { Acao::$acao }
            }
        )+
    };
}

permissoes!("autorizacoes-compra" => {
    PermAutorizacaoRead: Visualizar,
    PermAutorizacaoCreate: Criar,
    PermAutorizacaoEdit: Editar,
    PermAutorizacaoDelete: Excluir,
});

permissoes!("produtos" => {
    PermProdutoRead: Visualizar,
    PermProdutoCreate: Criar,
    PermProdutoEdit: Editar,
    PermProdutoDelete: Excluir,
});

permissoes!("promocoes" => {
    PermPromocaoRead: Visualizar,
    PermPromocaoCreate: Criar,
    PermPromocaoEdit: Editar,
    PermPromocaoDelete: Excluir,
});

permissoes!("comissoes" => {
    PermComissaoRead: Visualizar,
    PermComissaoCreate: Criar,
    PermComissaoEdit: Editar,
    PermComissaoDelete: Excluir,
});

permissoes!("comissoes-vendedores" => {
    PermComissaoVendedorRead: Visualizar,
    PermComissaoVendedorEdit: Editar,
    PermComissaoVendedorDelete: Excluir,
});

permissoes!("vendedor-metas" => {
    PermMetaRead: Visualizar,
    PermMetaCreate: Criar,
    PermMetaEdit: Editar,
    PermMetaDelete: Excluir,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_carry_module_and_action() {
        assert_eq!(PermAutorizacaoRead::modulo(), "autorizacoes-compra");
        assert_eq!(PermAutorizacaoDelete::acao(), Acao::Excluir);
        assert_eq!(PermMetaCreate::modulo(), "vendedor-metas");
        assert_eq!(PermComissaoVendedorEdit::acao(), Acao::Editar);
    }
}
