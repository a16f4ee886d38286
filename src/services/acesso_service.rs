// src/services/acesso_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::ensure_affected, error::AppError},
    db::AcessoRepository,
    models::acesso::{
        Acao, CreateModuloPayload, Modulo, NivelAcesso, Permissao, PermissaoConsulta,
        PermissaoItem, PermissaoModulo, SalvarNivelPayload, UpdateModuloPayload,
    },
};

#[derive(Clone)]
pub struct AcessoService {
    repo: AcessoRepository,
    pool: PgPool,
}

impl AcessoService {
    pub fn new(repo: AcessoRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // --- AVALIAÇÃO ---

    pub async fn consultar_permissao(
        &self,
        nivel: &str,
        chave_modulo: &str,
        acao: Acao,
    ) -> Result<PermissaoConsulta, AppError> {
        let row = self.repo.find_permission(nivel, chave_modulo).await?;
        Ok(PermissaoConsulta::from_row(row.as_ref(), acao))
    }

    /// Sem linha configurada para (nível, módulo) o acesso é negado.
    pub async fn get_module_permission(
        &self,
        nivel: &str,
        chave_modulo: &str,
        acao: Acao,
    ) -> Result<bool, AppError> {
        let consulta = self.consultar_permissao(nivel, chave_modulo, acao).await?;
        if consulta == PermissaoConsulta::NaoConfigurada {
            tracing::debug!(
                "Permissão não configurada: nível {} módulo {} ação {}",
                nivel,
                chave_modulo,
                acao
            );
        }
        Ok(consulta.permitido())
    }

    /// Menu do usuário: módulos ativos que o nível pode visualizar.
    pub async fn menu_do_nivel(&self, nivel: &str) -> Result<Vec<PermissaoModulo>, AppError> {
        let modulos = self.repo.list_permissoes_nivel(nivel, true).await?;
        Ok(modulos.into_iter().filter(|m| m.pode_visualizar).collect())
    }

    // --- NÍVEIS ---

    pub async fn list_niveis(&self) -> Result<Vec<NivelAcesso>, AppError> {
        self.repo.list_niveis().await
    }

    pub async fn save_nivel(&self, payload: &SalvarNivelPayload) -> Result<NivelAcesso, AppError> {
        self.repo.upsert_nivel(payload).await
    }

    // --- MÓDULOS ---

    pub async fn list_modulos(&self) -> Result<Vec<Modulo>, AppError> {
        self.repo.list_modulos().await
    }

    pub async fn create_modulo(&self, payload: &CreateModuloPayload) -> Result<Modulo, AppError> {
        let modulo = self.repo.create_modulo(payload).await?;
        tracing::info!("🧩 Módulo '{}' criado", modulo.chave);
        Ok(modulo)
    }

    pub async fn update_modulo(&self, id: Uuid, patch: &UpdateModuloPayload) -> Result<Modulo, AppError> {
        if patch.is_empty() {
            return Err(AppError::NoFieldsToUpdate);
        }
        self.repo
            .update_modulo(id, patch)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Módulo".into()))
    }

    pub async fn delete_modulo(&self, id: Uuid) -> Result<(), AppError> {
        ensure_affected(self.repo.delete_modulo(id).await?, "Módulo")
    }

    // --- PERMISSÕES ---

    pub async fn list_permissoes(&self, nivel: &str) -> Result<Vec<PermissaoModulo>, AppError> {
        self.repo.list_permissoes_nivel(nivel, false).await
    }

    /// Grava o lote inteiro ou nada.
    pub async fn salvar_permissoes(
        &self,
        nivel: &str,
        itens: &[PermissaoItem],
    ) -> Result<Vec<Permissao>, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut salvas = Vec::with_capacity(itens.len());
        for item in itens {
            salvas.push(self.repo.upsert_permissao(&mut *tx, nivel, item).await?);
        }

        tx.commit().await?;
        tracing::info!("🛡️ {} permissões salvas para o nível {}", salvas.len(), nivel);

        Ok(salvas)
    }

    pub async fn delete_permissao(&self, nivel: &str, modulo_id: Uuid) -> Result<(), AppError> {
        ensure_affected(
            self.repo.delete_permissao(nivel, modulo_id).await?,
            "Permissão",
        )
    }
}
