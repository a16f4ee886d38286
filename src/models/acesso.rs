// src/models/acesso.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct NivelAcesso {
    #[schema(example = "02")]
    pub codigo: String,
    #[schema(example = "Controladoria")]
    pub descricao: String,
    pub ativo: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Modulo {
    pub id: Uuid,
    #[schema(example = "Autorizações de Compra")]
    pub nome: String,
    #[schema(example = "autorizacoes-compra")]
    pub chave: String,
    #[schema(example = "shopping-cart")]
    pub icone: Option<String>,
    #[schema(example = 1)]
    pub ordem: i32,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Permissao {
    pub nivel: String,
    pub modulo_id: Uuid,
    pub pode_visualizar: bool,
    pub pode_criar: bool,
    pub pode_editar: bool,
    pub pode_excluir: bool,
}

// Linha da tela de permissões: todos os módulos, configurados ou não
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PermissaoModulo {
    pub modulo_id: Uuid,
    pub modulo_nome: String,
    pub modulo_chave: String,
    pub icone: Option<String>,
    pub ordem: i32,
    pub configurada: bool,
    pub pode_visualizar: bool,
    pub pode_criar: bool,
    pub pode_editar: bool,
    pub pode_excluir: bool,
}

/// Ação verificada contra a tabela de permissões.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Acao {
    Visualizar,
    Criar,
    Editar,
    Excluir,
}

impl Acao {
    pub fn as_str(&self) -> &'static str {
        match self {
            Acao::Visualizar => "visualizar",
            Acao::Criar => "criar",
            Acao::Editar => "editar",
            Acao::Excluir => "excluir",
        }
    }
}

impl fmt::Display for Acao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// O frontend antigo manda as ações em inglês; aceitamos os dois.
impl FromStr for Acao {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "visualizar" | "view" => Ok(Acao::Visualizar),
            "criar" | "create" => Ok(Acao::Criar),
            "editar" | "edit" => Ok(Acao::Editar),
            "excluir" | "delete" => Ok(Acao::Excluir),
            other => Err(format!("Ação desconhecida: {}", other)),
        }
    }
}

impl Permissao {
    pub fn permite(&self, acao: Acao) -> bool {
        match acao {
            Acao::Visualizar => self.pode_visualizar,
            Acao::Criar => self.pode_criar,
            Acao::Editar => self.pode_editar,
            Acao::Excluir => self.pode_excluir,
        }
    }
}

/// Resultado da consulta de permissão: distingue "negado" de "não configurado".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissaoConsulta {
    Configurada(bool),
    NaoConfigurada,
}

impl PermissaoConsulta {
    pub fn from_row(row: Option<&Permissao>, acao: Acao) -> Self {
        match row {
            Some(p) => PermissaoConsulta::Configurada(p.permite(acao)),
            None => PermissaoConsulta::NaoConfigurada,
        }
    }

    // Sem linha na tabela = acesso negado
    pub fn permitido(self) -> bool {
        matches!(self, PermissaoConsulta::Configurada(true))
    }
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SalvarNivelPayload {
    #[validate(length(min = 1, max = 4, message = "O código do nível deve ter de 1 a 4 caracteres."))]
    #[schema(example = "05")]
    pub codigo: String,
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    #[schema(example = "Compras")]
    pub descricao: String,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModuloPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub nome: String,
    #[validate(length(min = 1, max = 60, message = "A chave é obrigatória."))]
    #[schema(example = "promocoes")]
    pub chave: String,
    pub icone: Option<String>,
    #[serde(default)]
    pub ordem: i32,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateModuloPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub nome: Option<String>,
    #[validate(length(min = 1, max = 60, message = "A chave não pode ser vazia."))]
    pub chave: Option<String>,
    pub icone: Option<String>,
    pub ordem: Option<i32>,
    pub ativo: Option<bool>,
}

impl UpdateModuloPayload {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.chave.is_none()
            && self.icone.is_none()
            && self.ordem.is_none()
            && self.ativo.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissaoItem {
    pub modulo_id: Uuid,
    #[serde(default)]
    pub pode_visualizar: bool,
    #[serde(default)]
    pub pode_criar: bool,
    #[serde(default)]
    pub pode_editar: bool,
    #[serde(default)]
    pub pode_excluir: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SalvarPermissoesPayload {
    #[validate(length(min = 1, message = "Informe ao menos uma permissão."))]
    pub permissoes: Vec<PermissaoItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificacaoPermissao {
    pub modulo: String,
    pub acao: Acao,
    pub permitido: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permissao(v: bool, c: bool, e: bool, x: bool) -> Permissao {
        Permissao {
            nivel: "03".into(),
            modulo_id: Uuid::nil(),
            pode_visualizar: v,
            pode_criar: c,
            pode_editar: e,
            pode_excluir: x,
        }
    }

    #[test]
    fn missing_row_is_denied_for_every_action() {
        for acao in [Acao::Visualizar, Acao::Criar, Acao::Editar, Acao::Excluir] {
            let consulta = PermissaoConsulta::from_row(None, acao);
            assert_eq!(consulta, PermissaoConsulta::NaoConfigurada);
            assert!(!consulta.permitido());
        }
    }

    #[test]
    fn configured_row_picks_the_matching_flag() {
        let p = permissao(true, false, true, false);
        assert!(PermissaoConsulta::from_row(Some(&p), Acao::Visualizar).permitido());
        assert_eq!(
            PermissaoConsulta::from_row(Some(&p), Acao::Criar),
            PermissaoConsulta::Configurada(false)
        );
        assert!(PermissaoConsulta::from_row(Some(&p), Acao::Editar).permitido());
        assert!(!PermissaoConsulta::from_row(Some(&p), Acao::Excluir).permitido());
    }

    #[test]
    fn action_parses_portuguese_and_english() {
        assert_eq!("view".parse::<Acao>().unwrap(), Acao::Visualizar);
        assert_eq!("Excluir".parse::<Acao>().unwrap(), Acao::Excluir);
        assert_eq!("edit".parse::<Acao>().unwrap(), Acao::Editar);
        assert!("aprovar".parse::<Acao>().is_err());
    }
}
